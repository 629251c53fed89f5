use crate::utils::error::{IndexerError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

// Elasticsearch 索引名稱不可包含的字元
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' '];

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(IndexerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(IndexerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(IndexerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IndexerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_index_prefix(field_name: &str, prefix: &str) -> Result<()> {
    validate_non_empty_string(field_name, prefix)?;

    if prefix.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(IndexerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: prefix.to_string(),
            reason: "Index names must be lowercase".to_string(),
        });
    }

    if let Some(c) = prefix.chars().find(|c| FORBIDDEN_INDEX_CHARS.contains(c)) {
        return Err(IndexerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: prefix.to_string(),
            reason: format!("Index names cannot contain '{}'", c),
        });
    }

    if prefix.starts_with(['-', '_', '+']) {
        return Err(IndexerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: prefix.to_string(),
            reason: "Index names cannot start with '-', '_' or '+'".to_string(),
        });
    }

    Ok(())
}
