#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::signer::parse_endpoint;
use crate::utils::error::{IndexerError, Result};
use crate::utils::validation::{
    validate_index_prefix, validate_non_empty_string, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INDEX_PREFIX: &str = "logs";
pub const DEFAULT_DOC_TYPE: &str = "_doc";

/// 目的地與行為設定，在建構時傳入各元件。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// 搜尋網域的主機名稱，例如 `search-logs.us-east-1.es.amazonaws.com`
    pub endpoint: String,

    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    #[serde(default = "default_doc_type")]
    pub doc_type: String,

    #[serde(default = "default_log_failed_responses")]
    pub log_failed_responses: bool,

    /// 實際連線的 base URL（VPC proxy、本地測試）；簽章的 Host 仍為 `endpoint`
    #[serde(default)]
    pub target_url: Option<String>,
}

fn default_index_prefix() -> String {
    DEFAULT_INDEX_PREFIX.to_string()
}

fn default_doc_type() -> String {
    DEFAULT_DOC_TYPE.to_string()
}

fn default_log_failed_responses() -> bool {
    true
}

impl IndexerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            index_prefix: default_index_prefix(),
            doc_type: default_doc_type(),
            log_failed_responses: default_log_failed_responses(),
            target_url: None,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 以任意查詢函式讀取設定，`from_env` 的實作基礎。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("ES_ENDPOINT").ok_or_else(|| IndexerError::ConfigError {
            message: "ES_ENDPOINT environment variable is required".to_string(),
        })?;

        let log_failed_responses = match lookup("LOG_FAILED_RESPONSES") {
            Some(raw) => parse_flag("LOG_FAILED_RESPONSES", &raw)?,
            None => default_log_failed_responses(),
        };

        Ok(Self {
            endpoint,
            index_prefix: lookup("ES_INDEX_PREFIX").unwrap_or_else(default_index_prefix),
            doc_type: lookup("ES_DOC_TYPE").unwrap_or_else(default_doc_type),
            log_failed_responses,
            target_url: lookup("ES_TARGET_URL").filter(|url| !url.is_empty()),
        })
    }

    /// 送出請求的 URL
    pub fn bulk_url(&self, path: &str) -> String {
        match &self.target_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => format!("https://{}{}", self.endpoint, path),
        }
    }
}

fn parse_flag(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(IndexerError::InvalidConfigValueError {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "Expected true or false".to_string(),
        }),
    }
}

impl Validate for IndexerConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("endpoint", &self.endpoint)?;
        parse_endpoint(&self.endpoint)?;

        validate_index_prefix("index_prefix", &self.index_prefix)?;
        validate_non_empty_string("doc_type", &self.doc_type)?;

        if let Some(url) = &self.target_url {
            validate_url("target_url", url)?;
        }

        tracing::debug!("✅ Indexer configuration validation passed");
        Ok(())
    }
}
