use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid event: {reason}")]
    InvalidEvent { reason: String },

    #[error("Invalid record at position {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("Cannot derive region and service from host '{host}'")]
    HostParseError { host: String },

    #[error("Bulk request failed before a response arrived: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Bulk response is not valid JSON: {source}")]
    ResponseParseError {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Bulk request failed with status {status_code}")]
    BulkFailure {
        status_code: u16,
        response_body: Value,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Record,
    Configuration,
    Transport,
    Response,
    Bulk,
}

impl IndexerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IndexerError::SerializationError(_)
            | IndexerError::InvalidEvent { .. }
            | IndexerError::InvalidRecord { .. } => ErrorCategory::Record,
            IndexerError::HostParseError { .. }
            | IndexerError::ConfigError { .. }
            | IndexerError::InvalidConfigValueError { .. }
            | IndexerError::MissingConfigError { .. }
            | IndexerError::IoError(_) => ErrorCategory::Configuration,
            IndexerError::TransportError(_) => ErrorCategory::Transport,
            IndexerError::ResponseParseError { .. } => ErrorCategory::Response,
            IndexerError::BulkFailure { .. } => ErrorCategory::Bulk,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Record => "Send a JSON array whose elements are all JSON objects",
            ErrorCategory::Configuration => {
                "Check the endpoint (<domain>.<region>.<service>.amazonaws.com) and other settings"
            }
            ErrorCategory::Transport => "Check network access to the search domain",
            ErrorCategory::Response => "The endpoint did not answer with JSON; verify it is a search domain",
            ErrorCategory::Bulk => "Inspect failedItems in the response body for per-document errors",
        }
    }

    /// 舊式 `fail` 回呼收到的內容：bulk 失敗為 `{statusCode, responseBody}`，其他為錯誤描述。
    pub fn failure_payload(&self) -> Value {
        match self {
            IndexerError::BulkFailure {
                status_code,
                response_body,
            } => json!({
                "statusCode": status_code,
                "responseBody": response_body,
            }),
            other => json!({
                "errorType": format!("{:?}", other.category()),
                "errorMessage": other.to_string(),
            }),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexerError>;

/// 交給呼叫端的錯誤，訊息本身就是序列化後的 `failure_payload`。
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FailurePayload(String);

impl FailurePayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&IndexerError> for FailurePayload {
    fn from(error: &IndexerError) -> Self {
        Self(error.failure_payload().to_string())
    }
}
