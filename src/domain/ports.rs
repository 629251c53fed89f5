use crate::domain::model::Credentials;
use crate::utils::error::{IndexerError, Result};
use chrono::{DateTime, Utc};

/// 每次簽章都重新取得憑證，不做快取。
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 呼叫端的完成回呼，每次呼叫恰好觸發其中之一一次。
pub trait Completion {
    fn succeed(&self, message: &str);
    fn fail(&self, error: &IndexerError);
}
