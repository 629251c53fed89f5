use crate::domain::model::Credentials;
use crate::domain::ports::CredentialsProvider;
use crate::utils::error::Result;
use std::env;

pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// 從環境變數讀取憑證，每次呼叫都重新讀取。
///
/// 缺少的金鑰不會在本地報錯：簽章照樣算得出來，只是會被伺服器拒絕。
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialsProvider;

impl EnvCredentialsProvider {
    fn read(name: &str) -> Option<String> {
        match env::var(name) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

impl CredentialsProvider for EnvCredentialsProvider {
    fn credentials(&self) -> Result<Credentials> {
        let access_key_id = Self::read(ACCESS_KEY_ID_VAR).unwrap_or_else(|| {
            tracing::warn!("⚠️ {} is not set, the request will be rejected", ACCESS_KEY_ID_VAR);
            String::new()
        });
        let secret_access_key = Self::read(SECRET_ACCESS_KEY_VAR).unwrap_or_else(|| {
            tracing::warn!(
                "⚠️ {} is not set, the request will be rejected",
                SECRET_ACCESS_KEY_VAR
            );
            String::new()
        });

        Ok(Credentials {
            access_key_id,
            secret_access_key,
            session_token: Self::read(SESSION_TOKEN_VAR),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StaticCredentialsProvider {
    credentials: Credentials,
}

impl StaticCredentialsProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialsProvider for StaticCredentialsProvider {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }
}
