use crate::config::IndexerConfig;
use crate::utils::error::{IndexerError, Result};
use std::path::Path;

impl IndexerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IndexerError::ConfigError {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }
}
