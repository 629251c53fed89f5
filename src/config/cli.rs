use crate::config::IndexerConfig;
use crate::utils::error::{IndexerError, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "msk-es-indexer")]
#[command(about = "Replay a batch of log records into a signed Elasticsearch bulk request")]
pub struct CliConfig {
    /// JSON array 或 NDJSON 格式的記錄檔
    pub input: PathBuf,

    #[arg(long, help = "TOML config file; flags override its values")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub index_prefix: Option<String>,

    #[arg(long)]
    pub doc_type: Option<String>,

    #[arg(long, help = "Send to this base URL instead of https://<endpoint>")]
    pub target_url: Option<String>,

    #[arg(long, help = "Do not log failed bulk items")]
    pub no_log_failed_responses: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn indexer_config(&self) -> Result<IndexerConfig> {
        let mut config = match (&self.config, &self.endpoint) {
            (Some(path), _) => IndexerConfig::from_file(path)?,
            (None, Some(endpoint)) => IndexerConfig::new(endpoint.clone()),
            (None, None) => {
                return Err(IndexerError::MissingConfigError {
                    field: "endpoint".to_string(),
                })
            }
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(prefix) = &self.index_prefix {
            config.index_prefix = prefix.clone();
        }
        if let Some(doc_type) = &self.doc_type {
            config.doc_type = doc_type.clone();
        }
        if let Some(url) = &self.target_url {
            config.target_url = Some(url.clone());
        }
        if self.no_log_failed_responses {
            config.log_failed_responses = false;
        }

        Ok(config)
    }
}
