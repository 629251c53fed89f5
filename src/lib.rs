pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{EnvCredentialsProvider, FixedClock, StaticCredentialsProvider, SystemClock};
pub use config::IndexerConfig;
pub use crate::core::indexer::{complete, BulkIndexer, InvocationOutcome};
pub use crate::core::signer::{RequestSigner, SignedRequest};
pub use crate::core::submitter::BulkSubmitter;
pub use crate::core::transformer::BulkTransformer;
pub use domain::model::{BulkSummary, Credentials, Record};
pub use utils::error::{FailurePayload, IndexerError, Result};
