pub mod indexer;
pub mod signer;
pub mod submitter;
pub mod transformer;

pub use crate::domain::model::{BulkSummary, Credentials, Invocation, Record};
pub use crate::domain::ports::{Clock, Completion, CredentialsProvider};
pub use crate::utils::error::Result;
