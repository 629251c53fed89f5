use crate::config::IndexerConfig;
use crate::core::signer::RequestSigner;
use crate::core::submitter::BulkSubmitter;
use crate::core::transformer::BulkTransformer;
use crate::domain::model::{BulkSummary, Invocation};
use crate::domain::ports::{Clock, Completion, CredentialsProvider};
use crate::utils::error::Result;
use serde_json::Value;
use std::sync::Arc;

pub const BULK_PATH: &str = "/_bulk";
pub const CONTROL_MESSAGE: &str = "Control message handled successfully";
pub const SUCCESS_MESSAGE: &str = "Success";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    ControlMessage,
    Indexed(BulkSummary),
}

impl InvocationOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            InvocationOutcome::ControlMessage => CONTROL_MESSAGE,
            InvocationOutcome::Indexed(_) => SUCCESS_MESSAGE,
        }
    }

    pub fn summary(&self) -> Option<BulkSummary> {
        match self {
            InvocationOutcome::ControlMessage => None,
            InvocationOutcome::Indexed(summary) => Some(*summary),
        }
    }
}

/// 一次呼叫的完整流程：transform → sign → send → classify。
pub struct BulkIndexer {
    transformer: BulkTransformer,
    signer: RequestSigner,
    submitter: BulkSubmitter,
}

impl BulkIndexer {
    pub fn new(
        config: IndexerConfig,
        credentials: Arc<dyn CredentialsProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transformer: BulkTransformer::new(&config, clock.clone()),
            signer: RequestSigner::new(&config, credentials, clock),
            submitter: BulkSubmitter::new(&config),
        }
    }

    pub async fn handle(&self, event: Value) -> Result<InvocationOutcome> {
        let mut records = match Invocation::from_event(event)? {
            Invocation::ControlMessage => {
                tracing::info!("Received a control message");
                return Ok(InvocationOutcome::ControlMessage);
            }
            Invocation::Batch(records) => records,
        };

        let payload = match self.transformer.transform(&mut records)? {
            Some(payload) => payload,
            None => {
                tracing::info!("Received a control message");
                return Ok(InvocationOutcome::ControlMessage);
            }
        };

        let request = self.signer.sign("POST", BULK_PATH, payload)?;
        let summary = self.submitter.submit(&request).await?;

        tracing::info!(
            "✅ Success: attempted={}, successful={}, failed={}",
            summary.attempted_items,
            summary.successful_items,
            summary.failed_items
        );
        Ok(InvocationOutcome::Indexed(summary))
    }
}

/// 把結果轉交給舊式的 succeed/fail 回呼，恰好呼叫一次。
pub fn complete<C: Completion + ?Sized>(result: &Result<InvocationOutcome>, completion: &C) {
    match result {
        Ok(outcome) => completion.succeed(outcome.message()),
        Err(error) => completion.fail(error),
    }
}
