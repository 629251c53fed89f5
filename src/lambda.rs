#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use msk_es_indexer::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use msk_es_indexer::{
    BulkIndexer, BulkSummary, EnvCredentialsProvider, FailurePayload, IndexerConfig,
    IndexerError, SystemClock,
};
#[cfg(feature = "lambda")]
use serde::Serialize;
#[cfg(feature = "lambda")]
use serde_json::Value;
#[cfg(feature = "lambda")]
use std::sync::Arc;
#[cfg(feature = "lambda")]
use tracing::Instrument;

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BulkSummary>,
}

#[cfg(feature = "lambda")]
async fn handle_event(payload: Value) -> Result<Response, IndexerError> {
    // 每次呼叫都重新讀取設定與憑證
    let config = IndexerConfig::from_env()?;
    config.validate()?;

    let indexer = BulkIndexer::new(
        config,
        Arc::new(EnvCredentialsProvider),
        Arc::new(SystemClock),
    );

    let outcome = indexer.handle(payload).await?;
    Ok(Response {
        message: outcome.message().to_string(),
        summary: outcome.summary(),
    })
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Value>) -> Result<Response, Error> {
    let span = tracing::info_span!("invocation", request_id = %event.context.request_id);

    async move {
        handle_event(event.payload).await.map_err(|e| {
            let payload = FailurePayload::from(&e);
            tracing::error!(
                category = ?e.category(),
                error = payload.as_str(),
                "❌ Bulk indexing failed: {}",
                e
            );
            // 呼叫端收到的錯誤訊息就是 {statusCode, responseBody} 或錯誤描述
            Error::from(payload)
        })
    }
    .instrument(span)
    .await
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
