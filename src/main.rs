use anyhow::Context;
use clap::Parser;
use msk_es_indexer::domain::ports::Completion;
use msk_es_indexer::utils::{logger, validation::Validate};
use msk_es_indexer::{complete, BulkIndexer, CliConfig, EnvCredentialsProvider, IndexerError, SystemClock};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// 把結果印到終端機的 completion
struct ConsoleCompletion;

impl Completion for ConsoleCompletion {
    fn succeed(&self, message: &str) {
        println!("✅ {}", message);
    }

    fn fail(&self, error: &IndexerError) {
        eprintln!("❌ {}", error);
        eprintln!("{}", error.failure_payload());
        eprintln!("💡 建議: {}", error.recovery_suggestion());
    }
}

/// 讀取 JSON array；失敗時改以 NDJSON 逐行解析
fn read_records(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;

    if let Ok(value @ Value::Array(_)) = serde_json::from_str::<Value>(&content) {
        return Ok(value);
    }

    let records = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<Value>(line)
                .with_context(|| format!("Invalid JSON on line {}", n + 1))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Value::Array(records))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("Starting msk-es-indexer replay");

    let config = cli.indexer_config()?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    if cli.verbose {
        tracing::debug!("Indexer config: {:?}", config);
    }

    let event = read_records(&cli.input)?;

    let indexer = BulkIndexer::new(
        config,
        Arc::new(EnvCredentialsProvider),
        Arc::new(SystemClock),
    );
    let result = indexer.handle(event).await;

    complete(&result, &ConsoleCompletion);

    if let Err(e) = &result {
        tracing::error!("❌ Replay failed: {} (Category: {:?})", e, e.category());
        std::process::exit(1);
    }

    Ok(())
}
