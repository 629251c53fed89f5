use crate::config::IndexerConfig;
use crate::domain::model::Record;
use crate::domain::ports::Clock;
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub const TIMESTAMP_FIELD: &str = "@timestamp";
pub const DATE_FIELD: &str = "date";

#[derive(Serialize)]
struct BulkAction<'a> {
    index: ActionMeta<'a>,
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_type")]
    doc_type: &'a str,
}

/// 把一批記錄轉成 `_bulk` 的 NDJSON 內容。
///
/// 索引依「處理當下」的 UTC 日期輪替，而不是記錄本身的事件時間。
pub struct BulkTransformer {
    index_prefix: String,
    doc_type: String,
    clock: Arc<dyn Clock>,
}

impl BulkTransformer {
    pub fn new(config: &IndexerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            index_prefix: config.index_prefix.clone(),
            doc_type: config.doc_type.clone(),
            clock,
        }
    }

    pub fn index_name(&self, at: DateTime<Utc>) -> String {
        format!("{}-{}", self.index_prefix, at.format("%Y.%m.%d"))
    }

    /// 空批次回傳 `None`，呼叫端應視為「無事可做」的成功。
    pub fn transform(&self, records: &mut [Record]) -> Result<Option<String>> {
        if records.is_empty() {
            return Ok(None);
        }

        let mut body = String::new();
        for record in records.iter_mut() {
            let processed_at = self.clock.now();
            let index_name = self.index_name(processed_at);

            record
                .data
                .insert(TIMESTAMP_FIELD.to_string(), Value::String(format_timestamp(processed_at)));
            let date = normalize_date(record.data.get(DATE_FIELD));
            record.data.insert(DATE_FIELD.to_string(), date);

            let action = BulkAction {
                index: ActionMeta {
                    index: &index_name,
                    doc_type: &self.doc_type,
                },
            };

            body.push_str(&serde_json::to_string(&action)?);
            body.push('\n');
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }

        tracing::debug!(
            "Built bulk payload: {} records, {} bytes",
            records.len(),
            body.len()
        );
        Ok(Some(body))
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 解析不了或缺少的 `date` 會變成 `null`。
pub fn normalize_date(value: Option<&Value>) -> Value {
    let parsed = match value {
        Some(Value::String(raw)) => parse_date_str(raw.trim()),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    };

    parsed
        .map(|dt| Value::String(format_timestamp(dt)))
        .unwrap_or(Value::Null)
}

fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // 沒有時區的時間一律當作 UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
