use crate::utils::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 單筆日誌記錄：任意 JSON 物件，轉換時會被就地加上 `@timestamp` 並正規化 `date`。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// 一次呼叫收到的內容。
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// `null` 或空陣列：沒有資料的控制訊號
    ControlMessage,
    Batch(Vec<Record>),
}

impl Invocation {
    pub fn from_event(event: Value) -> Result<Self> {
        let items = match event {
            Value::Array(items) => items,
            Value::Null => return Ok(Invocation::ControlMessage),
            other => {
                return Err(IndexerError::InvalidEvent {
                    reason: format!(
                        "expected a JSON array of records, found {}",
                        json_kind(&other)
                    ),
                })
            }
        };

        if items.is_empty() {
            return Ok(Invocation::ControlMessage);
        }

        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(data) => Ok(Record { data }),
                other => Err(IndexerError::InvalidRecord {
                    index,
                    reason: format!("expected a JSON object, found {}", json_kind(&other)),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Invocation::Batch(records))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub attempted_items: usize,
    pub successful_items: usize,
    pub failed_items: usize,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

// 不把 secret 與 token 印進日誌
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}
