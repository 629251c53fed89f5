use crate::config::IndexerConfig;
use crate::core::signer::SignedRequest;
use crate::domain::model::BulkSummary;
use crate::utils::error::{IndexerError, Result};
use reqwest::{Client, Method};
use serde_json::Value;

pub const FAILED_ITEMS_FIELD: &str = "failedItems";

pub struct BulkSubmitter {
    client: Client,
    config: IndexerConfig,
}

impl BulkSubmitter {
    pub fn new(config: &IndexerConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &IndexerConfig, client: Client) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// 送出已簽章的請求並分類結果，只嘗試一次。
    pub async fn submit(&self, request: &SignedRequest) -> Result<BulkSummary> {
        let url = self.config.bulk_url(&request.path);
        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|e| IndexerError::ConfigError {
                message: format!("Invalid HTTP method '{}': {}", request.method, e),
            })?;

        tracing::debug!("Sending {} {} ({} bytes)", method, url, request.body.len());

        let mut builder = self.client.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!("Bulk response status: {}", status);

        let result = classify(status, &body);
        if let Err(IndexerError::BulkFailure {
            status_code,
            response_body,
        }) = &result
        {
            self.log_failure(*status_code, response_body);
        }
        result
    }

    fn log_failure(&self, status_code: u16, response_body: &Value) {
        let Some(failed_items) =
            failed_items_to_log(response_body, self.config.log_failed_responses)
        else {
            return;
        };

        let items = serde_json::Value::Array(failed_items.to_vec()).to_string();
        tracing::error!(
            status_code,
            failed_count = failed_items.len(),
            failed_items = %items,
            "❌ Failed Items"
        );
    }
}

/// 需要寫進失敗日誌的項目；開關關閉或沒有 `failedItems` 時為 `None`。
pub fn failed_items_to_log(response_body: &Value, enabled: bool) -> Option<&[Value]> {
    if !enabled {
        return None;
    }

    response_body
        .get(FAILED_ITEMS_FIELD)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .map(Vec::as_slice)
}

/// 依 HTTP 狀態與回應內容分類 bulk 結果。
///
/// - 2xx（不含 299）且沒有 `errors: true` → 成功，個別失敗的項目計入 `failed_items`
/// - 其他 → `BulkFailure`，`items` 只保留帶有 `error` 的項目並改名為 `failedItems`
pub fn classify(status: u16, body: &str) -> Result<BulkSummary> {
    let mut info: Value =
        serde_json::from_str(body).map_err(|source| IndexerError::ResponseParseError {
            source,
            body: body.to_string(),
        })?;

    let http_ok = (200..299).contains(&status);
    let has_errors = info.get("errors").and_then(Value::as_bool).unwrap_or(false);

    if http_ok && !has_errors {
        let items = info
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let failed = items
            .iter()
            .filter(|item| item_status(item).is_some_and(|s| s >= 300))
            .count();

        return Ok(BulkSummary {
            attempted_items: items.len(),
            successful_items: items.len() - failed,
            failed_items: failed,
        });
    }

    if let Some(object) = info.as_object_mut() {
        if let Some(Value::Array(items)) = object.remove("items") {
            let failed: Vec<Value> = items.into_iter().filter(item_has_error).collect();
            object.insert(FAILED_ITEMS_FIELD.to_string(), Value::Array(failed));
        }
    }

    Err(IndexerError::BulkFailure {
        status_code: status,
        response_body: info,
    })
}

// 每個項目是 `{<action>: {status, error?}}`，action 通常是 index
fn item_result(item: &Value) -> Option<&Value> {
    item.as_object().and_then(|object| object.values().next())
}

fn item_status(item: &Value) -> Option<u64> {
    item_result(item)?.get("status")?.as_u64()
}

fn item_has_error(item: &Value) -> bool {
    item_result(item)
        .and_then(|result| result.get("error"))
        .is_some_and(|error| !error.is_null())
}
