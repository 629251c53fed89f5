//! AWS Signature Version 4 簽章，針對 Elasticsearch 服務網域的 `_bulk` 請求。
//!
//! 步驟：
//! 1. 從主機名稱解析出 region 與 service
//! 2. 產生 `YYYYMMDDTHHMMSSZ` 時間戳與 8 碼日期
//! 3. 建立固定的 header 集合，小寫、排序後組成 canonical headers
//! 4. canonical request → string to sign → 四層 HMAC 衍生金鑰 → 簽章
//!
//! `Authorization` 一定是最後才加入，因為它簽的是其他所有 header。

use crate::config::IndexerConfig;
use crate::domain::model::Credentials;
use crate::domain::ports::{Clock, CredentialsProvider};
use crate::utils::error::{IndexerError, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::{Arc, LazyLock};

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SCOPE_TERMINATOR: &str = "aws4_request";
pub const AUTHORIZATION_HEADER: &str = "Authorization";

const ENDPOINT_REGEX: &str = r"^([^.]+)\.?([^.]*)\.?([^.]*)\.amazonaws\.com$";

// 樣式是固定字串，由 test_endpoint_pattern_compiles 檢查
static ENDPOINT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENDPOINT_REGEX).expect("invalid endpoint regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointScope {
    pub region: String,
    pub service: String,
}

/// `<domain>.<region>.<service>.amazonaws.com` → region、service
pub fn parse_endpoint(host: &str) -> Result<EndpointScope> {
    let parse_error = || IndexerError::HostParseError {
        host: host.to_string(),
    };

    let captures = ENDPOINT_PATTERN.captures(host).ok_or_else(parse_error)?;
    let region = captures.get(2).map_or("", |m| m.as_str());
    let service = captures.get(3).map_or("", |m| m.as_str());

    if region.is_empty() || service.is_empty() {
        return Err(parse_error());
    }

    Ok(EndpointScope {
        region: region.to_string(),
        service: service.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    pub date: String,
    pub region: String,
    pub service: String,
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.date, self.region, self.service, SCOPE_TERMINATOR
        )
    }
}

pub fn amz_date(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// 尚未簽章的請求；header 在這裡定案後才交給 `sign_request`。
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedRequest {
    pub host: String,
    pub method: String,
    pub path: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
    pub timestamp: DateTime<Utc>,
}

impl UnsignedRequest {
    /// 同名（不分大小寫）的 header 會被取代，否則附加在最後。
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    pub host: String,
    pub method: String,
    pub path: String,
    pub body: String,
    /// 依加入順序保存，鍵名大小寫照原樣；`Authorization` 在最後
    pub headers: Vec<(String, String)>,
    pub timestamp: DateTime<Utc>,
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION_HEADER)
    }
}

pub struct RequestSigner {
    host: String,
    credentials: Arc<dyn CredentialsProvider>,
    clock: Arc<dyn Clock>,
}

impl RequestSigner {
    pub fn new(
        config: &IndexerConfig,
        credentials: Arc<dyn CredentialsProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            host: config.endpoint.clone(),
            credentials,
            clock,
        }
    }

    /// 以當下時間與新讀取的憑證簽署請求。
    pub fn sign(&self, method: &str, path: &str, body: String) -> Result<SignedRequest> {
        let credentials = self.credentials.credentials()?;
        let unsigned = self.build_request(method, path, body, &credentials, self.clock.now());
        self.sign_request(unsigned, &credentials)
    }

    pub fn build_request(
        &self,
        method: &str,
        path: &str,
        body: String,
        credentials: &Credentials,
        at: DateTime<Utc>,
    ) -> UnsignedRequest {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Host".to_string(), self.host.clone()),
            ("Content-Length".to_string(), body.len().to_string()),
        ];
        if let Some(token) = &credentials.session_token {
            headers.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        headers.push(("X-Amz-Date".to_string(), amz_date(at)));

        UnsignedRequest {
            host: self.host.clone(),
            method: method.to_string(),
            path: path.to_string(),
            body,
            headers,
            timestamp: at,
        }
    }

    pub fn sign_request(
        &self,
        unsigned: UnsignedRequest,
        credentials: &Credentials,
    ) -> Result<SignedRequest> {
        let endpoint = parse_endpoint(&unsigned.host)?;
        let datetime = amz_date(unsigned.timestamp);
        let scope = CredentialScope {
            date: datetime[..8].to_string(),
            region: endpoint.region,
            service: endpoint.service,
        };

        let (canonical_headers, signed_headers) = canonical_headers(&unsigned.headers);
        let canonical = canonical_request(
            &unsigned.method,
            &unsigned.path,
            &canonical_headers,
            &signed_headers,
            unsigned.body.as_bytes(),
        );
        let string_to_sign = string_to_sign(&datetime, &scope, &canonical);
        let key = signing_key(&credentials.secret_access_key, &scope);
        let signature = hex::encode(hmac_sha256(&key, &string_to_sign));

        tracing::debug!(
            "Signed {} {} with scope {} (headers: {})",
            unsigned.method,
            unsigned.path,
            scope,
            signed_headers
        );

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
        );

        let mut headers = unsigned.headers;
        headers.push((AUTHORIZATION_HEADER.to_string(), authorization));

        Ok(SignedRequest {
            host: unsigned.host,
            method: unsigned.method,
            path: unsigned.path,
            body: unsigned.body,
            headers,
            timestamp: unsigned.timestamp,
        })
    }
}

/// 回傳 (canonical header 區塊, signed header 清單)。
pub fn canonical_headers(headers: &[(String, String)]) -> (String, String) {
    let mut lowered: Vec<(String, &str)> = headers
        .iter()
        .filter(|(key, _)| !key.eq_ignore_ascii_case(AUTHORIZATION_HEADER))
        .map(|(key, value)| (key.to_ascii_lowercase(), value.as_str()))
        .collect();
    lowered.sort_by(|a, b| a.0.cmp(&b.0));

    let block = lowered
        .iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join("\n");
    let signed = lowered
        .iter()
        .map(|(key, _)| key.as_str())
        .collect::<Vec<_>>()
        .join(";");

    (block, signed)
}

pub fn canonical_request(
    method: &str,
    path: &str,
    canonical_headers: &str,
    signed_headers: &str,
    body: &[u8],
) -> String {
    let body_hash = sha256_hex(body);
    [
        method,
        path,
        "", // query string
        canonical_headers,
        "",
        signed_headers,
        body_hash.as_str(),
    ]
    .join("\n")
}

pub fn string_to_sign(datetime: &str, scope: &CredentialScope, canonical_request: &str) -> String {
    let scope = scope.to_string();
    let request_hash = sha256_hex(canonical_request.as_bytes());
    [ALGORITHM, datetime, scope.as_str(), request_hash.as_str()].join("\n")
}

pub fn signing_key(secret_access_key: &str, scope: &CredentialScope) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret_access_key).as_bytes(), &scope.date);
    let k_region = hmac_sha256(&k_date, &scope.region);
    let k_service = hmac_sha256(&k_region, &scope.service);
    hmac_sha256(&k_service, SCOPE_TERMINATOR)
}

fn hmac_sha256(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, StaticCredentialsProvider};
    use chrono::TimeZone;

    const HOST: &str = "search-logs.us-east-1.es.amazonaws.com";
    const BODY: &str = "{\"index\":{\"_index\":\"logs-2024.03.05\",\"_type\":\"_doc\"}}\n{\"message\":\"hello\"}\n";

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap()
    }

    fn credentials(token: Option<&str>) -> Credentials {
        Credentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            token.map(str::to_string),
        )
    }

    fn signer(token: Option<&str>) -> RequestSigner {
        RequestSigner::new(
            &IndexerConfig::new(HOST),
            Arc::new(StaticCredentialsProvider::new(credentials(token))),
            Arc::new(FixedClock(at())),
        )
    }

    #[test]
    fn test_endpoint_pattern_compiles() {
        let pattern = Regex::new(ENDPOINT_REGEX).unwrap();
        // 整體 + domain、region、service
        assert_eq!(pattern.captures_len(), 4);
        assert_eq!(LazyLock::force(&ENDPOINT_PATTERN).as_str(), ENDPOINT_REGEX);
    }

    #[test]
    fn test_parse_endpoint() {
        let scope = parse_endpoint("search-domain.us-east-1.es.amazonaws.com").unwrap();
        assert_eq!(scope.region, "us-east-1");
        assert_eq!(scope.service, "es");
    }

    #[test]
    fn test_parse_endpoint_rejects_short_or_foreign_hosts() {
        for host in [
            "search-domain.us-east-1.amazonaws.com",
            "domain.amazonaws.com",
            "amazonaws.com",
            "localhost",
            "search-domain.us-east-1.es.example.com",
            "",
        ] {
            assert!(
                matches!(parse_endpoint(host), Err(IndexerError::HostParseError { .. })),
                "host should be rejected: {}",
                host
            );
        }
    }

    #[test]
    fn test_amz_date_format() {
        assert_eq!(amz_date(at()), "20240305T070809Z");
    }

    #[test]
    fn test_canonical_headers_are_lowercased_and_sorted() {
        let headers = vec![
            ("X-Amz-Date".to_string(), "20240305T070809Z".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Host".to_string(), HOST.to_string()),
        ];

        let (block, signed) = canonical_headers(&headers);

        assert_eq!(
            block,
            format!(
                "content-type:application/json\nhost:{}\nx-amz-date:20240305T070809Z",
                HOST
            )
        );
        assert_eq!(signed, "content-type;host;x-amz-date");
    }

    #[test]
    fn test_canonical_request_layout() {
        let signer = signer(Some("session-token"));
        let unsigned =
            signer.build_request("POST", "/_bulk", BODY.to_string(), &credentials(Some("session-token")), at());
        let (block, signed) = canonical_headers(&unsigned.headers);

        let canonical = canonical_request("POST", "/_bulk", &block, &signed, BODY.as_bytes());

        assert_eq!(
            canonical,
            "POST\n/_bulk\n\n\
             content-length:74\n\
             content-type:application/json\n\
             host:search-logs.us-east-1.es.amazonaws.com\n\
             x-amz-date:20240305T070809Z\n\
             x-amz-security-token:session-token\n\
             \n\
             content-length;content-type;host;x-amz-date;x-amz-security-token\n\
             bb1d763c2d32b4be585973928e47bc91c8e9008cb665f6c917f31b57c389859b"
        );
    }

    #[test]
    fn test_sign_matches_reference_signature() {
        let signed = signer(Some("session-token"))
            .sign("POST", "/_bulk", BODY.to_string())
            .unwrap();

        assert_eq!(
            signed.authorization().unwrap(),
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240305/us-east-1/es/aws4_request, \
             SignedHeaders=content-length;content-type;host;x-amz-date;x-amz-security-token, \
             Signature=eb796e2e06495e3ed6282426a78adb0e28aae7f1fe9eda7152ddb4a4f97699e1"
        );
    }

    #[test]
    fn test_sign_without_session_token_omits_header() {
        let signed = signer(None)
            .sign("POST", "/_bulk", BODY.to_string())
            .unwrap();

        assert!(signed.header("X-Amz-Security-Token").is_none());
        assert_eq!(
            signed.authorization().unwrap(),
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240305/us-east-1/es/aws4_request, \
             SignedHeaders=content-length;content-type;host;x-amz-date, \
             Signature=4574d138a5ceff7e53d867b18e476db58e85d2c01925907f8b6294528f8fa09e"
        );
    }

    #[test]
    fn test_signed_request_descriptor() {
        let signed = signer(Some("session-token"))
            .sign("POST", "/_bulk", BODY.to_string())
            .unwrap();

        let names: Vec<&str> = signed.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Content-Type",
                "Host",
                "Content-Length",
                "X-Amz-Security-Token",
                "X-Amz-Date",
                "Authorization"
            ]
        );
        assert_eq!(signed.host, HOST);
        assert_eq!(signed.method, "POST");
        assert_eq!(signed.path, "/_bulk");
        assert_eq!(signed.body, BODY);
        assert_eq!(signed.timestamp, at());
        assert_eq!(signed.header("content-length"), Some("74"));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = signer(Some("session-token"));
        let first = signer.sign("POST", "/_bulk", BODY.to_string()).unwrap();
        let second = signer.sign("POST", "/_bulk", BODY.to_string()).unwrap();

        assert_eq!(first.authorization(), second.authorization());
    }

    #[test]
    fn test_signature_changes_with_body_or_headers() {
        let signer = signer(Some("session-token"));
        let creds = credentials(Some("session-token"));
        let baseline = signer
            .sign_request(
                signer.build_request("POST", "/_bulk", BODY.to_string(), &creds, at()),
                &creds,
            )
            .unwrap();

        let other_body = signer
            .sign_request(
                signer.build_request("POST", "/_bulk", BODY.replace("hello", "jello"), &creds, at()),
                &creds,
            )
            .unwrap();
        assert_ne!(baseline.authorization(), other_body.authorization());

        let mut changed = signer.build_request("POST", "/_bulk", BODY.to_string(), &creds, at());
        changed.set_header("Content-Type", "application/x-ndjson");
        let other_header = signer.sign_request(changed, &creds).unwrap();
        assert_ne!(baseline.authorization(), other_header.authorization());

        let mut extra = signer.build_request("POST", "/_bulk", BODY.to_string(), &creds, at());
        extra.set_header("X-Opaque-Id", "replay-1");
        let extra_header = signer.sign_request(extra, &creds).unwrap();
        assert!(extra_header
            .authorization()
            .unwrap()
            .contains("SignedHeaders=content-length;content-type;host;x-amz-date;x-amz-security-token;x-opaque-id"));
        assert_eq!(extra_header.headers.last().unwrap().0, AUTHORIZATION_HEADER);
    }

    #[test]
    fn test_signature_changes_with_time() {
        let signer = signer(None);
        let creds = credentials(None);
        let later = at() + chrono::Duration::seconds(1);

        let first = signer
            .sign_request(signer.build_request("POST", "/_bulk", BODY.to_string(), &creds, at()), &creds)
            .unwrap();
        let second = signer
            .sign_request(signer.build_request("POST", "/_bulk", BODY.to_string(), &creds, later), &creds)
            .unwrap();

        assert_ne!(first.authorization(), second.authorization());
    }

    #[test]
    fn test_malformed_host_fails_to_sign() {
        let mut config = IndexerConfig::new("localhost");
        config.target_url = Some("http://localhost:9200".to_string());
        let signer = RequestSigner::new(
            &config,
            Arc::new(StaticCredentialsProvider::new(credentials(None))),
            Arc::new(FixedClock(at())),
        );

        let err = signer.sign("POST", "/_bulk", BODY.to_string()).unwrap_err();
        assert!(matches!(err, IndexerError::HostParseError { .. }));
    }

    #[test]
    fn test_signing_key_chain() {
        // AWS 文件中的衍生金鑰範例
        let scope = CredentialScope {
            date: "20120215".to_string(),
            region: "us-east-1".to_string(),
            service: "iam".to_string(),
        };

        let key = signing_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY", &scope);
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }
}
