//! Lightspeed archive proxy client.
//!
//! The archive proxy is a GraphQL endpoint. A lookup asks `custom_HostLookup`
//! for two aliased slots (`a` and `b`) carrying the same hostname and reads
//! one category code per slot.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, USER_AGENT};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::categories::CategoryNames;
use crate::error::{FilterError, Result};
use crate::types::{FilterStatus, Provider, ProviderResult};
use crate::CategoryProvider;

pub const DEFAULT_ENDPOINT: &str =
    "https://production-archive-proxy-api.lightspeedsystems.com/archiveproxy";

const ORIGIN_VALUE: &str = "https://archive.lightspeedsystems.com";

const LOOKUP_QUERY: &str = "\nquery getDeviceCategorization($itemA: CustomHostLookupInput!, $itemB: CustomHostLookupInput!){\n  a: custom_HostLookup(item: $itemA) { cat}\n  b: custom_HostLookup(item: $itemB) { cat   \n  }\n}";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    data: Option<LookupData>,
}

#[derive(Debug, Deserialize)]
struct LookupData {
    a: Option<HostLookup>,
    b: Option<HostLookup>,
}

#[derive(Debug, Deserialize)]
struct HostLookup {
    #[serde(default)]
    cat: Value,
}

pub struct LightspeedClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    names: Arc<CategoryNames>,
}

impl LightspeedClient {
    pub fn new(names: Arc<CategoryNames>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            names,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn request_body(hostname: &str) -> Value {
        json!({
            "query": LOOKUP_QUERY,
            "variables": {
                "itemA": { "hostname": hostname },
                "itemB": { "hostname": hostname },
            }
        })
    }
}

/// One slot's `cat` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCode {
    /// A JSON number with no fractional part (`9` and `9.0` alike)
    Number(i64),
    /// An integer written as a string. It can name a category but is never
    /// in the permitted set.
    Text(i64),
}

impl SlotCode {
    pub fn code(&self) -> i64 {
        match self {
            SlotCode::Number(code) | SlotCode::Text(code) => *code,
        }
    }

    pub fn permits(&self) -> bool {
        match self {
            SlotCode::Number(code) => Provider::Lightspeed.is_unblocked(*code),
            SlotCode::Text(_) => false,
        }
    }
}

/// Read a slot's `cat`. Anything that is not an integral number or the
/// canonical text of an integer matches no table entry.
fn category_code(cat: &Value) -> Option<SlotCode> {
    match cat {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .map(SlotCode::Number),
        // Table keys are canonical integers, so "09" or " 9" name nothing.
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .filter(|code| code.to_string() == *s)
            .map(SlotCode::Text),
        _ => None,
    }
}

/// Classify the two slot codes against the permitted set and name table.
pub fn classify(names: &CategoryNames, codes: [Option<SlotCode>; 2]) -> ProviderResult {
    let permitted = codes.iter().flatten().any(SlotCode::permits);

    let category = names
        .first_named(&codes.map(|slot| slot.map(|s| s.code())))
        .unwrap_or("Unknown");

    ProviderResult::new(FilterStatus::from_permitted(permitted), category)
}

/// Pull both slot codes out of a raw response body.
pub fn parse_codes(body: &[u8]) -> Result<[Option<SlotCode>; 2]> {
    let response: LookupResponse = serde_json::from_slice(body)?;
    let data = response.data.ok_or_else(|| FilterError::Schema {
        reason: "missing `data`".to_string(),
    })?;
    let a = data.a.ok_or_else(|| FilterError::Schema {
        reason: "missing `data.a`".to_string(),
    })?;
    let b = data.b.ok_or_else(|| FilterError::Schema {
        reason: "missing `data.b`".to_string(),
    })?;
    Ok([category_code(&a.cat), category_code(&b.cat)])
}

#[async_trait]
impl CategoryProvider for LightspeedClient {
    fn provider(&self) -> Provider {
        Provider::Lightspeed
    }

    async fn categorize(&self, hostname: &str) -> Result<ProviderResult> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(CONTENT_TYPE, "application/json")
            .header(ORIGIN, ORIGIN_VALUE)
            .header(USER_AGENT, "Mozilla/5.0")
            .json(&Self::request_body(hostname));

        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(domain = %hostname, %status, "Lightspeed returned non-success status");
            return Ok(ProviderResult::unknown());
        }

        let body = response.bytes().await?;
        let codes = parse_codes(&body)?;
        let result = classify(&self.names, codes);

        debug!(
            domain = %hostname,
            codes = ?codes,
            status = %result.status,
            category = %result.category,
            "Lightspeed categorization"
        );

        Ok(result)
    }
}
