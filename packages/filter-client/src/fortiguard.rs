//! FortiGuard DNS rating client.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{FilterStatus, Provider, ProviderResult};
use crate::CategoryProvider;

pub const DEFAULT_ENDPOINT: &str = "https://www.fortiguard.com/learnmore/dns";

/// Rating API version the endpoint expects.
const API_VERSION: u32 = 9;

const ORIGIN_VALUE: &str = "https://www.fortiguard.com";
const REFERER_VALUE: &str = "https://www.fortiguard.com/services/sdns";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_COOKIE: &str = "privacy_agreement=true";

#[derive(Debug, Serialize)]
struct RatingRequest<'a> {
    value: &'a str,
    version: u32,
}

pub struct FortiGuardClient {
    client: reqwest::Client,
    endpoint: String,
    cookie: String,
}

impl Default for FortiGuardClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FortiGuardClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cookie: DEFAULT_COOKIE.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

/// JavaScript-style truthiness, which is what the endpoint's `dns` field is
/// checked with: `null`, `false`, `0`, and `""` mean "no rating".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Leading-integer parse: optional whitespace, optional sign, then digits.
/// Trailing garbage is ignored; no digits at all is `None`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Rating as an integer, if it reads as one.
pub fn parse_rating(rating: &Value) -> Option<i64> {
    match rating {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Any falsy `categoryname` (missing, null, "", 0, false) reads as `Unknown`.
fn category_name(value: Option<&Value>) -> String {
    match value.filter(|v| is_truthy(v)) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Classify a parsed response body.
pub fn classify(body: &Value) -> ProviderResult {
    let dns = match body.get("dns") {
        Some(dns) if is_truthy(dns) => dns,
        _ => return ProviderResult::unknown(),
    };

    let rating = dns.get("rating").and_then(parse_rating);
    let permitted = rating
        .map(|code| Provider::FortiGuard.is_unblocked(code))
        .unwrap_or(false);

    ProviderResult::new(
        FilterStatus::from_permitted(permitted),
        category_name(dns.get("categoryname")),
    )
}

#[async_trait]
impl CategoryProvider for FortiGuardClient {
    fn provider(&self) -> Provider {
        Provider::FortiGuard
    }

    async fn categorize(&self, hostname: &str) -> Result<ProviderResult> {
        debug!(domain = %hostname, "Fetching FortiGuard rating");

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "*/*")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header(COOKIE, &self.cookie)
            .header(ORIGIN, ORIGIN_VALUE)
            .header(REFERER, REFERER_VALUE)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .body(serde_json::to_vec(&RatingRequest {
                value: hostname,
                version: API_VERSION,
            })?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(domain = %hostname, %status, "FortiGuard returned non-success status");
            return Ok(ProviderResult::unknown());
        }

        let body: Value = serde_json::from_slice(&response.bytes().await?)?;
        let result = classify(&body);

        match body.get("dns") {
            Some(dns) if is_truthy(dns) => debug!(
                domain = %hostname,
                rating = ?dns.get("rating"),
                status = %result.status,
                category = %result.category,
                "FortiGuard rating"
            ),
            _ => debug!(domain = %hostname, "No DNS rating in FortiGuard response"),
        }

        Ok(result)
    }
}
