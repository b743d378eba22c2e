use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, redirect};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::GitLabError;
use super::query::QueryParams;
use super::rate_limiter::RateLimiter;
use crate::config::Settings;

pub type Result<T> = std::result::Result<T, GitLabError>;

pub const USER_AGENT: &str = concat!("gitlab-insight/", env!("CARGO_PKG_VERSION"));

/// Conventional `max_pages` for [`GitLabClient::get_paginated`]
pub const DEFAULT_MAX_PAGES: u32 = 5;

const PRIVATE_TOKEN_HEADER: &str = "private-token";
const NEXT_PAGE_HEADER: &str = "x-next-page";
const ERROR_PREVIEW_CHARS: usize = 500;
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credentials {
    Configured,
    Anonymous,
}

struct ApiResponse {
    body: Value,
    next_page: Option<String>,
}

/// Classification of one HTTP attempt for the retry loop
enum Attempt {
    Done(ApiResponse),
    /// Retried while attempts remain; `error` is returned once they run out.
    Transient {
        error: GitLabError,
        delay: Duration,
    },
    Fail(GitLabError),
}

/// Read-only GitLab REST client shared by every tool invocation.
///
/// All requests pass through the client-side rate limiter and the retry
/// policy before their response is classified into data or a [`GitLabError`].
pub struct GitLabClient {
    settings: Settings,
    api_url: String,
    auth_header: Option<HeaderValue>,
    rate_limiter: RateLimiter,
    http: Mutex<Option<reqwest::Client>>,
}

impl GitLabClient {
    /// Validates `settings`; the HTTP connection itself is created on first use.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let auth_header = match &settings.token {
            Some(token) => {
                let mut value = HeaderValue::from_str(token)
                    .map_err(|e| GitLabError::Config(format!("Invalid token: {e}")))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            api_url: settings.api_url(),
            rate_limiter: RateLimiter::per_minute(settings.rate_limit_per_minute),
            auth_header,
            settings,
            http: Mutex::new(None),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Whether an HTTP connection is currently held.
    pub fn is_open(&self) -> bool {
        self.http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Release the HTTP connection. A later request creates a new one.
    pub fn close(&self) {
        let released = self
            .http
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!("Closed HTTP client for {}", self.api_url);
        }
    }

    /// Perform one API call and return its parsed JSON body.
    ///
    /// `path` is relative to `/api/v4` and must start with `/`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.send(method, path, params, body, Credentials::Configured)
            .await
            .map(|response| response.body)
    }

    pub async fn get(&self, path: &str, params: Option<&QueryParams>) -> Result<Value> {
        self.request(Method::GET, path, params, None).await
    }

    /// Follow `x-next-page` for up to `max_pages` pages and concatenate the
    /// array bodies. A non-array body is returned as a single element.
    pub async fn get_paginated(
        &self,
        path: &str,
        params: Option<QueryParams>,
        max_pages: u32,
    ) -> Result<Vec<Value>> {
        let mut params = params.unwrap_or_default();
        params.set_default("per_page", self.settings.default_per_page);
        params.set_default("page", 1);

        let mut results = Vec::new();
        for _ in 0..max_pages {
            let response = self
                .send(Method::GET, path, Some(&params), None, Credentials::Configured)
                .await?;

            match response.body {
                Value::Array(items) => {
                    let exhausted = items.is_empty();
                    results.extend(items);
                    match response.next_page {
                        Some(next) if !exhausted => params.insert("page", next),
                        _ => break,
                    }
                }
                other => {
                    results.push(other);
                    break;
                }
            }
        }

        Ok(results)
    }

    /// Probe the instance anonymously, then check the token against `/version`.
    /// Failures are reported in the result rather than returned.
    pub async fn test_connection(&self) -> ConnectionReport {
        let mut report = ConnectionReport {
            status: ConnectionStatus::Connected,
            gitlab_url: self.settings.gitlab_url.trim_end_matches('/').to_string(),
            authenticated: self.settings.is_authenticated(),
            public_access: None,
            auth_valid: None,
            version: None,
            revision: None,
            warning: None,
            note: None,
            error: None,
        };

        let probe = QueryParams::new()
            .with("per_page", 1)
            .with("visibility", "public");
        if let Err(e) = self
            .send(Method::GET, "/projects", Some(&probe), None, Credentials::Anonymous)
            .await
        {
            report.status = ConnectionStatus::Error;
            report.error = Some(e.to_string());
            return report;
        }
        report.public_access = Some(true);

        if !self.settings.is_authenticated() {
            report.note = Some(
                "No token configured. Only public projects and endpoints are accessible."
                    .to_string(),
            );
            return report;
        }

        match self.get("/version", None).await {
            Ok(version) => {
                report.auth_valid = Some(true);
                report.version = string_field(&version, "version");
                report.revision = string_field(&version, "revision");
            }
            Err(GitLabError::Authentication) => {
                report.auth_valid = Some(false);
                report.warning = Some(
                    "The configured token was rejected. Requests fall back to public access."
                        .to_string(),
                );
            }
            Err(e) => debug!("Ignoring /version probe failure: {}", e),
        }

        report
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        params: Option<&QueryParams>,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<ApiResponse> {
        let client = self.http_client()?;
        let max_retries = self.settings.max_retries;

        for attempt in 1..=max_retries {
            self.rate_limiter.acquire().await;

            let mut builder = client.request(method.clone(), format!("{}{}", self.api_url, path));
            if let Some(params) = params {
                builder = builder.query(params);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }
            if credentials == Credentials::Configured {
                if let Some(token) = &self.auth_header {
                    builder = builder.header(PRIVATE_TOKEN_HEADER, token.clone());
                }
            }

            debug!("{} {} (attempt {}/{})", method, path, attempt, max_retries);

            match self.attempt(builder, path, attempt).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fail(error) => return Err(error),
                Attempt::Transient { error, delay } => {
                    if attempt == max_retries {
                        warn!(
                            "{} {} failed after {} attempts: {}",
                            method, path, max_retries, error
                        );
                        return Err(error);
                    }
                    warn!(
                        "{} {} failed on attempt {}/{}: {}, retrying in {:?}",
                        method, path, attempt, max_retries, error, delay
                    );
                    sleep(delay).await;
                }
            }
        }

        Err(GitLabError::api(0, "Request was never attempted"))
    }

    async fn attempt(&self, builder: reqwest::RequestBuilder, path: &str, attempt: u32) -> Attempt {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return self.transport_failure(e, attempt),
        };

        let status = response.status().as_u16();
        match status {
            200 => {
                let next_page = next_page(response.headers());
                match response.bytes().await {
                    Ok(bytes) => match serde_json::from_slice(&bytes) {
                        Ok(body) => Attempt::Done(ApiResponse { body, next_page }),
                        Err(e) => Attempt::Fail(GitLabError::api(
                            200,
                            format!("Invalid JSON in response from {path}: {e}"),
                        )),
                    },
                    Err(e) => self.transport_failure(e, attempt),
                }
            }
            401 => Attempt::Fail(GitLabError::Authentication),
            404 => Attempt::Fail(GitLabError::not_found(path)),
            429 => {
                let delay = retry_after(response.headers()).unwrap_or_else(|| self.backoff(attempt));
                Attempt::Transient {
                    error: GitLabError::RateLimit { retry_after: delay },
                    delay,
                }
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                let error = GitLabError::api(status, extract_error_message(&text));
                if status >= 500 {
                    Attempt::Transient {
                        error,
                        delay: self.backoff(attempt),
                    }
                } else {
                    Attempt::Fail(error)
                }
            }
        }
    }

    fn transport_failure(&self, error: reqwest::Error, attempt: u32) -> Attempt {
        let what = if error.is_timeout() { "timed out" } else { "failed" };
        Attempt::Transient {
            error: GitLabError::api(
                0,
                format!(
                    "Request {what} after {} attempts: {error}",
                    self.settings.max_retries
                ),
            ),
            delay: self.backoff(attempt),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.settings
            .backoff_unit
            .saturating_mul(2_u32.saturating_pow(attempt))
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        let mut slot = self.http.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(self.settings.timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| GitLabError::Client(e.to_string()))?;

        debug!("Created HTTP client for {}", self.api_url);
        *slot = Some(client.clone());
        Ok(client)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Error,
}

/// Result of [`GitLabClient::test_connection`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub status: ConnectionStatus,
    pub gitlab_url: String,
    /// Whether a token is configured, not whether it is valid
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn next_page(headers: &HeaderMap) -> Option<String> {
    headers
        .get(NEXT_PAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// `Retry-After` in (possibly fractional) seconds. HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// `message` or `error` from a JSON error body, the whole JSON object when
/// neither is present, or a prefix of the raw text when it is not an object.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("message").or_else(|| map.get("error")) {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => serde_json::to_string(&map).unwrap_or_default(),
        },
        _ => body.chars().take(ERROR_PREVIEW_CHARS).collect(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"message":"403 Forbidden"}"#),
            "403 Forbidden"
        );
        assert_eq!(
            extract_error_message(r#"{"error":"invalid_scope"}"#),
            "invalid_scope"
        );
        assert_eq!(
            extract_error_message(r#"{"message":{"name":["is taken"]}}"#),
            r#"{"name":["is taken"]}"#
        );
        assert_eq!(extract_error_message(r#"{"detail":1}"#), r#"{"detail":1}"#);

        let html = "x".repeat(800);
        assert_eq!(extract_error_message(&html).len(), ERROR_PREVIEW_CHARS);
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("1.5"));
        assert_eq!(retry_after(&headers), Some(Duration::from_millis(1500)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("-3"));
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn test_next_page_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_page(&headers), None);
        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static(""));
        assert_eq!(next_page(&headers), None);
        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static("3"));
        assert_eq!(next_page(&headers).as_deref(), Some("3"));
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let client = GitLabClient::new(
            Settings::default().with_backoff_unit(Duration::from_millis(10)),
        )
        .unwrap();
        assert_eq!(client.backoff(1), Duration::from_millis(20));
        assert_eq!(client.backoff(2), Duration::from_millis(40));
        assert_eq!(client.backoff(3), Duration::from_millis(80));
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let result = GitLabClient::new(Settings::default().with_max_retries(0));
        assert!(matches!(result, Err(GitLabError::Config(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let client = GitLabClient::new(Settings::default()).unwrap();
        assert!(!client.is_open());
        client.http_client().unwrap();
        assert!(client.is_open());
        client.close();
        client.close();
        assert!(!client.is_open());
    }
}
