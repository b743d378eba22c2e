//! Server settings resolved once at startup.
//!
//! Values come from `GITLAB_INSIGHT_*` environment variables; the binaries
//! layer command-line overrides on top through the `with_*` methods.

use std::fmt;
use std::time::Duration;

use crate::gitlab::error::GitLabError;

/// Prefix shared by every environment variable read by [`Settings::from_env`]
pub const ENV_PREFIX: &str = "GITLAB_INSIGHT_";

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 300;
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_LOG_LEVEL: &str = "info";

type Result<T> = std::result::Result<T, GitLabError>;

#[derive(Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the GitLab instance, without the `/api/v4` suffix
    pub gitlab_url: String,
    /// Private access token; `None` means anonymous, public-only access
    pub token: Option<String>,
    pub timeout: Duration,
    /// Attempts per request, including the first one
    pub max_retries: u32,
    pub rate_limit_per_minute: u32,
    pub default_per_page: u32,
    pub max_per_page: u32,
    pub log_level: String,
    /// Multiplier for the `2^attempt` retry backoff
    pub backoff_unit: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gitlab_url: DEFAULT_GITLAB_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            backoff_unit: Duration::from_secs(1),
        }
    }
}

// Keeps the token out of log output.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("gitlab_url", &self.gitlab_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("default_per_page", &self.default_per_page)
            .field("max_per_page", &self.max_per_page)
            .field("log_level", &self.log_level)
            .field("backoff_unit", &self.backoff_unit)
            .finish()
    }
}

impl Settings {
    /// Read settings from the process environment and validate them.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which receives full variable names
    /// such as `GITLAB_INSIGHT_TOKEN`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self::default();
        if let Some(url) = var("GITLAB_URL") {
            settings.gitlab_url = url;
        }
        settings.token = var("TOKEN");
        if let Some(raw) = var("TIMEOUT") {
            settings.timeout = parse_seconds("TIMEOUT", &raw)?;
        }
        if let Some(raw) = var("MAX_RETRIES") {
            settings.max_retries = parse_number("MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = var("RATE_LIMIT_PER_MINUTE") {
            settings.rate_limit_per_minute = parse_number("RATE_LIMIT_PER_MINUTE", &raw)?;
        }
        if let Some(raw) = var("DEFAULT_PER_PAGE") {
            settings.default_per_page = parse_number("DEFAULT_PER_PAGE", &raw)?;
        }
        if let Some(raw) = var("MAX_PER_PAGE") {
            settings.max_per_page = parse_number("MAX_PER_PAGE", &raw)?;
        }
        if let Some(level) = var("LOG_LEVEL") {
            settings.log_level = level.to_lowercase();
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn with_gitlab_url(mut self, url: impl Into<String>) -> Self {
        self.gitlab_url = url.into();
        self
    }

    /// Empty tokens are treated as absent.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_rate_limit_per_minute(mut self, rate: u32) -> Self {
        self.rate_limit_per_minute = rate;
        self
    }

    pub fn with_per_page(mut self, default_per_page: u32, max_per_page: u32) -> Self {
        self.default_per_page = default_per_page;
        self.max_per_page = max_per_page;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.gitlab_url)
            .map_err(|e| config_error(format!("GitLab URL '{}' is invalid: {e}", self.gitlab_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(config_error(format!(
                "GitLab URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(config_error("GitLab URL must include a host"));
        }

        if let Some(token) = &self.token {
            if reqwest::header::HeaderValue::from_str(token).is_err() {
                return Err(config_error("Token contains characters not allowed in a header"));
            }
        }

        if self.timeout.is_zero() {
            return Err(config_error("Timeout must be greater than zero"));
        }
        if self.max_retries == 0 {
            return Err(config_error("max_retries must be at least 1"));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(config_error("rate_limit_per_minute must be at least 1"));
        }
        if self.default_per_page == 0 || self.default_per_page > self.max_per_page {
            return Err(config_error(format!(
                "default_per_page must be between 1 and max_per_page ({}), got {}",
                self.max_per_page, self.default_per_page
            )));
        }

        Ok(())
    }

    /// `{gitlab_url}/api/v4` with any trailing slash on the base URL removed
    pub fn api_url(&self) -> String {
        format!("{}/api/v4", self.gitlab_url.trim_end_matches('/'))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Clamp a caller supplied page size to `1..=max_per_page`.
    pub fn clamp_per_page(&self, requested: Option<u32>, fallback: u32) -> u32 {
        requested.unwrap_or(fallback).clamp(1, self.max_per_page.max(1))
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| config_error(format!("{ENV_PREFIX}{name} must be a non-negative integer, got '{raw}'")))
}

fn parse_seconds(name: &str, raw: &str) -> Result<Duration> {
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| config_error(format!("{ENV_PREFIX}{name} must be a non-negative number of seconds, got '{raw}'")))
}

fn config_error(message: impl Into<String>) -> GitLabError {
    GitLabError::Config(message.into())
}
