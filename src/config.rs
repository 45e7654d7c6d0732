use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_PLOTS_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7878";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// The upload form advertises "up to 10MB".
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Runtime settings shared by the CLI and the studio.
///
/// # Fields
/// - `backend_url`      — base URL of the classification API (`/api/...` is appended)
/// - `plots_base_url`   — host that serves the plot images listed by `/api/plots/all`
/// - `listen_addr`      — address the studio binds to
/// - `request_timeout`  — per-request timeout for backend calls
/// - `max_upload_bytes` — uploads larger than this are refused before forwarding
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub plots_base_url: String,
    pub listen_addr: String,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            plots_base_url: DEFAULT_PLOTS_BASE_URL.to_owned(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Builds a config from `DERMAVIEW_*` environment variables, falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(v) = lookup("DERMAVIEW_BACKEND_URL") {
            config.backend_url = v;
        }
        if let Some(v) = lookup("DERMAVIEW_PLOTS_BASE_URL") {
            config.plots_base_url = v;
        }
        if let Some(v) = lookup("DERMAVIEW_LISTEN") {
            config.listen_addr = v;
        }
        if let Some(v) = lookup("DERMAVIEW_TIMEOUT_SECS") {
            let secs = parse_positive("DERMAVIEW_TIMEOUT_SECS", &v)?;
            config.request_timeout = Duration::from_secs(secs as u64);
        }
        if let Some(v) = lookup("DERMAVIEW_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = parse_positive("DERMAVIEW_MAX_UPLOAD_BYTES", &v)?;
        }

        config.validate()
    }

    /// Checks URLs and limits, and strips trailing slashes from base URLs so
    /// paths can be appended directly.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.backend_url = check_base_url("backend_url", &self.backend_url)?;
        self.plots_base_url = check_base_url("plots_base_url", &self.plots_base_url)?;

        if self.listen_addr.trim().is_empty() {
            return Err(invalid("listen_addr", &self.listen_addr, "must not be empty"));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout", "0", "must be greater than zero"));
        }
        if self.max_upload_bytes == 0 {
            return Err(invalid("max_upload_bytes", "0", "must be greater than zero"));
        }
        Ok(self)
    }

    /// Absolute URL of a backend API path such as `/api/health`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }
}

fn check_base_url(field: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        None => Err(invalid(field, value, "must start with http:// or https://")),
        Some(h) if h.is_empty() => Err(invalid(field, value, "is missing a host")),
        Some(_) => Ok(trimmed.to_owned()),
    }
}

fn parse_positive(field: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(invalid(field, value, "must be a positive integer")),
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}
