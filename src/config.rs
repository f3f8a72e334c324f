//! Runtime configuration for the sales backend connection.
//!
//! Overrides come from the command line, where `clap` also reads
//! `RCC_API_BASE_URL` and `RCC_API_TIMEOUT_SECS`. Anything not given falls
//! back to the built-in defaults.

use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "https://rcckitportal.sun-rack.com/api/";

/// Default timeout for API requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Always ends with exactly one `/`, so endpoint paths can be appended.
    pub api_base_url: String,
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Build the config from optional overrides. A missing or blank value
    /// uses the default.
    pub fn resolve(base_url: Option<&str>, timeout_secs: Option<u64>) -> AppResult<Self> {
        let base_url = base_url
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT.as_secs());
        if timeout_secs == 0 {
            return Err(AppError::Config("timeout must be at least 1 second".into()));
        }

        let api_base_url = normalize_base_url(base_url);
        let has_host = reqwest::Url::parse(&api_base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| !h.is_empty()))
            .unwrap_or(false);
        if !has_host {
            return Err(AppError::Config(format!("Invalid API base URL: {base_url}")));
        }

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Normalise the backend URL:
/// - ensure a scheme is present (https, or http for localhost)
/// - collapse trailing slashes to exactly one
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }
    url.push('/');
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_scheme_and_single_trailing_slash() {
        assert_eq!(
            normalize_base_url("rcckitportal.sun-rack.com/api"),
            "https://rcckitportal.sun-rack.com/api/"
        );
        assert_eq!(
            normalize_base_url("localhost:8000/api//"),
            "http://localhost:8000/api/"
        );
        assert_eq!(
            normalize_base_url("  http://10.0.0.2/api/ "),
            "http://10.0.0.2/api/"
        );
    }

    #[test]
    fn resolve_falls_back_to_defaults() {
        let cfg = AppConfig::resolve(None, None).expect("defaults should resolve");
        assert_eq!(cfg, AppConfig::default());

        let cfg = AppConfig::resolve(Some("   "), None).expect("blank url uses default");
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn resolve_applies_overrides() {
        let cfg =
            AppConfig::resolve(Some("localhost:8000/api"), Some(12)).expect("flags should resolve");
        assert_eq!(cfg.api_base_url, "http://localhost:8000/api/");
        assert_eq!(cfg.timeout, Duration::from_secs(12));
    }

    #[test]
    fn resolve_rejects_bad_values() {
        let err = AppConfig::resolve(None, Some(0)).expect_err("zero timeout");
        assert!(err.to_string().contains("at least 1 second"));

        let err = AppConfig::resolve(Some("https://"), Some(5)).expect_err("no host");
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("Invalid API base URL"));
    }
}
