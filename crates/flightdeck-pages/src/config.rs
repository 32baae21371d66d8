//! Page configuration
//!
//! Settings shared by every page object in a test: where the application
//! lives and how long waits may take. Loaded from YAML, then optionally
//! overridden from the environment.

use crate::result::{PageError, PageResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Budget for waiting on a freshly created package to become searchable
pub const DEFAULT_PACKAGE_SEARCH_TIMEOUT_MS: u64 = 120_000;

/// Environment variable overriding [`PageConfig::base_url`]
pub const ENV_BASE_URL: &str = "FLIGHTDECK_BASE_URL";

/// Environment variable overriding [`PageConfig::timeout_ms`]
pub const ENV_TIMEOUT_MS: &str = "FLIGHTDECK_TIMEOUT_MS";

/// Shared page settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Root URL of the application under test
    pub base_url: String,
    /// Default timeout for waits, in milliseconds
    pub timeout_ms: u64,
    /// Poll interval for waits, in milliseconds
    pub poll_interval_ms: u64,
    /// Timeout for waiting until a package shows up in search
    pub package_search_timeout_ms: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            package_search_timeout_ms: DEFAULT_PACKAGE_SEARCH_TIMEOUT_MS,
        }
    }
}

impl PageConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set default wait timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set package search timeout
    #[must_use]
    pub const fn with_package_search_timeout(mut self, timeout_ms: u64) -> Self {
        self.package_search_timeout_ms = timeout_ms;
        self
    }

    /// Parse from YAML text. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> PageResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> PageResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Apply `FLIGHTDECK_*` environment overrides on top of a loaded config
    pub fn with_env_overrides(self) -> PageResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> PageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = raw.trim().parse().map_err(|_| {
                PageError::config(format!("{ENV_TIMEOUT_MS} must be an integer, got {raw:?}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings no wait could honour
    pub fn validate(&self) -> PageResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(PageError::config("poll_interval_ms must be positive"));
        }
        if self.base_url.trim().is_empty() {
            return Err(PageError::config("base_url must not be empty"));
        }
        Ok(())
    }

    /// Wait options for ordinary page waits
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Absolute URL for an application path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PageConfig::default();
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.package_search_timeout_ms, 120_000);
    }

    #[test]
    fn test_builder() {
        let config = PageConfig::new()
            .with_base_url("https://builder.addons.mozilla.org")
            .with_timeout(30_000)
            .with_poll_interval(250)
            .with_package_search_timeout(60_000);
        assert_eq!(config.base_url, "https://builder.addons.mozilla.org");
        assert_eq!(config.wait_options().timeout_ms, 30_000);
        assert_eq!(config.wait_options().poll_interval_ms, 250);
        assert_eq!(config.package_search_timeout_ms, 60_000);
    }

    #[test]
    fn test_yaml_partial_keeps_defaults() {
        let config = PageConfig::from_yaml_str("base_url: https://example.org\ntimeout_ms: 2000\n")
            .unwrap();
        assert_eq!(config.base_url, "https://example.org");
        assert_eq!(config.timeout_ms, 2000);
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_yaml_rejects_zero_poll() {
        let err = PageConfig::from_yaml_str("poll_interval_ms: 0\n").unwrap_err();
        assert!(matches!(err, PageError::Config { .. }));
    }

    #[test]
    fn test_yaml_syntax_error() {
        let err = PageConfig::from_yaml_str("timeout_ms: [").unwrap_err();
        assert!(matches!(err, PageError::Yaml(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "package_search_timeout_ms: 5000").unwrap();
        let config = PageConfig::from_file(file.path()).unwrap();
        assert_eq!(config.package_search_timeout_ms, 5000);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PageConfig::from_file("/nonexistent/flightdeck.yaml").unwrap_err();
        assert!(matches!(err, PageError::Io(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://ci.local:9000"),
            (ENV_TIMEOUT_MS, " 4500 "),
        ]
        .into_iter()
        .collect();
        let config = PageConfig::default()
            .with_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.base_url, "http://ci.local:9000");
        assert_eq!(config.timeout_ms, 4500);
    }

    #[test]
    fn test_bad_timeout_override() {
        let err = PageConfig::default()
            .with_overrides(|key| (key == ENV_TIMEOUT_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_TIMEOUT_MS));
    }

    #[test]
    fn test_url_joins_cleanly() {
        let config = PageConfig::new().with_base_url("http://localhost:8000/");
        assert_eq!(config.url("/search/"), "http://localhost:8000/search/");
        assert_eq!(config.url("search"), "http://localhost:8000/search");
    }
}
