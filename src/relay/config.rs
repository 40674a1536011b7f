//! Relay configuration

use crate::error::{PicforgeError, Result};
use std::time::Duration;

/// Default upstream background-removal endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.remove.bg/v1.0/removebg";

/// Environment variable holding the upstream credential
pub const CREDENTIAL_ENV_VAR: &str = "REMOVE_BG_API_KEY";

/// Default per-request upstream timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum accepted upload size (12 MiB, the upstream file limit)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 12 * 1024 * 1024;

/// Configuration for the relay and its outbound upstream calls
///
/// The credential is sourced only from server-held configuration; it is
/// never accepted from client input. Its absence is a configuration state
/// surfaced as a deterministic error, not a runtime surprise.
#[derive(Clone)]
pub struct RelayConfig {
    /// Upstream service endpoint URL
    pub upstream_url: String,

    /// Secret API key for the upstream service (None = not configured)
    pub api_key: Option<String>,

    /// Transport-level timeout for outbound calls
    pub timeout: Duration,

    /// Maximum accepted inbound upload size in bytes
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("upstream_url", &self.upstream_url)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl RelayConfig {
    /// Create a new configuration builder for fluent API construction
    #[must_use]
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::new()
    }

    /// Build a configuration from the process environment
    ///
    /// Reads the credential from `REMOVE_BG_API_KEY`; an unset or empty
    /// variable leaves the credential unconfigured.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var(CREDENTIAL_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Whether a credential is available for outbound calls
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Builder for [`RelayConfig`]
#[derive(Debug, Default)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RelayConfig::default(),
        }
    }

    /// Set the upstream endpoint URL
    #[must_use]
    pub fn upstream_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.upstream_url = url.into();
        self
    }

    /// Set the upstream credential
    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the outbound request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum accepted upload size in bytes
    #[must_use]
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an empty or non-HTTP upstream URL or a
    /// zero upload limit.
    pub fn build(self) -> Result<RelayConfig> {
        if !self.config.upstream_url.starts_with("http://")
            && !self.config.upstream_url.starts_with("https://")
        {
            return Err(PicforgeError::invalid_config(format!(
                "Upstream URL must be an http(s) URL, got '{}'",
                self.config.upstream_url
            )));
        }

        if self.config.max_upload_bytes == 0 {
            return Err(PicforgeError::invalid_config(
                "max_upload_bytes must be greater than zero",
            ));
        }

        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert!(!config.has_credential());
    }

    #[test]
    fn test_builder_validation() {
        let config = RelayConfig::builder()
            .upstream_url("https://upstream.test/removebg")
            .api_key("secret")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert!(config.has_credential());
        assert_eq!(config.timeout, Duration::from_secs(5));

        assert!(RelayConfig::builder().upstream_url("ftp://nope").build().is_err());
        assert!(RelayConfig::builder().max_upload_bytes(0).build().is_err());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = RelayConfig::builder()
            .api_key("super-secret-key")
            .build()
            .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
