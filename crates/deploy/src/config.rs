//! Deployment configuration and the pre-flight gate.
//!
//! Endpoint and signing key arrive as optional values (flags with env-var
//! fallbacks); [`RawConfig::validate`] turns them into a [`DeployConfig`]
//! or reports what is missing before any network or signer work starts.

use std::fmt;
use std::time::Duration;

use url::Url;

/// Environment variable naming the node RPC endpoint.
pub const RPC_URL_VAR: &str = "PRALINE_RPC_URL";

/// Environment variable naming the secret key.
pub const SECRET_KEY_VAR: &str = "PRALINE_PK";

/// Default number of confirmations to wait for after inclusion.
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// Default upper bound on the confirmation wait.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// A configuration failure, reported before any deployment work begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Couldn't find the deployment configuration. \
         Set the PRALINE_RPC_URL and PRALINE_PK environment variables \
         (or pass --rpc-url and --pk)"
    )]
    MissingBoth,

    #[error("Missing {0} environment variable")]
    MissingVar(&'static str),

    #[error("Invalid RPC endpoint {url}")]
    InvalidEndpoint {
        url: String,
        source: url::ParseError,
    },
}

/// Configuration values as they arrive from the process environment,
/// before the pre-flight check.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub rpc_url: Option<String>,
    pub secret_key: Option<String>,
}

impl RawConfig {
    /// Pre-flight gate. The three missing-value cases are reported
    /// separately because the operator guidance differs: neither value set
    /// usually means the environment was never initialized, a single missing
    /// variable is named so it can be added.
    ///
    /// The endpoint must parse as a URL; the secret key's syntax is not
    /// checked here; the signer rejects bad key material on first use.
    pub fn validate(self) -> Result<DeployConfig, ConfigError> {
        match (self.rpc_url, self.secret_key) {
            (None, None) => Err(ConfigError::MissingBoth),
            (None, Some(_)) => Err(ConfigError::MissingVar(RPC_URL_VAR)),
            (Some(_), None) => Err(ConfigError::MissingVar(SECRET_KEY_VAR)),
            (Some(rpc_url), Some(secret_key)) => {
                let rpc_url = Url::parse(&rpc_url).map_err(|source| {
                    ConfigError::InvalidEndpoint {
                        url: rpc_url,
                        source,
                    }
                })?;
                Ok(DeployConfig {
                    rpc_url,
                    secret_key,
                    confirmations: DEFAULT_CONFIRMATIONS,
                    confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
                })
            }
        }
    }
}

/// Validated deployment configuration, constructed once at process start and
/// passed by value to everything that needs it.
#[derive(Clone)]
pub struct DeployConfig {
    /// The node RPC endpoint.
    pub rpc_url: Url,
    /// The secret key authorizing the origination. Never logged.
    pub secret_key: String,
    /// Confirmation depth to wait for after inclusion.
    pub confirmations: u64,
    /// Upper bound on the confirmation wait.
    pub confirmation_timeout: Duration,
}

impl DeployConfig {
    pub fn confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("secret_key", &"<redacted>")
            .field("confirmations", &self.confirmations)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rpc_url: Option<&str>, secret_key: Option<&str>) -> RawConfig {
        RawConfig {
            rpc_url: rpc_url.map(String::from),
            secret_key: secret_key.map(String::from),
        }
    }

    #[test]
    fn test_both_missing() {
        let err = raw(None, None).validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingBoth));
        assert!(err.to_string().contains("PRALINE_RPC_URL"));
        assert!(err.to_string().contains("PRALINE_PK"));
    }

    #[test]
    fn test_endpoint_missing_is_named() {
        let err = raw(None, Some("edsk...")).validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(RPC_URL_VAR)));
        assert!(err.to_string().contains("PRALINE_RPC_URL"));
    }

    #[test]
    fn test_secret_key_missing_is_named() {
        let err = raw(Some("http://127.0.0.1:8732"), None)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(SECRET_KEY_VAR)));
        assert!(err.to_string().contains("PRALINE_PK"));
    }

    #[test]
    fn test_both_present() {
        let config = raw(Some("http://127.0.0.1:8732"), Some("edsk..."))
            .validate()
            .expect("both values present");
        assert_eq!(config.rpc_url.as_str(), "http://127.0.0.1:8732/");
        assert_eq!(config.secret_key, "edsk...");
        assert_eq!(config.confirmations, DEFAULT_CONFIRMATIONS);
        assert_eq!(config.confirmation_timeout, DEFAULT_CONFIRMATION_TIMEOUT);
    }

    #[test]
    fn test_unparseable_endpoint_fails_fast() {
        let err = raw(Some("not a url"), Some("edsk..."))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_secret_key_syntax_is_not_checked_here() {
        // Key material validation belongs to the signer.
        let config = raw(Some("http://127.0.0.1:8732"), Some("definitely-not-a-key"))
            .validate()
            .expect("gate only checks presence");
        assert_eq!(config.secret_key, "definitely-not-a-key");
    }

    #[test]
    fn test_debug_redacts_the_secret_key() {
        let config = raw(Some("http://127.0.0.1:8732"), Some("edskSecret"))
            .validate()
            .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("edskSecret"));
        assert!(debug.contains("<redacted>"));
    }
}
