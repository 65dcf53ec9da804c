//! Gateway configuration loading from environment.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Certification (sandbox) endpoint.
pub const CERT_URL: &str =
    "https://cert.api2.heartlandportico.com/Hps.Exchange.PosGateway/PosGatewayService.asmx";

/// Production endpoint.
pub const PRODUCTION_URL: &str =
    "https://api2.heartlandportico.com/Hps.Exchange.PosGateway/PosGatewayService.asmx";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "no gateway credentials: set GATEWAY_SECRET_API_KEY, or GATEWAY_SITE_ID, \
         GATEWAY_LICENSE_ID, GATEWAY_DEVICE_ID, GATEWAY_USERNAME and GATEWAY_PASSWORD"
    )]
    MissingCredentials,

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// How the merchant authenticates in the request header.
#[derive(Debug, Clone)]
pub enum Credentials {
    SecretApiKey(SecretString),
    Site {
        site_id: u32,
        license_id: u32,
        device_id: u32,
        username: String,
        password: SecretString,
    },
}

/// Gateway client configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credentials: Credentials,
    /// Overrides the endpoint derived from the credentials.
    pub service_url: Option<String>,
    pub developer_id: Option<String>,
    pub version_number: Option<String>,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            service_url: None,
            developer_id: None,
            version_number: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Shorthand for secret-API-key authentication.
    pub fn with_secret_api_key(key: impl Into<String>) -> Self {
        Self::new(Credentials::SecretApiKey(SecretString::from(key.into())))
    }

    /// Loads configuration from `GATEWAY_*` environment variables.
    ///
    /// A secret API key wins over site credentials when both are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credentials = match var("GATEWAY_SECRET_API_KEY") {
            Some(key) => Credentials::SecretApiKey(SecretString::from(key)),
            None => Credentials::Site {
                site_id: number(&var, "GATEWAY_SITE_ID")?,
                license_id: number(&var, "GATEWAY_LICENSE_ID")?,
                device_id: number(&var, "GATEWAY_DEVICE_ID")?,
                username: var("GATEWAY_USERNAME").ok_or(ConfigError::MissingCredentials)?,
                password: var("GATEWAY_PASSWORD")
                    .map(SecretString::from)
                    .ok_or(ConfigError::MissingCredentials)?,
            },
        };

        let timeout = match var("GATEWAY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                ConfigError::Invalid {
                    name: "GATEWAY_TIMEOUT_SECS",
                    value: raw.clone(),
                }
            })?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            credentials,
            service_url: var("GATEWAY_SERVICE_URL"),
            developer_id: var("GATEWAY_DEVELOPER_ID"),
            version_number: var("GATEWAY_VERSION_NUMBER"),
            timeout,
        })
    }

    /// The endpoint requests are posted to.
    ///
    /// Secret keys for the certification environment contain `_cert_`.
    /// Site credentials without an explicit URL go to production.
    pub fn service_url(&self) -> &str {
        if let Some(url) = &self.service_url {
            return url;
        }
        match &self.credentials {
            Credentials::SecretApiKey(key) if key.expose_secret().contains("_cert_") => CERT_URL,
            _ => PRODUCTION_URL,
        }
    }
}

fn number(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<u32, ConfigError> {
    let raw = var(name).ok_or(ConfigError::MissingCredentials)?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_cert_key_selects_cert_url() {
        let config = load(&[("GATEWAY_SECRET_API_KEY", "skapi_cert_MYl2AQAowiQAbLp5JesGKh7Q")]).unwrap();
        assert_eq!(config.service_url(), CERT_URL);

        let config = load(&[("GATEWAY_SECRET_API_KEY", "skapi_prod_abc")]).unwrap();
        assert_eq!(config.service_url(), PRODUCTION_URL);
    }

    #[test]
    fn test_explicit_url_wins() {
        let config = load(&[
            ("GATEWAY_SECRET_API_KEY", "skapi_cert_abc"),
            ("GATEWAY_SERVICE_URL", "https://localhost:9443/gateway"),
        ])
        .unwrap();
        assert_eq!(config.service_url(), "https://localhost:9443/gateway");
    }

    #[test]
    fn test_site_credentials() {
        let config = load(&[
            ("GATEWAY_SITE_ID", "12345"),
            ("GATEWAY_LICENSE_ID", "12"),
            ("GATEWAY_DEVICE_ID", "1234567"),
            ("GATEWAY_USERNAME", "777700001"),
            ("GATEWAY_PASSWORD", "$Test1234"),
            ("GATEWAY_TIMEOUT_SECS", "15"),
        ])
        .unwrap();

        match &config.credentials {
            Credentials::Site {
                site_id, password, ..
            } => {
                assert_eq!(*site_id, 12345);
                assert_eq!(password.expose_secret(), "$Test1234");
            }
            other => panic!("expected site credentials, got {other:?}"),
        }
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.service_url(), PRODUCTION_URL);
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingCredentials)));
        assert!(matches!(
            load(&[("GATEWAY_SITE_ID", "1"), ("GATEWAY_LICENSE_ID", "2")]),
            Err(ConfigError::MissingCredentials)
        ));
    }

    #[test]
    fn test_non_numeric_site_id() {
        let err = load(&[("GATEWAY_SITE_ID", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "GATEWAY_SITE_ID", .. }));
    }

    #[test]
    fn test_secret_is_not_printed() {
        let config = GatewayConfig::with_secret_api_key("skapi_cert_secret_value");
        assert!(!format!("{config:?}").contains("secret_value"));
    }
}
