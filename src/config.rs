//! Merchant credentials and gateway location.
//!
//! These are deployment-time values. They are passed explicitly to the
//! client so tests can point it at a local server with throwaway secrets.

use crate::error::{GatewayError, Result};
use std::env;
use std::fmt;
use url::Url;

/// Nuvei integration (test) environment
pub const SANDBOX_BASE_URL: &str = "https://ppp-test.nuvei.com/ppp/api/v1";

/// Nuvei production environment
pub const PRODUCTION_BASE_URL: &str = "https://secure.safecharge.com/ppp/api/v1";

#[derive(Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    pub merchant_site_id: String,
    secret_key: String,
    base_url: Url,
}

impl GatewayConfig {
    pub fn new(
        merchant_id: impl Into<String>,
        merchant_site_id: impl Into<String>,
        secret_key: impl Into<String>,
        base_url: &str,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        Ok(Self {
            merchant_id: merchant_id.into(),
            merchant_site_id: merchant_site_id.into(),
            secret_key: secret_key.into(),
            base_url,
        })
    }

    /// Credentials against the sandbox environment
    pub fn sandbox(
        merchant_id: impl Into<String>,
        merchant_site_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        Self::new(merchant_id, merchant_site_id, secret_key, SANDBOX_BASE_URL)
    }

    /// Load configuration from the environment (and `.env` if present).
    ///
    /// Reads:
    /// - `NUVEI_MERCHANT_ID`
    /// - `NUVEI_MERCHANT_SITE_ID`
    /// - `NUVEI_SECRET_KEY`
    /// - `NUVEI_BASE_URL` (optional, overrides `NUVEI_ENV`)
    /// - `NUVEI_ENV`: "sandbox" (default) or "production"
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let merchant_id = required_var("NUVEI_MERCHANT_ID")?;
        let merchant_site_id = required_var("NUVEI_MERCHANT_SITE_ID")?;
        let secret_key = required_var("NUVEI_SECRET_KEY")?;

        let base_url = match env::var("NUVEI_BASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let env_type = env::var("NUVEI_ENV").unwrap_or_else(|_| "sandbox".to_string());
                base_url_for(&env_type)?.to_string()
            }
        };

        Self::new(merchant_id, merchant_site_id, secret_key, &base_url)
    }

    /// Only the shared secret (`NUVEI_SECRET_KEY`), for offline checksum work
    pub fn secret_key_from_env() -> Result<String> {
        dotenv::dotenv().ok();
        required_var("NUVEI_SECRET_KEY")
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for an endpoint such as `openOrder.do`
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), name)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_site_id", &self.merchant_site_id)
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GatewayError::Config(format!("{} must be set", name))),
    }
}

fn base_url_for(env_type: &str) -> Result<&'static str> {
    match env_type.to_ascii_lowercase().as_str() {
        "sandbox" | "test" | "testnet" => Ok(SANDBOX_BASE_URL),
        "production" | "prod" | "live" => Ok(PRODUCTION_BASE_URL),
        other => Err(GatewayError::Config(format!(
            "Unknown NUVEI_ENV {:?} (expected sandbox or production)",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = GatewayConfig::new("m", "s", "k", "http://127.0.0.1:8080/api/v1/").unwrap();
        assert_eq!(
            config.endpoint("openOrder.do"),
            "http://127.0.0.1:8080/api/v1/openOrder.do"
        );

        let sandbox = GatewayConfig::sandbox("m", "s", "k").unwrap();
        assert_eq!(
            sandbox.endpoint("payment.do"),
            "https://ppp-test.nuvei.com/ppp/api/v1/payment.do"
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = GatewayConfig::sandbox("149703960791104369", "244398", "super-secret").unwrap();
        let printed = format!("{:?}", config);
        assert!(printed.contains("244398"));
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            GatewayConfig::new("m", "s", "k", "not a url"),
            Err(GatewayError::InvalidUrl(_))
        ));
        assert!(matches!(
            GatewayConfig::new("m", "s", "k", "mailto:ops@example.com"),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_secret_key_from_env_needs_only_secret() {
        env::remove_var("NUVEI_MERCHANT_ID");
        env::remove_var("NUVEI_MERCHANT_SITE_ID");
        env::set_var("NUVEI_SECRET_KEY", "env-secret");
        assert_eq!(GatewayConfig::secret_key_from_env().unwrap(), "env-secret");

        env::set_var("NUVEI_SECRET_KEY", "  ");
        assert!(matches!(
            GatewayConfig::secret_key_from_env(),
            Err(GatewayError::Config(_))
        ));
        env::remove_var("NUVEI_SECRET_KEY");
    }

    #[test]
    fn test_base_url_for_env() {
        assert_eq!(base_url_for("Production").unwrap(), PRODUCTION_BASE_URL);
        assert_eq!(base_url_for("sandbox").unwrap(), SANDBOX_BASE_URL);
        assert!(base_url_for("staging").is_err());
    }
}
