//! Cart client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FERREMAS_BASE_URL` - Origin of the Ferremas server (e.g., `http://127.0.0.1:5000`)
//!
//! ## Optional
//! - `FERREMAS_SESSION_COOKIE` - Value of the server's session cookie for a logged-in user
//! - `FERREMAS_SESSION_COOKIE_NAME` - Session cookie name (default: session)
//! - `FERREMAS_TAX_MODEL` - `inclusive` or `exclusive` (default: inclusive)
//! - `FERREMAS_TAX_RATE` - Tax rate as a decimal (default: 0.19)
//! - `FERREMAS_BADGE_CAP` - Largest count the cart badge shows before "N+", at least 1 (default: 9)
//! - `FERREMAS_CURRENCY` - Display currency, `CLP` or `USD` (default: CLP)
//! - `FERREMAS_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: transport default)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::str::FromStr;
use std::time::Duration;

use ferremas_core::types::totals::DEFAULT_TAX_RATE;
use ferremas_core::{CurrencyCode, TaxModel};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_COOKIE_NAME: &str = "session";
const DEFAULT_BADGE_CAP: usize = 9;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin every endpoint path is joined onto
    pub base_url: Url,
    /// Session cookie identifying the logged-in user, if any
    pub session: Option<SessionCookie>,
    /// How totals, prices and the badge are displayed
    pub display: DisplayConfig,
    /// Transport-level timeout applied to every request
    pub request_timeout: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Server session cookie.
///
/// Implements `Debug` manually to redact the cookie value.
#[derive(Clone)]
pub struct SessionCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: SecretString,
}

impl SessionCookie {
    /// Render as a `Cookie` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value.expose_secret())
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Display settings for the cart view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Tax model used to derive subtotal and tax
    pub tax_model: TaxModel,
    /// Badge counts above this show as "{cap}+"
    pub badge_cap: usize,
    /// Currency used for every displayed amount
    pub currency: CurrencyCode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tax_model: TaxModel::default(),
            badge_cap: DEFAULT_BADGE_CAP,
            currency: CurrencyCode::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(&lookup);

        let base_url = env.required("FERREMAS_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("FERREMAS_BASE_URL".to_string(), e.to_string())
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "FERREMAS_BASE_URL".to_string(),
                "must be an http(s) origin".to_string(),
            ));
        }

        let session = env
            .optional("FERREMAS_SESSION_COOKIE")
            .filter(|value| !value.is_empty())
            .map(|value| SessionCookie {
                name: env.or_default("FERREMAS_SESSION_COOKIE_NAME", DEFAULT_SESSION_COOKIE_NAME),
                value: SecretString::from(value),
            });

        let rate: Decimal = env.parsed_or("FERREMAS_TAX_RATE", DEFAULT_TAX_RATE)?;
        if rate.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "FERREMAS_TAX_RATE".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let tax_model = match env.or_default("FERREMAS_TAX_MODEL", "inclusive").as_str() {
            "inclusive" => TaxModel::Inclusive { rate },
            "exclusive" => TaxModel::Exclusive { rate },
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "FERREMAS_TAX_MODEL".to_string(),
                    format!("expected `inclusive` or `exclusive`, got `{other}`"),
                ));
            }
        };

        let badge_cap: usize = env.parsed_or("FERREMAS_BADGE_CAP", DEFAULT_BADGE_CAP)?;
        if badge_cap == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FERREMAS_BADGE_CAP".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let display = DisplayConfig {
            tax_model,
            badge_cap,
            currency: env.parsed_or("FERREMAS_CURRENCY", CurrencyCode::default())?,
        };

        let request_timeout = env
            .optional("FERREMAS_REQUEST_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "FERREMAS_REQUEST_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            base_url,
            session,
            display,
            request_timeout,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Whether requests carry a user session.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Lookup<'_, F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).map(|value| value.trim().to_string())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to a default when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("FERREMAS_BASE_URL", "http://127.0.0.1:5000")]).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:5000/");
        assert!(config.session.is_none());
        assert!(!config.is_authenticated());
        assert_eq!(config.display, DisplayConfig::default());
        assert_eq!(config.display.badge_cap, 9);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "FERREMAS_BASE_URL"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("FERREMAS_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[("FERREMAS_BASE_URL", "mailto:shop@ferremas.cl")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_exclusive_tax_model() {
        let config = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_TAX_MODEL", "exclusive"),
            ("FERREMAS_TAX_RATE", "0.10"),
        ])
        .unwrap();
        assert_eq!(
            config.display.tax_model,
            TaxModel::Exclusive {
                rate: Decimal::new(10, 2)
            }
        );
    }

    #[test]
    fn test_invalid_tax_settings() {
        let err = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_TAX_MODEL", "gross"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "FERREMAS_TAX_MODEL"));

        let err = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_TAX_RATE", "-0.19"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "FERREMAS_TAX_RATE"));
    }

    #[test]
    fn test_session_cookie() {
        let config = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_SESSION_COOKIE", "abc123"),
        ])
        .unwrap();
        let session = config.session.unwrap();
        assert_eq!(session.name, "session");
        assert_eq!(session.header_value(), "session=abc123");
    }

    #[test]
    fn test_empty_session_cookie_is_anonymous() {
        let config = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_SESSION_COOKIE", ""),
        ])
        .unwrap();
        assert!(config.session.is_none());
    }

    #[test]
    fn test_badge_cap_and_timeout() {
        let config = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_BADGE_CAP", "99"),
            ("FERREMAS_REQUEST_TIMEOUT_SECS", "15"),
            ("FERREMAS_CURRENCY", "usd"),
        ])
        .unwrap();
        assert_eq!(config.display.badge_cap, 99);
        assert_eq!(config.display.currency, CurrencyCode::USD);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));

        let err = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_BADGE_CAP", "many"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_zero_badge_cap_rejected() {
        let err = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_BADGE_CAP", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "FERREMAS_BADGE_CAP"));

        let config = load(&[
            ("FERREMAS_BASE_URL", "http://localhost"),
            ("FERREMAS_BADGE_CAP", "1"),
        ])
        .unwrap();
        assert_eq!(config.display.badge_cap, 1);
    }

    #[test]
    fn test_session_cookie_debug_redacts_value() {
        let cookie = SessionCookie {
            name: "session".to_string(),
            value: SecretString::from("super_secret_session_value"),
        };

        let debug_output = format!("{cookie:?}");
        assert!(debug_output.contains("session"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_session_value"));
    }
}
