use std::str::FromStr;

use digitalcv_domain::payment::NotifyPolicy;

use crate::domain::types::Pricing;

const DEFAULT_CV_PORT: u16 = 3120;
const DEFAULT_AMOUNT_MINOR: i64 = 250_000;
const DEFAULT_CURRENCY: &str = "LKR";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAIL_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Payment gateway connection settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway API. Env var: `GATEWAY_API_URL`.
    pub api_url: String,
    /// Bearer key for outbound charge requests. Env var: `GATEWAY_API_KEY`.
    pub api_key: String,
    /// Shared secret for webhook HMAC signatures. Env var: `GATEWAY_WEBHOOK_SECRET`.
    pub webhook_secret: String,
    /// Outbound request timeout (default 10). Env var: `GATEWAY_TIMEOUT_SECS`.
    pub timeout_secs: u64,
}

/// Outbound email settings. Delivery is disabled when `api_key` is `None`.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Env var: `MAIL_API_URL` (default: Resend).
    pub api_url: String,
    /// Env var: `MAIL_API_KEY`.
    pub api_key: Option<String>,
    /// Sender address. Env var: `MAIL_FROM` (required when `MAIL_API_KEY` is set).
    pub from: Option<String>,
}

/// CV service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CvConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `CV_PORT`.
    pub cv_port: u16,
    /// Externally reachable base URL used to build gateway callback URLs.
    /// Env var: `PUBLIC_BASE_URL`.
    pub public_base_url: String,
    pub gateway: GatewayConfig,
    pub mail: MailConfig,
    /// Fixed activation price. Env vars: `PAYMENT_AMOUNT_MINOR`, `PAYMENT_CURRENCY`.
    pub pricing: Pricing,
    /// Which payment outcomes email the CV owner. Env var: `NOTIFY_ON`.
    pub notify_policy: NotifyPolicy,
}

impl CvConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let public_base_url = required("PUBLIC_BASE_URL")?;
        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "PUBLIC_BASE_URL",
                reason: "must be an http(s) URL".to_owned(),
            });
        }

        let currency = get("PAYMENT_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid {
                name: "PAYMENT_CURRENCY",
                reason: "must be a 3-letter upper-case ISO 4217 code".to_owned(),
            });
        }
        let amount_minor = parse_or(&get, "PAYMENT_AMOUNT_MINOR", DEFAULT_AMOUNT_MINOR)?;
        if amount_minor <= 0 {
            return Err(ConfigError::Invalid {
                name: "PAYMENT_AMOUNT_MINOR",
                reason: "must be positive".to_owned(),
            });
        }

        let mail_api_key = get("MAIL_API_KEY");
        let mail_from = get("MAIL_FROM");
        if mail_api_key.is_some() && mail_from.is_none() {
            return Err(ConfigError::Missing("MAIL_FROM"));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            cv_port: parse_or(&get, "CV_PORT", DEFAULT_CV_PORT)?,
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
            gateway: GatewayConfig {
                api_url: required("GATEWAY_API_URL")?
                    .trim_end_matches('/')
                    .to_owned(),
                api_key: required("GATEWAY_API_KEY")?,
                webhook_secret: required("GATEWAY_WEBHOOK_SECRET")?,
                timeout_secs: parse_or(&get, "GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT_SECS)?,
            },
            mail: MailConfig {
                api_url: get("MAIL_API_URL").unwrap_or_else(|| DEFAULT_MAIL_API_URL.to_owned()),
                api_key: mail_api_key,
                from: mail_from,
            },
            pricing: Pricing {
                amount_minor,
                currency,
            },
            notify_policy: parse_or(&get, "NOTIFY_ON", NotifyPolicy::default())?,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&'static str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
