//! Configuration module for environment variable parsing.
//!
//! Every value the service needs is read once at startup. Missing or
//! malformed required variables abort startup with a [`ConfigError`].

use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::Algorithm;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Signing algorithms accepted for bearer tokens (shared-secret family only).
const SUPPORTED_ALGORITHMS: &[(&str, Algorithm)] = &[
    ("HS256", Algorithm::HS256),
    ("HS384", Algorithm::HS384),
    ("HS512", Algorithm::HS512),
];

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Long-lived access token for the WhatsApp Cloud API
    pub meta_access_token: String,

    /// Phone-number identifier registered with the messaging API
    pub phone_number_id: String,

    /// Base URL of the messaging API (e.g. https://graph.facebook.com/v17.0)
    pub whatsapp_api_url: String,

    /// Shared secret used to sign and verify bearer tokens
    pub secret_key: String,

    /// Signing algorithm for bearer tokens
    pub algorithm: Algorithm,

    /// Default bearer token lifetime in minutes
    pub access_token_expire_minutes: i64,

    // =========================================================================
    // Web Server Configuration
    // =========================================================================

    /// Interface the web server binds to
    pub host: String,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is honored if present;
    /// variables already set in the environment take precedence.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warn!(error = %e, "dotenv_load_failed");
            }
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let whatsapp_api_url = required("WHATSAPP_API_URL")?;
        Url::parse(&whatsapp_api_url).map_err(|e| ConfigError::Invalid {
            name: "WHATSAPP_API_URL",
            reason: e.to_string(),
        })?;

        let algorithm = parse_algorithm(&required("ALGORITHM")?)?;

        let access_token_expire_minutes = required("ACCESS_TOKEN_EXPIRE_MINUTES")?
            .parse::<i64>()
            .ok()
            .filter(|m| {
                *m > 0
                    && Duration::try_minutes(*m)
                        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
                        .is_some()
            })
            .ok_or_else(|| ConfigError::Invalid {
                name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "expected a positive number of minutes within range".to_string(),
            })?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 8000,
        };

        Ok(Config {
            meta_access_token: required("META_ACCESS_TOKEN")?,
            phone_number_id: required("PHONE_NUMBER_ID")?,
            whatsapp_api_url: whatsapp_api_url.trim_end_matches('/').to_string(),
            secret_key: required("SECRET_KEY")?,
            algorithm,
            access_token_expire_minutes,
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }

    /// Full URL of the outbound messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.whatsapp_api_url, self.phone_number_id)
    }
}

/// Parse an algorithm name such as "HS256" (case-insensitive).
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    SUPPORTED_ALGORITHMS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(raw))
        .map(|(_, alg)| *alg)
        .ok_or_else(|| ConfigError::Invalid {
            name: "ALGORITHM",
            reason: format!("unsupported algorithm {raw:?}, expected HS256, HS384 or HS512"),
        })
}
