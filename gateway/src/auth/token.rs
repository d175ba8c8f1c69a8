//! Bearer token issuance and verification.
//!
//! Tokens are JWTs signed with a shared secret. Claims are an opaque JSON
//! object; the only claims the service relies on are `sub` (the username)
//! and `exp` (added at issuance).

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Config;

/// Claim set carried by a token.
pub type Claims = Map<String, Value>;

/// Errors produced by [`TokenService`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token signature invalid")]
    InvalidSignature,

    #[error("token malformed: {0}")]
    Malformed(String),

    #[error("token has no subject")]
    MissingSubject,

    #[error("token lifetime out of range")]
    ExpiryOutOfRange,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Creates and verifies signed bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm, default_ttl: Duration) -> Self {
        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.secret_key,
            config.algorithm,
            Duration::try_minutes(config.access_token_expire_minutes).unwrap_or(Duration::MAX),
        )
    }

    /// Sign `claims` with `exp = now + ttl`.
    ///
    /// When `ttl` is `None` the configured default lifetime is used. Any
    /// `exp` already present in `claims` is overwritten.
    pub fn issue(&self, claims: &Claims, ttl: Option<Duration>) -> Result<String, TokenError> {
        let expires_at = Utc::now()
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or(TokenError::ExpiryOutOfRange)?;

        let mut payload = claims.clone();
        payload.insert("exp".to_string(), Value::from(expires_at.timestamp()));

        encode(&Header::new(self.algorithm), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the `sub` claim.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            let err = match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            };
            debug!(error = %err, "token_decode_failed");
            err
        })?;

        match data.claims.get("sub") {
            Some(Value::String(sub)) => Ok(sub.clone()),
            _ => {
                warn!("token_missing_subject");
                Err(TokenError::MissingSubject)
            }
        }
    }
}

/// Build the minimal claim set for a user.
pub fn subject_claims(username: &str) -> Claims {
    let mut claims = Claims::new();
    claims.insert("sub".to_string(), Value::from(username));
    claims
}
