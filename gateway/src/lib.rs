//! WhatsApp gateway - JWT-protected HTTP front for the WhatsApp Cloud API.
//!
//! This library provides the modules behind the `whatsapp-gateway` binary:
//! - `auth`: credential checks and bearer token issuance/verification
//! - `messaging`: outbound template and free-text messages
//! - `webhook`: pluggable processing of inbound webhook events
//! - `web`: axum router, bearer guard and error mapping
//!
//! ## Architecture
//!
//! ```text
//! Client → /auth/token → TokenService
//! Client → bearer guard → /whatsapp/* → MessagingClient → messaging API
//! Client → bearer guard → /webhook/   → WebhookProcessor
//! ```

pub mod auth;
pub mod config;
pub mod messaging;
pub mod web;
pub mod webhook;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use auth::{CredentialStore, StaticCredentialStore, TokenError, TokenService};
pub use config::{Config, ConfigError};
pub use messaging::{MessagingClient, MessagingError, OutboundMessage, UpstreamResponse};
pub use web::{router, ApiError, AppState};
pub use webhook::{AckProcessor, WebhookError, WebhookProcessor};
