//! Route handlers.
//!
//! Handlers only shape requests and responses; token checks live in the
//! bearer middleware and outbound calls in [`MessagingClient`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    Extension, Json,
};
use chrono::Duration;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::bearer::CurrentUser;
use super::error::ApiError;
use crate::auth::{subject_claims, CredentialStore, StaticCredentialStore, TokenService};
use crate::messaging::{FreeMessageRequest, MessagingClient, TemplateMessageRequest, UpstreamResponse};
use crate::webhook::{AckProcessor, WebhookError, WebhookProcessor};
use crate::Config;

/// Lifetime of tokens handed out by the login route.
pub const LOGIN_TOKEN_TTL_MINUTES: i64 = 30;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub credentials: Arc<dyn CredentialStore>,
    pub messaging: MessagingClient,
    pub webhook: Arc<dyn WebhookProcessor>,
}

impl AppState {
    /// State with the built-in credential map and webhook processor.
    pub fn new(config: Config) -> Self {
        Self {
            tokens: TokenService::from_config(&config),
            messaging: MessagingClient::from_config(&config),
            credentials: Arc::new(StaticCredentialStore::default()),
            webhook: Arc::new(AckProcessor),
            config: Arc::new(config),
        }
    }

    pub fn with_credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = store;
        self
    }

    pub fn with_webhook_processor(mut self, processor: Arc<dyn WebhookProcessor>) -> Self {
        self.webhook = processor;
        self
    }
}

/// Deserialize a JSON request body.
///
/// The `Content-Type` header is not checked; clients that omit it are
/// still served.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(e.to_string()))
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Auth
// =============================================================================

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// `POST /auth/token`: exchange credentials for a 30-minute bearer token.
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let credentials: LoginRequest = parse_body(&body)?;

    if !state
        .credentials
        .authenticate(&credentials.username, &credentials.password)
        .await
    {
        warn!(username = %credentials.username, "login_failed");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_token = state
        .tokens
        .issue(
            &subject_claims(&credentials.username),
            Some(Duration::minutes(LOGIN_TOKEN_TTL_MINUTES)),
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(username = %credentials.username, "login_succeeded");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

// =============================================================================
// WhatsApp Messaging
// =============================================================================

/// Successful send response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendResponse {
    pub status: String,
    pub response: Value,
}

fn send_result(resp: UpstreamResponse, status: &str) -> Result<Json<SendResponse>, ApiError> {
    if resp.is_success() {
        Ok(Json(SendResponse {
            status: status.to_string(),
            response: resp.body,
        }))
    } else {
        Err(ApiError::Upstream {
            status: resp.status,
            body: resp.body,
        })
    }
}

/// `POST /whatsapp/send-template-message/`
pub async fn send_template_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Json<SendResponse>, ApiError> {
    let message: TemplateMessageRequest = parse_body(&body)?;

    info!(
        user = %user,
        to = %message.to,
        template = %message.template_name,
        language = %message.language_code,
        "template_message_requested"
    );

    let resp = state
        .messaging
        .send_template(&message.to, &message.template_name, &message.language_code)
        .await?;

    send_result(resp, "Template message sent successfully")
}

/// `POST /whatsapp/send-free-message/`
pub async fn send_free_message(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Json<SendResponse>, ApiError> {
    let message: FreeMessageRequest = parse_body(&body)?;

    info!(
        user = %user,
        to = %message.to,
        text_length = message.text.len(),
        "free_message_requested"
    );

    let resp = state
        .messaging
        .send_free_text(&message.to, &message.text)
        .await?;

    send_result(resp, "Free message sent successfully")
}

// =============================================================================
// Webhook
// =============================================================================

/// `POST /webhook/`: hand the raw JSON body to the webhook processor and
/// return its result unchanged.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    info!(user = %user, body_length = body.len(), "webhook_received");

    let data: Value = serde_json::from_slice(&body)
        .map_err(|e| webhook_failure(WebhookError::InvalidPayload(e.to_string())))?;

    let result = state.webhook.process(data).await.map_err(webhook_failure)?;

    Ok(Json(result))
}

fn webhook_failure(err: WebhookError) -> ApiError {
    warn!(error = %err, "webhook_failed");
    ApiError::from(err)
}
