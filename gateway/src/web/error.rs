//! Error-to-response mapping for the HTTP boundary.

use std::any::Any;

use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::messaging::MessagingError;
use crate::webhook::WebhookError;

/// Every failure a route can surface to a caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad credentials or a missing/invalid bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Webhook payload could not be processed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request body does not match the route's fixed shape.
    #[error("unprocessable request: {0}")]
    Validation(String),

    /// The messaging API answered with something other than 200.
    #[error("messaging API returned status {status}")]
    Upstream { status: u16, body: Value },

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(detail) => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            ApiError::Validation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            ApiError::Upstream { status, body } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, Json(json!({ "detail": body }))).into_response()
            }
            ApiError::Internal(detail) => {
                error!(error = %detail, "internal_error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": format!("Internal error: {detail}") })),
                )
                    .into_response()
            }
        }
    }
}

impl From<MessagingError> for ApiError {
    fn from(err: MessagingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        ApiError::BadRequest(format!("Error processing webhook: {err}"))
    }
}

/// Turn a handler panic into the generic 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_has_bearer_challenge() {
        let resp = ApiError::Unauthorized("Invalid token".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[WWW_AUTHENTICATE], "Bearer");
        assert_eq!(body_json(resp).await, json!({"detail": "Invalid token"}));
    }

    #[tokio::test]
    async fn test_upstream_status_is_forwarded() {
        let body = json!({"error": {"code": 131047}});
        let resp = ApiError::Upstream {
            status: 403,
            body: body.clone(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await, json!({ "detail": body }));
    }

    #[tokio::test]
    async fn test_upstream_invalid_status_becomes_bad_gateway() {
        let resp = ApiError::Upstream {
            status: 42,
            body: Value::Null,
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_webhook_error_is_bad_request() {
        let resp = ApiError::from(WebhookError::Processing("boom".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({"detail": "Error processing webhook: boom"})
        );
    }

    #[tokio::test]
    async fn test_panic_message_is_embedded() {
        let resp = handle_panic(Box::new("kaboom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            json!({"message": "Internal error: kaboom"})
        );
    }
}
