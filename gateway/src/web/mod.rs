//! Web server module.
//!
//! Three route groups sit behind one router:
//! - `/auth/token` issues bearer tokens (public)
//! - `/whatsapp/*` forwards messages to the messaging API (bearer required)
//! - `/webhook/` hands inbound events to the webhook processor (bearer required)

pub mod bearer;
pub mod error;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub use bearer::{authorize, bearer_token, require_bearer, CurrentUser};
pub use error::{handle_panic, ApiError};
pub use handlers::{
    health, login, receive_webhook, send_free_message, send_template_message, AppState,
    HealthResponse, LoginRequest, SendResponse, TokenResponse, LOGIN_TOKEN_TTL_MINUTES,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/whatsapp/send-template-message/",
            post(send_template_message),
        )
        .route("/whatsapp/send-free-message/", post(send_free_message))
        .route("/webhook/", post(receive_webhook))
        .route("/webhook", post(receive_webhook))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/health", get(health))
        .route("/auth/token", post(login))
        .merge(protected)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
