//! Bearer-token guard for protected route groups.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::error::ApiError;
use super::handlers::AppState;
use crate::auth::TokenService;

/// Username of the verified token holder, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Resolve the caller from request headers.
pub fn authorize(headers: &HeaderMap, tokens: &TokenService) -> Result<CurrentUser, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        warn!("bearer_token_missing");
        ApiError::Unauthorized("Not authenticated".to_string())
    })?;

    tokens.verify(token).map(CurrentUser).map_err(|e| {
        warn!(reason = %e, "bearer_token_rejected");
        ApiError::Unauthorized("Invalid token".to_string())
    })
}

/// Middleware: reject the request with 401 unless it carries a valid token.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authorize(req.headers(), &state.tokens)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::subject_claims;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use jsonwebtoken::Algorithm;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_authorize() {
        let tokens = TokenService::new("k", Algorithm::HS256, Duration::minutes(5));
        let token = tokens.issue(&subject_claims("testuser"), None).unwrap();

        let user = authorize(&headers(&format!("Bearer {token}")), &tokens).unwrap();
        assert_eq!(user, CurrentUser("testuser".to_string()));

        assert!(matches!(
            authorize(&HeaderMap::new(), &tokens),
            Err(ApiError::Unauthorized(d)) if d == "Not authenticated"
        ));
        assert!(matches!(
            authorize(&headers("Bearer nope"), &tokens),
            Err(ApiError::Unauthorized(d)) if d == "Invalid token"
        ));
    }
}
