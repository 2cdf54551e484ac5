//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that resolves the bearer token to the calling user.
///
/// If valid, inserts the `AuthUser` into request extensions for handlers to use.
/// If missing or rejected by the auth service, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the bearer token
    let access_token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // 2. Ask the auth service who this is
    let user = state.auth.authenticate(&access_token).await.map_err(|e| {
        warn!("Rejected request: {}", e);
        ApiError::from(e)
    })?;

    // 3. Insert the user into request extensions
    req.extensions_mut().insert(user);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

/// Returns the token part of an `Authorization: Bearer <token>` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
