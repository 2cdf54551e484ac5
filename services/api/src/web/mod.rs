pub mod chat_task;
pub mod middleware;
pub mod process_task;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::{chat_with_document_handler, health_handler, process_document_handler};

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Extracted document text can be large.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the application router: both study endpoints behind bearer auth, plus a
/// public health check. CORS is permissive and wraps everything, so pre-flight
/// requests are answered before authentication runs.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ]);

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/process-document", post(process_document_handler))
        .route("/chat-with-document", post(chat_with_document_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(app_state)
}
