//! API module
//!
//! HTTP API endpoints and middleware.

pub mod extractor;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use sqlx::PgPool;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{PasswordHasher, TokenService};

pub use response::ApiResponse;
pub use routes::create_router;

/// Shared state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(pool: PgPool, tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            pool,
            tokens,
            passwords,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Layers run bottom-up: request id is set first, then context, then logging
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", create_router())
        .fallback(not_found)
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::context_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found() -> ApiResponse<()> {
    ApiResponse::failure(StatusCode::NOT_FOUND, "Route not found")
}
