use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::session::require_session;
use crate::AppState;

pub mod handlers;

/// Build the dashboard API router.
/// All routes are relative — the caller mounts this under `/api/v1`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/access/current", get(handlers::current_token))
        .route("/access/rotate", post(handlers::rotate_token))
        .route("/access/guest", post(handlers::register_guest))
        .route("/reports/absences", get(handlers::absences_report))
        .layer(middleware::from_fn(require_session))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
