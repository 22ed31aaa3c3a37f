//! Route table for the photo-booth API.

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub mod health;

/// Submission and upload endpoints.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(handlers::submit::submit))
        .route("/upload", post(handlers::upload::upload))
}
