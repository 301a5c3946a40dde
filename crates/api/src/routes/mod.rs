//! Route tree for the API.

pub mod bridge;
pub mod health;
pub mod variants;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Bridge worker surface: enqueue, dispatch, completion.
        .nest("/bridge", bridge::router())
        // Item-scoped variant CRUD and bulk job cleanup.
        .nest("/items", variants::router())
}
