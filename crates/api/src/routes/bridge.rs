//! Route definitions for the bridge worker surface.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::bridge;
use crate::state::AppState;

/// Routes mounted at `/bridge`.
///
/// ```text
/// POST   /enqueue        -> enqueue
/// GET    /jobs           -> list_jobs (read-only dispatch view)
/// POST   /jobs/claim     -> claim_jobs (atomic lease grant)
/// PATCH  /jobs/{id}      -> report_job
/// DELETE /jobs/{id}      -> delete_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/enqueue", post(bridge::enqueue))
        .route("/jobs", get(bridge::list_jobs))
        .route("/jobs/claim", post(bridge::claim_jobs))
        .route(
            "/jobs/{id}",
            patch(bridge::report_job).delete(bridge::delete_job),
        )
}
