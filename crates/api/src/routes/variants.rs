//! Route definitions for the item-scoped variant surface.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{bridge, variants};
use crate::state::AppState;

/// Routes mounted at `/items`.
///
/// ```text
/// GET    /{item_id}/variants        -> list_by_item
/// POST   /{item_id}/variants        -> create
/// GET    /{item_id}/variants/{id}   -> get_by_id
/// PATCH  /{item_id}/variants/{id}   -> update
/// DELETE /{item_id}/variants/{id}   -> delete (blobs first, then row)
/// DELETE /{item_id}/jobs            -> delete_jobs_for_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{item_id}/variants",
            get(variants::list_by_item).post(variants::create),
        )
        .route(
            "/{item_id}/variants/{id}",
            get(variants::get_by_id)
                .patch(variants::update)
                .delete(variants::delete),
        )
        .route("/{item_id}/jobs", delete(bridge::delete_jobs_for_item))
}
