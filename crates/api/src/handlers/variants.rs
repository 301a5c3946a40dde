//! Handlers for the design variant CRUD surface.
//!
//! Variants are nested under their owning item:
//! `/items/{item_id}/variants[/{id}]`. The lifecycle status is not
//! writable here -- the DTOs carry no status field, so status only
//! moves through the enqueue and completion transitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use teamink_core::error::CoreError;
use teamink_core::types::DbId;
use teamink_db::models::variant::{CreateDesignVariant, DesignVariant, UpdateDesignVariant};
use teamink_db::repositories::VariantRepo;
use teamink_storage::ArtifactStore;

use crate::cleanup::purge_artifacts;
use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, DeleteAck};
use crate::state::AppState;

/// A variant plus best-effort retrieval URLs for its artifacts.
#[derive(Debug, Serialize)]
pub struct VariantWithUrls {
    #[serde(flatten)]
    pub variant: DesignVariant,
    pub preview_url: Option<String>,
    pub final_url: Option<String>,
}

/// Resolve artifact URLs for a variant. URL generation failures are
/// tolerated (the field is simply absent) so a storage outage never
/// breaks reads.
async fn with_urls(store: &dyn ArtifactStore, variant: DesignVariant) -> VariantWithUrls {
    let preview_url = match &variant.preview_path {
        Some(path) => store.get_url(path, variant.preview_is_public).await.ok(),
        None => None,
    };
    let final_url = match &variant.final_path {
        Some(path) => store.get_url(path, variant.final_is_public).await.ok(),
        None => None,
    };

    VariantWithUrls {
        variant,
        preview_url,
        final_url,
    }
}

/// POST /api/v1/items/{item_id}/variants
///
/// Creates the variant in `preview` status. Overrides `input.item_id`
/// with the value from the URL path.
pub async fn create(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(mut input): Json<CreateDesignVariant>,
) -> AppResult<impl IntoResponse> {
    input.item_id = item_id;
    let variant = VariantRepo::create(&state.pool, &input).await?;

    tracing::info!(
        variant_id = variant.id,
        item_id,
        variant_name = %variant.variant_name,
        "Design variant created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: variant })))
}

/// GET /api/v1/items/{item_id}/variants
pub async fn list_by_item(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let variants = VariantRepo::list_by_item(&state.pool, item_id).await?;
    Ok(Json(DataResponse { data: variants }))
}

/// GET /api/v1/items/{item_id}/variants/{id}
///
/// Includes retrieval URLs for the preview and final artifacts when
/// they exist.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((_item_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let variant = VariantRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DesignVariant",
            id,
        }))?;

    let data = with_urls(state.artifact_store.as_ref(), variant).await;
    Ok(Json(DataResponse { data }))
}

/// PATCH /api/v1/items/{item_id}/variants/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((_item_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateDesignVariant>,
) -> AppResult<impl IntoResponse> {
    let variant = VariantRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DesignVariant",
            id,
        }))?;

    Ok(Json(DataResponse { data: variant }))
}

/// DELETE /api/v1/items/{item_id}/variants/{id}
///
/// Best-effort deletes the variant's blobs first (failures logged,
/// never fatal), then removes the row. Jobs referencing the variant
/// are removed by the `ON DELETE CASCADE` foreign key.
pub async fn delete(
    State(state): State<AppState>,
    Path((_item_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let variant = VariantRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DesignVariant",
            id,
        }))?;

    let paths = variant.artifact_paths();
    let removed = purge_artifacts(state.artifact_store.as_ref(), &paths).await;

    let deleted = VariantRepo::delete(&state.pool, id).await?;
    if !deleted {
        // Raced another delete after the lookup; the row is gone either way.
        return Err(AppError::Core(CoreError::NotFound {
            entity: "DesignVariant",
            id,
        }));
    }

    tracing::info!(
        variant_id = id,
        blobs_total = paths.len(),
        blobs_removed = removed,
        "Design variant deleted",
    );

    Ok(Json(DataResponse {
        data: DeleteAck { success: true },
    }))
}
