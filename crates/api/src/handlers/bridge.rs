//! Handlers for the bridge worker surface: enqueue, dispatch, and
//! completion reporting.
//!
//! The bridge is the out-of-process rendering worker. It polls (or
//! claims) queue rows, performs the actual rendering, and reports the
//! result back through the PATCH endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use teamink_core::error::CoreError;
use teamink_core::types::DbId;
use teamink_db::models::job::{
    ClaimRequest, DispatchQuery, EnqueueRequest, ReportJobUpdate, ReportOutcome, ReportedStatus,
};
use teamink_db::models::status::BridgeJobStatus;
use teamink_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, DeleteAck};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Enqueue
// ---------------------------------------------------------------------------

/// POST /api/v1/bridge/enqueue
///
/// Queue rendering work for a batch of variants. Variants already
/// covered by an active job are skipped, never duplicated; newly
/// covered variants move to `generating` in the same transaction.
pub async fn enqueue(
    State(state): State<AppState>,
    Json(input): Json<EnqueueRequest>,
) -> AppResult<impl IntoResponse> {
    if input.variant_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "variant_ids must not be empty".into(),
        )));
    }

    let priority = input.priority.unwrap_or(0);
    let outcome = JobRepo::enqueue(&state.pool, &input.variant_ids, priority).await?;

    tracing::info!(
        created = outcome.created,
        skipped = outcome.skipped,
        priority,
        "Bridge jobs enqueued",
    );

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// GET /api/v1/bridge/jobs
///
/// Read-only queue view with denormalized variant context, ordered by
/// `priority DESC, created_at ASC`. Defaults to `status=pending`.
/// Returned rows are not claimed; workers that want exclusive handoff
/// use `POST /bridge/jobs/claim` instead.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<DispatchQuery>,
) -> AppResult<impl IntoResponse> {
    let status_name = params.status.as_deref().unwrap_or("pending");
    let status = BridgeJobStatus::from_name(status_name).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown job status: {status_name}"))
    })?;

    let limit = JobRepo::clamp_limit(params.limit);
    let jobs = JobRepo::list_dispatch(&state.pool, status.id(), limit).await?;

    Ok(Json(DataResponse { data: jobs }))
}

/// POST /api/v1/bridge/jobs/claim
///
/// Atomically claim up to `limit` pending jobs: the returned rows are
/// moved to `processing` in the same transaction that selects them, so
/// two concurrent workers never receive the same job.
pub async fn claim_jobs(
    State(state): State<AppState>,
    Json(input): Json<ClaimRequest>,
) -> AppResult<impl IntoResponse> {
    let limit = JobRepo::clamp_limit(input.limit);
    let jobs = JobRepo::claim(&state.pool, limit).await?;

    tracing::info!(claimed = jobs.len(), "Bridge jobs claimed");

    Ok(Json(DataResponse { data: jobs }))
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// PATCH /api/v1/bridge/jobs/{id}
///
/// Apply a status report from the bridge worker. Terminal statuses
/// cascade into the referenced variant atomically; re-delivering the
/// current terminal status is a no-op, and any other transition on a
/// terminal job is a 409.
pub async fn report_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Json(input): Json<ReportJobUpdate>,
) -> AppResult<impl IntoResponse> {
    if input.status == Some(ReportedStatus::Completed) && input.final_artifact_path.is_none() {
        // Accepted, but the variant ends up generated while keeping
        // whatever final artifact it had before.
        tracing::warn!(job_id, "Job reported completed without a final artifact path");
    }

    match JobRepo::apply_report(&state.pool, job_id, &input).await? {
        ReportOutcome::Applied(job) => {
            tracing::info!(
                job_id,
                variant_id = job.variant_id,
                status_id = job.status_id,
                "Bridge job report applied",
            );
            Ok(Json(DataResponse { data: job }))
        }
        ReportOutcome::AlreadyTerminal(job) => {
            tracing::debug!(job_id, "Terminal status re-delivered, no-op");
            Ok(Json(DataResponse { data: job }))
        }
        ReportOutcome::TerminalConflict(_) => Err(AppError::Core(CoreError::Conflict(
            "Job is already in a terminal state and cannot be transitioned".into(),
        ))),
        ReportOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "BridgeJob",
            id: job_id,
        })),
    }
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// DELETE /api/v1/bridge/jobs/{id}
///
/// Jobs carry no blob artifacts of their own (artifacts belong to the
/// variant), so this is a plain row delete.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = JobRepo::delete(&state.pool, job_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "BridgeJob",
            id: job_id,
        }));
    }

    tracing::info!(job_id, "Bridge job deleted");

    Ok(Json(DataResponse {
        data: DeleteAck { success: true },
    }))
}

/// Response for the per-item bulk job delete.
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

/// DELETE /api/v1/items/{item_id}/jobs
///
/// Best-effort bulk delete of every job referencing one of the item's
/// variants. Returns 200 with the removed count even when it is zero.
pub async fn delete_jobs_for_item(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkDeleteResponse>>)> {
    let deleted = JobRepo::delete_by_item(&state.pool, item_id).await?;

    tracing::info!(item_id, deleted, "Bridge jobs bulk-deleted for item");

    Ok((
        StatusCode::OK,
        Json(DataResponse {
            data: BulkDeleteResponse { deleted },
        }),
    ))
}
