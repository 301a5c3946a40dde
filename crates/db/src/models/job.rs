//! Bridge job entity models and DTOs.
//!
//! A bridge job links exactly one design variant to one rendering
//! attempt by the out-of-process bridge worker. Jobs are created only
//! by the enqueue service and mutated only by the claim and completion
//! paths.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teamink_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// Fallback stored on the variant when the bridge reports a failure
/// without any error detail.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Rendering failed (no detail reported by the bridge)";

/// A row from the `bridge_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BridgeJob {
    pub id: DbId,
    pub variant_id: DbId,
    pub status_id: StatusId,
    pub priority: i32,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Request body for `POST /api/v1/bridge/enqueue`.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    /// Defaults to empty when absent, so a body without the field gets
    /// the same validation rejection as an explicit empty list.
    #[serde(default)]
    pub variant_ids: Vec<DbId>,
    /// Higher values are dispatched first. Defaults to 0.
    pub priority: Option<i32>,
}

/// Result of an enqueue call. Variants already covered by an active
/// job (and unknown or duplicate ids) are counted as skipped.
#[derive(Debug, Serialize)]
pub struct EnqueueOutcome {
    pub created: usize,
    pub skipped: usize,
    pub jobs: Vec<BridgeJob>,
}

/// Status the bridge worker may report via `PATCH /bridge/jobs/{id}`.
///
/// `pending` is deliberately absent: a job never moves back into the
/// queue through the completion handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportedStatus {
    Processing,
    Completed,
    Failed,
}

/// Request body for `PATCH /api/v1/bridge/jobs/{id}`.
#[derive(Debug, Deserialize)]
pub struct ReportJobUpdate {
    pub status: Option<ReportedStatus>,
    pub error_message: Option<String>,
    pub final_artifact_path: Option<String>,
    pub final_artifact_is_public: Option<bool>,
}

/// Outcome of applying a worker report to a job.
#[derive(Debug)]
pub enum ReportOutcome {
    /// The transition was applied (job and any variant cascade committed).
    Applied(BridgeJob),
    /// The job was already in the reported terminal status; nothing was
    /// written (re-delivery idempotence).
    AlreadyTerminal(BridgeJob),
    /// The job is terminal and the report asked for a different
    /// transition, which is never allowed.
    TerminalConflict(BridgeJob),
    /// No job with the given id exists.
    NotFound,
}

/// Query parameters for `GET /api/v1/bridge/jobs`.
#[derive(Debug, Deserialize)]
pub struct DispatchQuery {
    /// Wire status name. Defaults to `pending`.
    pub status: Option<String>,
    /// Maximum number of rows. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
}

/// Request body for `POST /api/v1/bridge/jobs/claim`.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub limit: Option<i64>,
}

/// Denormalized context the bridge worker needs to render a variant,
/// joined from the organizational tables. Everything past the item is
/// optional because those rows are owned by external CRUD and may be
/// absent.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VariantContext {
    pub variant_id: DbId,
    pub item_id: DbId,
    pub variant_name: String,
    pub configuration: serde_json::Value,
    pub item_name: Option<String>,
    pub project_id: Option<DbId>,
    pub project_name: Option<String>,
    pub team_id: Option<DbId>,
    pub team_name: Option<String>,
    pub school_id: Option<DbId>,
    pub school_name: Option<String>,
    pub template_id: Option<DbId>,
    pub template_path: Option<String>,
}

/// A queue row as served to the bridge worker: job fields plus the
/// denormalized variant context.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DispatchedJob {
    pub id: DbId,
    pub status_id: StatusId,
    pub priority: i32,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    #[sqlx(flatten)]
    pub variant: VariantContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_status_deserializes_from_snake_case() {
        let s: ReportedStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(s, ReportedStatus::Processing);
        let s: ReportedStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, ReportedStatus::Completed);
    }

    #[test]
    fn enqueue_request_without_variant_ids_deserializes_empty() {
        let req: EnqueueRequest = serde_json::from_str("{}").unwrap();
        assert!(req.variant_ids.is_empty());
        assert_eq!(req.priority, None);
    }

    #[test]
    fn reported_status_rejects_pending() {
        assert!(serde_json::from_str::<ReportedStatus>("\"pending\"").is_err());
    }

    #[test]
    fn default_failure_message_is_non_empty() {
        assert!(!DEFAULT_FAILURE_MESSAGE.is_empty());
    }
}
