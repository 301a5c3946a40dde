//! Repository for the `bridge_jobs` table.
//!
//! Owns the three operations with real concurrency concerns: enqueue
//! (at most one active job per variant), claim (atomic lease grant to
//! the bridge worker), and report (terminal transition plus variant
//! cascade in one transaction).

use std::collections::HashSet;

use sqlx::PgPool;
use teamink_core::types::DbId;

use crate::models::job::{
    BridgeJob, DispatchedJob, EnqueueOutcome, ReportJobUpdate, ReportOutcome, ReportedStatus,
    DEFAULT_FAILURE_MESSAGE,
};
use crate::models::status::{BridgeJobStatus, StatusId, VariantStatus};

/// Column list for `bridge_jobs` queries.
const COLUMNS: &str = "id, variant_id, status_id, priority, error_message, \
    created_at, started_at, completed_at, updated_at";

/// Column list for the denormalized dispatch view.
const DISPATCH_COLUMNS: &str = "\
    j.id, j.status_id, j.priority, j.created_at, j.started_at, \
    v.id AS variant_id, v.item_id, v.variant_name, v.configuration, \
    i.name AS item_name, \
    i.project_id, p.name AS project_name, \
    p.team_id, t.name AS team_name, \
    t.school_id, s.name AS school_name, \
    i.template_id, tp.file_path AS template_path";

/// Join clause pairing each job with its variant and the surrounding
/// organizational context. Everything past the variant is optional.
const DISPATCH_JOINS: &str = "\
    FROM bridge_jobs j \
    JOIN design_variants v ON v.id = j.variant_id \
    LEFT JOIN design_items i ON i.id = v.item_id \
    LEFT JOIN projects p ON p.id = i.project_id \
    LEFT JOIN teams t ON t.id = p.team_id \
    LEFT JOIN schools s ON s.id = t.school_id \
    LEFT JOIN templates tp ON tp.id = i.template_id";

/// Default page size for dispatch listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for dispatch listing and claiming.
const MAX_LIMIT: i64 = 100;

/// Provides queue operations for bridge jobs.
pub struct JobRepo;

impl JobRepo {
    /// Clamp a caller-supplied limit to the allowed page size.
    pub fn clamp_limit(limit: Option<i64>) -> i64 {
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Enqueue rendering work for a batch of variants.
    ///
    /// For every requested variant that exists and has no active
    /// (pending or processing) job, creates a `pending` job with the
    /// given priority and flips the variant to `generating`. Duplicate
    /// ids within the request, unknown ids, and variants already
    /// covered by an active job are counted as skipped.
    ///
    /// Job creation and the variant status write happen in one
    /// transaction. The insert races with concurrent enqueues through
    /// the `uq_bridge_jobs_active_variant` partial unique index:
    /// a conflicting insert is silently skipped, so the at-most-one-
    /// active-job invariant holds even across concurrent calls.
    pub async fn enqueue(
        pool: &PgPool,
        variant_ids: &[DbId],
        priority: i32,
    ) -> Result<EnqueueOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let known: HashSet<DbId> = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM design_variants WHERE id = ANY($1)",
        )
        .bind(variant_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let active: HashSet<DbId> = sqlx::query_scalar::<_, DbId>(
            "SELECT variant_id FROM bridge_jobs
             WHERE variant_id = ANY($1) AND status_id IN ($2, $3)",
        )
        .bind(variant_ids)
        .bind(BridgeJobStatus::Pending.id())
        .bind(BridgeJobStatus::Processing.id())
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let insert = format!(
            "INSERT INTO bridge_jobs (variant_id, status_id, priority)
             VALUES ($1, $2, $3)
             ON CONFLICT (variant_id) WHERE status_id IN (1, 2) DO NOTHING
             RETURNING {COLUMNS}"
        );

        let mut jobs: Vec<BridgeJob> = Vec::new();
        let mut skipped = 0usize;
        let mut seen: HashSet<DbId> = HashSet::new();

        for &variant_id in variant_ids {
            if !seen.insert(variant_id) || !known.contains(&variant_id)
                || active.contains(&variant_id)
            {
                skipped += 1;
                continue;
            }

            let inserted = sqlx::query_as::<_, BridgeJob>(&insert)
                .bind(variant_id)
                .bind(BridgeJobStatus::Pending.id())
                .bind(priority)
                .fetch_optional(&mut *tx)
                .await?;

            match inserted {
                Some(job) => {
                    sqlx::query("UPDATE design_variants SET status_id = $2 WHERE id = $1")
                        .bind(variant_id)
                        .bind(VariantStatus::Generating.id())
                        .execute(&mut *tx)
                        .await?;
                    jobs.push(job);
                }
                // Lost the race to a concurrent enqueue; the variant is
                // already covered.
                None => skipped += 1,
            }
        }

        tx.commit().await?;

        Ok(EnqueueOutcome {
            created: jobs.len(),
            skipped,
            jobs,
        })
    }

    /// Read-only dispatch view: jobs in the given status with their
    /// denormalized context, ordered by `priority DESC, created_at ASC`
    /// (strict FIFO among equal priority).
    pub async fn list_dispatch(
        pool: &PgPool,
        status_id: StatusId,
        limit: i64,
    ) -> Result<Vec<DispatchedJob>, sqlx::Error> {
        let query = format!(
            "SELECT {DISPATCH_COLUMNS} {DISPATCH_JOINS}
             WHERE j.status_id = $1
             ORDER BY j.priority DESC, j.created_at ASC
             LIMIT $2"
        );
        sqlx::query_as::<_, DispatchedJob>(&query)
            .bind(status_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Atomically claim up to `limit` pending jobs for the bridge worker.
    ///
    /// The selected rows move to `processing` (setting `started_at` if
    /// unset) in the same transaction that reads them, using
    /// `FOR UPDATE SKIP LOCKED` so concurrent claimers never receive
    /// the same row. Returns the claimed rows with denormalized
    /// context in dispatch order.
    pub async fn claim(pool: &PgPool, limit: i64) -> Result<Vec<DispatchedJob>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed_ids: Vec<DbId> = sqlx::query_scalar::<_, DbId>(
            "UPDATE bridge_jobs
             SET status_id = $1, started_at = COALESCE(started_at, NOW())
             WHERE id IN (
                 SELECT id FROM bridge_jobs
                 WHERE status_id = $2
                 ORDER BY priority DESC, created_at ASC
                 LIMIT $3
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING id",
        )
        .bind(BridgeJobStatus::Processing.id())
        .bind(BridgeJobStatus::Pending.id())
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        let query = format!(
            "SELECT {DISPATCH_COLUMNS} {DISPATCH_JOINS}
             WHERE j.id = ANY($1)
             ORDER BY j.priority DESC, j.created_at ASC"
        );
        let jobs = sqlx::query_as::<_, DispatchedJob>(&query)
            .bind(&claimed_ids)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(jobs)
    }

    /// Apply a status report from the bridge worker.
    ///
    /// The job row is locked for the duration of the transaction, and
    /// terminal transitions cascade into the referenced variant within
    /// the same transaction, so a crash can never leave a completed job
    /// next to a still-generating variant.
    ///
    /// Re-delivery of the current terminal status is a no-op: the row
    /// is returned unchanged and the variant is not touched again. Any
    /// other transition requested on a terminal job is rejected. Both
    /// checks run before any write, which also stops a stale report for
    /// a superseded job from overwriting a re-enqueued variant.
    pub async fn apply_report(
        pool: &PgPool,
        job_id: DbId,
        input: &ReportJobUpdate,
    ) -> Result<ReportOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM bridge_jobs WHERE id = $1 FOR UPDATE");
        let Some(job) = sqlx::query_as::<_, BridgeJob>(&select)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(ReportOutcome::NotFound);
        };

        let terminal = job.status_id == BridgeJobStatus::Completed.id()
            || job.status_id == BridgeJobStatus::Failed.id();

        let Some(status) = input.status else {
            // Message-only patch; no transition.
            let update = format!(
                "UPDATE bridge_jobs SET error_message = COALESCE($2, error_message)
                 WHERE id = $1 RETURNING {COLUMNS}"
            );
            let updated = sqlx::query_as::<_, BridgeJob>(&update)
                .bind(job_id)
                .bind(&input.error_message)
                .fetch_one(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(ReportOutcome::Applied(updated));
        };

        if terminal {
            let same = match status {
                ReportedStatus::Completed => job.status_id == BridgeJobStatus::Completed.id(),
                ReportedStatus::Failed => job.status_id == BridgeJobStatus::Failed.id(),
                ReportedStatus::Processing => false,
            };
            return Ok(if same {
                ReportOutcome::AlreadyTerminal(job)
            } else {
                ReportOutcome::TerminalConflict(job)
            });
        }

        let updated = match status {
            ReportedStatus::Processing => {
                let update = format!(
                    "UPDATE bridge_jobs
                     SET status_id = $2, started_at = COALESCE(started_at, NOW())
                     WHERE id = $1 RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, BridgeJob>(&update)
                    .bind(job_id)
                    .bind(BridgeJobStatus::Processing.id())
                    .fetch_one(&mut *tx)
                    .await?
            }
            ReportedStatus::Completed => {
                let update = format!(
                    "UPDATE bridge_jobs
                     SET status_id = $2, completed_at = COALESCE(completed_at, NOW())
                     WHERE id = $1 RETURNING {COLUMNS}"
                );
                let updated = sqlx::query_as::<_, BridgeJob>(&update)
                    .bind(job_id)
                    .bind(BridgeJobStatus::Completed.id())
                    .fetch_one(&mut *tx)
                    .await?;

                // Cascade: variant becomes generated, the final artifact
                // is recorded, and any stale error is cleared.
                sqlx::query(
                    "UPDATE design_variants
                     SET status_id = $2,
                         final_path = COALESCE($3, final_path),
                         final_is_public = COALESCE($4, final_is_public),
                         error_message = NULL
                     WHERE id = $1",
                )
                .bind(job.variant_id)
                .bind(VariantStatus::Generated.id())
                .bind(&input.final_artifact_path)
                .bind(input.final_artifact_is_public)
                .execute(&mut *tx)
                .await?;

                updated
            }
            ReportedStatus::Failed => {
                let message = input
                    .error_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());

                let update = format!(
                    "UPDATE bridge_jobs
                     SET status_id = $2, error_message = $3,
                         completed_at = COALESCE(completed_at, NOW())
                     WHERE id = $1 RETURNING {COLUMNS}"
                );
                let updated = sqlx::query_as::<_, BridgeJob>(&update)
                    .bind(job_id)
                    .bind(BridgeJobStatus::Failed.id())
                    .bind(&message)
                    .fetch_one(&mut *tx)
                    .await?;

                sqlx::query(
                    "UPDATE design_variants SET status_id = $2, error_message = $3 WHERE id = $1",
                )
                .bind(job.variant_id)
                .bind(VariantStatus::Failed.id())
                .bind(&message)
                .execute(&mut *tx)
                .await?;

                updated
            }
        };

        tx.commit().await?;
        Ok(ReportOutcome::Applied(updated))
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BridgeJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bridge_jobs WHERE id = $1");
        sqlx::query_as::<_, BridgeJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a job. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bridge_jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Best-effort bulk delete of every job referencing one of the
    /// item's variants. Returns the number of rows removed.
    pub async fn delete_by_item(pool: &PgPool, item_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM bridge_jobs
             WHERE variant_id IN (SELECT id FROM design_variants WHERE item_id = $1)",
        )
        .bind(item_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
