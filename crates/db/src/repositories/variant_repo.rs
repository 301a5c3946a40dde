//! Repository for the `design_variants` table.
//!
//! Lifecycle status is deliberately not writable here outside the
//! documented transitions: `create` always lands in `preview`, and
//! `update` has no status column. The enqueue and completion paths in
//! [`JobRepo`](crate::repositories::JobRepo) own the other writes.

use sqlx::PgPool;
use teamink_core::types::DbId;

use crate::models::status::VariantStatus;
use crate::models::variant::{CreateDesignVariant, DesignVariant, UpdateDesignVariant};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, item_id, variant_name, configuration, status_id, \
    preview_path, preview_is_public, final_path, final_is_public, \
    error_message, created_at, updated_at";

/// Provides CRUD operations for design variants.
pub struct VariantRepo;

impl VariantRepo {
    /// Insert a new design variant in `preview` status, returning the
    /// created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDesignVariant,
    ) -> Result<DesignVariant, sqlx::Error> {
        let query = format!(
            "INSERT INTO design_variants
                (item_id, variant_name, configuration, status_id,
                 preview_path, preview_is_public)
             VALUES ($1, $2, COALESCE($3, '{{}}'::jsonb), $4, $5, COALESCE($6, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DesignVariant>(&query)
            .bind(input.item_id)
            .bind(&input.variant_name)
            .bind(&input.configuration)
            .bind(VariantStatus::Preview.id())
            .bind(&input.preview_path)
            .bind(input.preview_is_public)
            .fetch_one(pool)
            .await
    }

    /// Find a design variant by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DesignVariant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM design_variants WHERE id = $1");
        sqlx::query_as::<_, DesignVariant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all variants of a design item, most recently created first.
    pub async fn list_by_item(
        pool: &PgPool,
        item_id: DbId,
    ) -> Result<Vec<DesignVariant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM design_variants
             WHERE item_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, DesignVariant>(&query)
            .bind(item_id)
            .fetch_all(pool)
            .await
    }

    /// Update a design variant. Only non-`None` fields in `input` are
    /// applied. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDesignVariant,
    ) -> Result<Option<DesignVariant>, sqlx::Error> {
        let query = format!(
            "UPDATE design_variants SET
                variant_name      = COALESCE($2, variant_name),
                configuration     = COALESCE($3, configuration),
                preview_path      = COALESCE($4, preview_path),
                preview_is_public = COALESCE($5, preview_is_public)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DesignVariant>(&query)
            .bind(id)
            .bind(&input.variant_name)
            .bind(&input.configuration)
            .bind(&input.preview_path)
            .bind(input.preview_is_public)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a design variant. Its bridge jobs are removed
    /// by the `ON DELETE CASCADE` foreign key. Returns `true` if a row
    /// was removed.
    ///
    /// Callers are expected to purge the variant's blob artifacts first;
    /// see the api crate's cleanup path.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM design_variants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
