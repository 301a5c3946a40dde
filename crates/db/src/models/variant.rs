//! Design variant entity models and DTOs.
//!
//! A variant is one renderable configuration of a design item. Its
//! `configuration` payload is opaque to the queue: it is stored and
//! handed to the bridge worker unchanged, never parsed.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teamink_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `design_variants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DesignVariant {
    pub id: DbId,
    pub item_id: DbId,
    pub variant_name: String,
    pub configuration: serde_json::Value,
    pub status_id: StatusId,
    pub preview_path: Option<String>,
    pub preview_is_public: bool,
    pub final_path: Option<String>,
    pub final_is_public: bool,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DesignVariant {
    /// Blob paths referenced by this variant, for best-effort cleanup
    /// before the row is deleted.
    pub fn artifact_paths(&self) -> Vec<String> {
        self.preview_path
            .iter()
            .chain(self.final_path.iter())
            .cloned()
            .collect()
    }
}

/// DTO for creating a new design variant.
///
/// Variants are always created in `preview` status; there is no status
/// field here or on [`UpdateDesignVariant`], so lifecycle status can
/// only move through the enqueue and completion transitions.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDesignVariant {
    #[serde(default)]
    pub item_id: DbId,
    pub variant_name: String,
    pub configuration: Option<serde_json::Value>,
    pub preview_path: Option<String>,
    pub preview_is_public: Option<bool>,
}

/// DTO for updating an existing design variant.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDesignVariant {
    pub variant_name: Option<String>,
    pub configuration: Option<serde_json::Value>,
    pub preview_path: Option<String>,
    pub preview_is_public: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(preview: Option<&str>, final_: Option<&str>) -> DesignVariant {
        DesignVariant {
            id: 1,
            item_id: 1,
            variant_name: "home red".into(),
            configuration: serde_json::json!({}),
            status_id: 1,
            preview_path: preview.map(String::from),
            preview_is_public: true,
            final_path: final_.map(String::from),
            final_is_public: false,
            error_message: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn artifact_paths_collects_both_artifacts() {
        let v = variant(Some("p/preview.png"), Some("p/final.png"));
        assert_eq!(v.artifact_paths(), vec!["p/preview.png", "p/final.png"]);
    }

    #[test]
    fn artifact_paths_empty_when_nothing_rendered() {
        assert!(variant(None, None).artifact_paths().is_empty());
    }
}
