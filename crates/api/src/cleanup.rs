//! Best-effort blob cleanup for the deletion paths.
//!
//! Database consistency is prioritized over blob-leak prevention: a
//! failed blob delete is logged at `warn` and never fails the
//! surrounding operation.

use teamink_storage::ArtifactStore;

/// Delete every blob in `paths`, continuing past failures.
///
/// Returns the number of deletes that succeeded.
pub async fn purge_artifacts(store: &dyn ArtifactStore, paths: &[String]) -> usize {
    let mut removed = 0;
    for path in paths {
        match store.delete(path).await {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to delete artifact blob");
            }
        }
    }
    removed
}
