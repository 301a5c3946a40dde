//! Domain-level error type shared by all teamink crates.

use crate::types::DbId;

/// A domain error, independent of any transport.
///
/// The api crate maps these onto HTTP status codes; repositories and
/// services return them where the failure is a domain condition rather
/// than an infrastructure fault.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup by id found nothing.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The caller's input is missing or malformed. Raised before any
    /// mutation is attempted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested mutation contradicts current state (e.g. a
    /// transition requested on a terminal job).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An unexpected internal condition.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = CoreError::NotFound {
            entity: "BridgeJob",
            id: 7,
        };
        assert_eq!(err.to_string(), "BridgeJob with id 7 not found");
    }

    #[test]
    fn validation_message_is_prefixed() {
        let err = CoreError::Validation("variant_ids must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: variant_ids must not be empty"
        );
    }
}
