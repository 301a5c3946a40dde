//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Design variant lifecycle status.
    ///
    /// `Generating` is only ever set by the enqueue path, `Generated`
    /// and `Failed` only by the completion cascade.
    VariantStatus {
        Preview = 1,
        Generating = 2,
        Generated = 3,
        Failed = 4,
    }
}

define_status_enum! {
    /// Bridge job queue status. `Completed` and `Failed` are terminal.
    BridgeJobStatus {
        Pending = 1,
        Processing = 2,
        Completed = 3,
        Failed = 4,
    }
}

impl BridgeJobStatus {
    /// Terminal jobs may only be deleted, never transitioned further.
    pub fn is_terminal(self) -> bool {
        matches!(self, BridgeJobStatus::Completed | BridgeJobStatus::Failed)
    }

    /// A job is active while it is pending or processing. At most one
    /// active job may reference a given variant.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Parse the wire name used by the dispatch query string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(BridgeJobStatus::Pending),
            "processing" => Some(BridgeJobStatus::Processing),
            "completed" => Some(BridgeJobStatus::Completed),
            "failed" => Some(BridgeJobStatus::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_status_ids_match_seed_data() {
        assert_eq!(VariantStatus::Preview.id(), 1);
        assert_eq!(VariantStatus::Generating.id(), 2);
        assert_eq!(VariantStatus::Generated.id(), 3);
        assert_eq!(VariantStatus::Failed.id(), 4);
    }

    #[test]
    fn bridge_job_status_ids_match_seed_data() {
        assert_eq!(BridgeJobStatus::Pending.id(), 1);
        assert_eq!(BridgeJobStatus::Processing.id(), 2);
        assert_eq!(BridgeJobStatus::Completed.id(), 3);
        assert_eq!(BridgeJobStatus::Failed.id(), 4);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!BridgeJobStatus::Pending.is_terminal());
        assert!(!BridgeJobStatus::Processing.is_terminal());
        assert!(BridgeJobStatus::Completed.is_terminal());
        assert!(BridgeJobStatus::Failed.is_terminal());
    }

    #[test]
    fn status_parses_from_wire_name() {
        assert_eq!(
            BridgeJobStatus::from_name("pending"),
            Some(BridgeJobStatus::Pending)
        );
        assert_eq!(BridgeJobStatus::from_name("cancelled"), None);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = VariantStatus::Generating.into();
        assert_eq!(id, 2);
    }
}
