//! Strongly-typed ID types for backend entities.
//!
//! The backend API identifies every entity with a numeric ID. Wrapping the
//! raw `i64` in per-entity newtypes keeps ad IDs, slot IDs and report IDs
//! from being swapped at a call site without the compiler noticing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate a strongly-typed ID wrapper around the backend's
/// numeric identifiers.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw backend identifier.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw numeric identifier.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for an ad creative.
    AdId
);

define_id!(
    /// Unique identifier for an ad slot.
    AdSlotId
);

define_id!(
    /// Unique identifier for an ad placement (an ad scheduled into a slot).
    AdPlacementId
);

define_id!(
    /// Unique identifier for a user report.
    ReportId
);

define_id!(
    /// Unique identifier for a collection (a user's bird sighting record).
    CollectionId
);

define_id!(
    /// Unique identifier for a comment on a collection.
    CommentId
);

define_id!(
    /// Unique identifier for an admin audit log entry.
    AuditLogId
);

define_id!(
    /// Unique identifier for an application user.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display_is_raw_number() {
        let id = AdId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn id_parses_from_string() {
        let id: ReportId = "17".parse().expect("should parse");
        assert_eq!(id.value(), 17);
    }

    #[test]
    fn parse_invalid_id() {
        let result: Result<AdSlotId, _> = "not-a-number".parse();
        assert!(result.is_err());
    }

    #[test]
    fn id_equality() {
        assert_eq!(AdId::new(7), AdId::from(7));
        assert_ne!(AdId::new(7), AdId::new(8));
    }

    #[test]
    fn id_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(CollectionId::new(1));
        set.insert(CollectionId::new(2));
        set.insert(CollectionId::new(1)); // duplicate

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = AuditLogId::new(9001);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "9001");
        let parsed: AuditLogId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
