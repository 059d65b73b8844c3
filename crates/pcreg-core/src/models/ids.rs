use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of hex characters taken from a v4 UUID for generated ids
const ID_SUFFIX_LEN: usize = 12;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Prefix used for generated ids
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh random id
            pub fn generate() -> Self {
                let suffix = Uuid::new_v4().simple().to_string();
                Self(format!("{}_{}", $prefix, &suffix[..ID_SUFFIX_LEN]))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a train
    TrainId,
    "TRN"
);
string_id!(
    /// Unique identifier for an incident
    IncidentId,
    "INC"
);
string_id!(
    /// Unique identifier for a journal entry
    LogId,
    "LOG"
);
string_id!(
    /// Unique identifier for a snapshot
    SnapshotId,
    "SNAP"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_carry_prefix() {
        let id = TrainId::generate();
        assert!(id.as_str().starts_with("TRN_"));
        assert_eq!(id.as_str().len(), "TRN_".len() + ID_SUFFIX_LEN);
        assert!(SnapshotId::generate().as_str().starts_with("SNAP_"));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: HashSet<LogId> = (0..500).map(|_| LogId::generate()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = IncidentId::from("INC_abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"INC_abc\"");
    }
}
