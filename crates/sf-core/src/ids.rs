//! UUID-backed identifiers.
//!
//! Run and checkpoint identifiers must round-trip as canonical UUID strings
//! (callers and persisted records key on them across process restarts), so
//! they wrap [`uuid::Uuid`] directly rather than the nanoid-based
//! [`crate::define_id!`] scheme used for opaque internal identifiers.

use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }
    };
}

uuid_id! {
    /// Uniquely identifies one workflow run.
    pub struct RunId;
}

uuid_id! {
    /// Uniquely identifies one checkpoint of a run.
    pub struct CheckpointId;
}

crate::define_id! {
    /// Opaque identifier for a single scheduled task execution.
    pub struct TaskId("tsk-");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_round_trips_through_string() {
        let id = RunId::new();
        let parsed = RunId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn run_id_rejects_non_uuid() {
        assert!(RunId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn checkpoint_ids_are_unique() {
        assert_ne!(CheckpointId::new(), CheckpointId::new());
    }
}
