//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every aggregate and participant has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) so event streams index well.
//!
//! Validation of identifiers coming from the outside (UI, sync layer) is
//! the caller's concern; anything that parses as a UUID is accepted here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a game (the score/status aggregate and the
    /// group every other stream of that game belongs to).
    GameId
}

define_id! {
    /// Unique identifier for one team's lineup aggregate within a game.
    TeamLineupId
}

define_id! {
    /// Unique identifier for the inning/half-inning aggregate of a game.
    InningStateId
}

define_id! {
    /// Unique identifier for a player.
    PlayerId
}

define_id! {
    /// Unique identifier for a domain event.
    EventId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let game = GameId::new();
        let lineup = TeamLineupId::new();
        // Different types; the compiler enforces no mixing.
        assert_ne!(game.into_inner(), Uuid::nil());
        assert_ne!(lineup.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = PlayerId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{}\"", id.into_inner())));
    }

    #[test]
    fn id_equality_is_by_value() {
        let raw = Uuid::now_v7();
        assert_eq!(InningStateId::from(raw), InningStateId::from(raw));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = GameId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
