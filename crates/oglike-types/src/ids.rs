//! Identifiers of everything a fleet dispatch refers to.
//!
//! A fleet request names a universe, a player, two bodies, ship types and
//! resource types in one payload. Giving each its own UUID newtype makes a
//! swapped field a compile error instead of a confusing `InvalidTarget`.
//! Ids are UUID v7, so freshly assigned fleet ids sort by creation time,
//! and they cross the wire as bare UUID strings.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares UUID newtypes, one per `Name;` entry with its doc comment.
macro_rules! define_ids {
    ($( $(#[$meta:meta])* $name:ident; )+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Fresh time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The wrapped UUID, as bound in SQL parameters.
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
                core::fmt::Display::fmt(&self.0, f)
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
    )+};
}

define_ids! {
    /// A live game world with its own dimensions and balance.
    UniverseId;
    /// A player account, bound to exactly one universe.
    PlayerId;
    /// A body fleets leave from or fly to: a planet or a moon.
    PlanetId;
    /// One dispatch order. Doubles as the client's retry key.
    FleetId;
    /// An ACS rendezvous shared by several fleets.
    AcsId;
    /// A ship type in the catalog.
    ShipId;
    /// A resource type such as metal or deuterium.
    ResourceId;
    /// A technology; propulsion levels speed ships up.
    TechnologyId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let fleet = FleetId::new();
        let planet = PlanetId::new();
        assert_ne!(fleet.into_inner(), Uuid::nil());
        assert_ne!(planet.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = UniverseId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{}\"", id.into_inner())));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = AcsId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
