//! Enumeration types shared by the fleet engine and its persistence layer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Location kinds
// ---------------------------------------------------------------------------

/// What sits at a set of coordinates.
///
/// A fleet may leave from a planet or a moon. It may head to a planet, a
/// moon, or the debris field orbiting a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum LocationKind {
    /// A planet.
    Planet,
    /// A moon orbiting a planet.
    Moon,
    /// The debris field at a position.
    Debris,
}

impl LocationKind {
    /// Whether an entity of this kind can be the source of a fleet.
    pub const fn can_launch_fleets(self) -> bool {
        matches!(self, Self::Planet | Self::Moon)
    }
}

// ---------------------------------------------------------------------------
// Mission objectives
// ---------------------------------------------------------------------------

/// The mission a fleet is dispatched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Purpose {
    /// Move ships permanently to another planet of the same player.
    Deployment,
    /// Carry resources to a planet and come back.
    Transport,
    /// Settle a new planet at an empty position.
    Colonization,
    /// Explore the unknown at the edge of a system.
    Expedition,
    /// Hold position at an allied planet to help defend it.
    AcsDefend,
    /// Join an allied attack converging on a single target.
    AcsAttack,
    /// Collect resources floating in a debris field.
    Harvesting,
    /// Attack another player's planet or moon.
    Attacking,
    /// Send probes to gather intelligence.
    Espionage,
    /// Try to destroy a moon.
    Destroy,
}

impl Purpose {
    /// Whether the objective needs a resolved target entity.
    ///
    /// Non-directed objectives (colonization, expedition, harvesting) only
    /// name coordinates and must not reference a target entity.
    pub const fn is_directed(self) -> bool {
        !matches!(self, Self::Colonization | Self::Expedition | Self::Harvesting)
    }

    /// Whether the objective is an aggression against the target's owner.
    pub const fn is_hostile(self) -> bool {
        matches!(
            self,
            Self::Attacking | Self::Espionage | Self::Destroy | Self::AcsAttack
        )
    }

    /// Whether the objective may be part of an ACS rendezvous.
    pub const fn is_group(self) -> bool {
        matches!(self, Self::AcsAttack | Self::AcsDefend)
    }

    /// Stable snake-case name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::Transport => "transport",
            Self::Colonization => "colonization",
            Self::Expedition => "expedition",
            Self::AcsDefend => "acs_defend",
            Self::AcsAttack => "acs_attack",
            Self::Harvesting => "harvesting",
            Self::Attacking => "attacking",
            Self::Espionage => "espionage",
            Self::Destroy => "destroy",
        }
    }
}

impl core::fmt::Display for Purpose {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvesting_is_not_directed() {
        assert!(!Purpose::Harvesting.is_directed());
        assert!(Purpose::Attacking.is_directed());
    }

    #[test]
    fn only_acs_objectives_are_group() {
        assert!(Purpose::AcsAttack.is_group());
        assert!(Purpose::AcsDefend.is_group());
        assert!(!Purpose::Attacking.is_group());
    }

    #[test]
    fn as_str_matches_serde_name() {
        let json = serde_json::to_string(&Purpose::AcsDefend).ok();
        assert_eq!(json.as_deref(), Some("\"acs_defend\""));
        assert_eq!(Purpose::AcsDefend.as_str(), "acs_defend");
    }

    #[test]
    fn debris_cannot_launch_fleets() {
        assert!(!LocationKind::Debris.can_launch_fleets());
        assert!(LocationKind::Moon.can_launch_fleets());
    }
}
