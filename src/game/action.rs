//! Bot Actions
//!
//! The three orders a bot may submit for a tick. The protocol core treats
//! them as opaque serializable data; only their JSON shape matters.

use serde::{Deserialize, Serialize};

/// Planet identifier as issued by the match server.
pub type PlanetId = u64;

/// One order for the current tick.
///
/// Serialized with an internal `type` tag, e.g.
/// `{"type":"send_fleet","from_id":1,"to_id":2,"energy":5.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Reveal the area around a point.
    Scan {
        /// Center X.
        x: f64,
        /// Center Y.
        y: f64,
        /// Scan radius.
        radius: f64,
    },

    /// Send energy from an owned planet to another planet.
    SendFleet {
        /// Source planet.
        from_id: PlanetId,
        /// Destination planet.
        to_id: PlanetId,
        /// Energy carried by the fleet.
        energy: f64,
    },

    /// Spend silver on a planet upgrade.
    Upgrade {
        /// Planet to upgrade.
        planet_id: PlanetId,
        /// Which stat to raise.
        upgrade: UpgradeKind,
    },
}

impl Action {
    /// Wire name of the variant (`scan`, `send_fleet`, `upgrade`).
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Scan { .. } => "scan",
            Action::SendFleet { .. } => "send_fleet",
            Action::Upgrade { .. } => "upgrade",
        }
    }
}

/// Planet stat raised by an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Energy cap and growth.
    Energy,
    /// Silver cap and growth.
    Silver,
    /// Defense multiplier.
    Defense,
    /// Fleet speed.
    Speed,
    /// Sensor range.
    Sensor,
}

impl UpgradeKind {
    /// Every upgrade kind, in wire order.
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Energy,
        UpgradeKind::Silver,
        UpgradeKind::Defense,
        UpgradeKind::Speed,
        UpgradeKind::Sensor,
    ];
}
