//! Notifications for the presentation layer.
//!
//! The engine does not reload interfaces or swap sprites itself. It queues
//! these events and the caller drains them with
//! [`World::take_events`](crate::world::World::take_events).

use serde::{Deserialize, Serialize};

use crate::ids::{CivilizationId, FactionId, PlayerId, UnitId, UnitTypeId};

/// Something observable changed while applying upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeEvent {
    /// A player's faction was re-rolled.
    FactionChanged {
        /// Player whose faction changed.
        player: PlayerId,
        /// Previous faction.
        from: Option<FactionId>,
        /// New faction (`None` when no candidate was free).
        to: Option<FactionId>,
    },
    /// A player switched civilization.
    CivilizationChanged {
        /// Player whose civilization changed.
        player: PlayerId,
        /// Previous civilization.
        from: Option<CivilizationId>,
        /// New civilization.
        to: CivilizationId,
    },
    /// The local player's interface must be rebuilt.
    InterfaceReloaded {
        /// The local player.
        player: PlayerId,
    },
    /// A unit picked a different variation.
    VariationChanged {
        /// Unit affected.
        unit: UnitId,
        /// Previous variation identifier.
        from: Option<String>,
        /// New variation identifier.
        to: Option<String>,
    },
    /// A unit changed type.
    UnitTransformed {
        /// Unit affected.
        unit: UnitId,
        /// Previous type.
        from: UnitTypeId,
        /// New type.
        to: UnitTypeId,
    },
}
