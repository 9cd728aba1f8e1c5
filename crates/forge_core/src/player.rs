//! Per-player state touched by upgrades.

use serde::{Deserialize, Serialize};

use crate::allow::AllowTable;
use crate::dense::DenseVec;
use crate::ids::{CivilizationId, FactionId, PlayerId, UnitId, UnitTypeId, UpgradeId};
use crate::resources::ResourceVec;
use crate::ruleset::Ruleset;
use crate::unit_type::UnitStats;

/// Research speed a player starts with, in percent.
pub const DEFAULT_SPEED_RESEARCH: i32 = 100;

/// Unit-type references held by a computer player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AiState {
    /// Types the AI wants trained or built.
    pub unit_type_requests: Vec<UnitTypeId>,
    /// Types the AI wants existing units upgraded to.
    pub upgrade_to_requests: Vec<UnitTypeId>,
    /// Desired composition of each force.
    pub forces: Vec<Vec<UnitTypeId>>,
}

impl AiState {
    /// Rewrite every reference to `from` into `to`, returning how many
    /// entries changed.
    pub fn replace_unit_type(&mut self, from: UnitTypeId, to: UnitTypeId) -> usize {
        let mut replaced = 0;
        let lists = [&mut self.unit_type_requests, &mut self.upgrade_to_requests]
            .into_iter()
            .chain(self.forces.iter_mut());
        for list in lists {
            for unit_type in list.iter_mut().filter(|t| **t == from) {
                *unit_type = to;
                replaced += 1;
            }
        }
        replaced
    }
}

/// A player slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Slot index.
    pub id: PlayerId,
    /// Civilization, if assigned.
    pub civilization: Option<CivilizationId>,
    /// Faction, if assigned.
    pub faction: Option<FactionId>,
    /// Controlled by the computer.
    pub ai_enabled: bool,
    /// Computer player bookkeeping.
    pub ai: AiState,
    /// Unit allowances and upgrade states.
    pub allow: AllowTable,
    /// This player's stat block per unit type.
    pub stats: DenseVec<UnitTypeId, UnitStats>,
    /// Effective income per resource.
    pub incomes: ResourceVec,
    /// Total supply provided by live units.
    pub supply: i32,
    /// Total demand of live units.
    pub demand: i32,
    /// Research speed in percent.
    pub speed_research: i32,
    /// Remaining or elapsed research time per upgrade.
    pub upgrade_timers: DenseVec<UpgradeId, i32>,
    /// Owned units in creation order.
    pub units: Vec<UnitId>,
}

impl Player {
    /// Create a player with default allowances and stat blocks.
    #[must_use]
    pub fn new(id: PlayerId, ruleset: &Ruleset) -> Self {
        Self {
            id,
            civilization: None,
            faction: None,
            ai_enabled: false,
            ai: AiState::default(),
            allow: AllowTable::new(ruleset.unit_types.len(), ruleset.upgrades.len()),
            stats: ruleset
                .unit_types
                .iter()
                .map(|t| t.default_stats.clone())
                .collect(),
            incomes: ruleset.resources.default_incomes(),
            supply: 0,
            demand: 0,
            speed_research: DEFAULT_SPEED_RESEARCH,
            upgrade_timers: DenseVec::filled(ruleset.upgrades.len(), 0),
            units: Vec::new(),
        }
    }

    /// Builder: assign a civilization.
    #[must_use]
    pub fn with_civilization(mut self, civilization: CivilizationId) -> Self {
        self.civilization = Some(civilization);
        self
    }

    /// Builder: assign a faction.
    #[must_use]
    pub fn with_faction(mut self, faction: FactionId) -> Self {
        self.faction = Some(faction);
        self
    }

    /// Builder: hand the player to the computer.
    #[must_use]
    pub fn with_ai(mut self) -> Self {
        self.ai_enabled = true;
        self
    }

    /// Stat block for a unit type.
    #[must_use]
    pub fn stats(&self, unit_type: UnitTypeId) -> &UnitStats {
        &self.stats[unit_type]
    }
}
