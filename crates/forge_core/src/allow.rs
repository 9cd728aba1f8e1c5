//! Per-player allow tables.
//!
//! Every player records an allowance count per unit type and an
//! [`UpgradeState`] per upgrade. Saves persist both positionally, one entry
//! per registry index, so registry order is part of the save format.

use serde::{Deserialize, Serialize};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::{UnitTypeId, UpgradeId};
use crate::modifier::Direction;

/// Allowance a unit type starts with: effectively unlimited.
pub const DEFAULT_UNIT_ALLOWANCE: i32 = 65_536;

/// Research state of one upgrade for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UpgradeState {
    /// May be researched.
    #[default]
    Allowed,
    /// May not be researched.
    Forbidden,
    /// Researched; only an explicit loss clears it.
    Researched,
}

impl UpgradeState {
    /// Single-character save code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Allowed => 'A',
            Self::Forbidden => 'F',
            Self::Researched => 'R',
        }
    }

    /// Parse a save code.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Allowed),
            'F' => Some(Self::Forbidden),
            'R' => Some(Self::Researched),
            _ => None,
        }
    }

    /// State after a modifier's allow/forbid/research change.
    ///
    /// Researched is sticky: modifier changes never downgrade it. Reversing
    /// a change swaps Allowed and Forbidden, and reversing a research change
    /// lands on Allowed.
    #[must_use]
    pub const fn after_change(self, change: Self, direction: Direction) -> Self {
        if matches!(self, Self::Researched) {
            return self;
        }
        match (direction, change) {
            (Direction::Apply, change) => change,
            (Direction::Reverse, Self::Allowed) => Self::Forbidden,
            (Direction::Reverse, Self::Forbidden | Self::Researched) => Self::Allowed,
        }
    }
}

/// Allow table of one player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AllowTable {
    units: DenseVec<UnitTypeId, i32>,
    upgrades: DenseVec<UpgradeId, UpgradeState>,
}

impl AllowTable {
    /// Create a table with every unit type at the default allowance and
    /// every upgrade allowed.
    #[must_use]
    pub fn new(unit_types: usize, upgrades: usize) -> Self {
        Self {
            units: DenseVec::filled(unit_types, DEFAULT_UNIT_ALLOWANCE),
            upgrades: DenseVec::filled(upgrades, UpgradeState::Allowed),
        }
    }

    /// Grow the table after new registrations.
    pub fn resize(&mut self, unit_types: usize, upgrades: usize) {
        self.units.resize(unit_types, DEFAULT_UNIT_ALLOWANCE);
        self.upgrades.resize(upgrades, UpgradeState::Allowed);
    }

    /// Allowance of a unit type.
    #[must_use]
    pub fn unit(&self, unit_type: UnitTypeId) -> i32 {
        self.units[unit_type]
    }

    /// Set the allowance of a unit type.
    pub fn set_unit(&mut self, unit_type: UnitTypeId, count: i32) {
        self.units[unit_type] = count;
    }

    /// Add to the allowance of a unit type.
    pub fn add_unit(&mut self, unit_type: UnitTypeId, delta: i32) {
        self.units[unit_type] += delta;
    }

    /// State of an upgrade.
    #[must_use]
    pub fn upgrade(&self, upgrade: UpgradeId) -> UpgradeState {
        self.upgrades[upgrade]
    }

    /// Set the state of an upgrade.
    pub fn set_upgrade(&mut self, upgrade: UpgradeId, state: UpgradeState) {
        self.upgrades[upgrade] = state;
    }

    /// Check if an upgrade is researched.
    #[must_use]
    pub fn is_researched(&self, upgrade: UpgradeId) -> bool {
        self.upgrades[upgrade] == UpgradeState::Researched
    }

    /// Researched upgrades in increasing id order.
    pub fn researched(&self) -> impl Iterator<Item = UpgradeId> + '_ {
        self.upgrades
            .iter()
            .filter(|(_, state)| **state == UpgradeState::Researched)
            .map(|(id, _)| id)
    }

    /// Upgrade states as a positional code string (`"AARF..."`).
    #[must_use]
    pub fn encode_upgrades(&self) -> String {
        self.upgrades.values().map(|s| s.code()).collect()
    }

    /// Unit allowances as a positional list.
    #[must_use]
    pub fn encode_units(&self) -> Vec<i32> {
        self.units.values().copied().collect()
    }

    /// Rebuild a table from its positional encodings.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SaveFormat`] if the lengths do not match the
    /// registries or an upgrade code is unknown.
    pub fn decode(units: &[i32], upgrades: &str, unit_types: usize, upgrade_count: usize) -> Result<Self> {
        if units.len() != unit_types {
            return Err(GameError::SaveFormat(format!(
                "expected {unit_types} unit allowances, found {}",
                units.len()
            )));
        }
        let states = upgrades
            .chars()
            .enumerate()
            .map(|(i, code)| {
                UpgradeState::from_code(code).ok_or_else(|| {
                    GameError::SaveFormat(format!("invalid upgrade code '{code}' at index {i}"))
                })
            })
            .collect::<Result<DenseVec<UpgradeId, UpgradeState>>>()?;
        if states.len() != upgrade_count {
            return Err(GameError::SaveFormat(format!(
                "expected {upgrade_count} upgrade states, found {}",
                states.len()
            )));
        }
        Ok(Self {
            units: units.iter().copied().collect(),
            upgrades: states,
        })
    }
}
