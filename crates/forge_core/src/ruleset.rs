//! The immutable rule definitions of a game.
//!
//! A [`Ruleset`] is assembled once, either through the builder methods below
//! or from a [`RulesetData`](crate::data::RulesetData) document, and is never
//! mutated while a game runs.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::factions::{FactionKind, FactionRegistry};
use crate::ids::{CivilizationId, FactionId, ResourceId, UnitTypeId, UpgradeId, VariableId};
use crate::modifier::{ModifierRegistry, UpgradeModifier};
use crate::resources::ResourceRegistry;
use crate::unit_type::{UnitStats, UnitTypeRegistry, Variation};
use crate::upgrade::{Upgrade, UpgradeRegistry};
use crate::variables::VariableRegistry;

/// All registries of a game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ruleset {
    /// Resource kinds.
    pub resources: ResourceRegistry,
    /// Unit variables.
    pub variables: VariableRegistry,
    /// Unit types.
    pub unit_types: UnitTypeRegistry,
    /// Upgrades, abilities and traits.
    pub upgrades: UpgradeRegistry,
    /// Upgrade modifiers.
    pub modifiers: ModifierRegistry,
    /// Civilizations and factions.
    pub factions: FactionRegistry,
}

impl Ruleset {
    /// Create a ruleset holding only the built-in resource and variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A zeroed stat block sized for the current registries.
    #[must_use]
    pub fn blank_stats(&self) -> UnitStats {
        UnitStats::new(self.resources.len(), self.variables.len())
    }

    /// Register a resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateIdentifier`] if the identifier exists.
    pub fn register_resource(&mut self, ident: &str, default_income: i32) -> Result<ResourceId> {
        let id = self.resources.register(ident, default_income)?;
        self.resize_stats();
        Ok(id)
    }

    /// Register a variable, returning the existing handle if already known.
    pub fn register_variable(&mut self, name: &str) -> VariableId {
        let id = self.variables.get_or_register(name);
        self.resize_stats();
        id
    }

    /// Register a unit type. The stat block is resized to the registries.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateIdentifier`] if the identifier exists.
    pub fn register_unit_type(
        &mut self,
        ident: &str,
        name: impl Into<String>,
        mut stats: UnitStats,
    ) -> Result<UnitTypeId> {
        stats.resize(self.resources.len(), self.variables.len());
        self.unit_types.register(ident, name, stats)
    }

    /// Append a variation to a unit type.
    pub fn add_variation(&mut self, unit_type: UnitTypeId, variation: Variation) {
        self.unit_types.add_variation(unit_type, variation);
    }

    /// Return the upgrade with this identifier, creating it if new.
    pub fn upgrade(&mut self, ident: &str) -> UpgradeId {
        self.upgrades.get_or_create(ident)
    }

    /// Mutable upgrade definition.
    pub fn upgrade_mut(&mut self, id: UpgradeId) -> &mut Upgrade {
        self.upgrades.get_mut(id)
    }

    /// Register a civilization.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateIdentifier`] if the identifier exists.
    pub fn register_civilization(&mut self, ident: &str) -> Result<CivilizationId> {
        self.factions.register_civilization(ident)
    }

    /// Register a faction.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateIdentifier`] if the identifier exists.
    pub fn register_faction(
        &mut self,
        ident: &str,
        civilization: CivilizationId,
        kind: FactionKind,
    ) -> Result<FactionId> {
        self.factions.register_faction(ident, civilization, kind)
    }

    /// Register a modifier after all previously registered ones.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the modifier references
    /// handles outside the registries, or [`GameError::InvalidPercent`] for
    /// an irreversible percentage.
    pub fn register_modifier(&mut self, modifier: UpgradeModifier) -> Result<()> {
        self.check_modifier_bounds(&modifier)?;
        self.modifiers.register(modifier, &self.upgrades)
    }

    fn check_modifier_bounds(&self, modifier: &UpgradeModifier) -> Result<()> {
        let checks = [
            ("upgrade", modifier.upgrade.0 as usize + 1, self.upgrades.len()),
            ("unit type", modifier.applies_to.len(), self.unit_types.len()),
            ("unit type", modifier.change_units.len(), self.unit_types.len()),
            ("variable", modifier.variables.len(), self.variables.len()),
            ("variable", modifier.modify_percent.len(), self.variables.len()),
            ("resource", modifier.costs.len(), self.resources.len()),
            ("resource", modifier.storing.len(), self.resources.len()),
            ("resource", modifier.improve_income.len(), self.resources.len()),
            ("upgrade", modifier.change_upgrades.len(), self.upgrades.len()),
            (
                "unit type",
                modifier.convert_to.map_or(0, |t| t.0 as usize + 1),
                self.unit_types.len(),
            ),
            (
                "civilization",
                modifier.change_civilization.map_or(0, |c| c.0 as usize + 1),
                self.factions.civilization_count(),
            ),
        ];
        for (kind, needed, available) in checks {
            if needed > available {
                return Err(GameError::InvalidState(format!(
                    "modifier references {kind} #{} but only {available} are registered",
                    needed - 1
                )));
            }
        }
        Ok(())
    }

    fn resize_stats(&mut self) {
        self.unit_types
            .resize_stats(self.resources.len(), self.variables.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{Variable, VariableDelta};

    #[test]
    fn test_late_variable_resizes_existing_types() {
        let mut ruleset = Ruleset::new();
        let footman = ruleset
            .register_unit_type("unit-footman", "Footman", ruleset.blank_stats())
            .unwrap();
        let damage = ruleset.register_variable("PiercingDamage");
        let stats = &ruleset.unit_types.get(footman).default_stats;
        assert_eq!(stats.variables.len(), ruleset.variables.len());
        assert_eq!(stats.variable(damage), Variable::default());
    }

    #[test]
    fn test_modifier_out_of_range_rejected() {
        let mut ruleset = Ruleset::new();
        let upgrade = ruleset.upgrade("upgrade-sword");
        let modifier = UpgradeModifier::new(upgrade)
            .with_variable(VariableId::new(40), VariableDelta::flat(1));
        assert!(matches!(
            ruleset.register_modifier(modifier),
            Err(GameError::InvalidState(_))
        ));

        let modifier = UpgradeModifier::new(upgrade).applying_to(UnitTypeId::new(0));
        assert!(ruleset.register_modifier(modifier).is_err());
        assert!(ruleset.modifiers.is_empty());
    }
}
