//! Upgrade modifiers and the modifier registry.
//!
//! A modifier is a bundle of deltas tied to one upgrade. An upgrade may own
//! several; they are applied in registration order, so their effects
//! accumulate rather than override each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::allow::UpgradeState;
use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::{
    CivilizationId, ClassId, DenseId, FactionId, ResourceId, UnitTypeId, UpgradeId, VariableId,
};
use crate::resources::ResourceVec;
use crate::upgrade::UpgradeRegistry;
use crate::variables::VariableDelta;

/// Whether a modifier is being turned on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Upgrade acquired.
    Apply,
    /// Upgrade lost.
    Reverse,
}

impl Direction {
    /// `+1` when applying, `-1` when reversing.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Apply => 1,
            Self::Reverse => -1,
        }
    }
}

/// Deltas one upgrade applies to matching unit types and their owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeModifier {
    /// Upgrade this modifier belongs to.
    pub upgrade: UpgradeId,
    /// Unit types whose stats this modifier changes.
    pub applies_to: DenseVec<UnitTypeId, bool>,
    /// Additive variable deltas.
    pub variables: DenseVec<VariableId, VariableDelta>,
    /// Percentage scaling; nonzero entries override the additive delta.
    pub modify_percent: DenseVec<VariableId, i32>,
    /// Cost deltas.
    pub costs: ResourceVec,
    /// Storage deltas.
    pub storing: ResourceVec,
    /// Income improvement deltas.
    pub improve_income: ResourceVec,
    /// Allowance deltas for unit types.
    pub change_units: DenseVec<UnitTypeId, i32>,
    /// Allow/forbid/research changes for other upgrades.
    pub change_upgrades: DenseVec<UpgradeId, Option<UpgradeState>>,
    /// Unit type that matching units turn into.
    pub convert_to: Option<UnitTypeId>,
    /// Civilization the owner switches to.
    pub change_civilization: Option<CivilizationId>,
    /// Research speed delta.
    pub speed_research: i32,
}

impl UpgradeModifier {
    /// Create a modifier with no effects.
    #[must_use]
    pub fn new(upgrade: UpgradeId) -> Self {
        Self {
            upgrade,
            applies_to: DenseVec::new(),
            variables: DenseVec::new(),
            modify_percent: DenseVec::new(),
            costs: ResourceVec::new(),
            storing: ResourceVec::new(),
            improve_income: ResourceVec::new(),
            change_units: DenseVec::new(),
            change_upgrades: DenseVec::new(),
            convert_to: None,
            change_civilization: None,
            speed_research: 0,
        }
    }

    /// Builder: apply to a unit type.
    #[must_use]
    pub fn applying_to(mut self, unit_type: UnitTypeId) -> Self {
        *self.applies_to.entry(unit_type) = true;
        self
    }

    /// Builder: additive variable delta.
    #[must_use]
    pub fn with_variable(mut self, variable: VariableId, delta: VariableDelta) -> Self {
        *self.variables.entry(variable) = delta;
        self
    }

    /// Builder: percentage scaling of a variable.
    #[must_use]
    pub fn with_percent(mut self, variable: VariableId, percent: i32) -> Self {
        *self.modify_percent.entry(variable) = percent;
        self
    }

    /// Builder: cost delta.
    #[must_use]
    pub fn with_cost(mut self, resource: ResourceId, delta: i32) -> Self {
        *self.costs.entry(resource) = delta;
        self
    }

    /// Builder: storage delta.
    #[must_use]
    pub fn with_storing(mut self, resource: ResourceId, delta: i32) -> Self {
        *self.storing.entry(resource) = delta;
        self
    }

    /// Builder: income improvement delta.
    #[must_use]
    pub fn with_income(mut self, resource: ResourceId, delta: i32) -> Self {
        *self.improve_income.entry(resource) = delta;
        self
    }

    /// Builder: unit allowance delta.
    #[must_use]
    pub fn with_unit_allowance(mut self, unit_type: UnitTypeId, delta: i32) -> Self {
        *self.change_units.entry(unit_type) = delta;
        self
    }

    /// Builder: change another upgrade's state.
    #[must_use]
    pub fn with_upgrade_change(mut self, upgrade: UpgradeId, state: UpgradeState) -> Self {
        *self.change_upgrades.entry(upgrade) = Some(state);
        self
    }

    /// Builder: convert matching units.
    #[must_use]
    pub fn converting_to(mut self, unit_type: UnitTypeId) -> Self {
        self.convert_to = Some(unit_type);
        self
    }

    /// Builder: switch the owner's civilization.
    #[must_use]
    pub fn changing_civilization(mut self, civilization: CivilizationId) -> Self {
        self.change_civilization = Some(civilization);
        self
    }

    /// Builder: research speed delta.
    #[must_use]
    pub fn with_speed_research(mut self, delta: i32) -> Self {
        self.speed_research = delta;
        self
    }

    /// Check if this modifier applies to a unit type.
    #[must_use]
    pub fn applies_to(&self, unit_type: UnitTypeId) -> bool {
        self.applies_to.value(unit_type)
    }

    /// Additive delta for a variable.
    #[must_use]
    pub fn variable_delta(&self, variable: VariableId) -> VariableDelta {
        self.variables.value(variable)
    }

    /// Percentage for a variable (0 = additive path).
    #[must_use]
    pub fn percent(&self, variable: VariableId) -> i32 {
        self.modify_percent.value(variable)
    }

    /// Allowance delta for a unit type.
    #[must_use]
    pub fn unit_allowance(&self, unit_type: UnitTypeId) -> i32 {
        self.change_units.value(unit_type)
    }

    /// Whether any variable delta or percentage is set.
    ///
    /// Gates the live-unit variable pass.
    #[must_use]
    pub fn modifies_variables(&self) -> bool {
        self.variables.values().any(|d| !d.is_zero()) || self.modify_percent.values().any(|p| *p != 0)
    }

    /// Variables touched by this modifier, in index order.
    pub fn touched_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        let len = self.variables.len().max(self.modify_percent.len());
        (0..len)
            .map(VariableId::from_index)
            .filter(|v| !self.variable_delta(*v).is_zero() || self.percent(*v) != 0)
    }
}

/// Ordered registry of all modifiers plus the class cross-reference tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierRegistry {
    modifiers: Vec<UpgradeModifier>,
    by_upgrade: DenseVec<UpgradeId, Vec<usize>>,
    classes: DenseVec<ClassId, String>,
    class_by_name: HashMap<String, ClassId>,
    civilization_class_upgrades: HashMap<(CivilizationId, ClassId), UpgradeId>,
    faction_class_upgrades: HashMap<(FactionId, ClassId), UpgradeId>,
}

impl ModifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a modifier after every modifier registered before it.
    ///
    /// The first modifier registered for an upgrade with a class also
    /// records that upgrade in the civilization (or faction) class table,
    /// unless that slot is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPercent`] for percentages of -100 or
    /// below, which cannot be reversed.
    pub fn register(&mut self, modifier: UpgradeModifier, upgrades: &UpgradeRegistry) -> Result<()> {
        let upgrade = upgrades.get(modifier.upgrade);
        if let Some(percent) = modifier.modify_percent.values().find(|p| **p <= -100) {
            return Err(GameError::InvalidPercent {
                upgrade: upgrade.ident.clone(),
                percent: *percent,
            });
        }

        if let Some(class_name) = &upgrade.class {
            let class = self.get_or_add_class(class_name);
            match (upgrade.faction, upgrade.civilization) {
                (Some(faction), _) => {
                    self.faction_class_upgrades
                        .entry((faction, class))
                        .or_insert(upgrade.id);
                }
                (None, Some(civilization)) => {
                    self.civilization_class_upgrades
                        .entry((civilization, class))
                        .or_insert(upgrade.id);
                }
                (None, None) => {}
            }
        }

        tracing::trace!(
            upgrade = %upgrade.ident,
            index = self.modifiers.len(),
            "Registered upgrade modifier"
        );
        self.by_upgrade
            .entry(modifier.upgrade)
            .push(self.modifiers.len());
        self.modifiers.push(modifier);
        Ok(())
    }

    /// Modifiers of an upgrade, in registration order.
    pub fn modifiers_for(&self, upgrade: UpgradeId) -> impl Iterator<Item = &UpgradeModifier> + '_ {
        self.by_upgrade
            .get(upgrade)
            .into_iter()
            .flatten()
            .map(|index| &self.modifiers[*index])
    }

    /// All modifiers, in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, UpgradeModifier> {
        self.modifiers.iter()
    }

    /// Number of registered modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// Check if no modifiers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Dense index of an upgrade class, assigning one on first sight.
    pub fn get_or_add_class(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        let id = self.classes.push(name.to_string());
        self.class_by_name.insert(name.to_string(), id);
        id
    }

    /// Dense index of an upgrade class.
    #[must_use]
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    /// Name of an upgrade class.
    #[must_use]
    pub fn class_name(&self, class: ClassId) -> &str {
        &self.classes[class]
    }

    /// Upgrade filling a class for a civilization.
    #[must_use]
    pub fn civilization_class_upgrade(
        &self,
        civilization: CivilizationId,
        class: ClassId,
    ) -> Option<UpgradeId> {
        self.civilization_class_upgrades
            .get(&(civilization, class))
            .copied()
    }

    /// Upgrade filling a class for a faction.
    #[must_use]
    pub fn faction_class_upgrade(&self, faction: FactionId, class: ClassId) -> Option<UpgradeId> {
        self.faction_class_upgrades.get(&(faction, class)).copied()
    }
}
