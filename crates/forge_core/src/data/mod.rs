//! Data structures for rule definitions.
//!
//! This module contains pure data structures that define resources, unit
//! types, upgrades and modifiers. All structs are designed to be
//! deserialized from RON files and reference each other by string
//! identifier; [`Ruleset::from_data`] resolves the identifiers into handles.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by the caller.

mod faction_data;
mod unit_data;
mod upgrade_data;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use faction_data::FactionData;
pub use unit_data::{UnitTypeData, VariableData, VariationData};
pub use upgrade_data::{ModifierData, UpgradeData};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::modifier::UpgradeModifier;
use crate::resources::ResourceVec;
use crate::ruleset::Ruleset;
use crate::unit_type::{UnitStats, Variation};

/// A resource kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceData {
    /// Unique string identifier.
    pub ident: String,

    /// Income before any improvement.
    #[serde(default)]
    pub default_income: i32,
}

/// A complete rules document.
///
/// Sections are registered in declaration order, which fixes every handle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesetData {
    /// Resource kinds besides time.
    pub resources: Vec<ResourceData>,
    /// Variables besides the built-ins.
    pub variables: Vec<String>,
    /// Civilization identifiers.
    pub civilizations: Vec<String>,
    /// Factions.
    pub factions: Vec<FactionData>,
    /// Upgrades, abilities and traits.
    pub upgrades: Vec<UpgradeData>,
    /// Unit types.
    pub unit_types: Vec<UnitTypeData>,
    /// Upgrade modifiers, in application order.
    pub modifiers: Vec<ModifierData>,
}

impl RulesetData {
    /// Parse a rules document from RON.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the document is malformed.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<ruleset>".to_string(),
            message: e.to_string(),
        })
    }
}

impl Ruleset {
    /// Build a ruleset from a rules document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`] when a definition references
    /// something never declared, [`GameError::DuplicateIdentifier`] for a
    /// repeated declaration, and [`GameError::InvalidPercent`] for an
    /// irreversible percentage.
    pub fn from_data(data: &RulesetData) -> Result<Self> {
        let result = Self::build(data);
        if let Err(error) = &result {
            tracing::error!(%error, "Invalid ruleset");
        }
        result
    }

    /// Parse and build a ruleset from RON.
    ///
    /// # Errors
    ///
    /// See [`RulesetData::from_ron_str`] and [`Ruleset::from_data`].
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Self::from_data(&RulesetData::from_ron_str(source)?)
    }

    fn build(data: &RulesetData) -> Result<Self> {
        let mut ruleset = Self::new();

        for resource in &data.resources {
            ruleset.register_resource(&resource.ident, resource.default_income)?;
        }
        for name in &data.variables {
            ruleset.register_variable(name);
        }
        for ident in &data.civilizations {
            ruleset.register_civilization(ident)?;
        }
        for faction in &data.factions {
            let civilization = ruleset.factions.require_civilization(&faction.civilization)?;
            let id = ruleset.register_faction(&faction.ident, civilization, faction.kind)?;
            ruleset.factions.faction_mut(id).playable = faction.playable;
        }

        for upgrade in &data.upgrades {
            if ruleset.upgrades.id(&upgrade.ident).is_some() {
                return Err(GameError::DuplicateIdentifier {
                    kind: "upgrade",
                    ident: upgrade.ident.clone(),
                });
            }
            let costs = ruleset.resource_vec(&upgrade.costs)?;
            let civilization = upgrade
                .civilization
                .as_deref()
                .map(|c| ruleset.factions.require_civilization(c))
                .transpose()?;
            let faction = upgrade
                .faction
                .as_deref()
                .map(|f| ruleset.factions.require_faction(f))
                .transpose()?;
            let id = ruleset.upgrade(&upgrade.ident);
            let def = ruleset.upgrade_mut(id);
            if let Some(name) = &upgrade.name {
                def.name.clone_from(name);
            }
            def.costs = costs;
            def.class.clone_from(&upgrade.class);
            def.civilization = civilization;
            def.faction = faction;
            def.ability = upgrade.ability;
            def.is_trait = upgrade.is_trait;
        }

        for unit_type in &data.unit_types {
            let stats = ruleset.unit_stats(unit_type)?;
            let id = ruleset.register_unit_type(&unit_type.ident, unit_type.name.clone(), stats)?;
            for variation in &unit_type.variations {
                let variation = ruleset.variation(variation)?;
                ruleset.add_variation(id, variation);
            }
        }

        for modifier in &data.modifiers {
            let modifier = ruleset.modifier(modifier)?;
            ruleset.register_modifier(modifier)?;
        }

        tracing::debug!(
            resources = ruleset.resources.len(),
            variables = ruleset.variables.len(),
            unit_types = ruleset.unit_types.len(),
            upgrades = ruleset.upgrades.len(),
            modifiers = ruleset.modifiers.len(),
            "Built ruleset"
        );
        Ok(ruleset)
    }

    fn resource_vec(&self, values: &BTreeMap<String, i32>) -> Result<ResourceVec> {
        let mut vec = self.resources.zeroed();
        for (ident, value) in values {
            let id = self.resources.require(ident)?;
            vec[id] = *value;
        }
        Ok(vec)
    }

    fn unit_stats(&self, data: &UnitTypeData) -> Result<UnitStats> {
        let mut stats = self.blank_stats();
        stats.costs = self.resource_vec(&data.costs)?;
        stats.storing = self.resource_vec(&data.storing)?;
        stats.improve_income = self.resource_vec(&data.improve_income)?;
        for (name, variable) in &data.variables {
            let id = self.variables.require(name)?;
            stats.set_variable(id, (*variable).into());
        }
        Ok(stats)
    }

    fn variation(&self, data: &VariationData) -> Result<Variation> {
        let upgrades = |idents: &[String]| {
            idents
                .iter()
                .map(|ident| self.upgrades.require(ident))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Variation {
            ident: data.ident.clone(),
            upgrades_required: upgrades(&data.upgrades_required)?,
            upgrades_forbidden: upgrades(&data.upgrades_forbidden)?,
            tilesets: data.tilesets.clone(),
            terrains: data.terrains.clone(),
        })
    }

    fn modifier(&self, data: &ModifierData) -> Result<UpgradeModifier> {
        let mut modifier = UpgradeModifier::new(self.upgrades.require(&data.upgrade)?);

        modifier.applies_to = DenseVec::filled(self.unit_types.len(), false);
        for ident in &data.applies_to {
            modifier.applies_to[self.unit_types.require(ident)?] = true;
        }
        for (name, delta) in &data.variables {
            modifier = modifier.with_variable(self.variables.require(name)?, *delta);
        }
        for (name, percent) in &data.modify_percent {
            modifier = modifier.with_percent(self.variables.require(name)?, *percent);
        }
        modifier.costs = self.resource_vec(&data.costs)?;
        modifier.storing = self.resource_vec(&data.storing)?;
        modifier.improve_income = self.resource_vec(&data.improve_income)?;
        for (ident, delta) in &data.change_units {
            modifier = modifier.with_unit_allowance(self.unit_types.require(ident)?, *delta);
        }
        for (ident, state) in &data.change_upgrades {
            modifier = modifier.with_upgrade_change(self.upgrades.require(ident)?, *state);
        }
        if let Some(ident) = &data.convert_to {
            modifier.convert_to = Some(self.unit_types.require(ident)?);
        }
        if let Some(ident) = &data.change_civilization {
            modifier.change_civilization = Some(self.factions.require_civilization(ident)?);
        }
        modifier.speed_research = data.speed_research;
        Ok(modifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ResourceId, UnitTypeId, VariableId};

    const RULES: &str = r#"
RulesetData(
    resources: [(ident: "gold", default_income: 100)],
    variables: ["PiercingDamage"],
    upgrades: [
        UpgradeData(ident: "upgrade-iron-forged", costs: {"time": 200, "gold": 800}),
    ],
    unit_types: [
        UnitTypeData(
            ident: "unit-footman",
            name: "Footman",
            costs: {"gold": 600},
            variables: {"PiercingDamage": (value: 5, max: 5)},
            variations: [VariationData(ident: "long-sword", upgrades_required: ["upgrade-iron-forged"])],
        ),
    ],
    modifiers: [
        ModifierData(
            upgrade: "upgrade-iron-forged",
            applies_to: ["unit-footman"],
            variables: {"PiercingDamage": (value: 2, max: 2)},
        ),
    ],
)
"#;

    #[test]
    fn test_from_ron_resolves_identifiers() {
        let ruleset = Ruleset::from_ron_str(RULES).unwrap();
        let gold = ruleset.resources.require("gold").unwrap();
        let damage = ruleset.variables.require("PiercingDamage").unwrap();
        let footman = ruleset.unit_types.require("unit-footman").unwrap();
        let upgrade = ruleset.upgrades.require("upgrade-iron-forged").unwrap();

        assert_eq!(gold, ResourceId::new(1));
        assert_eq!(damage, VariableId::new(3));
        assert_eq!(footman, UnitTypeId::new(0));
        assert_eq!(ruleset.upgrades.get(upgrade).time_cost(), 200);

        let stats = &ruleset.unit_types.get(footman).default_stats;
        assert_eq!(stats.costs[gold], 600);
        assert_eq!(stats.variable(damage).value, 5);

        let modifier = ruleset.modifiers.modifiers_for(upgrade).next().unwrap();
        assert!(modifier.applies_to(footman));
        assert_eq!(modifier.variable_delta(damage).max, 2);
    }

    #[test]
    fn test_unknown_identifier_is_reported() {
        let source = RULES.replace(r#"applies_to: ["unit-footman"]"#, r#"applies_to: ["unit-dragon"]"#);
        let result = Ruleset::from_ron_str(&source);
        assert!(matches!(
            result,
            Err(GameError::UnknownIdentifier { kind: "unit type", ref ident }) if ident == "unit-dragon"
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            RulesetData::from_ron_str("RulesetData(resources: 7)"),
            Err(GameError::DataParseError { .. })
        ));
    }
}
