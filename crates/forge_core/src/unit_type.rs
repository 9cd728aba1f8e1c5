//! Unit types, their per-player stat blocks and variations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::{DenseId, UnitTypeId, UpgradeId, VariableId};
use crate::resources::ResourceVec;
use crate::variables::{Variable, VariableVec};

/// Stat block of a unit type.
///
/// Each player holds one per unit type. Newly created units copy their
/// variables from it, and upgrades mutate it in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnitStats {
    /// Cost to train or build (slot 0 is time).
    pub costs: ResourceVec,
    /// Extra storage provided per resource.
    pub storing: ResourceVec,
    /// Income this type grants its owner per resource (0 = none).
    pub improve_income: ResourceVec,
    /// Variable templates.
    pub variables: VariableVec,
}

impl UnitStats {
    /// Create a zeroed stat block sized for the given registries.
    #[must_use]
    pub fn new(resources: usize, variables: usize) -> Self {
        Self {
            costs: ResourceVec::filled(resources, 0),
            storing: ResourceVec::filled(resources, 0),
            improve_income: ResourceVec::filled(resources, 0),
            variables: VariableVec::filled(
                variables,
                Variable {
                    enable: false,
                    ..Variable::default()
                },
            ),
        }
    }

    /// Copy of one variable (zeroed past the end of the table).
    #[must_use]
    pub fn variable(&self, id: VariableId) -> Variable {
        self.variables.value(id)
    }

    /// Set one variable, growing the table if needed.
    pub fn set_variable(&mut self, id: VariableId, variable: Variable) {
        *self.variables.entry(id) = variable;
    }

    /// Builder: set one variable.
    #[must_use]
    pub fn with_variable(mut self, id: VariableId, variable: Variable) -> Self {
        self.set_variable(id, variable);
        self
    }

    /// Resize all tables to the registry sizes.
    pub fn resize(&mut self, resources: usize, variables: usize) {
        self.costs.resize(resources, 0);
        self.storing.resize(resources, 0);
        self.improve_income.resize(resources, 0);
        self.variables.resize(
            variables,
            Variable {
                enable: false,
                ..Variable::default()
            },
        );
    }
}

/// A gated visual/stat variant of a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    /// Unique identifier within the unit type.
    pub ident: String,
    /// Upgrades that must all be held for this variation.
    pub upgrades_required: Vec<UpgradeId>,
    /// Upgrades none of which may be held for this variation.
    pub upgrades_forbidden: Vec<UpgradeId>,
    /// Tilesets this variation appears on (empty = all).
    pub tilesets: Vec<String>,
    /// Terrains this variation appears on (empty = all).
    pub terrains: Vec<String>,
}

impl Variation {
    /// Create an ungated variation.
    #[must_use]
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            upgrades_required: Vec::new(),
            upgrades_forbidden: Vec::new(),
            tilesets: Vec::new(),
            terrains: Vec::new(),
        }
    }

    /// Builder: require an upgrade.
    #[must_use]
    pub fn requiring(mut self, upgrade: UpgradeId) -> Self {
        self.upgrades_required.push(upgrade);
        self
    }

    /// Builder: forbid an upgrade.
    #[must_use]
    pub fn forbidding(mut self, upgrade: UpgradeId) -> Self {
        self.upgrades_forbidden.push(upgrade);
        self
    }

    /// Builder: restrict to a tileset.
    #[must_use]
    pub fn on_tileset(mut self, tileset: impl Into<String>) -> Self {
        self.tilesets.push(tileset.into());
        self
    }

    /// Builder: restrict to a terrain.
    #[must_use]
    pub fn on_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrains.push(terrain.into());
        self
    }

    /// Check the tileset / terrain restrictions.
    ///
    /// An unknown context (`None`) only satisfies unrestricted variations.
    #[must_use]
    pub fn fits_context(&self, tileset: Option<&str>, terrain: Option<&str>) -> bool {
        let fits = |allowed: &[String], current: Option<&str>| {
            allowed.is_empty() || current.is_some_and(|c| allowed.iter().any(|a| a == c))
        };
        fits(&self.tilesets, tileset) && fits(&self.terrains, terrain)
    }
}

/// A unit type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    /// Handle of this type.
    pub id: UnitTypeId,
    /// Unique string identifier.
    pub ident: String,
    /// Display name.
    pub name: String,
    /// Stat block every player starts with.
    pub default_stats: UnitStats,
    /// Variations in declaration order.
    pub variations: Vec<Variation>,
}

/// Registry of unit types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitTypeRegistry {
    types: DenseVec<UnitTypeId, UnitType>,
    by_ident: HashMap<String, UnitTypeId>,
}

impl UnitTypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit type.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateIdentifier`] if the identifier exists.
    pub fn register(
        &mut self,
        ident: &str,
        name: impl Into<String>,
        default_stats: UnitStats,
    ) -> Result<UnitTypeId> {
        if self.by_ident.contains_key(ident) {
            return Err(GameError::DuplicateIdentifier {
                kind: "unit type",
                ident: ident.to_string(),
            });
        }
        let id = UnitTypeId::from_index(self.types.len());
        self.types.push(UnitType {
            id,
            ident: ident.to_string(),
            name: name.into(),
            default_stats,
            variations: Vec::new(),
        });
        self.by_ident.insert(ident.to_string(), id);
        Ok(id)
    }

    /// Append a variation to a unit type.
    pub fn add_variation(&mut self, id: UnitTypeId, variation: Variation) {
        self.types[id].variations.push(variation);
    }

    /// Get a unit type.
    #[must_use]
    pub fn get(&self, id: UnitTypeId) -> &UnitType {
        &self.types[id]
    }

    /// Look up a unit type by identifier.
    #[must_use]
    pub fn id(&self, ident: &str) -> Option<UnitTypeId> {
        self.by_ident.get(ident).copied()
    }

    /// Look up a unit type by identifier, failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`].
    pub fn require(&self, ident: &str) -> Result<UnitTypeId> {
        self.id(ident)
            .ok_or_else(|| GameError::unknown("unit type", ident))
    }

    /// Number of unit types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no unit types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate unit type handles in index order.
    pub fn ids(&self) -> impl Iterator<Item = UnitTypeId> + '_ {
        self.types.ids()
    }

    /// Iterate unit types in index order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitType> + '_ {
        self.types.values()
    }

    /// Resize every default stat block to the registry sizes.
    pub(crate) fn resize_stats(&mut self, resources: usize, variables: usize) {
        for (_, unit_type) in self.types.iter_mut() {
            unit_type.default_stats.resize(resources, variables);
        }
    }
}
