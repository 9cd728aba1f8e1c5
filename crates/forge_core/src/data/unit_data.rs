//! Unit type data structures for data-driven unit definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::variables::Variable;

/// Template of one unit variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableData {
    /// Starting value.
    pub value: i32,

    /// Upper bound.
    pub max: i32,

    /// Regeneration per second.
    #[serde(default)]
    pub increase: i32,

    /// Whether the variable is active.
    #[serde(default = "default_enable")]
    pub enable: bool,
}

const fn default_enable() -> bool {
    true
}

impl From<VariableData> for Variable {
    fn from(data: VariableData) -> Self {
        Self {
            value: data.value,
            max: data.max,
            increase: data.increase,
            enable: data.enable,
        }
    }
}

/// A variation of a unit type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariationData {
    /// Identifier, unique within the unit type.
    pub ident: String,

    /// Upgrades that must all be held.
    #[serde(default)]
    pub upgrades_required: Vec<String>,

    /// Upgrades none of which may be held.
    #[serde(default)]
    pub upgrades_forbidden: Vec<String>,

    /// Tilesets the variation appears on (empty = all).
    #[serde(default)]
    pub tilesets: Vec<String>,

    /// Terrains the variation appears on (empty = all).
    #[serde(default)]
    pub terrains: Vec<String>,
}

/// Data-driven unit type definition.
///
/// # Example RON
///
/// ```ron
/// UnitTypeData(
///     ident: "unit-footman",
///     name: "Footman",
///     costs: {"time": 60, "gold": 600},
///     variables: {
///         "SightRange": (value: 4, max: 4),
///         "Demand": (value: 1, max: 1),
///         "PiercingDamage": (value: 5, max: 5),
///     },
///     variations: [
///         VariationData(ident: "short-sword", upgrades_forbidden: ["upgrade-iron-forged"]),
///         VariationData(ident: "long-sword", upgrades_required: ["upgrade-iron-forged"]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTypeData {
    /// Unique string identifier.
    pub ident: String,

    /// Display name.
    pub name: String,

    /// Cost per resource identifier.
    #[serde(default)]
    pub costs: BTreeMap<String, i32>,

    /// Storage provided per resource identifier.
    #[serde(default)]
    pub storing: BTreeMap<String, i32>,

    /// Income granted per resource identifier.
    #[serde(default)]
    pub improve_income: BTreeMap<String, i32>,

    /// Variable templates by variable name.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableData>,

    /// Variations in selection order.
    #[serde(default)]
    pub variations: Vec<VariationData>,
}
