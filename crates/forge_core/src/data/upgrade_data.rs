//! Upgrade and modifier data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::allow::UpgradeState;
use crate::variables::VariableDelta;

/// Data-driven upgrade definition.
///
/// # Example RON
///
/// ```ron
/// UpgradeData(
///     ident: "upgrade-germanic-writing",
///     name: "Runic Writing",
///     costs: {"time": 250, "gold": 1000},
///     class: Some("writing"),
///     civilization: Some("germanic"),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeData {
    /// Unique string identifier.
    pub ident: String,

    /// Display name (defaults to the identifier).
    #[serde(default)]
    pub name: Option<String>,

    /// Research cost per resource identifier ("time" is the research time).
    #[serde(default)]
    pub costs: BTreeMap<String, i32>,

    /// Upgrade class.
    #[serde(default)]
    pub class: Option<String>,

    /// Civilization identifier.
    #[serde(default)]
    pub civilization: Option<String>,

    /// Faction identifier.
    #[serde(default)]
    pub faction: Option<String>,

    /// Learned by individual units.
    #[serde(default)]
    pub ability: bool,

    /// Personality trait.
    #[serde(default)]
    pub is_trait: bool,
}

/// Data-driven upgrade modifier.
///
/// # Example RON
///
/// ```ron
/// ModifierData(
///     upgrade: "upgrade-iron-forged",
///     applies_to: ["unit-footman", "unit-knight"],
///     variables: {"PiercingDamage": (value: 2, max: 2)},
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierData {
    /// Owning upgrade identifier.
    pub upgrade: String,

    /// Unit type identifiers the modifier applies to.
    #[serde(default)]
    pub applies_to: Vec<String>,

    /// Additive deltas by variable name.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableDelta>,

    /// Percentage scaling by variable name.
    #[serde(default)]
    pub modify_percent: BTreeMap<String, i32>,

    /// Cost deltas by resource identifier.
    #[serde(default)]
    pub costs: BTreeMap<String, i32>,

    /// Storage deltas by resource identifier.
    #[serde(default)]
    pub storing: BTreeMap<String, i32>,

    /// Income improvements by resource identifier.
    #[serde(default)]
    pub improve_income: BTreeMap<String, i32>,

    /// Allowance deltas by unit type identifier.
    #[serde(default)]
    pub change_units: BTreeMap<String, i32>,

    /// State changes by upgrade identifier.
    #[serde(default)]
    pub change_upgrades: BTreeMap<String, UpgradeState>,

    /// Unit type identifier matching units convert to.
    #[serde(default)]
    pub convert_to: Option<String>,

    /// Civilization identifier the owner switches to.
    #[serde(default)]
    pub change_civilization: Option<String>,

    /// Research speed delta.
    #[serde(default)]
    pub speed_research: i32,
}
