//! Unit variables and their modifier arithmetic.
//!
//! A variable is the `value / max / increase / enable` quadruple every unit
//! type template and every live unit carries per registered variable. The
//! arithmetic that upgrades perform on one lives in [`Variable::modify`], so
//! the stat-block pass and the live-unit pass cannot disagree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::{DenseId, VariableId};
use crate::math::{percent_apply, percent_reverse};
use crate::modifier::Direction;

/// Dense per-variable table.
pub type VariableVec = DenseVec<VariableId, Variable>;

impl VariableId {
    /// Sight range, whose max drives the unit's current sight.
    pub const SIGHT_RANGE: Self = Self(0);
    /// Food/housing supplied by the unit.
    pub const SUPPLY: Self = Self(1);
    /// Food/housing consumed by the unit.
    pub const DEMAND: Self = Self(2);
}

/// Variables every ruleset has, in handle order.
pub const BUILTIN_VARIABLES: [&str; 3] = ["SightRange", "Supply", "Demand"];

/// One unit variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Variable {
    /// Current value.
    pub value: i32,
    /// Upper bound of the value.
    pub max: i32,
    /// Per-second regeneration.
    pub increase: i32,
    /// Whether the variable is active for the unit.
    pub enable: bool,
}

impl Variable {
    /// Create an enabled variable with `value` and `max`.
    #[must_use]
    pub const fn new(value: i32, max: i32) -> Self {
        Self {
            value,
            max,
            increase: 0,
            enable: true,
        }
    }

    /// Clamp `max` to at least zero and `value` into `[0, max]`.
    pub fn clamp(&mut self) {
        self.max = self.max.max(0);
        self.value = self.value.clamp(0, self.max);
    }

    /// Apply or reverse one modifier entry on this variable.
    ///
    /// A nonzero `percent` scales value and max and suppresses the additive
    /// path entirely. The result is clamped either way.
    pub fn modify(&mut self, delta: &VariableDelta, percent: i32, direction: Direction) {
        if percent != 0 {
            match direction {
                Direction::Apply => {
                    self.value = percent_apply(self.value, percent);
                    self.max = percent_apply(self.max, percent);
                }
                Direction::Reverse => {
                    self.value = percent_reverse(self.value, percent);
                    self.max = percent_reverse(self.max, percent);
                }
            }
        } else {
            let sign = direction.sign();
            self.value = self.value.saturating_add(delta.value.saturating_mul(sign));
            self.max = self.max.saturating_add(delta.max.saturating_mul(sign));
            self.increase = self
                .increase
                .saturating_add(delta.increase.saturating_mul(sign));
        }

        if delta.enable {
            self.enable = direction == Direction::Apply;
        }
        self.clamp();
    }
}

/// Modifier delta for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VariableDelta {
    /// Added to the value.
    #[serde(default)]
    pub value: i32,
    /// Added to the max.
    #[serde(default)]
    pub max: i32,
    /// Added to the increase.
    #[serde(default)]
    pub increase: i32,
    /// Enables the variable while applied.
    #[serde(default)]
    pub enable: bool,
}

impl VariableDelta {
    /// A delta that adds `amount` to both value and max.
    #[must_use]
    pub const fn flat(amount: i32) -> Self {
        Self {
            value: amount,
            max: amount,
            increase: 0,
            enable: false,
        }
    }

    /// Check if the delta changes nothing.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.value == 0 && self.max == 0 && self.increase == 0 && !self.enable
    }
}

/// Registry of variable names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableRegistry {
    names: DenseVec<VariableId, String>,
    by_name: HashMap<String, VariableId>,
}

impl VariableRegistry {
    /// Create a registry holding the built-in variables.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            names: DenseVec::new(),
            by_name: HashMap::new(),
        };
        for name in BUILTIN_VARIABLES {
            let id = registry.names.push(name.to_string());
            registry.by_name.insert(name.to_string(), id);
        }
        registry
    }

    /// Register a variable, returning the existing handle if already known.
    pub fn get_or_register(&mut self, name: &str) -> VariableId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = VariableId::from_index(self.names.len());
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up a variable by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<VariableId> {
        self.by_name.get(name).copied()
    }

    /// Look up a variable by name, failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`].
    pub fn require(&self, name: &str) -> Result<VariableId> {
        self.id(name).ok_or_else(|| GameError::unknown("variable", name))
    }

    /// Name of a variable.
    #[must_use]
    pub fn name(&self, id: VariableId) -> &str {
        &self.names[id]
    }

    /// Number of registered variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: built-ins are always registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate variable handles in index order.
    pub fn ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.names.ids()
    }
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
