//! Resource kinds and resource vectors.
//!
//! Costs, storage and income are dense per-resource vectors. Slot 0 is the
//! time cost, so an upgrade's research time travels with its other costs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::{DenseId, ResourceId};

/// Per-resource integer vector (costs, storage, income).
pub type ResourceVec = DenseVec<ResourceId, i32>;

impl ResourceId {
    /// The time-cost slot present in every cost vector.
    pub const TIME: Self = Self(0);
}

/// Identifier of the built-in time resource.
pub const TIME_IDENT: &str = "time";

/// A registered resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceKind {
    /// Handle of this resource.
    pub id: ResourceId,
    /// Unique string identifier.
    pub ident: String,
    /// Income a player gets from this resource before any improvement.
    pub default_income: i32,
}

/// Registry of resource kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRegistry {
    kinds: DenseVec<ResourceId, ResourceKind>,
    by_ident: HashMap<String, ResourceId>,
}

impl ResourceRegistry {
    /// Create a registry holding only the time resource.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            kinds: DenseVec::new(),
            by_ident: HashMap::new(),
        };
        registry.insert(TIME_IDENT, 0);
        registry
    }

    fn insert(&mut self, ident: &str, default_income: i32) -> ResourceId {
        let id = ResourceId::from_index(self.kinds.len());
        self.kinds.push(ResourceKind {
            id,
            ident: ident.to_string(),
            default_income,
        });
        self.by_ident.insert(ident.to_string(), id);
        id
    }

    /// Register a resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateIdentifier`] if the identifier exists.
    pub fn register(&mut self, ident: &str, default_income: i32) -> Result<ResourceId> {
        if self.by_ident.contains_key(ident) {
            return Err(GameError::DuplicateIdentifier {
                kind: "resource",
                ident: ident.to_string(),
            });
        }
        Ok(self.insert(ident, default_income))
    }

    /// Look up a resource by identifier.
    #[must_use]
    pub fn id(&self, ident: &str) -> Option<ResourceId> {
        self.by_ident.get(ident).copied()
    }

    /// Look up a resource by identifier, failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`].
    pub fn require(&self, ident: &str) -> Result<ResourceId> {
        self.id(ident)
            .ok_or_else(|| GameError::unknown("resource", ident))
    }

    /// Get a resource kind.
    #[must_use]
    pub fn get(&self, id: ResourceId) -> &ResourceKind {
        &self.kinds[id]
    }

    /// Default income of a resource.
    #[must_use]
    pub fn default_income(&self, id: ResourceId) -> i32 {
        self.kinds[id].default_income
    }

    /// Number of registered resources (including time).
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always false: the time resource is built in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterate resource handles in index order.
    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.kinds.ids()
    }

    /// A zeroed vector with one slot per resource.
    #[must_use]
    pub fn zeroed(&self) -> ResourceVec {
        ResourceVec::filled(self.len(), 0)
    }

    /// The per-resource default incomes.
    #[must_use]
    pub fn default_incomes(&self) -> ResourceVec {
        self.kinds.values().map(|k| k.default_income).collect()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_is_always_slot_zero() {
        let registry = ResourceRegistry::new();
        assert_eq!(registry.id(TIME_IDENT), Some(ResourceId::TIME));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_and_defaults() {
        let mut registry = ResourceRegistry::new();
        let gold = registry.register("gold", 100).unwrap();
        let wood = registry.register("wood", 100).unwrap();
        assert_eq!(gold, ResourceId::new(1));
        assert_eq!(wood, ResourceId::new(2));

        let defaults = registry.default_incomes();
        assert_eq!(defaults.value(ResourceId::TIME), 0);
        assert_eq!(defaults.value(gold), 100);
    }

    #[test]
    fn test_duplicate_resource_rejected() {
        let mut registry = ResourceRegistry::new();
        registry.register("gold", 100).unwrap();
        assert!(matches!(
            registry.register("gold", 50),
            Err(GameError::DuplicateIdentifier { .. })
        ));
    }
}
