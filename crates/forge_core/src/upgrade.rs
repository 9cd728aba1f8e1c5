//! Upgrade definitions and the upgrade registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::{CivilizationId, DenseId, FactionId, ResourceId, UpgradeId};
use crate::resources::ResourceVec;

/// A researchable upgrade, ability or trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    /// Handle of this upgrade.
    pub id: UpgradeId,
    /// Unique string identifier.
    pub ident: String,
    /// Display name.
    pub name: String,
    /// Research costs (slot 0 is research time).
    pub costs: ResourceVec,
    /// Upgrade class, shared by equivalent upgrades of different civilizations.
    pub class: Option<String>,
    /// Civilization this upgrade belongs to.
    pub civilization: Option<CivilizationId>,
    /// Faction this upgrade belongs to.
    pub faction: Option<FactionId>,
    /// Learned by individual units rather than researched by players.
    pub ability: bool,
    /// Personality trait held by individual units.
    pub is_trait: bool,
}

impl Upgrade {
    /// Research time.
    #[must_use]
    pub fn time_cost(&self) -> i32 {
        self.costs.value(ResourceId::TIME)
    }
}

/// Registry of all upgrades.
///
/// Ids are dense, assigned at first creation and never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeRegistry {
    upgrades: DenseVec<UpgradeId, Upgrade>,
    by_ident: HashMap<String, UpgradeId>,
}

impl UpgradeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the upgrade with this identifier, creating a blank one if new.
    pub fn get_or_create(&mut self, ident: &str) -> UpgradeId {
        if let Some(id) = self.by_ident.get(ident) {
            return *id;
        }
        let id = UpgradeId::from_index(self.upgrades.len());
        self.upgrades.push(Upgrade {
            id,
            ident: ident.to_string(),
            name: ident.to_string(),
            costs: ResourceVec::new(),
            class: None,
            civilization: None,
            faction: None,
            ability: false,
            is_trait: false,
        });
        self.by_ident.insert(ident.to_string(), id);
        tracing::trace!(upgrade = ident, id = id.0, "Created upgrade");
        id
    }

    /// Get an upgrade.
    #[must_use]
    pub fn get(&self, id: UpgradeId) -> &Upgrade {
        &self.upgrades[id]
    }

    /// Get an upgrade mutably (definition time only).
    pub fn get_mut(&mut self, id: UpgradeId) -> &mut Upgrade {
        &mut self.upgrades[id]
    }

    /// Look up an upgrade by identifier.
    #[must_use]
    pub fn id(&self, ident: &str) -> Option<UpgradeId> {
        self.by_ident.get(ident).copied()
    }

    /// Look up an upgrade by identifier, failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`].
    pub fn require(&self, ident: &str) -> Result<UpgradeId> {
        self.id(ident).ok_or_else(|| GameError::unknown("upgrade", ident))
    }

    /// Number of upgrades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    /// Check if no upgrades exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Iterate upgrade handles in increasing id order.
    pub fn ids(&self) -> impl Iterator<Item = UpgradeId> + '_ {
        self.upgrades.ids()
    }

    /// Iterate upgrades in increasing id order.
    pub fn iter(&self) -> impl Iterator<Item = &Upgrade> + '_ {
        self.upgrades.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_stable() {
        let mut registry = UpgradeRegistry::new();
        let a = registry.get_or_create("upgrade-iron-forged");
        let b = registry.get_or_create("upgrade-steel-forged");
        let again = registry.get_or_create("upgrade-iron-forged");
        assert_eq!(a, UpgradeId::new(0));
        assert_eq!(b, UpgradeId::new(1));
        assert_eq!(again, a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_time_cost_reads_slot_zero() {
        let mut registry = UpgradeRegistry::new();
        let id = registry.get_or_create("upgrade-writing");
        *registry.get_mut(id).costs.entry(ResourceId::TIME) = 250;
        assert_eq!(registry.get(id).time_cost(), 250);
    }
}
