//! Civilization and faction definitions.
//!
//! Players belong to a civilization and, within it, to a faction. Tribal
//! factions become polities once the player researches the polity class
//! (writing by default); see [`crate::settings::GameSettings::polity_class`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::{CivilizationId, DenseId, FactionId};

/// Political tier of a faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FactionKind {
    /// Pre-literate tribe.
    #[default]
    Tribe,
    /// Kingdom, republic or other literate polity.
    Polity,
}

/// A civilization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Civilization {
    /// Handle of this civilization.
    pub id: CivilizationId,
    /// Unique string identifier.
    pub ident: String,
}

/// A faction within a civilization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    /// Handle of this faction.
    pub id: FactionId,
    /// Unique string identifier.
    pub ident: String,
    /// Civilization the faction belongs to.
    pub civilization: CivilizationId,
    /// Tribe or polity.
    pub kind: FactionKind,
    /// Whether players may be assigned this faction.
    pub playable: bool,
}

/// Registry of civilizations and factions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionRegistry {
    civilizations: DenseVec<CivilizationId, Civilization>,
    civilization_by_ident: HashMap<String, CivilizationId>,
    factions: DenseVec<FactionId, Faction>,
    faction_by_ident: HashMap<String, FactionId>,
}

impl FactionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a civilization.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateIdentifier`] if the identifier exists.
    pub fn register_civilization(&mut self, ident: &str) -> Result<CivilizationId> {
        if self.civilization_by_ident.contains_key(ident) {
            return Err(GameError::DuplicateIdentifier {
                kind: "civilization",
                ident: ident.to_string(),
            });
        }
        let id = CivilizationId::from_index(self.civilizations.len());
        self.civilizations.push(Civilization {
            id,
            ident: ident.to_string(),
        });
        self.civilization_by_ident.insert(ident.to_string(), id);
        Ok(id)
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
        if self.faction_by_ident.contains_key(ident) {
            return Err(GameError::DuplicateIdentifier {
                kind: "faction",
                ident: ident.to_string(),
            });
        }
        let id = FactionId::from_index(self.factions.len());
        self.factions.push(Faction {
            id,
            ident: ident.to_string(),
            civilization,
            kind,
            playable: true,
        });
        self.faction_by_ident.insert(ident.to_string(), id);
        Ok(id)
    }

    /// Get a civilization.
    #[must_use]
    pub fn civilization(&self, id: CivilizationId) -> &Civilization {
        &self.civilizations[id]
    }

    /// Get a faction.
    #[must_use]
    pub fn faction(&self, id: FactionId) -> &Faction {
        &self.factions[id]
    }

    /// Get a faction mutably (definition time only).
    pub fn faction_mut(&mut self, id: FactionId) -> &mut Faction {
        &mut self.factions[id]
    }

    /// Look up a civilization by identifier, failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`].
    pub fn require_civilization(&self, ident: &str) -> Result<CivilizationId> {
        self.civilization_by_ident
            .get(ident)
            .copied()
            .ok_or_else(|| GameError::unknown("civilization", ident))
    }

    /// Look up a faction by identifier, failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`].
    pub fn require_faction(&self, ident: &str) -> Result<FactionId> {
        self.faction_by_ident
            .get(ident)
            .copied()
            .ok_or_else(|| GameError::unknown("faction", ident))
    }

    /// Factions of one civilization, in registration order.
    pub fn factions_of(&self, civilization: CivilizationId) -> impl Iterator<Item = &Faction> + '_ {
        self.factions
            .values()
            .filter(move |f| f.civilization == civilization)
    }

    /// Number of civilizations.
    #[must_use]
    pub fn civilization_count(&self) -> usize {
        self.civilizations.len()
    }

    /// Number of factions.
    #[must_use]
    pub fn faction_count(&self) -> usize {
        self.factions.len()
    }
}
