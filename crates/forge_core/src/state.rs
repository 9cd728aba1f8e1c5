//! Mutable game state.
//!
//! Everything here is serialized into saves and fed into the state hash.
//! The sight map is not: it is rebuilt from unit positions on load.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::dense::DenseVec;
use crate::error::{GameError, Result};
use crate::ids::PlayerId;
use crate::player::Player;
use crate::rng::SyncRng;
use crate::ruleset::Ruleset;
use crate::settings::GameSettings;
use crate::unit::UnitStorage;

/// Players, units, clock and RNG of a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Simulation cycle; 0 while the map is being set up.
    pub cycle: u64,
    /// Player slots.
    pub players: DenseVec<PlayerId, Player>,
    /// All live units.
    pub units: UnitStorage,
    /// Synchronized random number generator.
    pub rng: SyncRng,
    /// Tileset of the current map.
    pub tileset: Option<String>,
    /// Game settings.
    pub settings: GameSettings,
}

impl GameState {
    /// Create an empty game.
    #[must_use]
    pub fn new(settings: GameSettings, seed: u64) -> Self {
        Self {
            cycle: 0,
            players: DenseVec::new(),
            units: UnitStorage::new(),
            rng: SyncRng::new(seed),
            tileset: None,
            settings,
        }
    }

    /// Compute a deterministic hash of the game state.
    ///
    /// Used for desync detection and save verification. Two states that
    /// compare equal produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.cycle.hash(&mut hasher);
        self.players.hash(&mut hasher);

        // Hash units in deterministic order
        let ids = self.units.sorted_ids();
        ids.len().hash(&mut hasher);
        for id in ids {
            if let Some(unit) = self.units.get(id) {
                unit.hash(&mut hasher);
            }
        }
        self.units.next_id().hash(&mut hasher);

        self.rng.hash(&mut hasher);
        self.tileset.hash(&mut hasher);
        self.settings.hash(&mut hasher);

        hasher.finish()
    }

    /// Check that every per-player table matches the registry sizes.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SaveFormat`] describing the first mismatch.
    pub fn check_against(&self, ruleset: &Ruleset) -> Result<()> {
        let unit_types = ruleset.unit_types.len();
        let upgrades = ruleset.upgrades.len();
        for player in self.players.values() {
            let mismatch = if player.stats.len() != unit_types {
                Some(("stat blocks", player.stats.len(), unit_types))
            } else if player.allow.encode_units().len() != unit_types {
                Some(("unit allowances", player.allow.encode_units().len(), unit_types))
            } else if player.allow.encode_upgrades().len() != upgrades {
                Some(("upgrade states", player.allow.encode_upgrades().len(), upgrades))
            } else if player.upgrade_timers.len() != upgrades {
                Some(("upgrade timers", player.upgrade_timers.len(), upgrades))
            } else if player.incomes.len() != ruleset.resources.len() {
                Some(("incomes", player.incomes.len(), ruleset.resources.len()))
            } else {
                None
            };
            if let Some((what, found, expected)) = mismatch {
                return Err(GameError::SaveFormat(format!(
                    "player {} has {found} {what}, rules define {expected}",
                    player.id
                )));
            }
        }
        for (id, unit) in self.units.iter() {
            if unit.owner.0 as usize >= self.players.len() || unit.unit_type.0 as usize >= unit_types {
                return Err(GameError::SaveFormat(format!(
                    "unit {id} references an unknown player or unit type"
                )));
            }
        }
        Ok(())
    }
}
