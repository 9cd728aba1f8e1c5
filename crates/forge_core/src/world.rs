//! The game context and its public entry points.
//!
//! [`World`] owns the immutable [`Ruleset`], the mutable [`GameState`], the
//! sight map and the pending events. Every upgrade operation goes through
//! it, so the engine never reaches for ambient globals.
//!
//! ## Example
//!
//! ```
//! use forge_core::prelude::*;
//!
//! let mut ruleset = Ruleset::new();
//! let footman = ruleset
//!     .register_unit_type("unit-footman", "Footman", ruleset.blank_stats())
//!     .unwrap();
//! let mut world = World::new(ruleset, GameSettings::default(), 42, FogOfWar::new(32, 32));
//! let player = world.add_player();
//! let unit = world
//!     .spawn_unit(player, footman, Vec2Fixed::tile_center(4, 4))
//!     .unwrap();
//! assert_eq!(world.player(player).unwrap().units, vec![unit]);
//! ```

use crate::allow::UpgradeState;
use crate::depend::{DependSubject, DependencyOracle, DependencyTarget};
use crate::error::{GameError, Result};
use crate::events::UpgradeEvent;
use crate::ids::{PlayerId, UnitId, UnitTypeId, UpgradeId, VariableId};
use crate::math::Vec2Fixed;
use crate::modifier::Direction;
use crate::player::Player;
use crate::ruleset::Ruleset;
use crate::settings::GameSettings;
use crate::sight::{FogOfWar, SightMap};
use crate::state::GameState;
use crate::unit::Unit;

/// Split borrows of a [`World`] used by the engine passes.
///
/// The ruleset is shared while the state, sight map and event queue are
/// mutated, which a `&mut World` alone cannot express.
pub(crate) struct Engine<'a, S: SightMap> {
    pub(crate) ruleset: &'a Ruleset,
    pub(crate) state: &'a mut GameState,
    pub(crate) sight: &'a mut S,
    pub(crate) events: &'a mut Vec<UpgradeEvent>,
}

/// A running game.
#[derive(Debug)]
pub struct World<S: SightMap = FogOfWar> {
    ruleset: Ruleset,
    state: GameState,
    sight: S,
    events: Vec<UpgradeEvent>,
}

impl<S: SightMap> World<S> {
    /// Create a game with no players.
    #[must_use]
    pub fn new(ruleset: Ruleset, settings: GameSettings, seed: u64, sight: S) -> Self {
        Self {
            ruleset,
            state: GameState::new(settings, seed),
            sight,
            events: Vec::new(),
        }
    }

    /// Rebuild a game from [`World::save_state`] output.
    ///
    /// Sight is re-marked for every unit on the map.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SaveFormat`] if the bytes do not decode or do
    /// not match the ruleset.
    pub fn from_saved(ruleset: Ruleset, bytes: &[u8], sight: S) -> Result<Self> {
        let state: GameState =
            bincode::deserialize(bytes).map_err(|e| GameError::SaveFormat(e.to_string()))?;
        state.check_against(&ruleset)?;

        let mut world = Self {
            ruleset,
            state,
            sight,
            events: Vec::new(),
        };
        for id in world.state.units.sorted_ids() {
            if let Some(unit) = world.state.units.get(id) {
                if !unit.removed {
                    world
                        .sight
                        .mark_sight(unit.owner, unit.position, unit.sight_radius);
                }
            }
        }
        tracing::info!(
            cycle = world.state.cycle,
            units = world.state.units.len(),
            "Loaded saved game"
        );
        Ok(world)
    }

    /// Serialize the game state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::SaveFormat`] if serialization fails.
    pub fn save_state(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.state).map_err(|e| GameError::SaveFormat(e.to_string()))
    }

    /// Deterministic hash of the game state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.state.state_hash()
    }

    pub(crate) fn engine(&mut self) -> Engine<'_, S> {
        Engine {
            ruleset: &self.ruleset,
            state: &mut self.state,
            sight: &mut self.sight,
            events: &mut self.events,
        }
    }

    /// The rule definitions.
    #[must_use]
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// The game state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The sight map.
    #[must_use]
    pub fn sight(&self) -> &S {
        &self.sight
    }

    /// Current simulation cycle.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.state.cycle
    }

    /// Set the simulation cycle.
    pub fn set_cycle(&mut self, cycle: u64) {
        self.state.cycle = cycle;
    }

    /// Set the map tileset used by variation selection.
    pub fn set_tileset(&mut self, tileset: Option<String>) {
        self.state.tileset = tileset;
    }

    /// Drain the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<UpgradeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add a player with default allowances and stat blocks.
    pub fn add_player(&mut self) -> PlayerId {
        let id = PlayerId::new(u32::try_from(self.state.players.len()).unwrap_or(u32::MAX));
        let player = Player::new(id, &self.ruleset);
        self.state.players.push(player)
    }

    /// Get a player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.state
            .players
            .get(id)
            .ok_or(GameError::InvalidPlayer(id.0))
    }

    /// Get a player mutably (setup only: civilization, faction, AI).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.state
            .players
            .get_mut(id)
            .ok_or(GameError::InvalidPlayer(id.0))
    }

    fn check_player(&self, id: PlayerId) -> Result<()> {
        self.player(id).map(|_| ())
    }

    /// Get a unit.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.state
            .units
            .get(id)
            .ok_or(GameError::UnitNotFound(id.0))
    }

    /// Get a unit mutably (orders, character flag).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.state
            .units
            .get_mut(id)
            .ok_or(GameError::UnitNotFound(id.0))
    }

    /// Create a unit from the owner's stat block for its type.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown owner.
    pub fn spawn_unit(
        &mut self,
        owner: PlayerId,
        unit_type: UnitTypeId,
        position: Vec2Fixed,
    ) -> Result<UnitId> {
        self.check_player(owner)?;
        let id = self.state.units.allocate_id();
        let player = &mut self.state.players[owner];
        let unit = Unit::new(
            id,
            owner,
            unit_type,
            position,
            player.stats(unit_type).variables.clone(),
        );
        player.supply += unit.variable(VariableId::SUPPLY).value;
        player.demand += unit.variable(VariableId::DEMAND).value;
        player.units.push(id);
        self.sight
            .mark_sight(owner, unit.position, unit.sight_radius);
        self.state.units.insert(unit);

        tracing::trace!(unit = %id, player = %owner, unit_type = %unit_type, "Spawned unit");
        self.engine().choose_variation(id, None);
        Ok(id)
    }

    /// Remove a unit from the game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn destroy_unit(&mut self, id: UnitId) -> Result<()> {
        let unit = self
            .state
            .units
            .remove(id)
            .ok_or(GameError::UnitNotFound(id.0))?;
        if !unit.removed {
            self.sight
                .unmark_sight(unit.owner, unit.position, unit.sight_radius);
        }
        let player = &mut self.state.players[unit.owner];
        player.supply -= unit.variable(VariableId::SUPPLY).value;
        player.demand -= unit.variable(VariableId::DEMAND).value;
        player.units.retain(|u| *u != id);
        Ok(())
    }

    /// Take a unit off the map or put it back, keeping sight in step.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn set_removed(&mut self, id: UnitId, removed: bool) -> Result<()> {
        let unit = self
            .state
            .units
            .get_mut(id)
            .ok_or(GameError::UnitNotFound(id.0))?;
        if unit.removed == removed {
            return Ok(());
        }
        unit.removed = removed;
        if removed {
            self.sight
                .unmark_sight(unit.owner, unit.position, unit.sight_radius);
        } else {
            unit.sight_range = unit.variable(VariableId::SIGHT_RANGE).max;
            unit.refresh_sight();
            self.sight
                .mark_sight(unit.owner, unit.position, unit.sight_radius);
        }
        Ok(())
    }

    /// Set how many units of a type a player may have.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn allow_unit_id(&mut self, player: PlayerId, unit_type: UnitTypeId, count: i32) -> Result<()> {
        self.player_mut(player)?.allow.set_unit(unit_type, count);
        Ok(())
    }

    /// How many units of a type a player may have.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn unit_id_allowed(&self, player: PlayerId, unit_type: UnitTypeId) -> Result<i32> {
        Ok(self.player(player)?.allow.unit(unit_type))
    }

    /// Set a player's state for an upgrade.
    ///
    /// Entering Researched runs the polity side effect; modifiers are not
    /// applied here.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn allow_upgrade_id(&mut self, player: PlayerId, upgrade: UpgradeId, state: UpgradeState) -> Result<()> {
        self.check_player(player)?;
        self.engine().allow_upgrade(player, upgrade, state);
        Ok(())
    }

    /// A player's state for an upgrade.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn upgrade_id_allowed(&self, player: PlayerId, upgrade: UpgradeId) -> Result<UpgradeState> {
        Ok(self.player(player)?.allow.upgrade(upgrade))
    }

    /// A player's state for an upgrade looked up by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownIdentifier`] for an unknown upgrade or
    /// [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn upgrade_ident_allowed(&self, player: PlayerId, ident: &str) -> Result<UpgradeState> {
        let upgrade = self.ruleset.upgrades.require(ident)?;
        self.upgrade_id_allowed(player, upgrade)
    }

    /// Check whether a player may start researching an upgrade.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn can_research(
        &self,
        player: PlayerId,
        upgrade: UpgradeId,
        oracle: &impl DependencyOracle,
    ) -> Result<bool> {
        Ok(self.player(player)?.allow.upgrade(upgrade) == UpgradeState::Allowed
            && oracle.check_depend(
                DependSubject::Player(player),
                &DependencyTarget::Upgrade(upgrade),
                false,
                false,
            ))
    }

    /// A player finished researching an upgrade.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn upgrade_acquire(&mut self, player: PlayerId, upgrade: UpgradeId) -> Result<()> {
        self.check_player(player)?;
        self.engine().upgrade_acquire(player, upgrade);
        Ok(())
    }

    /// A player lost an upgrade.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn upgrade_lost(&mut self, player: PlayerId, upgrade: UpgradeId) -> Result<()> {
        self.check_player(player)?;
        self.engine().upgrade_lost(player, upgrade);
        Ok(())
    }

    /// Re-apply every researched upgrade of every player.
    ///
    /// Used after a map or save declares upgrades as researched without
    /// having applied their modifiers.
    pub fn apply_upgrades(&mut self) {
        self.engine().apply_upgrades();
    }

    /// A unit gained a level of an individual upgrade.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn individual_upgrade_acquire(&mut self, unit: UnitId, upgrade: UpgradeId) -> Result<()> {
        self.unit(unit)?;
        self.engine().individual_upgrade_acquire(unit, upgrade);
        Ok(())
    }

    /// A unit lost one level of an individual upgrade, or all of them.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn individual_upgrade_lost(&mut self, unit: UnitId, upgrade: UpgradeId, lose_all: bool) -> Result<()> {
        self.unit(unit)?;
        self.engine().individual_upgrade_lost(unit, upgrade, lose_all);
        Ok(())
    }

    /// A unit learned an ability.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotAnAbility`] if the upgrade is not an ability
    /// or [`GameError::UnitNotFound`] for an unknown id.
    pub fn ability_acquire(&mut self, unit: UnitId, upgrade: UpgradeId) -> Result<()> {
        self.check_ability(upgrade)?;
        self.individual_upgrade_acquire(unit, upgrade)
    }

    /// A unit forgot an ability.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotAnAbility`] if the upgrade is not an ability
    /// or [`GameError::UnitNotFound`] for an unknown id.
    pub fn ability_lost(&mut self, unit: UnitId, upgrade: UpgradeId) -> Result<()> {
        self.check_ability(upgrade)?;
        self.individual_upgrade_lost(unit, upgrade, false)
    }

    fn check_ability(&self, upgrade: UpgradeId) -> Result<()> {
        let def = self.ruleset.upgrades.get(upgrade);
        if def.ability {
            Ok(())
        } else {
            Err(GameError::NotAnAbility(def.ident.clone()))
        }
    }

    /// Give a unit a personality trait, replacing its current one.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn trait_acquire(&mut self, unit: UnitId, upgrade: UpgradeId) -> Result<()> {
        if let Some(old) = self.unit(unit)?.unit_trait {
            self.engine().individual_upgrade_lost(unit, old, true);
        }
        self.unit_mut(unit)?.unit_trait = Some(upgrade);
        self.engine().individual_upgrade_acquire(unit, upgrade);
        Ok(())
    }

    /// Convert a player's units of one type into another.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for an unknown slot.
    pub fn convert_unit_type(
        &mut self,
        player: PlayerId,
        from: UnitTypeId,
        to: UnitTypeId,
        direction: Direction,
    ) -> Result<()> {
        self.check_player(player)?;
        self.engine().convert_unit_type(player, from, to, direction);
        Ok(())
    }

    /// Pick a new variation for a unit, preferring ones whose identifier
    /// overlaps `priority`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnitNotFound`] for an unknown id.
    pub fn choose_variation(&mut self, unit: UnitId, priority: Option<&str>) -> Result<()> {
        self.unit(unit)?;
        self.engine()
            .choose_variation(unit, priority.map(str::to_string));
        Ok(())
    }
}
