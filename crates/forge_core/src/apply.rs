//! Applying and reversing upgrade modifiers.
//!
//! One implementation serves both directions: every delta is multiplied by
//! [`Direction::sign`], and the few asymmetric steps (percent scaling,
//! income seeding, enable flags) branch on the direction explicitly.
//!
//! Unit types are visited in handle order and units in the owner's
//! container order, so two peers applying the same upgrades always draw
//! from the synchronized RNG in the same sequence.

use crate::allow::UpgradeState;
use crate::events::UpgradeEvent;
use crate::factions::FactionKind;
use crate::ids::{CivilizationId, FactionId, PlayerId, ResourceId, UnitId, UnitTypeId, UpgradeId, VariableId};
use crate::modifier::{Direction, UpgradeModifier};
use crate::sight::SightMap;
use crate::unit::Unit;
use crate::world::Engine;

impl<S: SightMap> Engine<'_, S> {
    /// Player-wide research completion.
    pub(crate) fn upgrade_acquire(&mut self, player: PlayerId, upgrade: UpgradeId) {
        let ruleset = self.ruleset;
        let def = ruleset.upgrades.get(upgrade);
        tracing::debug!(player = %player, upgrade = %def.ident, "Upgrade acquired");

        self.state.players[player].upgrade_timers[upgrade] = def.time_cost();
        self.allow_upgrade(player, upgrade, UpgradeState::Researched);
        self.apply_upgrade_modifiers(player, upgrade, Direction::Apply);
    }

    /// Player-wide upgrade loss.
    pub(crate) fn upgrade_lost(&mut self, player: PlayerId, upgrade: UpgradeId) {
        let ruleset = self.ruleset;
        let def = ruleset.upgrades.get(upgrade);
        let p = &mut self.state.players[player];
        if !p.allow.is_researched(upgrade) {
            tracing::warn!(
                player = %player,
                upgrade = %def.ident,
                "Losing an upgrade that was never researched"
            );
        }
        tracing::debug!(player = %player, upgrade = %def.ident, "Upgrade lost");

        p.upgrade_timers[upgrade] = 0;
        self.allow_upgrade(player, upgrade, UpgradeState::Allowed);
        self.apply_upgrade_modifiers(player, upgrade, Direction::Reverse);
    }

    /// Re-apply every researched upgrade, upgrade-major then player-major.
    pub(crate) fn apply_upgrades(&mut self) {
        let ruleset = self.ruleset;
        let players: Vec<PlayerId> = self.state.players.ids().collect();
        for upgrade in ruleset.upgrades.ids() {
            for &player in &players {
                if !self.state.players[player].allow.is_researched(upgrade) {
                    continue;
                }
                self.state.players[player].upgrade_timers[upgrade] =
                    ruleset.upgrades.get(upgrade).time_cost();
                self.allow_upgrade(player, upgrade, UpgradeState::Researched);
                self.apply_upgrade_modifiers(player, upgrade, Direction::Apply);
            }
        }
    }

    /// Set an upgrade state, running the polity side effect on entry into
    /// Researched.
    pub(crate) fn allow_upgrade(&mut self, player: PlayerId, upgrade: UpgradeId, state: UpgradeState) {
        let allow = &mut self.state.players[player].allow;
        let previous = allow.upgrade(upgrade);
        allow.set_upgrade(upgrade, state);

        if state == UpgradeState::Researched && previous != UpgradeState::Researched {
            self.on_researched(player, upgrade);
        }
    }

    fn on_researched(&mut self, player: PlayerId, upgrade: UpgradeId) {
        let ruleset = self.ruleset;
        let settings = &self.state.settings;
        let is_polity_class = ruleset
            .upgrades
            .get(upgrade)
            .class
            .as_deref()
            .is_some_and(|class| class == settings.polity_class);
        if !is_polity_class || settings.grand_strategy {
            return;
        }
        let tribal = self.state.players[player]
            .faction
            .map_or(true, |f| ruleset.factions.faction(f).kind == FactionKind::Tribe);
        if tribal {
            self.reroll_faction(player);
        }
    }

    fn has_polity_class(&self, player: PlayerId) -> bool {
        let polity_class = self.state.settings.polity_class.as_str();
        self.state.players[player]
            .allow
            .researched()
            .any(|u| self.ruleset.upgrades.get(u).class.as_deref() == Some(polity_class))
    }

    /// Draw a new faction for a player from the free playable factions of
    /// its civilization.
    pub(crate) fn reroll_faction(&mut self, player: PlayerId) {
        let wanted = if self.has_polity_class(player) {
            FactionKind::Polity
        } else {
            FactionKind::Tribe
        };
        let candidates: Vec<FactionId> = match self.state.players[player].civilization {
            Some(civilization) => self
                .ruleset
                .factions
                .factions_of(civilization)
                .filter(|f| f.playable && f.kind == wanted)
                .filter(|f| {
                    !self
                        .state
                        .players
                        .values()
                        .any(|p| p.id != player && p.faction == Some(f.id))
                })
                .map(|f| f.id)
                .collect(),
            None => Vec::new(),
        };

        let chosen = self
            .state
            .rng
            .draw_index(candidates.len())
            .map(|index| candidates[index]);
        let p = &mut self.state.players[player];
        let previous = p.faction;
        p.faction = chosen;
        if previous != chosen {
            tracing::info!(
                player = %player,
                from = ?previous.map(|f| &self.ruleset.factions.faction(f).ident),
                to = ?chosen.map(|f| &self.ruleset.factions.faction(f).ident),
                "Faction changed"
            );
            self.events.push(UpgradeEvent::FactionChanged {
                player,
                from: previous,
                to: chosen,
            });
        }
    }

    fn change_civilization(&mut self, player: PlayerId, civilization: CivilizationId) {
        let p = &mut self.state.players[player];
        let previous = p.civilization;
        if previous == Some(civilization) {
            return;
        }
        p.civilization = Some(civilization);
        tracing::info!(
            player = %player,
            civilization = %self.ruleset.factions.civilization(civilization).ident,
            "Civilization changed"
        );
        self.events.push(UpgradeEvent::CivilizationChanged {
            player,
            from: previous,
            to: civilization,
        });
        if self.state.settings.local_player == Some(player) {
            self.events.push(UpgradeEvent::InterfaceReloaded { player });
        }
        self.reroll_faction(player);
    }

    fn apply_upgrade_modifiers(&mut self, player: PlayerId, upgrade: UpgradeId, direction: Direction) {
        let ruleset = self.ruleset;
        for modifier in ruleset.modifiers.modifiers_for(upgrade) {
            self.apply_modifier(player, modifier, direction);
        }
    }

    /// Apply or reverse one modifier for a whole player.
    pub(crate) fn apply_modifier(&mut self, player: PlayerId, modifier: &UpgradeModifier, direction: Direction) {
        let ruleset = self.ruleset;
        let sign = direction.sign();
        tracing::debug!(
            player = %player,
            upgrade = %ruleset.upgrades.get(modifier.upgrade).ident,
            ?direction,
            "Applying upgrade modifier"
        );

        self.state.players[player].speed_research += sign * modifier.speed_research;

        if let Some(civilization) = modifier.change_civilization {
            if direction == Direction::Apply && self.state.cycle > 0 {
                self.change_civilization(player, civilization);
            }
        }

        for (target, change) in modifier.change_upgrades.iter() {
            let Some(change) = *change else {
                continue;
            };
            let current = self.state.players[player].allow.upgrade(target);
            let next = current.after_change(change, direction);
            if next != current {
                self.allow_upgrade(player, target, next);
            }
        }

        for (unit_type, delta) in modifier.change_units.iter() {
            if *delta != 0 {
                self.state.players[player]
                    .allow
                    .add_unit(unit_type, sign * delta);
            }
        }

        for unit_type in ruleset.unit_types.ids() {
            if modifier.applies_to(unit_type) {
                self.apply_to_unit_type(player, unit_type, modifier, direction);
            }
        }

        #[cfg(feature = "debug-validation")]
        self.validate_player_units(player);
    }

    /// The player's units of one type, in container order.
    pub(crate) fn units_of_type(&self, player: PlayerId, unit_type: UnitTypeId) -> Vec<UnitId> {
        self.state.players[player]
            .units
            .iter()
            .copied()
            .filter(|id| {
                self.state
                    .units
                    .get(*id)
                    .is_some_and(|u| u.unit_type == unit_type)
            })
            .collect()
    }

    fn apply_to_unit_type(
        &mut self,
        player: PlayerId,
        unit_type: UnitTypeId,
        modifier: &UpgradeModifier,
        direction: Direction,
    ) {
        let sign = direction.sign();
        let var_modified = modifier.modifies_variables();
        let units = self.units_of_type(player, unit_type);

        for &id in &units {
            self.update_unit_sight_and_supply(id, modifier, direction);
        }

        let stats = &mut self.state.players[player].stats[unit_type];
        stats.costs.add_scaled(&modifier.costs, sign);
        stats.storing.add_scaled(&modifier.storing, sign);

        for (resource, delta) in modifier.improve_income.iter() {
            if *delta != 0 {
                self.apply_income(player, unit_type, resource, *delta, direction, !units.is_empty());
            }
        }

        let stats = &mut self.state.players[player].stats[unit_type];
        for variable in modifier.touched_variables() {
            stats.variables[variable].modify(
                &modifier.variable_delta(variable),
                modifier.percent(variable),
                direction,
            );
        }

        if var_modified {
            for &id in &units {
                if let Some(unit) = self.state.units.get_mut(id) {
                    modify_unit_variables(unit, modifier, direction);
                    tracing::trace!(unit = %id, "Modified unit variables");
                }
            }
        }

        for &id in &units {
            self.reselect_variation(id, modifier.upgrade, direction);
        }

        if let Some(target) = modifier.convert_to {
            match direction {
                Direction::Apply => self.convert_unit_type(player, unit_type, target, direction),
                Direction::Reverse => self.convert_unit_type(player, target, unit_type, direction),
            }
        }
    }

    /// Sight and supply/demand steps shared by the player and unit passes.
    fn update_unit_sight_and_supply(&mut self, id: UnitId, modifier: &UpgradeModifier, direction: Direction) {
        let sign = direction.sign();
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };

        // Sight range tracks the SightRange max.
        let sight_delta = modifier.variable_delta(VariableId::SIGHT_RANGE).max;
        if sight_delta != 0 && !unit.removed {
            self.sight
                .unmark_sight(unit.owner, unit.position, unit.sight_radius);
            unit.sight_range = unit.variable(VariableId::SIGHT_RANGE).max + sign * sight_delta;
            unit.refresh_sight();
            self.sight
                .mark_sight(unit.owner, unit.position, unit.sight_radius);
        }

        let supply = modifier.variable_delta(VariableId::SUPPLY).value;
        let demand = modifier.variable_delta(VariableId::DEMAND).value;
        let owner = &mut self.state.players[unit.owner];
        owner.supply += sign * supply;
        owner.demand += sign * demand;
    }

    fn apply_income(
        &mut self,
        player: PlayerId,
        unit_type: UnitTypeId,
        resource: ResourceId,
        delta: i32,
        direction: Direction,
        owns_type: bool,
    ) {
        let default_income = self.ruleset.resources.default_income(resource);
        let p = &mut self.state.players[player];
        let stat = p.stats[unit_type].improve_income.entry(resource);
        match direction {
            Direction::Apply => {
                if *stat == 0 {
                    *stat = default_income;
                }
                *stat += delta;
                let stat = *stat;
                if owns_type {
                    let income = p.incomes.entry(resource);
                    *income = (*income).max(stat);
                }
            }
            Direction::Reverse => {
                let before = *stat;
                *stat -= delta;
                let income = p.incomes.value(resource);
                if before == income && income != 0 {
                    let rescanned = self.rescan_income(player, resource);
                    *self.state.players[player].incomes.entry(resource) = rescanned;
                }
            }
        }
    }

    /// Best improve-income among the player's units, or the resource default.
    fn rescan_income(&self, player: PlayerId, resource: ResourceId) -> i32 {
        let p = &self.state.players[player];
        p.units
            .iter()
            .filter_map(|id| self.state.units.get(*id))
            .map(|u| p.stats[u.unit_type].improve_income.value(resource))
            .fold(self.ruleset.resources.default_income(resource), i32::max)
    }

    /// Apply or reverse one modifier for a single unit.
    pub(crate) fn apply_individual_modifier(&mut self, id: UnitId, modifier: &UpgradeModifier, direction: Direction) {
        tracing::trace!(
            unit = %id,
            upgrade = %self.ruleset.upgrades.get(modifier.upgrade).ident,
            ?direction,
            "Applying individual upgrade modifier"
        );
        self.update_unit_sight_and_supply(id, modifier, direction);
        if let Some(unit) = self.state.units.get_mut(id) {
            modify_unit_variables(unit, modifier, direction);
        }
        self.reselect_variation(id, modifier.upgrade, direction);

        // Individual conversions are one-way.
        if let (Some(target), Direction::Apply) = (modifier.convert_to, direction) {
            self.transform_unit(id, target);
        }
    }

    fn trait_suppressed(&self, unit: &Unit, upgrade: UpgradeId) -> bool {
        self.ruleset.upgrades.get(upgrade).is_trait
            && !unit.character
            && self.state.settings.no_randomness
    }

    /// A unit gained one level of an individual upgrade.
    pub(crate) fn individual_upgrade_acquire(&mut self, id: UnitId, upgrade: UpgradeId) {
        let ruleset = self.ruleset;
        let def = ruleset.upgrades.get(upgrade);
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };
        *unit.individual_upgrades.entry(upgrade).or_insert(0) += 1;
        let owner = unit.owner;
        self.state.players[owner].upgrade_timers[upgrade] = def.time_cost();
        tracing::debug!(unit = %id, upgrade = %def.ident, "Individual upgrade acquired");

        let Some(unit) = self.state.units.get(id) else {
            return;
        };
        if self.trait_suppressed(unit, upgrade) {
            tracing::debug!(unit = %id, upgrade = %def.ident, "Trait modifiers suppressed");
            return;
        }
        for modifier in ruleset.modifiers.modifiers_for(upgrade) {
            self.apply_individual_modifier(id, modifier, Direction::Apply);
        }
    }

    /// A unit lost one level of an individual upgrade, or every level.
    pub(crate) fn individual_upgrade_lost(&mut self, id: UnitId, upgrade: UpgradeId, lose_all: bool) {
        let ruleset = self.ruleset;
        let def = ruleset.upgrades.get(upgrade);
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };
        let held = unit.individual_upgrade_count(upgrade);
        self.state.players[unit.owner].upgrade_timers[upgrade] = 0;
        if held == 0 {
            tracing::warn!(unit = %id, upgrade = %def.ident, "Losing an individual upgrade the unit does not hold");
            return;
        }

        let levels = if lose_all { held } else { 1 };
        if held == levels {
            unit.individual_upgrades.remove(&upgrade);
            if unit.unit_trait == Some(upgrade) {
                unit.unit_trait = None;
            }
        } else {
            unit.individual_upgrades.insert(upgrade, held - levels);
        }
        tracing::debug!(unit = %id, upgrade = %def.ident, levels, "Individual upgrade lost");

        let Some(unit) = self.state.units.get(id) else {
            return;
        };
        if self.trait_suppressed(unit, upgrade) {
            return;
        }
        for _ in 0..levels {
            for modifier in ruleset.modifiers.modifiers_for(upgrade) {
                self.apply_individual_modifier(id, modifier, Direction::Reverse);
            }
        }
    }

    #[cfg(feature = "debug-validation")]
    fn validate_player_units(&self, player: PlayerId) {
        for id in &self.state.players[player].units {
            if let Some(unit) = self.state.units.get(*id) {
                for (variable, var) in unit.variables.iter() {
                    debug_assert!(
                        (0..=var.max).contains(&var.value),
                        "unit {id} variable {variable} out of range: {} / {}",
                        var.value,
                        var.max
                    );
                }
            }
        }
    }
}

fn modify_unit_variables(unit: &mut Unit, modifier: &UpgradeModifier, direction: Direction) {
    for variable in modifier.touched_variables() {
        unit.variables.entry(variable).modify(
            &modifier.variable_delta(variable),
            modifier.percent(variable),
            direction,
        );
    }
}
