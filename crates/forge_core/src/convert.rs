//! Unit type conversion.
//!
//! An upgrade can turn every unit of one type into another (e.g. a
//! civilization-specific replacement of a generic unit). Conversion moves
//! the units themselves, the orders that would produce more of the old
//! type, and the AI's wishes for it.

use crate::events::UpgradeEvent;
use crate::ids::{PlayerId, UnitId, UnitTypeId, VariableId};
use crate::math::scale_ratio;
use crate::modifier::Direction;
use crate::sight::SightMap;
use crate::variables::Variable;
use crate::world::Engine;

impl<S: SightMap> Engine<'_, S> {
    /// Convert a player's units of type `from` into type `to`.
    ///
    /// Applying also forbids `from`. Pending orders and AI requests are
    /// only rewritten once the game is running.
    pub(crate) fn convert_unit_type(
        &mut self,
        player: PlayerId,
        from: UnitTypeId,
        to: UnitTypeId,
        direction: Direction,
    ) {
        let running = self.state.cycle > 0;
        let p = &mut self.state.players[player];
        if direction == Direction::Apply {
            p.allow.set_unit(from, 0);
        }
        if p.ai_enabled && running {
            let replaced = p.ai.replace_unit_type(from, to);
            tracing::trace!(player = %player, replaced, "Rewrote AI unit type requests");
        }

        let units = p.units.clone();
        for id in units {
            let Some(unit) = self.state.units.get_mut(id) else {
                continue;
            };
            if unit.unit_type == from {
                self.transform_unit(id, to);
            } else if running {
                for target in unit.orders.iter_mut().filter_map(|o| o.target_type_mut()) {
                    if *target == from {
                        *target = to;
                    }
                }
            }
        }
    }

    /// Turn one unit into another type, rescaling its variables.
    pub(crate) fn transform_unit(&mut self, id: UnitId, to: UnitTypeId) {
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };
        let from = unit.unit_type;
        if from == to {
            return;
        }
        let owner = &mut self.state.players[unit.owner];
        let new_stats = &owner.stats[to];

        let old_supply = unit.variable(VariableId::SUPPLY).value;
        let old_demand = unit.variable(VariableId::DEMAND).value;
        unit.variables
            .resize(new_stats.variables.len(), Variable::default());
        for (variable, var) in unit.variables.iter_mut() {
            let new = new_stats.variable(variable);
            var.value = if var.max != 0 && var.value != 0 {
                scale_ratio(var.value, new.max, var.max)
            } else {
                new.value
            };
            var.max = new.max;
            var.increase = new.increase;
            var.enable = new.enable;
            var.clamp();
        }
        owner.supply += unit.variable(VariableId::SUPPLY).value - old_supply;
        owner.demand += unit.variable(VariableId::DEMAND).value - old_demand;

        if !unit.removed {
            self.sight
                .unmark_sight(unit.owner, unit.position, unit.sight_radius);
        }
        unit.sight_range = unit.variable(VariableId::SIGHT_RANGE).max;
        unit.refresh_sight();
        if !unit.removed {
            self.sight
                .mark_sight(unit.owner, unit.position, unit.sight_radius);
        }

        let variations = &self.ruleset.unit_types.get(from).variations;
        let priority = unit
            .variation
            .and_then(|i| variations.get(i))
            .map(|v| v.ident.clone());
        unit.unit_type = to;
        unit.variation = None;

        tracing::debug!(unit = %id, from = %from, to = %to, "Unit transformed");
        self.events.push(UpgradeEvent::UnitTransformed { unit: id, from, to });
        self.choose_variation(id, priority);
    }
}
