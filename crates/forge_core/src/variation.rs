//! Variation reselection.

use crate::events::UpgradeEvent;
use crate::ids::{UnitId, UpgradeId};
use crate::modifier::Direction;
use crate::sight::SightMap;
use crate::world::Engine;

impl<S: SightMap> Engine<'_, S> {
    /// Re-pick a unit's variation if an upgrade change invalidated it.
    ///
    /// Applying an upgrade invalidates variations that forbid it; reversing
    /// one invalidates variations that require it. A unit without a
    /// variation always gets another chance.
    pub(crate) fn reselect_variation(&mut self, id: UnitId, upgrade: UpgradeId, direction: Direction) {
        let Some(unit) = self.state.units.get(id) else {
            return;
        };
        let unit_type = self.ruleset.unit_types.get(unit.unit_type);
        let invalid = match unit.variation.and_then(|i| unit_type.variations.get(i)) {
            Some(variation) => match direction {
                Direction::Apply => variation.upgrades_forbidden.contains(&upgrade),
                Direction::Reverse => variation.upgrades_required.contains(&upgrade),
            },
            None => !unit_type.variations.is_empty(),
        };
        if invalid {
            let priority = unit
                .variation
                .and_then(|i| unit_type.variations.get(i))
                .map(|v| v.ident.clone());
            self.choose_variation(id, priority);
        }
    }

    /// Pick a variation of the unit's current type.
    ///
    /// Candidates fit the map context and the unit's held upgrades. The
    /// first candidate whose identifier overlaps `priority` wins outright;
    /// otherwise one is drawn uniformly. With no candidates the current
    /// variation is kept.
    pub(crate) fn choose_variation(&mut self, id: UnitId, priority: Option<String>) {
        let ruleset = self.ruleset;
        let Some(unit) = self.state.units.get(id) else {
            return;
        };
        let owner = &self.state.players[unit.owner];
        let variations = &ruleset.unit_types.get(unit.unit_type).variations;
        if variations.is_empty() {
            return;
        }

        let tileset = self.state.tileset.as_deref();
        let terrain = self.sight.terrain_at(unit.position);
        let held = |upgrade: &UpgradeId| {
            owner.allow.is_researched(*upgrade) || unit.individual_upgrade_count(*upgrade) > 0
        };
        let priority = priority.filter(|p| !p.is_empty());

        let mut candidates = Vec::new();
        let mut preferred = None;
        for (index, variation) in variations.iter().enumerate() {
            if !variation.fits_context(tileset, terrain)
                || !variation.upgrades_required.iter().all(held)
                || variation.upgrades_forbidden.iter().any(held)
            {
                continue;
            }
            if let Some(p) = &priority {
                if variation.ident.contains(p.as_str()) || p.contains(variation.ident.as_str()) {
                    preferred = Some(index);
                    break;
                }
            }
            candidates.push(index);
        }
        let previous = unit.variation;

        let chosen = preferred.or_else(|| {
            self.state
                .rng
                .draw_index(candidates.len())
                .map(|k| candidates[k])
        });
        let Some(chosen) = chosen else {
            tracing::debug!(unit = %id, "No valid variation, keeping the current one");
            return;
        };
        if let Some(unit) = self.state.units.get_mut(id) {
            unit.variation = Some(chosen);
        }
        if previous != Some(chosen) {
            let ident = |i: Option<usize>| i.and_then(|i| variations.get(i)).map(|v| v.ident.clone());
            tracing::trace!(unit = %id, variation = %variations[chosen].ident, "Variation changed");
            self.events.push(UpgradeEvent::VariationChanged {
                unit: id,
                from: ident(previous),
                to: ident(Some(chosen)),
            });
        }
    }
}
