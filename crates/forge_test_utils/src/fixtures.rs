//! Test fixtures and helpers.
//!
//! The standard ruleset (`assets/data/ruleset.ron`) and pre-built worlds
//! for consistent testing.

use fixed::types::I32F32;
use forge_core::prelude::*;

/// The standard rules document.
pub const STANDARD_RULES: &str = include_str!("../../../assets/data/ruleset.ron");

/// Side length of the map used by [`standard_world`].
pub const MAP_SIZE: u32 = 64;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Center of a map tile.
#[must_use]
pub fn tile(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::tile_center(x, y)
}

/// Build the standard ruleset.
///
/// # Panics
///
/// Panics if the bundled rules document is invalid.
#[must_use]
pub fn standard_ruleset() -> Ruleset {
    Ruleset::from_ron_str(STANDARD_RULES).expect("bundled ruleset is valid")
}

/// Handles of everything the standard ruleset declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct StandardIds {
    pub gold: ResourceId,
    pub wood: ResourceId,

    pub hit_points: VariableId,
    pub armor: VariableId,
    pub piercing_damage: VariableId,

    pub germanic: CivilizationId,
    pub teutonic: CivilizationId,
    pub saxon_tribe: FactionId,
    pub frank_tribe: FactionId,
    pub saxony: FactionId,
    pub francia: FactionId,
    pub thuringian_tribe: FactionId,
    pub thuringia: FactionId,

    pub iron_forged: UpgradeId,
    pub eagle_eye: UpgradeId,
    pub masonry: UpgradeId,
    pub improved_lumber: UpgradeId,
    pub levy: UpgradeId,
    pub chivalry: UpgradeId,
    pub writing: UpgradeId,
    pub teutonic_customs: UpgradeId,
    pub critical_strike: UpgradeId,
    pub strong: UpgradeId,
    pub quick: UpgradeId,

    pub peasant: UnitTypeId,
    pub footman: UnitTypeId,
    pub knight: UnitTypeId,
    pub farm: UnitTypeId,
    pub town_hall: UnitTypeId,
}

impl StandardIds {
    /// Look every handle up by identifier.
    ///
    /// # Panics
    ///
    /// Panics if `ruleset` is not the standard ruleset.
    #[must_use]
    pub fn resolve(ruleset: &Ruleset) -> Self {
        let resource = |ident: &str| ruleset.resources.require(ident).expect(ident);
        let variable = |name: &str| ruleset.variables.require(name).expect(name);
        let civilization = |ident: &str| ruleset.factions.require_civilization(ident).expect(ident);
        let faction = |ident: &str| ruleset.factions.require_faction(ident).expect(ident);
        let upgrade = |ident: &str| ruleset.upgrades.require(ident).expect(ident);
        let unit_type = |ident: &str| ruleset.unit_types.require(ident).expect(ident);

        Self {
            gold: resource("gold"),
            wood: resource("wood"),

            hit_points: variable("HitPoints"),
            armor: variable("Armor"),
            piercing_damage: variable("PiercingDamage"),

            germanic: civilization("germanic"),
            teutonic: civilization("teutonic"),
            saxon_tribe: faction("saxon-tribe"),
            frank_tribe: faction("frank-tribe"),
            saxony: faction("saxony"),
            francia: faction("francia"),
            thuringian_tribe: faction("thuringian-tribe"),
            thuringia: faction("thuringia"),

            iron_forged: upgrade("upgrade-iron-forged"),
            eagle_eye: upgrade("upgrade-eagle-eye"),
            masonry: upgrade("upgrade-masonry"),
            improved_lumber: upgrade("upgrade-improved-lumber"),
            levy: upgrade("upgrade-levy"),
            chivalry: upgrade("upgrade-chivalry"),
            writing: upgrade("upgrade-germanic-writing"),
            teutonic_customs: upgrade("upgrade-teutonic-customs"),
            critical_strike: upgrade("upgrade-critical-strike"),
            strong: upgrade("upgrade-strong"),
            quick: upgrade("upgrade-quick"),

            peasant: unit_type("unit-peasant"),
            footman: unit_type("unit-footman"),
            knight: unit_type("unit-knight"),
            farm: unit_type("unit-farm"),
            town_hall: unit_type("unit-town-hall"),
        }
    }
}

/// Create a standard game with two germanic players.
///
/// Player 0 starts as the saxon tribe, player 1 as the frank tribe.
///
/// # Panics
///
/// Panics if the bundled ruleset is invalid.
#[must_use]
pub fn standard_world_with<S: SightMap>(
    settings: GameSettings,
    seed: u64,
    sight: S,
) -> (World<S>, StandardIds) {
    let ruleset = standard_ruleset();
    let ids = StandardIds::resolve(&ruleset);
    let mut world = World::new(ruleset, settings, seed, sight);

    for faction in [ids.saxon_tribe, ids.frank_tribe] {
        let player = world.add_player();
        let p = world.player_mut(player).expect("player just added");
        p.civilization = Some(ids.germanic);
        p.faction = Some(faction);
    }
    (world, ids)
}

/// [`standard_world_with`] on a fog-of-war map with default settings.
#[must_use]
pub fn standard_world(seed: u64) -> (World, StandardIds) {
    standard_world_with(
        GameSettings::default(),
        seed,
        FogOfWar::new(MAP_SIZE, MAP_SIZE),
    )
}

/// Spawn `count` units of one type in a row starting at tile `(x, y)`.
///
/// # Panics
///
/// Panics if `owner` is not a player of `world`.
pub fn spawn_row<S: SightMap>(
    world: &mut World<S>,
    owner: PlayerId,
    unit_type: UnitTypeId,
    count: usize,
    (x, y): (i32, i32),
) -> Vec<UnitId> {
    (0..count)
        .map(|i| {
            let offset = i32::try_from(i).unwrap_or(i32::MAX);
            world
                .spawn_unit(owner, unit_type, tile(x + offset, y))
                .expect("owner exists")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_ruleset_loads() {
        let ruleset = standard_ruleset();
        let ids = StandardIds::resolve(&ruleset);
        assert_eq!(ruleset.unit_types.len(), 5);
        assert_eq!(ruleset.upgrades.get(ids.iron_forged).time_cost(), 200);
        assert!(ruleset.upgrades.get(ids.critical_strike).ability);
        assert!(ruleset.upgrades.get(ids.strong).is_trait);
    }

    #[test]
    fn test_standard_world_players() {
        let (world, ids) = standard_world(1);
        let first = world.player(PlayerId::new(0)).unwrap();
        let second = world.player(PlayerId::new(1)).unwrap();
        assert_eq!(first.faction, Some(ids.saxon_tribe));
        assert_eq!(second.faction, Some(ids.frank_tribe));
        assert!(world.player(PlayerId::new(2)).is_err());
    }

    #[test]
    fn test_spawn_row() {
        let (mut world, ids) = standard_world(1);
        let player = PlayerId::new(0);
        let units = spawn_row(&mut world, player, ids.footman, 3, (10, 10));
        assert_eq!(units.len(), 3);
        assert_eq!(world.player(player).unwrap().demand, 3);
        assert_eq!(world.unit(units[2]).unwrap().position, tile(12, 10));
    }

    #[test]
    fn test_fixed_helpers() {
        assert_eq!(fixed(3), I32F32::from_num(3));
        assert_eq!(fixed_f(0.5) * fixed(2), fixed(1));
    }
}
