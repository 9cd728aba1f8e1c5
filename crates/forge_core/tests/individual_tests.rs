//! Per-unit upgrades: abilities, traits and stacked levels.

use forge_core::prelude::*;
use forge_test_utils::fixtures::{standard_world, standard_world_with, tile, MAP_SIZE};

const P0: PlayerId = PlayerId(0);

#[test]
fn test_ability_levels_stack_and_unwind() {
    let (mut world, ids) = standard_world(4);
    let footman = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();
    let damage = |world: &World, id| world.unit(id).unwrap().variable(ids.piercing_damage);

    world.ability_acquire(footman, ids.critical_strike).unwrap();
    assert_eq!(damage(&world, footman), Variable::new(6, 6));
    world
        .individual_upgrade_acquire(footman, ids.critical_strike)
        .unwrap();
    assert_eq!(damage(&world, footman), Variable::new(7, 7));
    assert_eq!(
        world
            .unit(footman)
            .unwrap()
            .individual_upgrade_count(ids.critical_strike),
        2
    );

    world.ability_lost(footman, ids.critical_strike).unwrap();
    assert_eq!(damage(&world, footman), Variable::new(6, 6));

    world
        .individual_upgrade_acquire(footman, ids.critical_strike)
        .unwrap();
    world
        .individual_upgrade_lost(footman, ids.critical_strike, true)
        .unwrap();
    assert_eq!(damage(&world, footman), Variable::new(5, 5));
    assert!(world.unit(footman).unwrap().individual_upgrades.is_empty());

    // Player stat blocks never see individual upgrades.
    assert_eq!(
        world
            .player(P0)
            .unwrap()
            .stats(ids.footman)
            .variable(ids.piercing_damage),
        Variable::new(5, 5)
    );
}

#[test]
fn test_individual_upgrade_touches_only_its_unit() {
    let (mut world, ids) = standard_world(4);
    let first = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();
    let second = world.spawn_unit(P0, ids.footman, tile(9, 8)).unwrap();

    world.ability_acquire(first, ids.critical_strike).unwrap();

    assert_eq!(
        world.unit(second).unwrap().variable(ids.piercing_damage),
        Variable::new(5, 5)
    );
    assert_eq!(
        world.upgrade_id_allowed(P0, ids.critical_strike).unwrap(),
        UpgradeState::Allowed
    );
}

#[test]
fn test_ability_check() {
    let (mut world, ids) = standard_world(4);
    let footman = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();

    let result = world.ability_acquire(footman, ids.strong);
    assert!(matches!(result, Err(GameError::NotAnAbility(ref ident)) if ident == "upgrade-strong"));
    assert!(matches!(
        world.ability_lost(footman, ids.quick),
        Err(GameError::NotAnAbility(_))
    ));
    assert!(world.unit(footman).unwrap().individual_upgrades.is_empty());
}

#[test]
fn test_losing_unheld_upgrade_is_noop() {
    let (mut world, ids) = standard_world(4);
    let footman = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();
    let before = world.unit(footman).unwrap().clone();

    world
        .individual_upgrade_lost(footman, ids.critical_strike, false)
        .unwrap();
    world
        .individual_upgrade_lost(footman, ids.critical_strike, true)
        .unwrap();

    assert_eq!(world.unit(footman).unwrap(), &before);
}

#[test]
fn test_trait_replaces_previous_trait() {
    let (mut world, ids) = standard_world(4);
    let footman = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();

    world.trait_acquire(footman, ids.strong).unwrap();
    let unit = world.unit(footman).unwrap();
    assert_eq!(unit.variable(ids.hit_points), Variable::new(70, 70));
    assert_eq!(unit.unit_trait, Some(ids.strong));

    world.trait_acquire(footman, ids.quick).unwrap();
    let unit = world.unit(footman).unwrap();
    assert_eq!(unit.variable(ids.hit_points), Variable::new(60, 60));
    assert_eq!(unit.variable(ids.armor), Variable::new(3, 3));
    assert_eq!(unit.unit_trait, Some(ids.quick));
    assert_eq!(unit.individual_upgrade_count(ids.strong), 0);
    assert_eq!(unit.individual_upgrade_count(ids.quick), 1);
}

#[test]
fn test_traits_suppressed_without_randomness() {
    let settings = GameSettings {
        no_randomness: true,
        ..GameSettings::default()
    };
    let (mut world, ids) = standard_world_with(settings, 4, FogOfWar::new(MAP_SIZE, MAP_SIZE));
    let soldier = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();
    let hero = world.spawn_unit(P0, ids.footman, tile(9, 8)).unwrap();
    world.unit_mut(hero).unwrap().character = true;

    world.trait_acquire(soldier, ids.strong).unwrap();
    world.trait_acquire(hero, ids.strong).unwrap();

    let soldier_unit = world.unit(soldier).unwrap();
    assert_eq!(soldier_unit.variable(ids.hit_points), Variable::new(60, 60));
    assert_eq!(soldier_unit.unit_trait, Some(ids.strong));
    assert_eq!(soldier_unit.individual_upgrade_count(ids.strong), 1);
    assert_eq!(
        world.unit(hero).unwrap().variable(ids.hit_points),
        Variable::new(70, 70)
    );

    // Abilities are never suppressed.
    world.ability_acquire(soldier, ids.critical_strike).unwrap();
    assert_eq!(
        world.unit(soldier).unwrap().variable(ids.piercing_damage),
        Variable::new(6, 6)
    );
}

#[test]
fn test_individual_upgrade_sets_timer() {
    let (mut world, ids) = standard_world(4);
    let footman = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();

    world.individual_upgrade_acquire(footman, ids.iron_forged).unwrap();
    assert_eq!(world.player(P0).unwrap().upgrade_timers[ids.iron_forged], 200);
    world
        .individual_upgrade_lost(footman, ids.iron_forged, false)
        .unwrap();
    assert_eq!(world.player(P0).unwrap().upgrade_timers[ids.iron_forged], 0);
}

#[test]
fn test_individual_upgrade_drives_variation() {
    let (mut world, ids) = standard_world(4);
    let footman = world.spawn_unit(P0, ids.footman, tile(8, 8)).unwrap();
    let ident = |world: &World| {
        let unit = world.unit(footman).unwrap();
        let variations = &world.ruleset().unit_types.get(ids.footman).variations;
        unit.variation.map(|i| variations[i].ident.clone())
    };

    world.individual_upgrade_acquire(footman, ids.iron_forged).unwrap();
    assert_eq!(ident(&world).as_deref(), Some("long-sword"));
    assert_eq!(
        world.unit(footman).unwrap().variable(ids.piercing_damage),
        Variable::new(7, 7)
    );

    world
        .individual_upgrade_lost(footman, ids.iron_forged, false)
        .unwrap();
    assert_eq!(ident(&world).as_deref(), Some("short-sword"));
}

#[test]
fn test_unknown_unit() {
    let (mut world, ids) = standard_world(4);
    assert!(matches!(
        world.individual_upgrade_acquire(UnitId(999), ids.critical_strike),
        Err(GameError::UnitNotFound(999))
    ));
    assert!(matches!(
        world.individual_upgrade_lost(UnitId(999), ids.critical_strike, true),
        Err(GameError::UnitNotFound(999))
    ));
    assert!(matches!(
        world.trait_acquire(UnitId(999), ids.strong),
        Err(GameError::UnitNotFound(999))
    ));
}
