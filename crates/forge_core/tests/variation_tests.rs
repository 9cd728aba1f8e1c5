//! Variation selection and reselection.

use forge_core::prelude::*;
use forge_test_utils::fixtures::{spawn_row, standard_world, tile};
use forge_test_utils::sight::RecordingSightMap;

const P0: PlayerId = PlayerId(0);

struct Archery {
    ruleset: Ruleset,
    archer: UnitTypeId,
    fletching: UpgradeId,
    veteran: UpgradeId,
}

/// An archer type whose variations are configured by the caller.
fn archery(variations: impl FnOnce(UpgradeId, UpgradeId) -> Vec<Variation>) -> Archery {
    let mut ruleset = Ruleset::new();
    let damage = ruleset.register_variable("PiercingDamage");
    let fletching = ruleset.upgrade("upgrade-fletching");
    let veteran = ruleset.upgrade("upgrade-veteran");
    ruleset.upgrade_mut(veteran).ability = true;

    let stats = ruleset
        .blank_stats()
        .with_variable(VariableId::SIGHT_RANGE, Variable::new(5, 5))
        .with_variable(damage, Variable::new(4, 4));
    let archer = ruleset
        .register_unit_type("unit-archer", "Archer", stats)
        .unwrap();
    for variation in variations(fletching, veteran) {
        ruleset.add_variation(archer, variation);
    }

    ruleset
        .register_modifier(
            UpgradeModifier::new(fletching)
                .applying_to(archer)
                .with_variable(damage, VariableDelta::flat(1)),
        )
        .unwrap();
    ruleset
        .register_modifier(
            UpgradeModifier::new(veteran).with_variable(damage, VariableDelta::flat(2)),
        )
        .unwrap();

    Archery {
        ruleset,
        archer,
        fletching,
        veteran,
    }
}

fn world_of<S: SightMap>(ruleset: Ruleset, sight: S) -> World<S> {
    let mut world = World::new(ruleset, GameSettings::default(), 17, sight);
    world.add_player();
    world
}

fn variation_ident<S: SightMap>(world: &World<S>, unit: UnitId) -> Option<String> {
    let unit = world.unit(unit).unwrap();
    let unit_type = world.ruleset().unit_types.get(unit.unit_type);
    unit.variation.map(|i| unit_type.variations[i].ident.clone())
}

#[test]
fn test_spawn_picks_allowed_variation() {
    let (mut world, ids) = standard_world(3);
    let units = spawn_row(&mut world, P0, ids.footman, 4, (2, 2));
    for unit in units {
        assert_eq!(variation_ident(&world, unit).as_deref(), Some("short-sword"));
    }
}

#[test]
fn test_research_swaps_forbidden_variation() {
    let (mut world, ids) = standard_world(3);
    let units = spawn_row(&mut world, P0, ids.footman, 2, (2, 2));
    world.take_events();

    world.upgrade_acquire(P0, ids.iron_forged).unwrap();
    for &unit in &units {
        assert_eq!(variation_ident(&world, unit).as_deref(), Some("long-sword"));
    }
    let changes = world
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, UpgradeEvent::VariationChanged { .. }))
        .count();
    assert_eq!(changes, 2);

    world.upgrade_lost(P0, ids.iron_forged).unwrap();
    for &unit in &units {
        assert_eq!(variation_ident(&world, unit).as_deref(), Some("short-sword"));
    }
}

#[test]
fn test_no_valid_candidate_keeps_current_variation() {
    let Archery {
        ruleset,
        archer,
        fletching,
        ..
    } = archery(|fletching, _| vec![Variation::new("plain-bow").forbidding(fletching)]);
    let mut world = world_of(ruleset, FogOfWar::new(16, 16));
    let unit = world.spawn_unit(P0, archer, tile(4, 4)).unwrap();
    assert_eq!(world.unit(unit).unwrap().variation, Some(0));
    world.take_events();

    world.upgrade_acquire(P0, fletching).unwrap();

    assert_eq!(world.unit(unit).unwrap().variation, Some(0));
    assert!(world
        .take_events()
        .iter()
        .all(|e| !matches!(e, UpgradeEvent::VariationChanged { .. })));
}

#[test]
fn test_unit_without_valid_variation_gets_one_later() {
    let Archery {
        ruleset,
        archer,
        fletching,
        ..
    } = archery(|fletching, _| vec![Variation::new("fletched-bow").requiring(fletching)]);
    let mut world = world_of(ruleset, FogOfWar::new(16, 16));
    let unit = world.spawn_unit(P0, archer, tile(4, 4)).unwrap();
    assert_eq!(world.unit(unit).unwrap().variation, None);

    world.upgrade_acquire(P0, fletching).unwrap();
    assert_eq!(variation_ident(&world, unit).as_deref(), Some("fletched-bow"));
}

#[test]
fn test_tileset_filters_variations() {
    let Archery { ruleset, archer, .. } = archery(|_, _| {
        vec![
            Variation::new("summer-cloak").on_tileset("summer"),
            Variation::new("winter-cloak").on_tileset("winter"),
        ]
    });
    let mut world = world_of(ruleset, FogOfWar::new(16, 16));
    world.set_tileset(Some("winter".to_string()));
    let unit = world.spawn_unit(P0, archer, tile(1, 1)).unwrap();
    assert_eq!(variation_ident(&world, unit).as_deref(), Some("winter-cloak"));
}

#[test]
fn test_terrain_filters_variations() {
    let Archery { ruleset, archer, .. } = archery(|_, _| {
        vec![
            Variation::new("grass-cloak").on_terrain("grass"),
            Variation::new("snow-cloak").on_terrain("snow"),
        ]
    });
    let mut world = world_of(ruleset, RecordingSightMap::new().with_terrain("snow"));
    let unit = world.spawn_unit(P0, archer, tile(1, 1)).unwrap();
    assert_eq!(variation_ident(&world, unit).as_deref(), Some("snow-cloak"));
}

#[test]
fn test_fog_of_war_terrain_lookup() {
    let Archery { ruleset, archer, .. } = archery(|_, _| {
        vec![
            Variation::new("grass-cloak").on_terrain("grass"),
            Variation::new("snow-cloak").on_terrain("snow"),
        ]
    });
    let mut fog = FogOfWar::new(16, 16);
    fog.set_terrain(3, 3, "grass");
    let mut world = world_of(ruleset, fog);
    let unit = world.spawn_unit(P0, archer, tile(3, 3)).unwrap();
    assert_eq!(variation_ident(&world, unit).as_deref(), Some("grass-cloak"));
}

#[test]
fn test_priority_substring_wins() {
    let Archery { ruleset, archer, .. } =
        archery(|_, _| vec![Variation::new("long-bow"), Variation::new("short-bow")]);
    let mut world = world_of(ruleset, FogOfWar::new(16, 16));
    let unit = world.spawn_unit(P0, archer, tile(2, 2)).unwrap();

    world.choose_variation(unit, Some("short")).unwrap();
    assert_eq!(variation_ident(&world, unit).as_deref(), Some("short-bow"));

    world.choose_variation(unit, Some("elite-long-bow")).unwrap();
    assert_eq!(variation_ident(&world, unit).as_deref(), Some("long-bow"));
}

#[test]
fn test_individual_upgrade_counts_as_held() {
    let Archery {
        ruleset,
        archer,
        veteran,
        ..
    } = archery(|_, veteran| {
        vec![
            Variation::new("recruit").forbidding(veteran),
            Variation::new("veteran").requiring(veteran),
        ]
    });
    let mut world = world_of(ruleset, FogOfWar::new(16, 16));
    let first = world.spawn_unit(P0, archer, tile(2, 2)).unwrap();
    let second = world.spawn_unit(P0, archer, tile(3, 2)).unwrap();

    world.ability_acquire(first, veteran).unwrap();
    assert_eq!(variation_ident(&world, first).as_deref(), Some("veteran"));
    assert_eq!(variation_ident(&world, second).as_deref(), Some("recruit"));

    world.ability_lost(first, veteran).unwrap();
    assert_eq!(variation_ident(&world, first).as_deref(), Some("recruit"));
}

#[test]
fn test_variation_choice_is_seeded() {
    let pick = |seed: u64| {
        let Archery { ruleset, archer, .. } = archery(|_, _| {
            (0..8)
                .map(|i| Variation::new(format!("look-{i}")))
                .collect()
        });
        let mut world = World::new(ruleset, GameSettings::default(), seed, FogOfWar::new(8, 8));
        world.add_player();
        let units: Vec<UnitId> = (0..4)
            .map(|x| world.spawn_unit(P0, archer, tile(x, 0)).unwrap())
            .collect();
        units
            .into_iter()
            .map(|u| world.unit(u).unwrap().variation)
            .collect::<Vec<_>>()
    };
    assert_eq!(pick(99), pick(99));
}

#[test]
fn test_choose_variation_unknown_unit() {
    let (mut world, _) = standard_world(1);
    assert!(matches!(
        world.choose_variation(UnitId(404), None),
        Err(GameError::UnitNotFound(404))
    ));
}
