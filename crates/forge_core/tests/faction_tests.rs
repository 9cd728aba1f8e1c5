//! Faction re-rolls and civilization changes.

use forge_core::prelude::*;
use forge_test_utils::fixtures::{standard_world, standard_world_with, MAP_SIZE};

const P0: PlayerId = PlayerId(0);
const P1: PlayerId = PlayerId(1);

fn faction_events(events: &[UpgradeEvent]) -> Vec<&UpgradeEvent> {
    events
        .iter()
        .filter(|e| matches!(e, UpgradeEvent::FactionChanged { .. }))
        .collect()
}

#[test]
fn test_writing_turns_tribe_into_polity() {
    let (mut world, ids) = standard_world(21);

    world.upgrade_acquire(P0, ids.writing).unwrap();

    let faction = world.player(P0).unwrap().faction;
    assert!(faction == Some(ids.saxony) || faction == Some(ids.francia));
    let events = world.take_events();
    assert_eq!(
        faction_events(&events),
        [&UpgradeEvent::FactionChanged {
            player: P0,
            from: Some(ids.saxon_tribe),
            to: faction,
        }]
    );
    assert_eq!(
        world.upgrade_id_allowed(P0, ids.teutonic_customs).unwrap(),
        UpgradeState::Forbidden
    );
    assert_eq!(world.player(P1).unwrap().faction, Some(ids.frank_tribe));
}

#[test]
fn test_occupied_faction_skipped() {
    for seed in 0..8 {
        let (mut world, ids) = standard_world(seed);
        world.player_mut(P1).unwrap().faction = Some(ids.saxony);

        world.upgrade_acquire(P0, ids.writing).unwrap();

        assert_eq!(world.player(P0).unwrap().faction, Some(ids.francia));
    }
}

#[test]
fn test_no_free_faction_clears_it() {
    let (mut world, ids) = standard_world(21);
    let p2 = world.add_player();
    world.player_mut(P1).unwrap().faction = Some(ids.saxony);
    {
        let p = world.player_mut(p2).unwrap();
        p.civilization = Some(ids.germanic);
        p.faction = Some(ids.francia);
    }

    world.upgrade_acquire(P0, ids.writing).unwrap();

    assert_eq!(world.player(P0).unwrap().faction, None);
    let events = world.take_events();
    assert_eq!(
        faction_events(&events),
        [&UpgradeEvent::FactionChanged {
            player: P0,
            from: Some(ids.saxon_tribe),
            to: None,
        }]
    );
}

#[test]
fn test_grand_strategy_keeps_faction() {
    let settings = GameSettings {
        grand_strategy: true,
        ..GameSettings::default()
    };
    let (mut world, ids) = standard_world_with(settings, 21, FogOfWar::new(MAP_SIZE, MAP_SIZE));

    world.upgrade_acquire(P0, ids.writing).unwrap();

    assert_eq!(world.player(P0).unwrap().faction, Some(ids.saxon_tribe));
    assert!(faction_events(&world.take_events()).is_empty());
}

#[test]
fn test_polity_keeps_faction() {
    let (mut world, ids) = standard_world(21);
    world.player_mut(P0).unwrap().faction = Some(ids.saxony);

    world.upgrade_acquire(P0, ids.writing).unwrap();

    assert_eq!(world.player(P0).unwrap().faction, Some(ids.saxony));
    assert!(faction_events(&world.take_events()).is_empty());
}

#[test]
fn test_custom_polity_class() {
    let settings = GameSettings {
        polity_class: "masonry".to_string(),
        ..GameSettings::default()
    };
    let (mut world, ids) = standard_world_with(settings, 21, FogOfWar::new(MAP_SIZE, MAP_SIZE));

    world.upgrade_acquire(P0, ids.writing).unwrap();

    assert_eq!(world.player(P0).unwrap().faction, Some(ids.saxon_tribe));
}

#[test]
fn test_allow_researched_triggers_reroll() {
    let (mut world, ids) = standard_world(21);

    world
        .allow_upgrade_id(P0, ids.writing, UpgradeState::Researched)
        .unwrap();

    let faction = world.player(P0).unwrap().faction;
    assert!(faction == Some(ids.saxony) || faction == Some(ids.francia));
    // Only the state changed; the modifier did not run.
    assert_eq!(
        world.upgrade_id_allowed(P0, ids.teutonic_customs).unwrap(),
        UpgradeState::Allowed
    );
}

#[test]
fn test_civilization_change_waits_for_running_game() {
    let (mut world, ids) = standard_world(21);

    world.upgrade_acquire(P0, ids.teutonic_customs).unwrap();

    let p = world.player(P0).unwrap();
    assert_eq!(p.civilization, Some(ids.germanic));
    assert_eq!(p.faction, Some(ids.saxon_tribe));
    assert!(world.take_events().is_empty());
}

#[test]
fn test_civilization_change() {
    let settings = GameSettings {
        local_player: Some(P0),
        ..GameSettings::default()
    };
    let (mut world, ids) = standard_world_with(settings, 21, FogOfWar::new(MAP_SIZE, MAP_SIZE));
    world.set_cycle(10);

    world.upgrade_acquire(P0, ids.teutonic_customs).unwrap();

    assert_eq!(
        world.take_events(),
        vec![
            UpgradeEvent::CivilizationChanged {
                player: P0,
                from: Some(ids.germanic),
                to: ids.teutonic,
            },
            UpgradeEvent::InterfaceReloaded { player: P0 },
            UpgradeEvent::FactionChanged {
                player: P0,
                from: Some(ids.saxon_tribe),
                to: Some(ids.thuringian_tribe),
            },
        ]
    );

    world.upgrade_lost(P0, ids.teutonic_customs).unwrap();
    let p = world.player(P0).unwrap();
    assert_eq!(p.civilization, Some(ids.teutonic));
    assert_eq!(p.faction, Some(ids.thuringian_tribe));
}

#[test]
fn test_remote_civilization_change_skips_interface() {
    let settings = GameSettings {
        local_player: Some(P0),
        ..GameSettings::default()
    };
    let (mut world, ids) = standard_world_with(settings, 21, FogOfWar::new(MAP_SIZE, MAP_SIZE));
    world.set_cycle(10);

    world.upgrade_acquire(P1, ids.teutonic_customs).unwrap();

    let events = world.take_events();
    assert!(events
        .iter()
        .all(|e| !matches!(e, UpgradeEvent::InterfaceReloaded { .. })));
    assert_eq!(world.player(P1).unwrap().civilization, Some(ids.teutonic));
}

#[test]
fn test_polity_research_carries_across_civilizations() {
    let (mut world, ids) = standard_world(21);
    world.set_cycle(10);

    world.upgrade_acquire(P0, ids.writing).unwrap();
    world.upgrade_acquire(P0, ids.teutonic_customs).unwrap();

    // The unplayable empire is never drawn.
    assert_eq!(world.player(P0).unwrap().faction, Some(ids.thuringia));
}
