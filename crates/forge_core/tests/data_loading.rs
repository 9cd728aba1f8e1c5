//! Building rulesets from RON documents.

use forge_core::prelude::*;
use forge_test_utils::fixtures::{standard_ruleset, StandardIds};

#[test]
fn test_standard_ruleset_registries() {
    let ruleset = standard_ruleset();
    let ids = StandardIds::resolve(&ruleset);

    // "time" plus gold and wood.
    assert_eq!(ruleset.resources.len(), 3);
    assert_eq!(ids.gold, ResourceId::new(1));
    assert_eq!(ruleset.resources.default_income(ids.wood), 100);
    assert_eq!(ruleset.variables.len(), 6);
    assert_eq!(ids.hit_points, VariableId::new(3));
    assert_eq!(ruleset.upgrades.len(), 11);
    assert_eq!(ruleset.modifiers.len(), 11);
    assert_eq!(ids.iron_forged, UpgradeId::new(0));
    assert_eq!(ids.town_hall, UnitTypeId::new(4));
    assert_eq!(ruleset.factions.faction_count(), 7);
}

#[test]
fn test_unit_type_definitions() {
    let ruleset = standard_ruleset();
    let ids = StandardIds::resolve(&ruleset);
    let footman = ruleset.unit_types.get(ids.footman);

    assert_eq!(footman.name, "Footman");
    assert_eq!(footman.default_stats.costs[ids.gold], 600);
    assert_eq!(footman.default_stats.costs[ResourceId::TIME], 60);
    assert_eq!(
        footman.default_stats.variable(VariableId::SIGHT_RANGE),
        Variable::new(4, 4)
    );
    assert_eq!(
        footman.default_stats.variable(ids.piercing_damage),
        Variable::new(5, 5)
    );
    assert_eq!(footman.variations.len(), 2);
    assert_eq!(footman.variations[0].upgrades_forbidden, [ids.iron_forged]);
    assert_eq!(footman.variations[1].upgrades_required, [ids.iron_forged]);
}

#[test]
fn test_modifier_definitions() {
    let ruleset = standard_ruleset();
    let ids = StandardIds::resolve(&ruleset);

    let iron: Vec<&UpgradeModifier> = ruleset.modifiers.modifiers_for(ids.iron_forged).collect();
    assert_eq!(iron.len(), 1);
    assert!(iron[0].applies_to(ids.footman));
    assert!(iron[0].applies_to(ids.knight));
    assert!(!iron[0].applies_to(ids.peasant));
    assert_eq!(iron[0].variable_delta(ids.piercing_damage), VariableDelta::flat(2));

    let masonry = ruleset.modifiers.modifiers_for(ids.masonry).next().unwrap();
    assert_eq!(masonry.percent(ids.hit_points), 20);
    assert_eq!(masonry.costs[ids.wood], -50);

    let levy = ruleset.modifiers.modifiers_for(ids.levy).next().unwrap();
    assert_eq!(levy.unit_allowance(ids.knight), -65_536);
    assert_eq!(levy.speed_research, 10);

    let chivalry = ruleset.modifiers.modifiers_for(ids.chivalry).next().unwrap();
    assert_eq!(chivalry.convert_to, Some(ids.knight));
}

#[test]
fn test_class_upgrade_lookup() {
    let ruleset = standard_ruleset();
    let ids = StandardIds::resolve(&ruleset);

    let writing = ruleset.modifiers.class_id("writing").unwrap();
    assert_eq!(ruleset.modifiers.class_name(writing), "writing");
    assert_eq!(
        ruleset
            .modifiers
            .civilization_class_upgrade(ids.germanic, writing),
        Some(ids.writing)
    );
    assert_eq!(
        ruleset
            .modifiers
            .civilization_class_upgrade(ids.teutonic, writing),
        None
    );
    assert_eq!(ruleset.modifiers.faction_class_upgrade(ids.saxony, writing), None);
    assert!(ruleset.modifiers.class_id("masonry").is_none());
}

#[test]
fn test_faction_definitions() {
    let ruleset = standard_ruleset();
    let ids = StandardIds::resolve(&ruleset);

    let teutonic: Vec<&str> = ruleset
        .factions
        .factions_of(ids.teutonic)
        .map(|f| f.ident.as_str())
        .collect();
    assert_eq!(teutonic, ["thuringian-tribe", "thuringia", "holy-roman-empire"]);
    assert_eq!(ruleset.factions.faction(ids.saxony).kind, FactionKind::Polity);
    let empire = ruleset.factions.require_faction("holy-roman-empire").unwrap();
    assert!(!ruleset.factions.faction(empire).playable);
}

#[test]
fn test_duplicate_identifier_rejected() {
    let result = Ruleset::from_ron_str(
        r#"RulesetData(resources: [(ident: "gold"), (ident: "gold")])"#,
    );
    assert!(matches!(
        result,
        Err(GameError::DuplicateIdentifier { kind: "resource", ref ident }) if ident == "gold"
    ));

    let result = Ruleset::from_ron_str(
        r#"RulesetData(upgrades: [UpgradeData(ident: "upgrade-a"), UpgradeData(ident: "upgrade-a")])"#,
    );
    assert!(matches!(
        result,
        Err(GameError::DuplicateIdentifier { kind: "upgrade", .. })
    ));
}

#[test]
fn test_irreversible_percent_rejected() {
    let result = Ruleset::from_ron_str(
        r#"RulesetData(
            variables: ["HitPoints"],
            upgrades: [UpgradeData(ident: "upgrade-ruin")],
            modifiers: [ModifierData(upgrade: "upgrade-ruin", modify_percent: {"HitPoints": -100})],
        )"#,
    );
    assert!(matches!(
        result,
        Err(GameError::InvalidPercent { percent: -100, ref upgrade }) if upgrade == "upgrade-ruin"
    ));
}

#[test]
fn test_unknown_references_rejected() {
    let unknown_variable = Ruleset::from_ron_str(
        r#"RulesetData(
            upgrades: [UpgradeData(ident: "upgrade-focus")],
            modifiers: [ModifierData(upgrade: "upgrade-focus", variables: {"Mana": (value: 1)})],
        )"#,
    );
    assert!(matches!(
        unknown_variable,
        Err(GameError::UnknownIdentifier { kind: "variable", ref ident }) if ident == "Mana"
    ));

    let unknown_civilization = Ruleset::from_ron_str(
        r#"RulesetData(factions: [FactionData(ident: "rome", civilization: "latin", kind: Polity)])"#,
    );
    assert!(matches!(
        unknown_civilization,
        Err(GameError::UnknownIdentifier { kind: "civilization", .. })
    ));

    let unknown_upgrade = Ruleset::from_ron_str(
        r#"RulesetData(unit_types: [UnitTypeData(
            ident: "unit-archer",
            name: "Archer",
            variations: [VariationData(ident: "elven", upgrades_required: ["upgrade-elves"])],
        )])"#,
    );
    assert!(matches!(
        unknown_upgrade,
        Err(GameError::UnknownIdentifier { kind: "upgrade", .. })
    ));
}

#[test]
fn test_malformed_document() {
    assert!(matches!(
        Ruleset::from_ron_str("RulesetData(resources: 7)"),
        Err(GameError::DataParseError { .. })
    ));
}
