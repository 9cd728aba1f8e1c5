//! Stat inspection.
//!
//! Researches a list of upgrades for a fresh player and reports the stat
//! blocks the player ends up with.

use std::collections::BTreeMap;

use forge_core::ids::{PlayerId, UnitTypeId, UpgradeId};
use forge_core::resources::ResourceVec;
use forge_core::ruleset::Ruleset;
use forge_core::settings::GameSettings;
use forge_core::sight::FogOfWar;
use forge_core::variables::Variable;
use forge_core::world::World;
use serde::Serialize;

use crate::error::{Result, ToolError};

/// Output encoding of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Pretty RON.
    #[default]
    Ron,
    /// Pretty JSON.
    Json,
}

/// Stat block of one unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTypeReport {
    /// Unit type identifier.
    pub ident: String,
    /// Display name.
    pub name: String,
    /// How many the player may have.
    pub allowance: i32,
    /// Nonzero costs by resource.
    pub costs: BTreeMap<String, i32>,
    /// Nonzero storage by resource.
    pub storing: BTreeMap<String, i32>,
    /// Nonzero income improvements by resource.
    pub improve_income: BTreeMap<String, i32>,
    /// Variables with a nonzero value or max.
    pub variables: BTreeMap<String, Variable>,
}

/// Everything a player's research changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatReport {
    /// Upgrades researched, in order.
    pub researched: Vec<String>,
    /// Research speed in percent.
    pub speed_research: i32,
    /// Effective income by resource.
    pub incomes: BTreeMap<String, i32>,
    /// Requested unit types, in handle order.
    pub unit_types: Vec<UnitTypeReport>,
}

/// Research `upgrades` in order for a fresh player and report the stat
/// blocks of `unit_types` (every type when empty).
///
/// # Errors
///
/// Returns [`ToolError::Game`] for an unknown upgrade or unit type.
pub fn inspect(
    ruleset: Ruleset,
    settings: GameSettings,
    upgrades: &[String],
    unit_types: &[String],
) -> Result<StatReport> {
    let upgrade_ids = upgrades
        .iter()
        .map(|ident| ruleset.upgrades.require(ident))
        .collect::<forge_core::error::Result<Vec<UpgradeId>>>()?;
    let type_ids: Vec<UnitTypeId> = if unit_types.is_empty() {
        ruleset.unit_types.ids().collect()
    } else {
        let mut ids = unit_types
            .iter()
            .map(|ident| ruleset.unit_types.require(ident))
            .collect::<forge_core::error::Result<Vec<UnitTypeId>>>()?;
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    let mut world = World::new(ruleset, settings, 0, FogOfWar::new(1, 1));
    let player = world.add_player();
    for &upgrade in &upgrade_ids {
        world.upgrade_acquire(player, upgrade)?;
    }
    report(&world, player, upgrades, &type_ids)
}

fn report(
    world: &World,
    player: PlayerId,
    upgrades: &[String],
    unit_types: &[UnitTypeId],
) -> Result<StatReport> {
    let ruleset = world.ruleset();
    let p = world.player(player)?;
    let by_resource = |values: &ResourceVec| -> BTreeMap<String, i32> {
        values
            .iter()
            .filter(|(_, value)| **value != 0)
            .map(|(id, value)| (ruleset.resources.get(id).ident.clone(), *value))
            .collect()
    };

    let unit_types = unit_types
        .iter()
        .map(|&id| {
            let def = ruleset.unit_types.get(id);
            let stats = p.stats(id);
            UnitTypeReport {
                ident: def.ident.clone(),
                name: def.name.clone(),
                allowance: p.allow.unit(id),
                costs: by_resource(&stats.costs),
                storing: by_resource(&stats.storing),
                improve_income: by_resource(&stats.improve_income),
                variables: stats
                    .variables
                    .iter()
                    .filter(|(_, var)| var.value != 0 || var.max != 0)
                    .map(|(id, var)| (ruleset.variables.name(id).to_string(), *var))
                    .collect(),
            }
        })
        .collect();

    Ok(StatReport {
        researched: upgrades.to_vec(),
        speed_research: p.speed_research,
        incomes: by_resource(&p.incomes),
        unit_types,
    })
}

/// Encode a report.
///
/// # Errors
///
/// Returns [`ToolError::Report`] if serialization fails.
pub fn render(report: &StatReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Ron => ron::ser::to_string_pretty(report, ron::ser::PrettyConfig::default())
            .map_err(|e| ToolError::Report(e.to_string())),
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).map_err(|e| ToolError::Report(e.to_string()))
        }
    }
}
