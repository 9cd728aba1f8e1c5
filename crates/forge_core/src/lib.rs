//! # Forge Core
//!
//! Deterministic upgrade and modifier engine for real-time strategy games.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (all draws go through [`rng::SyncRng`])
//! - No floating-point math (positions and radii use fixed-point)
//!
//! Upgrades are applied and reversed through the same code path, so losing
//! an upgrade restores exactly the state acquiring it changed.
//!
//! ## Crate Structure
//!
//! - [`ruleset`] - Immutable registries (resources, variables, unit types, upgrades)
//! - [`modifier`] - Upgrade modifiers and their registry
//! - [`allow`] - Per-player allow/forbid/research state
//! - [`world`] - The game context and every public entry point
//! - [`sight`] / [`depend`] - Collaborator traits for visibility and rule checks
//! - [`data`] - RON rule definitions

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod allow;
mod apply;
mod convert;
pub mod data;
pub mod dense;
pub mod depend;
pub mod error;
pub mod events;
pub mod factions;
pub mod ids;
pub mod math;
pub mod modifier;
pub mod player;
pub mod resources;
pub mod rng;
pub mod ruleset;
pub mod settings;
pub mod sight;
pub mod state;
pub mod unit;
pub mod unit_type;
pub mod upgrade;
pub mod variables;
mod variation;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::allow::{AllowTable, UpgradeState};
    pub use crate::data::RulesetData;
    pub use crate::depend::{DependSubject, DependencyOracle, DependencyTarget};
    pub use crate::error::{GameError, Result};
    pub use crate::events::UpgradeEvent;
    pub use crate::factions::FactionKind;
    pub use crate::ids::{
        CivilizationId, ClassId, FactionId, PlayerId, ResourceId, UnitId, UnitTypeId, UpgradeId,
        VariableId,
    };
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::modifier::{Direction, UpgradeModifier};
    pub use crate::player::Player;
    pub use crate::ruleset::Ruleset;
    pub use crate::settings::GameSettings;
    pub use crate::sight::{FogOfWar, SightMap};
    pub use crate::unit::{Order, Unit};
    pub use crate::unit_type::{UnitStats, Variation};
    pub use crate::variables::{Variable, VariableDelta};
    pub use crate::world::World;
}
