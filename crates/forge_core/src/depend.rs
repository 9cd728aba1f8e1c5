//! Dependency rule collaborator.
//!
//! Rule evaluation (ages, seasons, triggers, unit counts) lives outside the
//! engine. The engine only asks yes/no questions through
//! [`DependencyOracle`].

use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, UnitId, UnitTypeId, UpgradeId};

/// What a dependency rule is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyTarget {
    /// A unit type the player must own or be able to build.
    UnitType(UnitTypeId),
    /// An upgrade.
    Upgrade(UpgradeId),
    /// A historical age, by identifier.
    Age(String),
    /// A season, by identifier.
    Season(String),
    /// A scenario trigger, by identifier.
    Trigger(String),
}

/// Who the dependency is checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependSubject {
    /// A player as a whole.
    Player(PlayerId),
    /// One unit (individual upgrades, abilities).
    Unit(UnitId),
}

/// Evaluates dependency rules.
pub trait DependencyOracle {
    /// Check whether `subject` satisfies the rules attached to `target`.
    fn check_depend(
        &self,
        subject: DependSubject,
        target: &DependencyTarget,
        ignore_units: bool,
        is_predependency: bool,
    ) -> bool;
}

impl<F> DependencyOracle for F
where
    F: Fn(DependSubject, &DependencyTarget) -> bool,
{
    fn check_depend(
        &self,
        subject: DependSubject,
        target: &DependencyTarget,
        _ignore_units: bool,
        _is_predependency: bool,
    ) -> bool {
        self(subject, target)
    }
}

