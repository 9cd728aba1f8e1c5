//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the upgrade engine produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Upgrade application must be 100% deterministic for lockstep multiplayer.
//! Sources of non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Unit types are visited by handle and units in owner container order.
//!
//! - **System randomness**: Variation choice and faction re-rolls draw from
//!   the seeded [`forge_core::rng::SyncRng`] only, and the number of draws
//!   must match across peers.
//!
//! - **Floating-point math**: Sight radii use [`forge_core::math::Fixed`].
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual operations (apply, reverse, reselect)
//! 2. **Property tests**: Random scripts must still produce deterministic outputs
//! 3. **Save tests**: A saved and reloaded game hashes the same

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use forge_core::error::Result;
use forge_core::ids::{PlayerId, UnitId, UnitTypeId, UpgradeId};
use forge_core::math::Vec2Fixed;
use forge_core::sight::SightMap;
use forge_core::world::World;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps per run.
    pub steps: usize,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Upgrade script is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a computation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: usize,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, usize),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for index in 0..steps {
            step(&mut state, index);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// One scripted game event.
///
/// Units are addressed by their position in the owner's unit list (modulo
/// its length) so any script stays meaningful however many units exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Player-wide research completion.
    Acquire {
        /// Researching player.
        player: PlayerId,
        /// Upgrade researched.
        upgrade: UpgradeId,
    },
    /// Player-wide upgrade loss.
    Lose {
        /// Losing player.
        player: PlayerId,
        /// Upgrade lost.
        upgrade: UpgradeId,
    },
    /// Create a unit on a tile.
    Spawn {
        /// Owner.
        player: PlayerId,
        /// Type of the unit.
        unit_type: UnitTypeId,
        /// Tile coordinates.
        tile: (i32, i32),
    },
    /// Remove the owner's nth unit.
    Destroy {
        /// Owner.
        player: PlayerId,
        /// Index into the owner's units.
        nth: usize,
    },
    /// The owner's nth unit gains an individual upgrade level.
    IndividualAcquire {
        /// Owner.
        player: PlayerId,
        /// Index into the owner's units.
        nth: usize,
        /// Upgrade gained.
        upgrade: UpgradeId,
    },
    /// The owner's nth unit loses an individual upgrade.
    IndividualLose {
        /// Owner.
        player: PlayerId,
        /// Index into the owner's units.
        nth: usize,
        /// Upgrade lost.
        upgrade: UpgradeId,
        /// Lose every level instead of one.
        lose_all: bool,
    },
    /// Advance the simulation clock by one cycle.
    AdvanceCycle,
}

impl Action {
    /// Apply the action to a world. Unit actions on a player without units
    /// do nothing.
    ///
    /// # Errors
    ///
    /// Propagates engine errors (unknown player).
    pub fn apply<S: SightMap>(&self, world: &mut World<S>) -> Result<()> {
        match *self {
            Self::Acquire { player, upgrade } => world.upgrade_acquire(player, upgrade),
            Self::Lose { player, upgrade } => world.upgrade_lost(player, upgrade),
            Self::Spawn {
                player,
                unit_type,
                tile: (x, y),
            } => world
                .spawn_unit(player, unit_type, Vec2Fixed::tile_center(x, y))
                .map(|_| ()),
            Self::Destroy { player, nth } => match nth_unit(world, player, nth)? {
                Some(unit) => world.destroy_unit(unit),
                None => Ok(()),
            },
            Self::IndividualAcquire {
                player,
                nth,
                upgrade,
            } => match nth_unit(world, player, nth)? {
                Some(unit) => world.individual_upgrade_acquire(unit, upgrade),
                None => Ok(()),
            },
            Self::IndividualLose {
                player,
                nth,
                upgrade,
                lose_all,
            } => match nth_unit(world, player, nth)? {
                Some(unit) => world.individual_upgrade_lost(unit, upgrade, lose_all),
                None => Ok(()),
            },
            Self::AdvanceCycle => {
                world.set_cycle(world.cycle() + 1);
                Ok(())
            }
        }
    }
}

fn nth_unit<S: SightMap>(world: &World<S>, player: PlayerId, nth: usize) -> Result<Option<UnitId>> {
    let units = &world.player(player)?.units;
    if units.is_empty() {
        return Ok(None);
    }
    Ok(Some(units[nth % units.len()]))
}

/// Apply every action of a script in order.
///
/// # Errors
///
/// Stops at and returns the first engine error.
pub fn run_script<S: SightMap>(world: &mut World<S>, script: &[Action]) -> Result<()> {
    for action in script {
        action.apply(world)?;
    }
    Ok(())
}

/// Run a script on `runs` freshly set up worlds and compare final hashes.
///
/// # Panics
///
/// Panics if an action fails.
pub fn verify_script_determinism<S, F>(runs: usize, setup: F, script: &[Action]) -> DeterminismResult
where
    S: SightMap,
    F: Fn() -> World<S>,
{
    verify_determinism(
        runs,
        script.len(),
        setup,
        |world, index| {
            script[index]
                .apply(world)
                .expect("scripted action failed");
        },
        |world: &World<S>| world.state_hash(),
    )
}

/// Run a script on two worlds side by side, finding the first divergence.
///
/// # Returns
///
/// `None` if the worlds stay identical, `Some(step)` for the first step
/// after which they differ (0 = before any action).
///
/// # Panics
///
/// Panics if an action fails.
pub fn find_first_divergence<S, F>(setup: F, script: &[Action]) -> Option<usize>
where
    S: SightMap,
    F: Fn() -> World<S>,
{
    let mut first = setup();
    let mut second = setup();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for (index, action) in script.iter().enumerate() {
        action.apply(&mut first).expect("scripted action failed");
        action.apply(&mut second).expect("scripted action failed");

        if first.state_hash() != second.state_hash() {
            tracing::debug!(step = index + 1, ?action, "Worlds diverged");
            return Some(index + 1);
        }
    }

    None
}

/// Verify that a save/load round trip preserves the game state exactly.
///
/// `sight` is the fresh sight map handed to the reloaded world.
pub fn verify_save_round_trip<S: SightMap>(world: &World<S>, sight: S) -> bool {
    let Ok(bytes) = world.save_state() else {
        return false;
    };
    match World::from_saved(world.ruleset().clone(), &bytes, sight) {
        Ok(restored) => restored.state_hash() == world.state_hash(),
        Err(_) => false,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for upgrade testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of modifier application.
pub mod strategies {
    use forge_core::ids::PlayerId;
    use forge_core::variables::{Variable, VariableDelta};
    use proptest::prelude::*;

    use super::Action;
    use crate::fixtures::StandardIds;

    /// Generate a variable with `0 <= value <= max`.
    pub fn arb_variable() -> impl Strategy<Value = Variable> {
        (0i32..1000)
            .prop_flat_map(|max| (0..=max, Just(max)))
            .prop_map(|(value, max)| Variable::new(value, max))
    }

    /// Generate a non-negative additive delta.
    ///
    /// Non-negative deltas on an in-range variable never hit the clamp, so
    /// applying and reversing them is exact.
    pub fn arb_additive_delta() -> impl Strategy<Value = VariableDelta> {
        (0i32..100, 0i32..100, -10i32..10).prop_map(|(value, extra, increase)| VariableDelta {
            value,
            max: value + extra,
            increase,
            enable: false,
        })
    }

    /// Generate a reversible percentage (greater than -100, nonzero).
    pub fn arb_percent() -> impl Strategy<Value = i32> {
        prop_oneof![-99i32..0, 1i32..300]
    }

    /// Generate one scripted action against the standard world.
    pub fn arb_action(ids: StandardIds) -> impl Strategy<Value = Action> {
        let player = (0u32..2).prop_map(PlayerId::new);
        let upgrade = prop::sample::select(vec![
            ids.iron_forged,
            ids.eagle_eye,
            ids.masonry,
            ids.improved_lumber,
            ids.levy,
            ids.writing,
        ]);
        let individual = prop::sample::select(vec![ids.critical_strike, ids.strong, ids.quick]);
        let unit_type = prop::sample::select(vec![
            ids.peasant,
            ids.footman,
            ids.knight,
            ids.farm,
            ids.town_hall,
        ]);

        prop_oneof![
            (player.clone(), upgrade.clone())
                .prop_map(|(player, upgrade)| Action::Acquire { player, upgrade }),
            (player.clone(), upgrade).prop_map(|(player, upgrade)| Action::Lose { player, upgrade }),
            (player.clone(), unit_type, 0i32..60, 0i32..60).prop_map(
                |(player, unit_type, x, y)| Action::Spawn {
                    player,
                    unit_type,
                    tile: (x, y),
                }
            ),
            (player.clone(), 0usize..8).prop_map(|(player, nth)| Action::Destroy { player, nth }),
            (player.clone(), 0usize..8, individual.clone()).prop_map(|(player, nth, upgrade)| {
                Action::IndividualAcquire {
                    player,
                    nth,
                    upgrade,
                }
            }),
            (player, 0usize..8, individual, any::<bool>()).prop_map(
                |(player, nth, upgrade, lose_all)| Action::IndividualLose {
                    player,
                    nth,
                    upgrade,
                    lose_all,
                }
            ),
            Just(Action::AdvanceCycle),
        ]
    }

    /// Generate a script of up to `max_len` actions.
    pub fn arb_script(ids: StandardIds, max_len: usize) -> impl Strategy<Value = Vec<Action>> {
        proptest::collection::vec(arb_action(ids), 0..max_len)
    }
}
