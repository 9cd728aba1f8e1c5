//! Live units and unit storage.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, UnitId, UnitTypeId, UpgradeId, VariableId};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::variables::{Variable, VariableVec};

/// A queued unit order.
///
/// Only the unit-type references matter to the upgrade engine: converting a
/// unit type rewrites the targets of pending train and build orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    /// Hold position.
    Stop,
    /// Move to a point.
    Move(Vec2Fixed),
    /// Attack a unit.
    Attack(UnitId),
    /// Train a unit of a type.
    Train {
        /// Type being trained.
        unit_type: UnitTypeId,
    },
    /// Construct a building of a type.
    Build {
        /// Type being built.
        unit_type: UnitTypeId,
        /// Construction site.
        site: Vec2Fixed,
    },
    /// Research an upgrade.
    Research {
        /// Upgrade being researched.
        upgrade: UpgradeId,
    },
}

impl Order {
    /// The unit type this order produces, if any.
    pub fn target_type_mut(&mut self) -> Option<&mut UnitTypeId> {
        match self {
            Self::Train { unit_type } | Self::Build { unit_type, .. } => Some(unit_type),
            Self::Stop | Self::Move(_) | Self::Attack(_) | Self::Research { .. } => None,
        }
    }
}

/// A unit on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Owning player.
    pub owner: PlayerId,
    /// Current type.
    pub unit_type: UnitTypeId,
    /// Position in map coordinates.
    pub position: Vec2Fixed,
    /// Per-unit variables, copied from the owner's stat block at creation.
    pub variables: VariableVec,
    /// Current sight range in tiles.
    pub sight_range: i32,
    /// Sight radius marked on the map, derived from `sight_range`.
    #[serde(with = "fixed_serde")]
    pub sight_radius: Fixed,
    /// Index of the current variation of the type.
    pub variation: Option<usize>,
    /// Upgrades held by this unit alone, with their level.
    pub individual_upgrades: BTreeMap<UpgradeId, u32>,
    /// Personality trait.
    pub unit_trait: Option<UpgradeId>,
    /// Named hero.
    pub character: bool,
    /// Inside a building or transport; not on the map. Destroyed units
    /// leave the unit store, so every stored unit is alive.
    pub removed: bool,
    /// Pending orders, current first.
    pub orders: VecDeque<Order>,
}

impl Unit {
    /// Create a unit with the given template variables.
    #[must_use]
    pub fn new(
        id: UnitId,
        owner: PlayerId,
        unit_type: UnitTypeId,
        position: Vec2Fixed,
        variables: VariableVec,
    ) -> Self {
        let sight_range = variables.value(VariableId::SIGHT_RANGE).max;
        let mut unit = Self {
            id,
            owner,
            unit_type,
            position,
            variables,
            sight_range,
            sight_radius: Fixed::ZERO,
            variation: None,
            individual_upgrades: BTreeMap::new(),
            unit_trait: None,
            character: false,
            removed: false,
            orders: VecDeque::new(),
        };
        unit.refresh_sight();
        unit
    }

    /// Copy of one variable.
    #[must_use]
    pub fn variable(&self, id: VariableId) -> Variable {
        self.variables.value(id)
    }

    /// Level of an individually held upgrade (0 = not held).
    #[must_use]
    pub fn individual_upgrade_count(&self, upgrade: UpgradeId) -> u32 {
        self.individual_upgrades.get(&upgrade).copied().unwrap_or(0)
    }

    /// Recompute the marked radius from the sight range.
    pub fn refresh_sight(&mut self) {
        self.sight_radius = Fixed::from_num(self.sight_range.max(0));
    }
}

/// Storage for all live units.
///
/// Uses a `HashMap` for O(1) lookup by id, with deterministic iteration via
/// sorted keys where order matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStorage {
    units: HashMap<UnitId, Unit>,
    next_id: u64,
}

impl UnitStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Reserve the next unit id.
    pub fn allocate_id(&mut self) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a unit under its own id.
    pub fn insert(&mut self, unit: Unit) {
        self.units.insert(unit.id, unit);
    }

    /// Remove a unit.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Get a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a unit mutably.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Check if a unit exists.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Next id that will be handed out.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Sorted unit ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<_> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all units (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, &Unit)> {
        self.units.iter()
    }
}

impl Default for UnitStorage {
    fn default() -> Self {
        Self::new()
    }
}
