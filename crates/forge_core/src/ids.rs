//! Typed handles.
//!
//! Every registry hands out dense integer handles in registration order.
//! Handles are never reused within a session, so they double as indices into
//! [`DenseVec`](crate::dense::DenseVec) tables.

use serde::{Deserialize, Serialize};

/// A handle that indexes a dense table.
pub trait DenseId: Copy + Eq + Ord + std::fmt::Debug {
    /// Build the handle for a table index.
    fn from_index(index: usize) -> Self;

    /// Table index of this handle.
    fn index(self) -> usize;
}

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            /// Create a handle from its raw value.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }
        }

        impl DenseId for $name {
            fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).expect("dense table exceeds u32 handles"))
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

dense_id!(
    /// Resource kind (index 0 is always the time cost).
    ResourceId
);
dense_id!(
    /// Unit variable (sight range, supply, damage, ...).
    VariableId
);
dense_id!(
    /// Unit type.
    UnitTypeId
);
dense_id!(
    /// Upgrade, ability or trait.
    UpgradeId
);
dense_id!(
    /// Upgrade class ("writing", "melee_weapon_1", ...).
    ClassId
);
dense_id!(
    /// Civilization.
    CivilizationId
);
dense_id!(
    /// Faction within a civilization.
    FactionId
);
dense_id!(
    /// Player slot.
    PlayerId
);

/// Unique identifier for live units.
///
/// Unlike the dense handles, unit ids are sparse: units come and go during
/// play and their ids are never compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
