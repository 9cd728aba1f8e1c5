//! Handle-indexed tables.
//!
//! [`DenseVec`] replaces fixed-size arrays keyed by registry indices. Tables
//! that mirror a registry (per-player stat blocks, allow tables) are resized
//! whenever the registry grows; sparse-by-nature tables (modifier deltas)
//! grow lazily on first write and read as the default value past their end.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::ids::DenseId;

/// A `Vec<T>` indexed by a typed handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DenseVec<I, T> {
    items: Vec<T>,
    #[serde(skip)]
    marker: PhantomData<fn(I) -> I>,
}

impl<I: DenseId, T> DenseVec<I, T> {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the table has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a value, returning its handle.
    pub fn push(&mut self, value: T) -> I {
        self.items.push(value);
        I::from_index(self.items.len() - 1)
    }

    /// Get the slot for a handle, if it exists.
    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.items.get(id.index())
    }

    /// Get the slot for a handle mutably, if it exists.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.items.get_mut(id.index())
    }

    /// Iterate handles and values in index order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(i, value)| (I::from_index(i), value))
    }

    /// Iterate handles and values mutably in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> + '_ {
        self.items
            .iter_mut()
            .enumerate()
            .map(|(i, value)| (I::from_index(i), value))
    }

    /// Iterate all handles in index order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.items.len()).map(I::from_index)
    }

    /// Iterate values in index order.
    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Grow or shrink to `len` slots, filling new ones with `f`.
    pub fn resize_with(&mut self, len: usize, f: impl FnMut() -> T) {
        self.items.resize_with(len, f);
    }
}

impl<I: DenseId, T: Clone> DenseVec<I, T> {
    /// Create a table of `len` copies of `value`.
    #[must_use]
    pub fn filled(len: usize, value: T) -> Self {
        Self {
            items: vec![value; len],
            marker: PhantomData,
        }
    }

    /// Grow or shrink to `len` slots, filling new ones with `value`.
    pub fn resize(&mut self, len: usize, value: T) {
        self.items.resize(len, value);
    }
}

impl<I: DenseId, T: Default> DenseVec<I, T> {
    /// Mutable slot for a handle, growing the table with defaults if needed.
    pub fn entry(&mut self, id: I) -> &mut T {
        let index = id.index();
        if index >= self.items.len() {
            self.items.resize_with(index + 1, T::default);
        }
        &mut self.items[index]
    }
}

impl<I: DenseId, T: Copy + Default> DenseVec<I, T> {
    /// Value for a handle, or the default past the end of the table.
    #[must_use]
    pub fn value(&self, id: I) -> T {
        self.items.get(id.index()).copied().unwrap_or_default()
    }
}

impl<I: DenseId> DenseVec<I, i32> {
    /// Element-wise `self += sign * other`.
    pub fn add_scaled(&mut self, other: &Self, sign: i32) {
        for (id, delta) in other.iter() {
            if *delta != 0 {
                *self.entry(id) += sign * delta;
            }
        }
    }

    /// Check if every slot is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.items.iter().all(|v| *v == 0)
    }
}

impl<I, T> Default for DenseVec<I, T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            marker: PhantomData,
        }
    }
}

impl<I: DenseId, T> Index<I> for DenseVec<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.index()]
    }
}

impl<I: DenseId, T> IndexMut<I> for DenseVec<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.index()]
    }
}

impl<I: DenseId, T> FromIterator<T> for DenseVec<I, T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self {
            items: iter.into_iter().collect(),
            marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ResourceId, UnitTypeId};

    #[test]
    fn test_push_returns_sequential_handles() {
        let mut table: DenseVec<UnitTypeId, &str> = DenseVec::new();
        assert_eq!(table.push("footman"), UnitTypeId::new(0));
        assert_eq!(table.push("knight"), UnitTypeId::new(1));
        assert_eq!(table[UnitTypeId::new(1)], "knight");
    }

    #[test]
    fn test_entry_grows_lazily() {
        let mut table: DenseVec<ResourceId, i32> = DenseVec::new();
        *table.entry(ResourceId::new(3)) += 5;
        assert_eq!(table.len(), 4);
        assert_eq!(table.value(ResourceId::new(3)), 5);
        assert_eq!(table.value(ResourceId::new(9)), 0);
    }

    #[test]
    fn test_add_scaled_is_symmetric() {
        let mut costs: DenseVec<ResourceId, i32> = DenseVec::filled(3, 10);
        let mut delta: DenseVec<ResourceId, i32> = DenseVec::new();
        *delta.entry(ResourceId::new(1)) = -4;
        *delta.entry(ResourceId::new(4)) = 2;

        let before = costs.clone();
        costs.add_scaled(&delta, 1);
        assert_eq!(costs.value(ResourceId::new(1)), 6);
        assert_eq!(costs.value(ResourceId::new(4)), 2);

        costs.add_scaled(&delta, -1);
        assert_eq!(costs.value(ResourceId::new(1)), before.value(ResourceId::new(1)));
        assert_eq!(costs.value(ResourceId::new(4)), 0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_index_panics() {
        let table: DenseVec<UnitTypeId, i32> = DenseVec::filled(2, 0);
        let _ = table[UnitTypeId::new(2)];
    }
}
