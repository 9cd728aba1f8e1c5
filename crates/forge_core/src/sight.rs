//! Map visibility collaborator.
//!
//! The engine never owns fog of war. It tells a [`SightMap`] when a unit's
//! sight footprint is about to change (unmark) and when it has changed
//! (mark), and asks it for the terrain under a unit when picking a
//! variation. [`FogOfWar`] is the tile-counting implementation used by
//! headless games and tests.

use std::collections::BTreeMap;

use crate::ids::PlayerId;
use crate::math::{Fixed, Vec2Fixed};

/// Visibility bookkeeping consumed by the engine.
pub trait SightMap {
    /// Add a sight footprint of `range` centered on `position`.
    fn mark_sight(&mut self, player: PlayerId, position: Vec2Fixed, range: Fixed);

    /// Remove a footprint previously added with the same arguments.
    fn unmark_sight(&mut self, player: PlayerId, position: Vec2Fixed, range: Fixed);

    /// Terrain identifier under `position`, if known.
    fn terrain_at(&self, position: Vec2Fixed) -> Option<&str>;
}

/// Tile-based fog of war with per-player reference counts.
#[derive(Debug, Clone, Default)]
pub struct FogOfWar {
    width: i32,
    height: i32,
    counts: BTreeMap<PlayerId, Vec<u16>>,
    terrain: Vec<Option<String>>,
}

impl FogOfWar {
    /// Create an all-dark map with no terrain information.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            width,
            height,
            counts: BTreeMap::new(),
            terrain: vec![None; Self::area(width, height)],
        }
    }

    fn area(width: i32, height: i32) -> usize {
        usize::try_from(width).unwrap_or(0) * usize::try_from(height).unwrap_or(0)
    }

    fn tile_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        usize::try_from(y * self.width + x).ok()
    }

    /// Set the terrain of one tile. Out-of-map tiles are ignored.
    pub fn set_terrain(&mut self, x: i32, y: i32, terrain: impl Into<String>) {
        if let Some(index) = self.tile_index(x, y) {
            self.terrain[index] = Some(terrain.into());
        }
    }

    /// Number of footprints of `player` covering a tile.
    #[must_use]
    pub fn mark_count(&self, player: PlayerId, x: i32, y: i32) -> u16 {
        self.tile_index(x, y)
            .and_then(|index| self.counts.get(&player).map(|tiles| tiles[index]))
            .unwrap_or(0)
    }

    /// Check if `player` sees a tile.
    #[must_use]
    pub fn is_visible(&self, player: PlayerId, x: i32, y: i32) -> bool {
        self.mark_count(player, x, y) > 0
    }

    /// Check if no player sees anything.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.counts
            .values()
            .all(|tiles| tiles.iter().all(|count| *count == 0))
    }

    /// Tiles whose centers lie within `range` of `position`.
    fn footprint(&self, position: Vec2Fixed, range: Fixed) -> Vec<usize> {
        if range < Fixed::ZERO {
            return Vec::new();
        }
        let (cx, cy) = position.tile();
        let reach: i32 = range.ceil().to_num();
        let range_sq = range * range;
        let mut tiles = Vec::new();
        for y in (cy - reach)..=(cy + reach) {
            for x in (cx - reach)..=(cx + reach) {
                let Some(index) = self.tile_index(x, y) else {
                    continue;
                };
                if Vec2Fixed::tile_center(x, y).distance_squared(position) <= range_sq {
                    tiles.push(index);
                }
            }
        }
        tiles
    }
}

impl SightMap for FogOfWar {
    fn mark_sight(&mut self, player: PlayerId, position: Vec2Fixed, range: Fixed) {
        let tiles = self.footprint(position, range);
        let area = Self::area(self.width, self.height);
        let counts = self
            .counts
            .entry(player)
            .or_insert_with(|| vec![0; area]);
        for index in tiles {
            counts[index] = counts[index].saturating_add(1);
        }
    }

    fn unmark_sight(&mut self, player: PlayerId, position: Vec2Fixed, range: Fixed) {
        let tiles = self.footprint(position, range);
        let Some(counts) = self.counts.get_mut(&player) else {
            tracing::warn!(%player, "Unmarking sight for a player that never marked any");
            return;
        };
        for index in tiles {
            #[cfg(feature = "debug-validation")]
            debug_assert!(counts[index] > 0, "sight unmarked more often than marked");
            counts[index] = counts[index].saturating_sub(1);
        }
    }

    fn terrain_at(&self, position: Vec2Fixed) -> Option<&str> {
        let (x, y) = position.tile();
        self.tile_index(x, y)
            .and_then(|index| self.terrain[index].as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId(0);

    #[test]
    fn test_mark_then_unmark_restores_darkness() {
        let mut fog = FogOfWar::new(16, 16);
        let pos = Vec2Fixed::tile_center(8, 8);
        fog.mark_sight(P0, pos, Fixed::from_num(3));
        assert!(fog.is_visible(P0, 8, 8));
        assert!(fog.is_visible(P0, 11, 8));
        assert!(!fog.is_visible(P0, 12, 8));
        assert!(!fog.is_visible(P0, 11, 11));

        fog.unmark_sight(P0, pos, Fixed::from_num(3));
        assert!(fog.is_dark());
    }

    #[test]
    fn test_overlapping_marks_count() {
        let mut fog = FogOfWar::new(8, 8);
        let pos = Vec2Fixed::tile_center(2, 2);
        fog.mark_sight(P0, pos, Fixed::from_num(1));
        fog.mark_sight(P0, pos, Fixed::from_num(2));
        assert_eq!(fog.mark_count(P0, 2, 2), 2);
        assert_eq!(fog.mark_count(P0, 4, 2), 1);
        assert_eq!(fog.mark_count(PlayerId(1), 2, 2), 0);
    }

    #[test]
    fn test_footprint_clipped_at_map_edge() {
        let mut fog = FogOfWar::new(4, 4);
        fog.mark_sight(P0, Vec2Fixed::tile_center(0, 0), Fixed::from_num(2));
        assert!(fog.is_visible(P0, 0, 0));
        assert!(fog.is_visible(P0, 2, 0));
        assert!(!fog.is_visible(P0, -1, 0));
    }

    #[test]
    fn test_terrain_lookup() {
        let mut fog = FogOfWar::new(4, 4);
        fog.set_terrain(1, 2, "swamp");
        assert_eq!(fog.terrain_at(Vec2Fixed::tile_center(1, 2)), Some("swamp"));
        assert_eq!(fog.terrain_at(Vec2Fixed::tile_center(0, 0)), None);
        assert_eq!(fog.terrain_at(Vec2Fixed::tile_center(9, 9)), None);
    }
}
