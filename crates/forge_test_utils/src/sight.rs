//! A sight map that records what the engine asks of it.

use forge_core::ids::PlayerId;
use forge_core::math::{Fixed, Vec2Fixed};
use forge_core::sight::SightMap;

/// One call made by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightCall {
    /// A footprint was added.
    Mark {
        /// Owner of the footprint.
        player: PlayerId,
        /// Center.
        position: Vec2Fixed,
        /// Radius.
        range: Fixed,
    },
    /// A footprint was removed.
    Unmark {
        /// Owner of the footprint.
        player: PlayerId,
        /// Center.
        position: Vec2Fixed,
        /// Radius.
        range: Fixed,
    },
}

/// Records every mark/unmark call in order.
///
/// `terrain_at` answers with one fixed terrain for the whole map.
#[derive(Debug, Clone, Default)]
pub struct RecordingSightMap {
    calls: Vec<SightCall>,
    terrain: Option<String>,
}

impl RecordingSightMap {
    /// Create an empty recorder with no terrain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: report `terrain` everywhere.
    #[must_use]
    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrain = Some(terrain.into());
        self
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> &[SightCall] {
        &self.calls
    }

    /// Forget all recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Number of marks recorded.
    #[must_use]
    pub fn marks(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SightCall::Mark { .. }))
            .count()
    }

    /// Number of unmarks recorded.
    #[must_use]
    pub fn unmarks(&self) -> usize {
        self.calls.len() - self.marks()
    }

    /// Ranges of the footprints a player still holds at `position`.
    ///
    /// Each unmark cancels the earliest matching mark.
    #[must_use]
    pub fn live_ranges(&self, player: PlayerId, position: Vec2Fixed) -> Vec<Fixed> {
        let mut live = Vec::new();
        for call in &self.calls {
            match *call {
                SightCall::Mark {
                    player: p,
                    position: at,
                    range,
                } if p == player && at == position => live.push(range),
                SightCall::Unmark {
                    player: p,
                    position: at,
                    range,
                } if p == player && at == position => {
                    if let Some(index) = live.iter().position(|r| *r == range) {
                        live.remove(index);
                    }
                }
                _ => {}
            }
        }
        live
    }
}

impl SightMap for RecordingSightMap {
    fn mark_sight(&mut self, player: PlayerId, position: Vec2Fixed, range: Fixed) {
        self.calls.push(SightCall::Mark {
            player,
            position,
            range,
        });
    }

    fn unmark_sight(&mut self, player: PlayerId, position: Vec2Fixed, range: Fixed) {
        self.calls.push(SightCall::Unmark {
            player,
            position,
            range,
        });
    }

    fn terrain_at(&self, _position: Vec2Fixed) -> Option<&str> {
        self.terrain.as_deref()
    }
}
