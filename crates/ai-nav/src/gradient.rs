//! Gradient descent/ascent over a [`FlowSource`].
//!
//! The navigator looks one tile around a probe point and picks the Moore neighbor whose value
//! best approaches a target value. The search starts at the previously chosen direction, so
//! equally good neighbors never make the actor flip-flop between tiles.

use crate::{FlowSource, TileCoord, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Moore neighborhood in fixed scan order.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// When a gradient navigation counts as arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComparisonMethod {
    LessOrEqual,
    #[default]
    Equal,
    GreaterOrEqual,
}

impl ComparisonMethod {
    /// Arrival test with a one-unit tolerance.
    pub fn is_satisfied(self, current: u32, target: u32) -> bool {
        match self {
            Self::LessOrEqual => current <= target.saturating_add(1),
            Self::Equal => current.abs_diff(target) <= 1,
            Self::GreaterOrEqual => current.saturating_add(1) >= target,
        }
    }
}

/// Hysteresis memory for one navigating actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GradientMemory {
    pub last_direction: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStep {
    pub direction_index: usize,
    pub tile: TileCoord,
    pub value: u32,
    /// Unit direction toward `tile`.
    pub direction: Vec2,
}

/// Point `radius + 1` ahead of the actor, where the field is sampled.
pub fn probe_point(position: Vec2, forward: Vec2, radius: f32) -> Vec2 {
    position + forward.normalize_or_zero() * (radius + 1.0)
}

/// Tile to sample from: the probe tile when it lies on the field, else the actor's own tile.
pub fn probe_tile(field: &dyn FlowSource, position: Vec2, probe: Vec2) -> Option<TileCoord> {
    [probe, position]
        .into_iter()
        .map(|p| field.tile_of(p))
        .find(|t| field.value_at_tile(*t).is_some())
}

/// Chooses the neighbor of `from` that best approaches `target`.
///
/// Returns `None` when `from` is off the field, already equals `target`, or has no neighbor
/// on the field. Only a strictly better score replaces the first candidate found.
pub fn choose_step(
    field: &dyn FlowSource,
    from: TileCoord,
    target: u32,
    memory: &mut GradientMemory,
) -> Option<GradientStep> {
    let current = field.value_at_tile(from)?;
    if current == target {
        return None;
    }

    let start = memory.last_direction % DIRECTIONS.len();
    let mut best: Option<(u32, usize, TileCoord, u32)> = None;
    for i in 0..DIRECTIONS.len() {
        let index = (start + i) % DIRECTIONS.len();
        let (dx, dy) = DIRECTIONS[index];
        let tile = from.offset(dx, dy);
        let Some(value) = field.value_at_tile(tile) else {
            continue;
        };
        let score = value.abs_diff(target);
        if best.is_none_or(|(best_score, ..)| score < best_score) {
            best = Some((score, index, tile, value));
        }
    }

    let (_, index, tile, value) = best?;
    memory.last_direction = index;
    let (dx, dy) = DIRECTIONS[index];
    Some(GradientStep {
        direction_index: index,
        tile,
        value,
        direction: Vec2::new(dx as f32, dy as f32).normalize_or_zero(),
    })
}
