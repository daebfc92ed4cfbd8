use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer tile coordinate. May lie outside any field's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Read-only scalar field over a tile grid, typically the map's precomputed distance field.
pub trait FlowSource {
    fn tile_size(&self) -> f32;

    /// Value at `tile`, or `None` outside the field.
    fn value_at_tile(&self, tile: TileCoord) -> Option<u32>;

    fn tile_of(&self, p: Vec2) -> TileCoord {
        let ts = self.tile_size().max(1e-6);
        TileCoord::new((p.x / ts).floor() as i32, (p.y / ts).floor() as i32)
    }

    fn value_at(&self, p: Vec2) -> Option<u32> {
        self.value_at_tile(self.tile_of(p))
    }

    fn contains(&self, p: Vec2) -> bool {
        self.value_at(p).is_some()
    }
}

/// Dense row-major flow field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowField {
    width: u32,
    height: u32,
    tile_size: f32,
    values: Vec<u32>,
}

impl FlowField {
    /// A `width` x `height` field filled with `fill`. Empty dimensions yield an empty field.
    pub fn new(width: u32, height: u32, tile_size: f32, fill: u32) -> Self {
        Self {
            width,
            height,
            tile_size: tile_size.max(1e-3),
            values: vec![fill; width as usize * height as usize],
        }
    }

    /// Builds a field from rows (`rows[y][x]`). Returns `None` for ragged input.
    pub fn from_rows(rows: &[Vec<u32>], tile_size: f32) -> Option<Self> {
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let mut field = Self::new(width as u32, rows.len() as u32, tile_size, 0);
        for (y, row) in rows.iter().enumerate() {
            let start = y * width;
            field.values[start..start + width].copy_from_slice(row);
        }
        Some(field)
    }

    /// Field whose value is the 8-connected step distance to the nearest source tile.
    ///
    /// Tiles with no source in reach keep `u32::MAX`.
    pub fn from_sources(width: u32, height: u32, tile_size: f32, sources: &[TileCoord]) -> Self {
        let mut field = Self::new(width, height, tile_size, u32::MAX);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let best = sources
                    .iter()
                    .map(|s| (s.x - x).unsigned_abs().max((s.y - y).unsigned_abs()))
                    .min()
                    .unwrap_or(u32::MAX);
                field.set(TileCoord::new(x, y), best);
            }
        }
        field
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// World-space extent of the field.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (
            Vec2::ZERO,
            Vec2::new(
                self.width as f32 * self.tile_size,
                self.height as f32 * self.tile_size,
            ),
        )
    }

    pub fn set(&mut self, tile: TileCoord, value: u32) {
        if let Some(idx) = self.idx(tile) {
            self.values[idx] = value;
        }
    }

    fn in_bounds(&self, tile: TileCoord) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width as i32 && tile.y < self.height as i32
    }

    fn idx(&self, tile: TileCoord) -> Option<usize> {
        if !self.in_bounds(tile) {
            return None;
        }
        Some(tile.y as usize * self.width as usize + tile.x as usize)
    }
}

impl FlowSource for FlowField {
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn value_at_tile(&self, tile: TileCoord) -> Option<u32> {
        self.idx(tile).map(|i| self.values[i])
    }
}
