// Tile grid for one level
// built once by the level loader, read-only while the level is played

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// What occupies one cell. Only `Solid` blocks movement; the spawn kinds are
/// markers the level start turns into actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Empty,
    Solid,
    Item,
    WeakSpawn,
    ScarecrowSpawn,
    BossSpawn,
    PlayerSpawn,
}

impl TileType {
    pub fn is_solid(self) -> bool {
        matches!(self, TileType::Solid)
    }

    // glyphs used by `TileMap::from_ascii`
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' | ' ' => Some(TileType::Empty),
            '#' => Some(TileType::Solid),
            'i' => Some(TileType::Item),
            'e' => Some(TileType::WeakSpawn),
            's' => Some(TileType::ScarecrowSpawn),
            'B' => Some(TileType::BossSpawn),
            'P' => Some(TileType::PlayerSpawn),
            _ => None,
        }
    }
}

/// Column/row address. Signed so that points off the map still get an
/// address; lookups outside the grid read as `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub col: i32,
    pub row: i32,
}

impl TileIndex {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// World-space bounds of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Row 0 is the top row of the level description and world y grows upward,
/// so row `height - 1` sits at y = 0. Cell centers land on multiples of the
/// tile size.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tile_size: f32,
    tiles: Vec<TileType>,
}

impl TileMap {
    /// `tiles` is row-major, top row first.
    pub fn new(width: usize, height: usize, tile_size: f32, tiles: Vec<TileType>) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::EmptyMap { width, height });
        }
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(CoreError::InvalidTileSize(tile_size));
        }
        if tiles.len() != width * height {
            return Err(CoreError::TileCount { expected: width * height, found: tiles.len() });
        }
        Ok(Self { width, height, tile_size, tiles })
    }

    pub fn from_rows(rows: Vec<Vec<TileType>>, tile_size: f32) -> Result<Self, CoreError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut tiles = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(CoreError::RaggedRow { row, found: line.len(), expected: width });
            }
            tiles.extend(line);
        }
        Self::new(width, height, tile_size, tiles)
    }

    /// Parse a glyph grid, one text line per row. Blank lines are skipped so
    /// raw string literals can start on their own line.
    pub fn from_ascii(text: &str, tile_size: f32) -> Result<Self, CoreError> {
        let mut rows = Vec::new();
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let row = rows.len();
            let cells = line
                .trim_end()
                .chars()
                .enumerate()
                .map(|(col, glyph)| {
                    TileType::from_glyph(glyph).ok_or(CoreError::UnknownGlyph { glyph, row, col })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
        Self::from_rows(rows, tile_size)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    /// Out-of-range indices read as `Empty`, never as solid, so the map
    /// edge never blocks movement on its own.
    pub fn type_at(&self, col: i32, row: i32) -> TileType {
        if !self.contains(col, row) {
            return TileType::Empty;
        }
        self.tiles[row as usize * self.width + col as usize]
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.type_at(col, row).is_solid()
    }

    /// Cell center in world space.
    pub fn world_position_of(&self, col: i32, row: i32) -> Vec3 {
        let flipped = self.height as i32 - 1 - row;
        Vec3::new(col as f32 * self.tile_size, flipped as f32 * self.tile_size, 0.0)
    }

    /// Containing cell of a world point (floor semantics). A point on a
    /// shared edge belongs to the cell with the larger world coordinate.
    pub fn index_of(&self, point: Vec3) -> TileIndex {
        let half = self.tile_size * 0.5;
        let col = ((point.x + half) / self.tile_size).floor() as i32;
        let from_bottom = ((point.y + half) / self.tile_size).floor() as i32;
        TileIndex::new(col, self.height as i32 - 1 - from_bottom)
    }

    pub fn rect_of(&self, col: i32, row: i32) -> TileRect {
        let center = self.world_position_of(col, row);
        let half = self.tile_size * 0.5;
        TileRect {
            left: center.x - half,
            right: center.x + half,
            top: center.y + half,
            bottom: center.y - half,
        }
    }

    /// Every cell of one type, top row first.
    pub fn spawn_points(&self, kind: TileType) -> impl Iterator<Item = TileIndex> + '_ {
        self.tiles.iter().enumerate().filter_map(move |(i, tile)| {
            (*tile == kind).then(|| TileIndex::new((i % self.width) as i32, (i / self.width) as i32))
        })
    }
}
