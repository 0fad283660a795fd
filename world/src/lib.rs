#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile store for Grid Tactics.
//!
//! The world owns terrain only. Every query is bounds-checked and reports
//! out-of-range positions as absent rather than failing, so callers can probe
//! neighbours and visibility windows without clamping first.

use grid_tactics_core::{Terrain, Tile, TilePos};
use thiserror::Error;

const DEFAULT_TERRAIN: Terrain = Terrain::Grass;

/// Rectangular grid of tiles with a shape fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct World {
    rows: u32,
    cols: u32,
    terrain: Vec<Terrain>,
}

impl World {
    /// Creates a world of the provided shape covered in grass.
    #[must_use]
    pub fn new(rows: u32, cols: u32) -> Self {
        let capacity = usize::try_from(u64::from(rows) * u64::from(cols)).unwrap_or(0);
        Self {
            rows,
            cols,
            terrain: vec![DEFAULT_TERRAIN; capacity],
        }
    }

    /// Builds a world from rows of terrain glyphs.
    ///
    /// The grid takes the number of lines as its height and the longest line as
    /// its width; short lines leave the remaining tiles as grass.
    pub fn from_glyph_rows(lines: &[&str]) -> Result<Self, MapParseError> {
        let rows = u32::try_from(lines.len()).map_err(|_| MapParseError::TooLarge)?;
        let widest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let cols = u32::try_from(widest).map_err(|_| MapParseError::TooLarge)?;

        let mut table = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let mut terrain_row = Vec::with_capacity(widest);
            for (col, glyph) in line.chars().enumerate() {
                let terrain = Terrain::from_glyph(glyph)
                    .ok_or(MapParseError::UnknownGlyph { glyph, row, col })?;
                terrain_row.push(terrain);
            }
            table.push(terrain_row);
        }

        let mut world = Self::new(rows, cols);
        world.load_map(&table);
        Ok(world)
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of tiles.
    #[must_use]
    pub fn area(&self) -> usize {
        self.terrain.len()
    }

    /// Reports whether the position lies on the grid.
    #[must_use]
    pub fn contains(&self, pos: TilePos) -> bool {
        self.index(pos).is_some()
    }

    /// Returns the tile at the position, or `None` when it lies off the grid.
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<Tile> {
        self.index(pos)
            .map(|index| Tile::new(pos, self.terrain[index]))
    }

    /// Terrain at the position, or `None` when it lies off the grid.
    #[must_use]
    pub fn terrain(&self, pos: TilePos) -> Option<Terrain> {
        self.index(pos).map(|index| self.terrain[index])
    }

    /// Reports whether the position is on the grid and can be walked on.
    #[must_use]
    pub fn is_passable(&self, pos: TilePos) -> bool {
        self.terrain(pos).is_some_and(Terrain::is_passable)
    }

    /// Number of in-bounds cardinal neighbours that can be walked on.
    #[must_use]
    pub fn passable_neighbor_count(&self, pos: TilePos) -> usize {
        pos.neighbors()
            .into_iter()
            .filter(|neighbor| self.is_passable(*neighbor))
            .count()
    }

    /// In-bounds cardinal neighbours ordered up, down, left, right.
    #[must_use]
    pub fn adjacent_tiles(&self, pos: TilePos) -> Vec<Tile> {
        pos.neighbors()
            .into_iter()
            .filter_map(|neighbor| self.tile(neighbor))
            .collect()
    }

    /// In-bounds tiles within the Manhattan `range` of `pos`, row-major.
    #[must_use]
    pub fn tiles_in_range(&self, pos: TilePos, range: u32) -> Vec<Tile> {
        let reach = i32::try_from(range).unwrap_or(i32::MAX);
        let mut tiles = Vec::new();
        for row in pos.row().saturating_sub(reach)..=pos.row().saturating_add(reach) {
            for col in pos.col().saturating_sub(reach)..=pos.col().saturating_add(reach) {
                let candidate = TilePos::new(row, col);
                if pos.manhattan_distance(candidate) > range {
                    continue;
                }
                if let Some(tile) = self.tile(candidate) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    /// Overwrites the terrain of a tile; positions off the grid are ignored.
    pub fn set_terrain(&mut self, pos: TilePos, terrain: Terrain) {
        if let Some(index) = self.index(pos) {
            self.terrain[index] = terrain;
        }
    }

    /// Resets the grid to grass and copies the provided terrain table into it.
    ///
    /// Rows and columns that fall outside the grid are dropped.
    pub fn load_map<R>(&mut self, table: &[R])
    where
        R: AsRef<[Terrain]>,
    {
        self.terrain.fill(DEFAULT_TERRAIN);
        for (row, terrain_row) in table.iter().enumerate() {
            let Ok(row) = i32::try_from(row) else {
                break;
            };
            for (col, terrain) in terrain_row.as_ref().iter().enumerate() {
                let Ok(col) = i32::try_from(col) else {
                    break;
                };
                self.set_terrain(TilePos::new(row, col), *terrain);
            }
        }
    }

    /// Every position on the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> {
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);
        let cols = i32::try_from(self.cols).unwrap_or(i32::MAX);
        (0..rows).flat_map(move |row| (0..cols).map(move |col| TilePos::new(row, col)))
    }

    /// Number of tiles that can be walked on.
    #[must_use]
    pub fn passable_count(&self) -> usize {
        self.terrain
            .iter()
            .filter(|terrain| terrain.is_passable())
            .count()
    }

    /// Row-major index of the position, or `None` when it lies off the grid.
    #[must_use]
    pub fn index(&self, pos: TilePos) -> Option<usize> {
        let row = u32::try_from(pos.row()).ok()?;
        let col = u32::try_from(pos.col()).ok()?;
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let width = usize::try_from(self.cols).ok()?;
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        row.checked_mul(width)?.checked_add(col)
    }
}

/// Reasons a glyph table could not be turned into a world.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapParseError {
    /// A character did not correspond to any terrain.
    #[error("unknown terrain glyph '{glyph}' at row {row}, column {col}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Row containing the character.
        row: usize,
        /// Column containing the character.
        col: usize,
    },
    /// The table has more rows or columns than the grid can address.
    #[error("terrain table exceeds the addressable grid size")]
    TooLarge,
}
