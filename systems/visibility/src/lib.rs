#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line-of-sight visibility and fog of war.
//!
//! Visibility is evaluated inside a square window centred on an observer. A
//! tile is seen when a straight walk from the observer reaches it without
//! passing over a tile that blocks sight. Blocking tiles are themselves
//! visible; only what lies behind them is hidden.

use std::collections::HashSet;

use grid_tactics_core::TilePos;
use grid_tactics_world::World;

/// Side length of the visibility window used when none is specified.
pub const DEFAULT_VISIBILITY_SIZE: u32 = 10;

/// Computes the tiles visible from `origin` inside a `size`×`size` window.
///
/// The window starts `size / 2` tiles above and left of the origin. Tiles
/// outside the world are never reported. The origin is always visible.
#[must_use]
pub fn compute_visible(world: &World, origin: TilePos, size: u32) -> HashSet<TilePos> {
    let half = i32::try_from(size / 2).unwrap_or(i32::MAX);
    let span = i32::try_from(size).unwrap_or(i32::MAX);
    let min_row = origin.row().saturating_sub(half);
    let min_col = origin.col().saturating_sub(half);
    let max_row = min_row.saturating_add(span).saturating_sub(1);
    let max_col = min_col.saturating_add(span).saturating_sub(1);

    let mut visible = HashSet::new();
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            let candidate = TilePos::new(row, col);
            if world.contains(candidate) && has_line_of_sight(world, origin, candidate) {
                let _ = visible.insert(candidate);
            }
        }
    }
    let _ = visible.insert(origin);
    visible
}

/// Reports whether `pos` belongs to a visible set.
#[must_use]
pub fn is_tile_visible(visible: &HashSet<TilePos>, pos: TilePos) -> bool {
    visible.contains(&pos)
}

/// Walks from `from` toward `to` one interpolated step at a time.
///
/// Reaching `to` succeeds regardless of its terrain; stepping onto a missing
/// tile or a sight-blocking tile first fails.
fn has_line_of_sight(world: &World, from: TilePos, to: TilePos) -> bool {
    let row_delta = f64::from(to.row()) - f64::from(from.row());
    let col_delta = f64::from(to.col()) - f64::from(from.col());
    let steps = from
        .row()
        .abs_diff(to.row())
        .max(from.col().abs_diff(to.col()));
    if steps == 0 {
        return true;
    }

    let total = f64::from(steps);
    for step in 1..=steps {
        let progress = f64::from(step) / total;
        let row = round_half_up(f64::from(from.row()) + row_delta * progress);
        let col = round_half_up(f64::from(from.col()) + col_delta * progress);
        let pos = TilePos::new(row, col);
        if pos == to {
            return true;
        }
        match world.terrain(pos) {
            Some(terrain) if !terrain.blocks_sight() => {}
            _ => return false,
        }
    }
    true
}

/// Rounds to the nearest integer with halves going toward positive infinity.
fn round_half_up(value: f64) -> i32 {
    // Coordinates come from i32 endpoints, so the result always fits.
    (value + 0.5).floor() as i32
}

/// What the observer knows about a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FogState {
    /// Never seen.
    #[default]
    Unexplored,
    /// Seen before but outside the current view.
    Explored,
    /// Inside the current view.
    Visible,
}

/// Current view plus everything ever seen.
///
/// The explored set only grows; each [`FogOfWar::reveal`] replaces the current
/// view and folds it into the explored set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FogOfWar {
    visible: HashSet<TilePos>,
    explored: HashSet<TilePos>,
}

impl FogOfWar {
    /// Creates fog with nothing seen yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the view from `origin` and records it as explored.
    pub fn reveal(&mut self, world: &World, origin: TilePos, size: u32) -> &HashSet<TilePos> {
        self.visible = compute_visible(world, origin, size);
        self.explored.extend(self.visible.iter().copied());
        tracing::trace!(
            origin = %origin,
            visible = self.visible.len(),
            explored = self.explored.len(),
            "revealed fog"
        );
        &self.visible
    }

    /// Tiles inside the current view.
    #[must_use]
    pub fn visible(&self) -> &HashSet<TilePos> {
        &self.visible
    }

    /// Tiles that have ever been inside a view.
    #[must_use]
    pub fn explored(&self) -> &HashSet<TilePos> {
        &self.explored
    }

    /// Reports whether the tile is currently in view.
    #[must_use]
    pub fn is_visible(&self, pos: TilePos) -> bool {
        self.visible.contains(&pos)
    }

    /// Reports whether the tile has ever been in view.
    #[must_use]
    pub fn is_explored(&self, pos: TilePos) -> bool {
        self.explored.contains(&pos)
    }

    /// Classifies the tile for rendering.
    #[must_use]
    pub fn state(&self, pos: TilePos) -> FogState {
        if self.is_visible(pos) {
            FogState::Visible
        } else if self.is_explored(pos) {
            FogState::Explored
        } else {
            FogState::Unexplored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::Terrain;

    #[test]
    fn rounding_sends_halves_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(0.49), 0);
    }

    #[test]
    fn open_window_sees_every_in_bounds_tile() {
        let world = World::new(10, 10);
        let visible = compute_visible(&world, TilePos::new(5, 5), DEFAULT_VISIBILITY_SIZE);
        assert_eq!(visible.len(), 100);
    }

    #[test]
    fn window_is_clipped_by_the_grid() {
        let world = World::new(10, 10);
        let visible = compute_visible(&world, TilePos::new(0, 0), 4);
        // Rows and columns -2..=1 intersect the grid in a 2x2 corner.
        assert_eq!(visible.len(), 4);
        assert!(visible.iter().all(|pos| world.contains(*pos)));
    }

    #[test]
    fn walls_are_seen_but_hide_what_lies_behind() {
        let mut world = World::new(7, 7);
        world.set_terrain(TilePos::new(3, 4), Terrain::Wall);
        let visible = compute_visible(&world, TilePos::new(3, 3), 7);

        assert!(is_tile_visible(&visible, TilePos::new(3, 4)));
        assert!(!is_tile_visible(&visible, TilePos::new(3, 5)));
        assert!(!is_tile_visible(&visible, TilePos::new(3, 6)));
        assert!(is_tile_visible(&visible, TilePos::new(1, 5)));
    }

    #[test]
    fn water_does_not_block_sight() {
        let mut world = World::new(5, 5);
        world.set_terrain(TilePos::new(2, 3), Terrain::Water);
        let visible = compute_visible(&world, TilePos::new(2, 2), 5);
        assert!(is_tile_visible(&visible, TilePos::new(2, 4)));
    }

    #[test]
    fn origin_is_visible_even_in_a_zero_window() {
        let world = World::new(3, 3);
        let visible = compute_visible(&world, TilePos::new(1, 1), 0);
        assert_eq!(visible.len(), 1);
        assert!(is_tile_visible(&visible, TilePos::new(1, 1)));
    }

    #[test]
    fn fog_tracks_visible_and_explored_tiles() {
        let mut world = World::new(1, 12);
        world.set_terrain(TilePos::new(0, 6), Terrain::Wall);
        let mut fog = FogOfWar::new();
        assert_eq!(fog.state(TilePos::new(0, 0)), FogState::Unexplored);

        let _ = fog.reveal(&world, TilePos::new(0, 1), 4);
        assert_eq!(fog.state(TilePos::new(0, 2)), FogState::Visible);
        assert_eq!(fog.state(TilePos::new(0, 9)), FogState::Unexplored);

        let _ = fog.reveal(&world, TilePos::new(0, 9), 4);
        assert_eq!(fog.state(TilePos::new(0, 2)), FogState::Explored);
        assert_eq!(fog.state(TilePos::new(0, 9)), FogState::Visible);
        assert!(fog.is_explored(TilePos::new(0, 0)));
        assert!(!fog.is_visible(TilePos::new(0, 0)));
        assert!(!fog.is_explored(TilePos::new(0, 5)));
    }
}
