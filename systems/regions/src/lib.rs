#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Connected-region analysis and spawn planning.
//!
//! [`find_regions`] partitions the passable tiles of a world into maximal
//! 4-connected components. [`plan_spawns`] places the player and the enemies
//! inside one of those components so every entity starts on ground that can
//! reach every other entity.

mod spawn;

use std::collections::VecDeque;

use grid_tactics_core::TilePos;
use grid_tactics_world::World;

pub use spawn::{plan_spawns, EnemySpawn, SpawnConfig, SpawnPlan};

/// Maximal 4-connected set of passable tiles in flood-fill discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    tiles: Vec<TilePos>,
}

impl Region {
    /// Tiles composing the region, starting with the flood-fill seed.
    #[must_use]
    pub fn tiles(&self) -> &[TilePos] {
        &self.tiles
    }

    /// Number of tiles in the region.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the region holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Reports whether the position belongs to the region.
    #[must_use]
    pub fn contains(&self, pos: TilePos) -> bool {
        self.tiles.contains(&pos)
    }
}

/// Flood-fills the passable tiles of `world` into connected regions.
///
/// Seeds are visited in row-major order and the result is ordered by
/// descending size; regions of equal size keep their discovery order.
#[must_use]
pub fn find_regions(world: &World) -> Vec<Region> {
    let mut visited = vec![false; world.area()];
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for seed in world.positions() {
        let Some(seed_index) = world.index(seed) else {
            continue;
        };
        if visited[seed_index] || !world.is_passable(seed) {
            continue;
        }

        visited[seed_index] = true;
        queue.push_back(seed);
        let mut tiles = Vec::new();

        while let Some(current) = queue.pop_front() {
            tiles.push(current);
            for neighbor in current.neighbors() {
                if !world.is_passable(neighbor) {
                    continue;
                }
                let Some(index) = world.index(neighbor) else {
                    continue;
                };
                if visited[index] {
                    continue;
                }
                visited[index] = true;
                queue.push_back(neighbor);
            }
        }

        regions.push(Region { tiles });
    }

    regions.sort_by(|left, right| right.len().cmp(&left.len()));
    regions
}
