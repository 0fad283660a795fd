//! Fixed map used once every generation attempt has been rejected.

use grid_tactics_core::{Terrain, TilePos};
use grid_tactics_system_regions::{EnemySpawn, SpawnPlan};
use grid_tactics_world::World;

const G: Terrain = Terrain::Grass;
const D: Terrain = Terrain::Dirt;
const S: Terrain = Terrain::Sand;
const W: Terrain = Terrain::Water;
const X: Terrain = Terrain::Wall;

/// Side length of the fallback map.
pub const FALLBACK_SIZE: u32 = 10;

/// Grassland sloping diagonally into a sandy shore, a river and a wall ridge.
///
/// Its 62 passable tiles form one 4-connected region.
pub const FALLBACK_TERRAIN: [[Terrain; 10]; 10] = [
    [G, G, G, G, G, G, D, D, S, S],
    [G, G, G, G, G, D, D, S, S, S],
    [G, G, G, G, D, D, S, S, W, W],
    [G, G, G, D, D, S, S, W, W, W],
    [G, G, D, D, S, S, S, W, X, X],
    [G, D, D, S, S, S, W, W, X, X],
    [D, D, S, S, S, W, W, X, X, X],
    [D, S, S, S, W, W, X, X, X, X],
    [S, S, S, W, W, X, X, X, X, X],
    [S, S, W, W, X, X, X, X, X, X],
];

/// Builds the fallback world.
#[must_use]
pub fn fallback_world() -> World {
    let mut world = World::new(FALLBACK_SIZE, FALLBACK_SIZE);
    world.load_map(&FALLBACK_TERRAIN);
    world
}

/// Hand-placed starts for the fallback map, used only if planning fails.
pub(crate) fn fallback_spawns(player_health: u32, enemy_health: u32) -> SpawnPlan {
    SpawnPlan {
        player: TilePos::new(1, 1),
        player_health,
        enemies: [(3, 4), (5, 2), (2, 7)]
            .into_iter()
            .map(|(row, col)| EnemySpawn {
                pos: TilePos::new(row, col),
                health: enemy_health,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_system_regions::find_regions;

    #[test]
    fn fallback_is_one_connected_region() {
        let world = fallback_world();
        assert_eq!(world.passable_count(), 62);

        let regions = find_regions(&world);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 62);
    }

    #[test]
    fn hand_placed_starts_are_passable_and_distinct() {
        let world = fallback_world();
        let plan = fallback_spawns(5, 2);
        assert!(world.is_passable(plan.player));
        for enemy in &plan.enemies {
            assert!(world.is_passable(enemy.pos));
            assert_ne!(enemy.pos, plan.player);
        }
        assert_eq!(plan.enemies.len(), 3);
    }
}
