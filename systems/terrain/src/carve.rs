//! Water and wall features carved over the painted biomes.

use grid_tactics_core::{Terrain, TilePos};
use grid_tactics_world::World;
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
    Rng,
};

use crate::{chance, random_pos, roll, to_coord, GeneratorConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    const fn opposite(self) -> Self {
        match self {
            Edge::Top => Edge::Bottom,
            Edge::Bottom => Edge::Top,
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
        }
    }

    fn random_tile<R>(self, world: &World, rng: &mut R) -> TilePos
    where
        R: Rng + ?Sized,
    {
        let last_row = to_coord(world.rows().saturating_sub(1));
        let last_col = to_coord(world.cols().saturating_sub(1));
        let along = random_pos(world, rng);
        match self {
            Edge::Top => TilePos::new(0, along.col()),
            Edge::Bottom => TilePos::new(last_row, along.col()),
            Edge::Left => TilePos::new(along.row(), 0),
            Edge::Right => TilePos::new(along.row(), last_col),
        }
    }

    fn distance(self, world: &World, pos: TilePos) -> u32 {
        let last_row = to_coord(world.rows().saturating_sub(1));
        let last_col = to_coord(world.cols().saturating_sub(1));
        match self {
            Edge::Top => pos.row().unsigned_abs(),
            Edge::Bottom => last_row.abs_diff(pos.row()),
            Edge::Left => pos.col().unsigned_abs(),
            Edge::Right => last_col.abs_diff(pos.col()),
        }
    }

    /// Offsets perpendicular to travel away from this edge.
    const fn sides(self) -> [(i32, i32); 2] {
        match self {
            Edge::Top | Edge::Bottom => [(0, -1), (0, 1)],
            Edge::Left | Edge::Right => [(-1, 0), (1, 0)],
        }
    }
}

/// Carves up to `max_rivers` edge-to-edge rivers and returns how many ran.
pub(crate) fn carve_rivers<R>(world: &mut World, config: &GeneratorConfig, rng: &mut R) -> u32
where
    R: Rng + ?Sized,
{
    let rivers = rng.gen_range(0..=config.max_rivers);
    let step_cap = config.river_step_cap.min(world.area());

    for _ in 0..rivers {
        let Some(&source) = Edge::ALL.choose(rng) else {
            break;
        };
        let target = source.opposite();
        let [near, far] = source.sides();
        let mut current = source.random_tile(world, rng);

        for _ in 0..step_cap {
            world.set_terrain(current, Terrain::Water);
            if chance(rng, config.river_splash_near) {
                world.set_terrain(current.offset(near.0, near.1), Terrain::Water);
            }
            if chance(rng, config.river_splash_far) {
                world.set_terrain(current.offset(far.0, far.1), Terrain::Water);
            }
            if target.distance(world, current) == 0 {
                break;
            }

            let options: Vec<TilePos> = current
                .neighbors()
                .into_iter()
                .filter(|next| world.contains(*next))
                .collect();
            let next = if chance(rng, config.river_bias) {
                let closest = options
                    .iter()
                    .map(|next| target.distance(world, *next))
                    .min();
                let best: Vec<TilePos> = options
                    .iter()
                    .copied()
                    .filter(|next| Some(target.distance(world, *next)) == closest)
                    .collect();
                best.choose(rng).copied()
            } else {
                let weights: Vec<f64> = options
                    .iter()
                    .map(|next| 1.0 / (f64::from(target.distance(world, *next)) + 1.0))
                    .collect();
                match WeightedIndex::new(&weights) {
                    Ok(weighted) => options.get(weighted.sample(rng)).copied(),
                    Err(_) => options.choose(rng).copied(),
                }
            };
            match next {
                Some(next) => current = next,
                None => break,
            }
        }
    }
    rivers
}

/// Floods one Manhattan disc per `tiles_per_lake` tiles of area, rounded up.
pub(crate) fn carve_lakes<R>(world: &mut World, config: &GeneratorConfig, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let lakes = lake_count(world.area(), config.tiles_per_lake);
    for _ in 0..lakes {
        let center = random_pos(world, rng);
        let radius = roll(rng, config.min_lake_radius, config.max_lake_radius);
        for tile in world.tiles_in_range(center, radius) {
            world.set_terrain(tile.pos(), Terrain::Water);
        }
    }
    lakes
}

fn lake_count(area: usize, tiles_per_lake: usize) -> usize {
    if tiles_per_lake == 0 {
        return 0;
    }
    area.saturating_add(tiles_per_lake - 1) / tiles_per_lake
}

/// Surrounds the map with water and lines the inside of the ring with sand.
pub(crate) fn ring_island<R>(world: &mut World, config: &GeneratorConfig, rng: &mut R) -> u32
where
    R: Rng + ?Sized,
{
    let thickness = roll(rng, config.min_island_ring, config.max_island_ring);
    let last_row = to_coord(world.rows().saturating_sub(1));
    let last_col = to_coord(world.cols().saturating_sub(1));
    let positions: Vec<TilePos> = world.positions().collect();

    for pos in positions {
        let border = pos
            .row()
            .min(pos.col())
            .min(last_row - pos.row())
            .min(last_col - pos.col())
            .unsigned_abs();
        if border < thickness {
            world.set_terrain(pos, Terrain::Water);
        } else if border == thickness {
            world.set_terrain(pos, Terrain::Sand);
        }
    }
    thickness
}

/// Raises short wall runs until the wall budget is spent; returns walls placed.
pub(crate) fn raise_walls<R>(world: &mut World, config: &GeneratorConfig, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let budget = wall_budget(world.area(), config.wall_budget);
    let clusters = budget
        .checked_div(config.wall_tiles_per_cluster)
        .unwrap_or(0)
        .max(config.min_wall_clusters);
    let directions = TilePos::new(0, 0).neighbors();
    let mut placed = 0;

    for _ in 0..clusters {
        if placed >= budget {
            break;
        }
        let mut current = random_pos(world, rng);
        let Some(mut heading) = directions.choose(rng).copied() else {
            break;
        };
        let steps = roll(rng, config.min_wall_steps, config.max_wall_steps);

        for _ in 0..steps {
            if placed >= budget {
                break;
            }
            if world.is_passable(current) {
                world.set_terrain(current, Terrain::Wall);
                placed += 1;
            }
            if chance(rng, config.wall_turn_chance) {
                if let Some(turned) = directions.choose(rng) {
                    heading = *turned;
                }
            }
            current = current.offset(heading.row(), heading.col());
            if !world.contains(current) {
                break;
            }
        }
    }
    placed
}

fn wall_budget(area: usize, fraction: f64) -> usize {
    let budget = (area as f64 * fraction.clamp(0.0, 1.0)).floor();
    budget as usize
}
