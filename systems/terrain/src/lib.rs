#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural terrain generation for Grid Tactics.
//!
//! Each attempt rolls a grid shape, paints it from a handful of biome seeds,
//! carves rivers, lakes and wall clusters, and then asks the region analyser
//! and spawn planner whether the result is playable. Attempts that leave the
//! map fragmented or unable to host a full roster are discarded. When the
//! attempt budget runs out the fixed fallback map is used instead, so
//! generation never fails.

mod biome;
mod carve;
mod config;
mod fallback;

use std::fmt;

use grid_tactics_core::{Entity, TilePos};
use grid_tactics_system_regions::{find_regions, plan_spawns, SpawnPlan};
use grid_tactics_world::World;
use rand::Rng;

use crate::biome::BiomeMap;
pub use crate::{
    biome::Biome,
    config::{ConfigError, GeneratorConfig},
    fallback::{fallback_world, FALLBACK_SIZE, FALLBACK_TERRAIN},
};

/// Playable map together with the spawn plan chosen for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeneratedMap {
    /// Terrain of the accepted map.
    pub world: World,
    /// Start positions inside the largest connected region.
    pub spawns: SpawnPlan,
    /// Attempts consumed, including the accepted one.
    pub attempts: u32,
    /// Whether the fixed fallback map was used.
    pub fallback: bool,
    /// Biomes seeded for the accepted map; empty for the fallback.
    pub biomes: Vec<Biome>,
}

impl GeneratedMap {
    /// Initial entity list for the map: the player first, then the enemies.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.spawns.entities()
    }
}

/// Generates a playable map, falling back to the fixed map when every attempt
/// is rejected.
pub fn generate<R>(config: &GeneratorConfig, rng: &mut R) -> GeneratedMap
where
    R: Rng + ?Sized,
{
    for attempt in 1..=config.max_attempts {
        let rows = roll(rng, config.min_dimension.max(1), config.max_dimension.max(1));
        let cols = roll(rng, config.min_dimension.max(1), config.max_dimension.max(1));
        let (world, biomes) = build_terrain(rows, cols, config, rng);

        match evaluate(&world, config, rng) {
            Ok(spawns) => {
                tracing::info!(
                    attempt,
                    rows,
                    cols,
                    enemies = spawns.enemies.len(),
                    "accepted generated map"
                );
                return GeneratedMap {
                    world,
                    spawns,
                    attempts: attempt,
                    fallback: false,
                    biomes,
                };
            }
            Err(rejection) => {
                tracing::debug!(attempt, rows, cols, %rejection, "rejected generated map");
            }
        }
    }

    tracing::info!(
        attempts = config.max_attempts,
        "generation budget exhausted, using fallback map"
    );
    fallback_map(config, rng)
}

/// Paints and carves one candidate map of the given shape.
fn build_terrain<R>(rows: u32, cols: u32, config: &GeneratorConfig, rng: &mut R) -> (World, Vec<Biome>)
where
    R: Rng + ?Sized,
{
    let mut world = World::new(rows, cols);
    let biomes = BiomeMap::scatter(&world, config, rng);
    biomes.paint_base(&mut world);
    biomes.scatter_patches(&mut world, config, rng);

    let rivers = carve::carve_rivers(&mut world, config, rng);
    let lakes = carve::carve_lakes(&mut world, config, rng);
    if biomes.has_island() {
        let ring = carve::ring_island(&mut world, config, rng);
        tracing::trace!(ring, "ringed island");
    }
    let walls = carve::raise_walls(&mut world, config, rng);

    tracing::trace!(rows, cols, rivers, lakes, walls, "carved terrain");
    (world, biomes.seeds().to_vec())
}

/// Why a candidate map was turned down.
#[derive(Debug)]
enum Rejection {
    NoPassableGround,
    RegionTooSmall { tiles: usize },
    RegionTooFragmented { share: f64 },
    TooFewEnemies { enemies: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoPassableGround => f.write_str("no passable ground"),
            Rejection::RegionTooSmall { tiles } => {
                write!(f, "largest region holds only {tiles} tiles")
            }
            Rejection::RegionTooFragmented { share } => {
                write!(f, "largest region covers only {:.0}% of the ground", share * 100.0)
            }
            Rejection::TooFewEnemies { enemies } => {
                write!(f, "only {enemies} enemies could be placed")
            }
        }
    }
}

fn evaluate<R>(world: &World, config: &GeneratorConfig, rng: &mut R) -> Result<SpawnPlan, Rejection>
where
    R: Rng + ?Sized,
{
    let regions = find_regions(world);
    let largest = regions.first().ok_or(Rejection::NoPassableGround)?;
    if largest.len() < config.min_region_tiles {
        return Err(Rejection::RegionTooSmall {
            tiles: largest.len(),
        });
    }

    let share = largest.len() as f64 / world.passable_count() as f64;
    if share < config.min_region_share {
        return Err(Rejection::RegionTooFragmented { share });
    }

    let spawns = plan_spawns(world, largest, &config.spawn, rng).ok_or(Rejection::NoPassableGround)?;
    let required = usize::try_from(config.spawn.min_enemies).unwrap_or(usize::MAX);
    if spawns.enemies.len() < required {
        return Err(Rejection::TooFewEnemies {
            enemies: spawns.enemies.len(),
        });
    }
    Ok(spawns)
}

/// Runs the fixed map through region analysis and spawn planning.
fn fallback_map<R>(config: &GeneratorConfig, rng: &mut R) -> GeneratedMap
where
    R: Rng + ?Sized,
{
    let world = fallback_world();
    let spawns = find_regions(&world)
        .first()
        .and_then(|region| plan_spawns(&world, region, &config.spawn, rng))
        .unwrap_or_else(|| {
            fallback::fallback_spawns(config.spawn.player_health, config.spawn.enemy_health_min)
        });

    GeneratedMap {
        world,
        spawns,
        attempts: config.max_attempts,
        fallback: true,
        biomes: Vec::new(),
    }
}

/// Uniform integer in the inclusive range spanned by `a` and `b`.
pub(crate) fn roll<R>(rng: &mut R, a: u32, b: u32) -> u32
where
    R: Rng + ?Sized,
{
    rng.gen_range(a.min(b)..=a.max(b))
}

/// Bernoulli trial with the probability clamped into `[0, 1]`.
pub(crate) fn chance<R>(rng: &mut R, probability: f64) -> bool
where
    R: Rng + ?Sized,
{
    let probability = if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    };
    rng.gen_bool(probability)
}

/// Uniformly random in-bounds position.
pub(crate) fn random_pos<R>(world: &World, rng: &mut R) -> TilePos
where
    R: Rng + ?Sized,
{
    let row = rng.gen_range(0..world.rows().max(1));
    let col = rng.gen_range(0..world.cols().max(1));
    TilePos::new(to_coord(row), to_coord(col))
}

pub(crate) fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
