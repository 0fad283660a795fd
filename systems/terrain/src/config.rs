//! Tunable generation parameters loaded from TOML.

use std::{fs, io, path::Path, path::PathBuf};

use grid_tactics_system_regions::SpawnConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every knob that shapes terrain generation and map acceptance.
///
/// Missing keys in a TOML document fall back to the defaults below, so a
/// configuration file only needs to name the values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Attempts made before falling back to the fixed map.
    pub max_attempts: u32,
    /// Smallest row or column count rolled for an attempt.
    pub min_dimension: u32,
    /// Largest row or column count rolled for an attempt.
    pub max_dimension: u32,
    /// Tiles the largest region needs before a map is accepted.
    pub min_region_tiles: usize,
    /// Share of all passable tiles the largest region needs.
    pub min_region_share: f64,
    /// Fewest biome seeds scattered per attempt.
    pub min_biome_seeds: u32,
    /// Most biome seeds scattered per attempt.
    pub max_biome_seeds: u32,
    /// Biome tiles that warrant one terrain patch.
    pub tiles_per_patch: usize,
    /// Shortest patch walk.
    pub min_patch_steps: u32,
    /// Longest patch walk.
    pub max_patch_steps: u32,
    /// Most rivers carved per attempt.
    pub max_rivers: u32,
    /// Chance a river step heads straight for its target edge.
    pub river_bias: f64,
    /// Chance a river splashes onto the first side of its course.
    pub river_splash_near: f64,
    /// Chance a river splashes onto the second side of its course.
    pub river_splash_far: f64,
    /// Upper bound on the steps a single river may take.
    pub river_step_cap: usize,
    /// Grid area that warrants one lake.
    pub tiles_per_lake: usize,
    /// Smallest lake radius.
    pub min_lake_radius: u32,
    /// Largest lake radius.
    pub max_lake_radius: u32,
    /// Thinnest water ring around an island map.
    pub min_island_ring: u32,
    /// Thickest water ring around an island map.
    pub max_island_ring: u32,
    /// Fraction of all tiles that may be turned into walls.
    pub wall_budget: f64,
    /// Fewest wall clusters attempted.
    pub min_wall_clusters: usize,
    /// Wall budget that warrants one additional cluster.
    pub wall_tiles_per_cluster: usize,
    /// Shortest wall cluster walk.
    pub min_wall_steps: u32,
    /// Longest wall cluster walk.
    pub max_wall_steps: u32,
    /// Chance a wall walk changes direction after each step.
    pub wall_turn_chance: f64,
    /// Spawn placement parameters.
    pub spawn: SpawnConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            min_dimension: 10,
            max_dimension: 50,
            min_region_tiles: 25,
            min_region_share: 0.45,
            min_biome_seeds: 2,
            max_biome_seeds: 4,
            tiles_per_patch: 40,
            min_patch_steps: 6,
            max_patch_steps: 18,
            max_rivers: 2,
            river_bias: 0.65,
            river_splash_near: 0.30,
            river_splash_far: 0.35,
            river_step_cap: 120,
            tiles_per_lake: 350,
            min_lake_radius: 1,
            max_lake_radius: 3,
            min_island_ring: 2,
            max_island_ring: 4,
            wall_budget: 0.04,
            min_wall_clusters: 3,
            wall_tiles_per_cluster: 6,
            min_wall_steps: 2,
            max_wall_steps: 6,
            wall_turn_chance: 0.25,
            spawn: SpawnConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// Failures raised while loading a [`GeneratorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read generator config {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The document was not valid TOML for the configuration schema.
    #[error("could not parse generator config: {0}")]
    Parse(#[from] toml::de::Error),
}
