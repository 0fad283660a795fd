//! Biome seeding, Voronoi assignment and patch scattering.

use grid_tactics_core::{Terrain, TilePos};
use grid_tactics_world::World;
use rand::{seq::SliceRandom, Rng};

use crate::{random_pos, roll, GeneratorConfig};

/// Landscape class that decides the base terrain of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Grassland broken by dirt and sand clearings.
    Forest,
    /// Sand flats with dirt and grass oases.
    Desert,
    /// Sand coast with grass and dirt dunes.
    Beach,
    /// Grassland that surrounds itself with a water ring.
    Island,
}

impl Biome {
    /// Every biome in a fixed order.
    pub const ALL: [Biome; 4] = [Biome::Forest, Biome::Desert, Biome::Beach, Biome::Island];

    /// Terrain laid down before any patch is scattered.
    #[must_use]
    pub const fn base_terrain(self) -> Terrain {
        match self {
            Biome::Forest | Biome::Island => Terrain::Grass,
            Biome::Desert | Biome::Beach => Terrain::Sand,
        }
    }

    /// Terrains a patch of this biome may paint.
    #[must_use]
    pub const fn patch_terrain(self) -> [Terrain; 2] {
        match self {
            Biome::Forest => [Terrain::Dirt, Terrain::Sand],
            Biome::Desert => [Terrain::Dirt, Terrain::Grass],
            Biome::Beach => [Terrain::Grass, Terrain::Dirt],
            Biome::Island => [Terrain::Dirt, Terrain::Sand],
        }
    }
}

/// Per-tile biome labels for one attempt, stored row-major.
#[derive(Debug)]
pub(crate) struct BiomeMap {
    seeds: Vec<Biome>,
    labels: Vec<Biome>,
}

impl BiomeMap {
    /// Scatters seeds over `world` and labels every tile with its nearest seed.
    pub(crate) fn scatter<R>(world: &World, config: &GeneratorConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let count = roll(rng, config.min_biome_seeds.max(1), config.max_biome_seeds.max(1));
        let seeds: Vec<(TilePos, Biome)> = (0..count)
            .map(|_| {
                let pos = random_pos(world, rng);
                let biome = *Biome::ALL.choose(rng).unwrap_or(&Biome::Forest);
                (pos, biome)
            })
            .collect();

        let labels = world
            .positions()
            .map(|pos| {
                seeds
                    .iter()
                    .min_by_key(|(seed, _)| seed.manhattan_distance(pos))
                    .map_or(Biome::Forest, |(_, biome)| *biome)
            })
            .collect();

        Self {
            seeds: seeds.into_iter().map(|(_, biome)| biome).collect(),
            labels,
        }
    }

    /// Biomes of the seeds in placement order.
    pub(crate) fn seeds(&self) -> &[Biome] {
        &self.seeds
    }

    /// Reports whether any seed rolled the island biome.
    pub(crate) fn has_island(&self) -> bool {
        self.seeds.contains(&Biome::Island)
    }

    fn biome_at(&self, world: &World, pos: TilePos) -> Option<Biome> {
        world.index(pos).map(|index| self.labels[index])
    }

    /// Writes every tile's base terrain into `world`.
    pub(crate) fn paint_base(&self, world: &mut World) {
        let positions: Vec<TilePos> = world.positions().collect();
        for (pos, biome) in positions.into_iter().zip(self.labels.iter()) {
            world.set_terrain(pos, biome.base_terrain());
        }
    }

    /// Scatters random-walk patches of alternate terrain inside each biome.
    pub(crate) fn scatter_patches<R>(&self, world: &mut World, config: &GeneratorConfig, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for biome in Biome::ALL {
            let tiles: Vec<TilePos> = world
                .positions()
                .zip(self.labels.iter())
                .filter(|(_, label)| **label == biome)
                .map(|(pos, _)| pos)
                .collect();
            if tiles.is_empty() {
                continue;
            }

            let patches = tiles
                .len()
                .checked_div(config.tiles_per_patch)
                .unwrap_or(0)
                .max(1);
            for _ in 0..patches {
                let Some(&start) = tiles.choose(rng) else {
                    break;
                };
                let painted = *biome
                    .patch_terrain()
                    .choose(rng)
                    .unwrap_or(&biome.base_terrain());
                let steps = roll(rng, config.min_patch_steps, config.max_patch_steps);

                let mut current = start;
                for _ in 0..steps {
                    world.set_terrain(current, painted);
                    let same_biome: Vec<TilePos> = current
                        .neighbors()
                        .into_iter()
                        .filter(|next| self.biome_at(world, *next) == Some(biome))
                        .collect();
                    match same_biome.choose(rng) {
                        Some(next) => current = *next,
                        None => break,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn base_terrain_matches_biome() {
        assert_eq!(Biome::Forest.base_terrain(), Terrain::Grass);
        assert_eq!(Biome::Island.base_terrain(), Terrain::Grass);
        assert_eq!(Biome::Desert.base_terrain(), Terrain::Sand);
        assert_eq!(Biome::Beach.base_terrain(), Terrain::Sand);
    }

    #[test]
    fn patch_terrain_never_repeats_the_base() {
        for biome in Biome::ALL {
            assert!(!biome.patch_terrain().contains(&biome.base_terrain()));
        }
    }

    #[test]
    fn seed_count_stays_in_configured_range() {
        let world = World::new(12, 12);
        let config = GeneratorConfig::default();
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let biomes = BiomeMap::scatter(&world, &config, &mut rng);
            assert!((2..=4).contains(&biomes.seeds().len()));
        }
    }

    #[test]
    fn single_seed_labels_every_tile() {
        let world = World::new(6, 7);
        let config = GeneratorConfig {
            min_biome_seeds: 1,
            max_biome_seeds: 1,
            ..GeneratorConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let biomes = BiomeMap::scatter(&world, &config, &mut rng);

        let only = biomes.seeds()[0];
        assert!(world
            .positions()
            .all(|pos| biomes.biome_at(&world, pos) == Some(only)));
    }

    #[test]
    fn patches_only_paint_passable_biome_terrain() {
        let mut world = World::new(20, 20);
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let biomes = BiomeMap::scatter(&world, &config, &mut rng);
        biomes.paint_base(&mut world);
        biomes.scatter_patches(&mut world, &config, &mut rng);

        for pos in world.positions() {
            let biome = biomes.biome_at(&world, pos).expect("labelled");
            let terrain = world.terrain(pos).expect("in bounds");
            assert!(
                terrain == biome.base_terrain() || biome.patch_terrain().contains(&terrain),
                "{terrain:?} does not belong to {biome:?} at {pos}"
            );
        }
        assert_eq!(world.passable_count(), world.area());
    }
}
