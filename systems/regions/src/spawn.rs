//! Player and enemy start positions.

use grid_tactics_core::{Combatant, Entity, EntityId, EntityKind, TilePos};
use grid_tactics_world::World;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Region;

/// Tuning parameters for spawn placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Starting and maximum health of the player.
    pub player_health: u32,
    /// Smallest health an enemy may start with.
    pub enemy_health_min: u32,
    /// Largest health an enemy may start with.
    pub enemy_health_max: u32,
    /// Grid area that warrants one enemy.
    pub tiles_per_enemy: u32,
    /// Lower clamp on the enemy count.
    pub min_enemies: u32,
    /// Upper clamp on the enemy count.
    pub max_enemies: u32,
    /// Preferred minimum Manhattan distance between an enemy and the player.
    pub enemy_separation: u32,
    /// Passable neighbours a tile needs before the player may start on it.
    pub min_player_neighbors: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            player_health: 5,
            enemy_health_min: 2,
            enemy_health_max: 4,
            tiles_per_enemy: 140,
            min_enemies: 3,
            max_enemies: 8,
            enemy_separation: 4,
            min_player_neighbors: 2,
        }
    }
}

impl SpawnConfig {
    /// Number of enemies a grid of the provided shape calls for.
    #[must_use]
    pub fn enemy_count(&self, rows: u32, cols: u32) -> usize {
        let upper = self.max_enemies.max(self.min_enemies);
        let area = u64::from(rows) * u64::from(cols);
        let by_area = area
            .checked_div(u64::from(self.tiles_per_enemy))
            .unwrap_or(u64::from(upper));
        let clamped = by_area.clamp(u64::from(self.min_enemies), u64::from(upper));
        usize::try_from(clamped).unwrap_or(usize::MAX)
    }

    fn enemy_health_bounds(&self) -> (u32, u32) {
        let low = self.enemy_health_min.min(self.enemy_health_max);
        let high = self.enemy_health_min.max(self.enemy_health_max);
        (low.max(1), high.max(1))
    }
}

/// Enemy start position with its rolled health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemySpawn {
    /// Tile the enemy starts on.
    pub pos: TilePos,
    /// Starting and maximum health of the enemy.
    pub health: u32,
}

/// Start positions chosen for one match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpawnPlan {
    /// Tile the player starts on.
    pub player: TilePos,
    /// Starting and maximum health of the player.
    pub player_health: u32,
    /// Enemy starts in placement order.
    pub enemies: Vec<EnemySpawn>,
}

impl SpawnPlan {
    /// Materialises the plan as entities: the player first, then the enemies.
    ///
    /// The player receives identifier 1 and enemies follow from 2 upward.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities = Vec::with_capacity(self.enemies.len() + 1);
        entities.push(
            Entity::new(EntityId::new(1), EntityKind::Player, self.player)
                .with_combatant(Combatant::full(self.player_health)),
        );
        for (offset, enemy) in (2_u32..).zip(self.enemies.iter()) {
            entities.push(
                Entity::new(EntityId::new(offset), EntityKind::Enemy, enemy.pos)
                    .with_combatant(Combatant::full(enemy.health)),
            );
        }
        entities
    }
}

/// Chooses the player and enemy start tiles inside `region`.
///
/// Returns `None` only when the region is empty. The enemy list may be
/// shorter than [`SpawnConfig::enemy_count`] when the region cannot hold them.
pub fn plan_spawns<R>(
    world: &World,
    region: &Region,
    config: &SpawnConfig,
    rng: &mut R,
) -> Option<SpawnPlan>
where
    R: Rng + ?Sized,
{
    let player = choose_player_tile(world, region, config)?;

    let mut pool: Vec<TilePos> = region
        .tiles()
        .iter()
        .copied()
        .filter(|pos| *pos != player && world.passable_neighbor_count(*pos) >= 1)
        .collect();
    if pool.is_empty() {
        pool = region
            .tiles()
            .iter()
            .copied()
            .filter(|pos| *pos != player)
            .collect();
    }

    let wanted = config
        .enemy_count(world.rows(), world.cols())
        .min(region.len().saturating_sub(1));
    let (health_min, health_max) = config.enemy_health_bounds();
    let mut threshold = config.enemy_separation.max(1);
    let mut enemies = Vec::with_capacity(wanted);

    while enemies.len() < wanted && !pool.is_empty() {
        let qualifying: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, pos)| pos.manhattan_distance(player) >= threshold)
            .map(|(index, _)| index)
            .collect();

        let index = if !qualifying.is_empty() {
            qualifying[rng.gen_range(0..qualifying.len())]
        } else if threshold > 1 {
            threshold -= 1;
            continue;
        } else {
            rng.gen_range(0..pool.len())
        };

        let pos = pool.swap_remove(index);
        let health = rng.gen_range(health_min..=health_max);
        enemies.push(EnemySpawn { pos, health });
    }

    tracing::debug!(
        player = %player,
        enemies = enemies.len(),
        wanted,
        separation = threshold,
        "planned spawns"
    );

    Some(SpawnPlan {
        player,
        player_health: config.player_health,
        enemies,
    })
}

fn choose_player_tile(world: &World, region: &Region, config: &SpawnConfig) -> Option<TilePos> {
    let roomy: Vec<TilePos> = region
        .tiles()
        .iter()
        .copied()
        .filter(|pos| world.passable_neighbor_count(*pos) >= config.min_player_neighbors)
        .collect();
    let candidates = if roomy.is_empty() {
        region.tiles()
    } else {
        roomy.as_slice()
    };

    // Distances are doubled so the centre of an even-sized grid stays integral.
    let center_row = i64::from(world.rows()) - 1;
    let center_col = i64::from(world.cols()) - 1;
    candidates.iter().copied().min_by_key(|pos| {
        (2 * i64::from(pos.row()) - center_row).abs() + (2 * i64::from(pos.col()) - center_col).abs()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::find_regions;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn enemy_count_clamps_by_area() {
        let config = SpawnConfig::default();
        assert_eq!(config.enemy_count(10, 10), 3);
        assert_eq!(config.enemy_count(20, 30), 4);
        assert_eq!(config.enemy_count(50, 50), 8);
    }

    #[test]
    fn enemy_count_survives_degenerate_config() {
        let config = SpawnConfig {
            tiles_per_enemy: 0,
            min_enemies: 6,
            max_enemies: 2,
            ..SpawnConfig::default()
        };
        assert_eq!(config.enemy_count(10, 10), 6);
    }

    #[test]
    fn player_starts_nearest_the_centre() {
        let world = World::new(9, 9);
        let region = find_regions(&world).remove(0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let plan = plan_spawns(&world, &region, &SpawnConfig::default(), &mut rng)
            .expect("non-empty region");
        assert_eq!(plan.player, TilePos::new(4, 4));
    }

    #[test]
    fn player_prefers_roomy_tiles() {
        // The centre tile (1, 1) is a dead end; (1, 2) has two open neighbours.
        let world = World::from_glyph_rows(&["###G", "#GGG", "####"]).expect("valid map");
        let region = find_regions(&world).remove(0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let plan = plan_spawns(&world, &region, &SpawnConfig::default(), &mut rng)
            .expect("non-empty region");
        assert_eq!(plan.player, TilePos::new(1, 2));
    }

    #[test]
    fn enemies_keep_their_distance_when_room_allows() {
        let world = World::new(12, 12);
        let region = find_regions(&world).remove(0);
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let plan = plan_spawns(&world, &region, &SpawnConfig::default(), &mut rng)
            .expect("non-empty region");
        assert_eq!(plan.enemies.len(), 3);
        for enemy in &plan.enemies {
            assert!(enemy.pos.manhattan_distance(plan.player) >= 4);
            assert!((2..=4).contains(&enemy.health));
        }
    }

    #[test]
    fn separation_relaxes_in_cramped_regions() {
        let world = World::from_glyph_rows(&["GGG", "GGG"]).expect("valid map");
        let region = find_regions(&world).remove(0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let plan = plan_spawns(&world, &region, &SpawnConfig::default(), &mut rng)
            .expect("non-empty region");
        assert_eq!(plan.enemies.len(), 3);

        let mut occupied: Vec<_> = plan.enemies.iter().map(|enemy| enemy.pos).collect();
        occupied.push(plan.player);
        occupied.sort();
        occupied.dedup();
        assert_eq!(occupied.len(), 4, "spawns must not share tiles");
    }

    #[test]
    fn enemy_count_is_capped_by_region_size() {
        let world = World::from_glyph_rows(&["GG~~", "~~~~", "~~~~"]).expect("valid map");
        let region = find_regions(&world).remove(0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let plan = plan_spawns(&world, &region, &SpawnConfig::default(), &mut rng)
            .expect("non-empty region");
        assert_eq!(plan.enemies.len(), 1);
    }

    #[test]
    fn empty_region_yields_no_plan() {
        let world = World::new(3, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(plan_spawns(&world, &Region::default(), &SpawnConfig::default(), &mut rng).is_none());
    }

    #[test]
    fn entities_number_player_first() {
        let plan = SpawnPlan {
            player: TilePos::new(1, 1),
            player_health: 5,
            enemies: vec![
                EnemySpawn {
                    pos: TilePos::new(3, 3),
                    health: 2,
                },
                EnemySpawn {
                    pos: TilePos::new(4, 4),
                    health: 4,
                },
            ],
        };

        let entities = plan.entities();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].kind, EntityKind::Player);
        assert_eq!(entities[0].health(), Some(5));
        assert_eq!(entities[2].id, EntityId::new(3));
        assert_eq!(entities[2].combatant, Some(Combatant::full(4)));
    }
}
