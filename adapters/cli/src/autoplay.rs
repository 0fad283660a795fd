use std::{sync::mpsc, time::Duration};

use anyhow::{Context, Result};
use grid_tactics_core::{Entity, EntityKind, Intent, TilePos};
use grid_tactics_system_combat::{Scene, Simulator};
use grid_tactics_system_terrain::GeneratedMap;

const TICK: Duration = Duration::from_millis(16);

/// How an automated match ended.
#[derive(Debug)]
pub(crate) struct AutoplayReport {
    /// Simulator left in its final state.
    pub(crate) simulator: Simulator,
    /// Player turns that were submitted.
    pub(crate) turns: u32,
}

/// Plays `map` with a greedy player until the match ends or `max_turns` pass.
pub(crate) fn autoplay(map: &GeneratedMap, max_turns: u32) -> Result<AutoplayReport> {
    let (sender, receiver) = mpsc::channel();
    let mut simulator = Simulator::new();
    simulator.initialize(map.world.clone(), receiver, map.entities());

    let mut turns = 0;
    while turns < max_turns && !simulator.is_over() {
        let Some(intent) = next_intent(&simulator) else {
            tracing::info!(turns, "greedy player has no move left");
            break;
        };
        sender
            .send(intent)
            .context("simulator dropped its intent channel")?;
        simulator.update(TICK);
        turns += 1;

        for event in simulator.drain_events() {
            tracing::debug!(turn = turns, ?event, "simulation event");
        }
    }

    Ok(AutoplayReport { simulator, turns })
}

/// Attacks an adjacent enemy, otherwise steps toward the nearest one.
pub(crate) fn next_intent(simulator: &Simulator) -> Option<Intent> {
    let player = simulator.player()?.position;
    let enemies: Vec<&Entity> = simulator
        .entities()
        .iter()
        .filter(|entity| entity.kind == EntityKind::Enemy)
        .collect();

    if let Some(adjacent) = enemies
        .iter()
        .find(|enemy| enemy.position.is_adjacent(player))
    {
        return Some(Intent::TapEntity { entity: adjacent.id });
    }

    let nearest = enemies
        .iter()
        .min_by_key(|enemy| (enemy.position.manhattan_distance(player), enemy.id))?;
    step_toward(simulator, player, nearest.position).map(|pos| Intent::SelectTile { pos })
}

fn step_toward(simulator: &Simulator, from: TilePos, goal: TilePos) -> Option<TilePos> {
    from.neighbors()
        .into_iter()
        .filter(|pos| simulator.world().is_passable(*pos) && !simulator.entities().is_occupied(*pos))
        .min_by_key(|pos| pos.manhattan_distance(goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::{EntityId, MatchResult};
    use grid_tactics_system_terrain::{generate, GeneratorConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn map(seed: u64) -> GeneratedMap {
        generate(&GeneratorConfig::default(), &mut ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn greedy_player_attacks_adjacent_enemies_first() {
        let (_sender, receiver) = mpsc::channel();
        let mut simulator = Simulator::new();
        simulator.initialize(
            grid_tactics_world::World::new(3, 3),
            receiver,
            vec![
                Entity::new(EntityId::new(1), EntityKind::Player, TilePos::new(1, 1)),
                Entity::new(EntityId::new(2), EntityKind::Enemy, TilePos::new(1, 2)),
            ],
        );
        assert_eq!(
            next_intent(&simulator),
            Some(Intent::TapEntity {
                entity: EntityId::new(2)
            })
        );
    }

    #[test]
    fn greedy_player_closes_the_distance() {
        let (_sender, receiver) = mpsc::channel();
        let mut simulator = Simulator::new();
        simulator.initialize(
            grid_tactics_world::World::new(5, 5),
            receiver,
            vec![
                Entity::new(EntityId::new(1), EntityKind::Player, TilePos::new(0, 0)),
                Entity::new(EntityId::new(2), EntityKind::Enemy, TilePos::new(4, 0)),
            ],
        );
        assert_eq!(
            next_intent(&simulator),
            Some(Intent::SelectTile {
                pos: TilePos::new(1, 0)
            })
        );
    }

    #[test]
    fn autoplay_respects_the_turn_budget() {
        let report = autoplay(&map(11), 3).expect("autoplay runs");
        assert!(report.turns <= 3);
        assert_eq!(report.simulator.turn(), grid_tactics_core::TurnPhase::Player);
    }

    #[test]
    fn autoplay_is_reproducible() {
        let first = autoplay(&map(4), 60).expect("autoplay runs");
        let second = autoplay(&map(4), 60).expect("autoplay runs");
        assert_eq!(first.turns, second.turns);
        assert_eq!(
            first.simulator.take_snapshot(),
            second.simulator.take_snapshot()
        );
        if first.simulator.is_over() {
            assert_ne!(first.simulator.result(), MatchResult::Playing);
        }
    }
}
