#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn-based combat for Grid Tactics.
//!
//! [`Simulator`] owns the live entity arena. It drains player [`Intent`]s from
//! a channel, validates them against the world, and turns accepted intents
//! into [`GameAction`]s. Every action, whether it comes from the player, the
//! enemy phase or a replay, is executed by [`apply_action`] so the action log
//! always reproduces the arena.
//!
//! [`Intent`]: grid_tactics_core::Intent

mod simulator;
mod turn;

use grid_tactics_core::{EntityArena, GameAction};

pub use simulator::{Scene, Simulator};
pub use turn::TurnManager;

/// Health granted to a player that arrives without a health pool.
pub const DEFAULT_PLAYER_HEALTH: u32 = 5;

/// Health granted to an enemy that arrives without a health pool.
pub const DEFAULT_ENEMY_HEALTH: u32 = 2;

/// Damage dealt by a single attack.
pub const DAMAGE_PER_HIT: u32 = 1;

/// Executes one action against the arena.
///
/// Actions naming an unknown entity are ignored, as are attacks on entities
/// without a health pool. No passability or adjacency rules are enforced here;
/// validation belongs to whoever produced the action.
pub fn apply_action(entities: &mut EntityArena, action: &GameAction) {
    match action {
        GameAction::Move { entity_id, to } => {
            if let Some(entity) = entities.get_mut(*entity_id) {
                entity.position = *to;
            }
        }
        GameAction::Attack { target_id, .. } => {
            if let Some(combatant) = entities
                .get_mut(*target_id)
                .and_then(|target| target.combatant.as_mut())
            {
                combatant.take_damage(DAMAGE_PER_HIT);
            }
        }
        GameAction::Remove { entity_id } => {
            let _ = entities.remove(*entity_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::{Combatant, Entity, EntityId, EntityKind, TilePos};

    fn arena() -> EntityArena {
        EntityArena::from_entities([
            Entity::new(EntityId::new(1), EntityKind::Player, TilePos::new(0, 0))
                .with_combatant(Combatant::full(5)),
            Entity::new(EntityId::new(2), EntityKind::Enemy, TilePos::new(0, 1))
                .with_combatant(Combatant::full(1)),
            Entity::new(EntityId::new(3), EntityKind::Npc, TilePos::new(4, 4)),
        ])
    }

    #[test]
    fn move_ignores_terrain_and_distance() {
        let mut entities = arena();
        apply_action(
            &mut entities,
            &GameAction::Move {
                entity_id: EntityId::new(1),
                to: TilePos::new(-3, 40),
            },
        );
        assert_eq!(
            entities.get(EntityId::new(1)).map(|entity| entity.position),
            Some(TilePos::new(-3, 40))
        );
    }

    #[test]
    fn attack_floors_health_at_zero() {
        let mut entities = arena();
        let attack = GameAction::Attack {
            attacker_id: EntityId::new(1),
            target_id: EntityId::new(2),
        };
        apply_action(&mut entities, &attack);
        apply_action(&mut entities, &attack);

        let target = entities.get(EntityId::new(2)).expect("attack does not remove");
        assert_eq!(target.health(), Some(0));
    }

    #[test]
    fn attack_on_a_bystander_changes_nothing() {
        let mut entities = arena();
        let before = entities.clone();
        apply_action(
            &mut entities,
            &GameAction::Attack {
                attacker_id: EntityId::new(1),
                target_id: EntityId::new(3),
            },
        );
        assert_eq!(entities, before);
    }

    #[test]
    fn remove_deletes_the_entity() {
        let mut entities = arena();
        apply_action(
            &mut entities,
            &GameAction::Remove {
                entity_id: EntityId::new(2),
            },
        );
        assert!(!entities.contains(EntityId::new(2)));
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut entities = arena();
        let before = entities.clone();
        for action in [
            GameAction::Move {
                entity_id: EntityId::new(99),
                to: TilePos::new(1, 1),
            },
            GameAction::Attack {
                attacker_id: EntityId::new(1),
                target_id: EntityId::new(99),
            },
            GameAction::Remove {
                entity_id: EntityId::new(99),
            },
        ] {
            apply_action(&mut entities, &action);
        }
        assert_eq!(entities, before);
    }
}
