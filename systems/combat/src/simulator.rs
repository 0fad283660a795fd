use std::{mem, sync::mpsc::Receiver, time::Duration};

use grid_tactics_core::{
    Combatant, Entity, EntityArena, EntityId, EntityKind, EntitySnapshot, Event, GameAction,
    GameSnapshot, Intent, MatchResult, TilePos, TurnPhase,
};
use grid_tactics_world::World;

use crate::{apply_action, TurnManager, DEFAULT_ENEMY_HEALTH, DEFAULT_PLAYER_HEALTH};

/// Lifecycle every playable scene exposes to the host loop.
pub trait Scene {
    /// Installs the world, the intent source and the starting entities.
    fn initialize(&mut self, world: World, intents: Receiver<Intent>, entities: Vec<Entity>);

    /// Processes pending intents and re-evaluates the match outcome.
    fn update(&mut self, delta: Duration);

    /// Reports whether the match has ended.
    fn is_over(&self) -> bool;

    /// Current outcome of the match.
    fn result(&self) -> MatchResult;
}

/// Authoritative owner of the live entities of a match.
#[derive(Debug)]
pub struct Simulator {
    world: World,
    intents: Option<Receiver<Intent>>,
    entities: EntityArena,
    player: Option<EntityId>,
    turns: TurnManager,
    result: MatchResult,
    action_log: Vec<GameAction>,
    events: Vec<Event>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Creates a simulator with an empty world and no entities.
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: World::new(0, 0),
            intents: None,
            entities: EntityArena::new(),
            player: None,
            turns: TurnManager::new(),
            result: MatchResult::Playing,
            action_log: Vec::new(),
            events: Vec::new(),
        }
    }

    /// World the match is played on.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only view of the live entities.
    #[must_use]
    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    /// The player entity, if it is still present.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entities.get(id))
    }

    /// Phase that currently owns the turn.
    #[must_use]
    pub fn turn(&self) -> TurnPhase {
        self.turns.current()
    }

    /// Every action applied so far, oldest first.
    #[must_use]
    pub fn action_log(&self) -> &[GameAction] {
        &self.action_log
    }

    /// Takes the events broadcast since the previous call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    /// Validates and executes a single intent.
    ///
    /// Intents that break a rule are dropped without touching any state.
    /// An accepted intent runs the full enemy phase before returning.
    pub fn handle_intent(&mut self, intent: Intent) {
        if !self.turns.is_player_turn() || self.result.is_over() {
            tracing::debug!(?intent, result = ?self.result, "dropped intent outside the player turn");
            return;
        }
        let Some((player_id, player_pos)) = self.player().map(|player| (player.id, player.position))
        else {
            tracing::debug!(?intent, "dropped intent without a player");
            return;
        };

        let accepted = match intent {
            Intent::SelectTile { pos } => self.select_tile(player_id, player_pos, pos),
            Intent::TapEntity { entity } => self.tap_entity(player_id, player_pos, entity),
        };
        if !accepted {
            tracing::debug!(?intent, "dropped invalid intent");
            return;
        }

        tracing::debug!(?intent, "accepted intent");
        self.finish_player_turn();
    }

    fn select_tile(&mut self, player_id: EntityId, from: TilePos, to: TilePos) -> bool {
        if !self.world.is_passable(to) || !from.is_adjacent(to) || self.entities.is_occupied(to) {
            return false;
        }
        self.perform(GameAction::Move {
            entity_id: player_id,
            to,
        });
        true
    }

    fn tap_entity(&mut self, player_id: EntityId, from: TilePos, target_id: EntityId) -> bool {
        let Some(target) = self.entities.get(target_id) else {
            return false;
        };
        if target.kind != EntityKind::Enemy
            || target.combatant.is_none()
            || !from.is_adjacent(target.position)
        {
            return false;
        }

        self.perform(GameAction::Attack {
            attacker_id: player_id,
            target_id,
        });
        if self.entities.get(target_id).and_then(Entity::health) == Some(0) {
            self.perform(GameAction::Remove {
                entity_id: target_id,
            });
            self.events.push(Event::EntityRemoved { entity: target_id });
        }
        true
    }

    /// Executes, logs and announces one action.
    fn perform(&mut self, action: GameAction) {
        apply_action(&mut self.entities, &action);
        self.action_log.push(action.clone());
        self.events.push(Event::ActionApplied { action });
    }

    fn finish_player_turn(&mut self) {
        self.turns.end_player_turn();
        self.events.push(Event::TurnChanged {
            phase: self.turns.current(),
        });

        self.run_enemy_phase();

        self.turns.start_player_turn();
        self.events.push(Event::TurnChanged {
            phase: self.turns.current(),
        });
    }

    fn run_enemy_phase(&mut self) {
        let Some(player_id) = self.player else {
            return;
        };
        let roster: Vec<EntityId> = self.entities.living_enemies().map(|enemy| enemy.id).collect();

        for enemy_id in roster {
            if self.result.is_over() {
                break;
            }
            let Some(target) = self.player().map(|player| player.position) else {
                break;
            };
            let Some(enemy) = self.entities.get(enemy_id) else {
                continue;
            };
            if !enemy.is_living_combatant() {
                continue;
            }
            let from = enemy.position;

            if from.is_adjacent(target) {
                self.perform(GameAction::Attack {
                    attacker_id: enemy_id,
                    target_id: player_id,
                });
                if self.player().and_then(Entity::health) == Some(0) {
                    self.conclude(MatchResult::Lose);
                    return;
                }
                continue;
            }

            if let Some(to) = self.next_enemy_step(from, target) {
                self.perform(GameAction::Move {
                    entity_id: enemy_id,
                    to,
                });
            }
        }

        if self.entities.living_enemies().next().is_none() {
            self.conclude(MatchResult::Win);
        }
    }

    /// One greedy step toward `target`, primary axis first.
    ///
    /// The primary axis is the one with the larger distance, rows on ties.
    /// Only impassable terrain diverts the step to the secondary axis; an
    /// occupied first passable candidate holds the enemy in place.
    fn next_enemy_step(&self, from: TilePos, target: TilePos) -> Option<TilePos> {
        let row_delta = target.row() - from.row();
        let col_delta = target.col() - from.col();
        let row_step = (row_delta != 0).then(|| from.offset(row_delta.signum(), 0));
        let col_step = (col_delta != 0).then(|| from.offset(0, col_delta.signum()));

        let candidates = if row_delta.abs() >= col_delta.abs() {
            [row_step, col_step]
        } else {
            [col_step, row_step]
        };
        let step = candidates
            .into_iter()
            .flatten()
            .find(|pos| self.world.is_passable(*pos))?;
        (!self.entities.is_occupied(step)).then_some(step)
    }

    fn evaluate_outcome(&mut self) {
        if self.result.is_over() {
            return;
        }
        if self.player().and_then(Entity::health) == Some(0) {
            self.conclude(MatchResult::Lose);
        } else if self.entities.living_enemies().next().is_none() {
            self.conclude(MatchResult::Win);
        }
    }

    fn conclude(&mut self, result: MatchResult) {
        self.result = result;
        self.events.push(Event::MatchConcluded { result });
        tracing::info!(
            ?result,
            actions = self.action_log.len(),
            "match concluded"
        );
    }

    /// Copies the live state into a serialisable value.
    #[must_use]
    pub fn take_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            entities: self.entities.snapshots(),
            turn: self.turns.current(),
            result: self.result,
            action_log: self.action_log.clone(),
        }
    }

    /// Replaces the live state with the snapshot contents.
    ///
    /// Entities are rebuilt through `factory`; the world and intent channel
    /// are kept.
    pub fn restore_snapshot<F>(&mut self, snapshot: &GameSnapshot, factory: F)
    where
        F: FnMut(&EntitySnapshot) -> Entity,
    {
        self.entities = EntityArena::from_entities(snapshot.entities.iter().map(factory));
        self.player = self.entities.first_of_kind(EntityKind::Player).map(|player| player.id);
        match snapshot.turn {
            TurnPhase::Player => self.turns.start_player_turn(),
            TurnPhase::Enemy => self.turns.start_enemy_turn(),
        }
        self.result = snapshot.result;
        self.action_log = snapshot.action_log.clone();
        tracing::debug!(
            entities = self.entities.len(),
            actions = self.action_log.len(),
            "restored snapshot"
        );
    }

    /// Applies `actions` on top of a snapshot without validation.
    ///
    /// The returned snapshot keeps the turn and result of `snapshot` and
    /// extends its log with `actions`.
    #[must_use]
    pub fn replay_from_snapshot<F>(
        snapshot: &GameSnapshot,
        actions: &[GameAction],
        factory: F,
    ) -> GameSnapshot
    where
        F: FnMut(&EntitySnapshot) -> Entity,
    {
        let mut entities = EntityArena::from_entities(snapshot.entities.iter().map(factory));
        for action in actions {
            apply_action(&mut entities, action);
        }

        let mut action_log = snapshot.action_log.clone();
        action_log.extend_from_slice(actions);
        GameSnapshot {
            entities: entities.snapshots(),
            turn: snapshot.turn,
            result: snapshot.result,
            action_log,
        }
    }
}

impl Scene for Simulator {
    fn initialize(&mut self, world: World, intents: Receiver<Intent>, entities: Vec<Entity>) {
        self.world = world;
        self.intents = Some(intents);
        self.entities = EntityArena::from_entities(entities.into_iter().map(with_default_health));
        self.player = self.entities.first_of_kind(EntityKind::Player).map(|player| player.id);
        self.turns = TurnManager::new();
        self.result = MatchResult::Playing;
        self.action_log.clear();
        self.events.clear();
        tracing::info!(
            rows = self.world.rows(),
            cols = self.world.cols(),
            entities = self.entities.len(),
            "initialized match"
        );
    }

    fn update(&mut self, _delta: Duration) {
        let pending: Vec<Intent> = self
            .intents
            .as_ref()
            .map(|intents| intents.try_iter().collect())
            .unwrap_or_default();
        for intent in pending {
            self.handle_intent(intent);
        }
        self.evaluate_outcome();
    }

    fn is_over(&self) -> bool {
        self.result.is_over()
    }

    fn result(&self) -> MatchResult {
        self.result
    }
}

/// Gives players and enemies a full health pool when they arrive without one.
fn with_default_health(entity: Entity) -> Entity {
    if entity.combatant.is_some() {
        return entity;
    }
    let health = match entity.kind {
        EntityKind::Player => DEFAULT_PLAYER_HEALTH,
        EntityKind::Enemy => DEFAULT_ENEMY_HEALTH,
        EntityKind::Npc => return entity,
    };
    entity.with_combatant(Combatant::full(health))
}
