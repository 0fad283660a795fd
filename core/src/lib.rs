#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Tactics engine.
//!
//! This crate defines the vocabulary that connects adapters, the tile world,
//! and the pure systems. Adapters deliver [`Intent`] values, the combat
//! simulator turns accepted intents into [`GameAction`] values that it applies
//! through a single canonical mutation function, and it broadcasts [`Event`]
//! values so presentation layers can react. Snapshots ([`GameSnapshot`]) are
//! plain values that serialise to JSON and carry no reference to live state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a single grid tile expressed as row and column indices.
///
/// Coordinates are signed so that visibility windows and neighbour offsets may
/// step outside the grid; bounds are enforced by the world, not by this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    row: i32,
    col: i32,
}

impl TilePos {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn col(&self) -> i32 {
        self.col
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: TilePos) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Reports whether the two positions share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: TilePos) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Returns the position displaced by the provided row and column deltas.
    #[must_use]
    pub const fn offset(self, row_delta: i32, col_delta: i32) -> Self {
        Self {
            row: self.row + row_delta,
            col: self.col + col_delta,
        }
    }

    /// Cardinal neighbours ordered up, down, left, right.
    #[must_use]
    pub const fn neighbors(self) -> [TilePos; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }

    /// Stable textual key used when tiles are stored in string-keyed sets.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Terrain occupying a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    /// Open grassland.
    Grass,
    /// Bare earth.
    Dirt,
    /// Loose sand.
    Sand,
    /// Open water; cannot be walked on.
    Water,
    /// Solid wall; cannot be walked on and blocks line of sight.
    Wall,
}

impl Terrain {
    /// Every terrain variant in declaration order.
    pub const ALL: [Terrain; 5] = [
        Terrain::Grass,
        Terrain::Dirt,
        Terrain::Sand,
        Terrain::Water,
        Terrain::Wall,
    ];

    /// Reports whether units may stand on this terrain.
    ///
    /// This is the only source of passability in the engine.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Terrain::Water | Terrain::Wall)
    }

    /// Reports whether the terrain stops line of sight.
    #[must_use]
    pub const fn blocks_sight(self) -> bool {
        matches!(self, Terrain::Wall)
    }

    /// Single-character glyph used in map dumps and fixed map tables.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Terrain::Grass => 'G',
            Terrain::Dirt => 'D',
            Terrain::Sand => 'S',
            Terrain::Water => '~',
            Terrain::Wall => '#',
        }
    }

    /// Parses a glyph produced by [`Terrain::glyph`].
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        Self::ALL.into_iter().find(|terrain| terrain.glyph() == glyph)
    }
}

/// Immutable view of a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pos: TilePos,
    terrain: Terrain,
}

impl Tile {
    /// Creates a tile at the provided position.
    #[must_use]
    pub const fn new(pos: TilePos, terrain: Terrain) -> Self {
        Self { pos, terrain }
    }

    /// Position of the tile.
    #[must_use]
    pub const fn pos(&self) -> TilePos {
        self.pos
    }

    /// Row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.pos.row()
    }

    /// Column index of the tile.
    #[must_use]
    pub const fn col(&self) -> i32 {
        self.pos.col()
    }

    /// Terrain currently covering the tile.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Passability derived from the tile's terrain.
    #[must_use]
    pub const fn passable(&self) -> bool {
        self.terrain.is_passable()
    }
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role an entity plays in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// The entity controlled through player intents.
    Player,
    /// Hostile entities driven by the enemy phase.
    Enemy,
    /// Bystanders that never take part in combat.
    Npc,
}

/// Health pool attached to entities that take part in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combatant {
    health: u32,
    max_health: u32,
}

impl Combatant {
    /// Creates a health pool, raising the maximum when `health` exceeds it.
    #[must_use]
    pub fn new(health: u32, max_health: u32) -> Self {
        Self {
            health,
            max_health: max_health.max(health),
        }
    }

    /// Creates a health pool at full health.
    #[must_use]
    pub const fn full(max_health: u32) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Lowers health by `amount`, flooring at zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Reports whether the pool is exhausted.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.health == 0
    }
}

/// Anything that occupies a tile.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Identifier that stays fixed for the lifetime of the entity.
    pub id: EntityId,
    /// Role of the entity.
    pub kind: EntityKind,
    /// Tile currently occupied by the entity.
    pub position: TilePos,
    /// Health pool, absent for entities exempt from combat.
    pub combatant: Option<Combatant>,
}

impl Entity {
    /// Creates an entity without a health pool.
    #[must_use]
    pub const fn new(id: EntityId, kind: EntityKind, position: TilePos) -> Self {
        Self {
            id,
            kind,
            position,
            combatant: None,
        }
    }

    /// Attaches a health pool to the entity.
    #[must_use]
    pub fn with_combatant(mut self, combatant: Combatant) -> Self {
        self.combatant = Some(combatant);
        self
    }

    /// Remaining health, if the entity takes part in combat.
    #[must_use]
    pub fn health(&self) -> Option<u32> {
        self.combatant.map(|combatant| combatant.health())
    }

    /// Reports whether the entity has a health pool with health remaining.
    #[must_use]
    pub fn is_living_combatant(&self) -> bool {
        self.combatant
            .is_some_and(|combatant| !combatant.is_defeated())
    }
}

impl Entity {
    /// Rehydrates an entity from its snapshot.
    ///
    /// A snapshot carrying only one of the two health values is treated as a
    /// full health pool of that size.
    #[must_use]
    pub fn from_snapshot(snapshot: &EntitySnapshot) -> Self {
        let combatant = match (snapshot.health, snapshot.max_health) {
            (Some(health), Some(max_health)) => Some(Combatant::new(health, max_health)),
            (Some(health), None) => Some(Combatant::full(health)),
            (None, Some(max_health)) => Some(Combatant::full(max_health)),
            (None, None) => None,
        };
        Self {
            id: snapshot.id,
            kind: snapshot.kind,
            position: snapshot.position,
            combatant,
        }
    }
}

impl From<&EntitySnapshot> for Entity {
    fn from(snapshot: &EntitySnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

/// Entity collection keyed by identifier that preserves insertion order.
///
/// Insertion order is the collection order the enemy phase iterates in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityArena {
    entities: Vec<Entity>,
}

impl EntityArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an arena from the provided entities, dropping repeated identifiers.
    #[must_use]
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut arena = Self::new();
        for entity in entities {
            let _ = arena.insert(entity);
        }
        arena
    }

    /// Appends an entity; returns `false` when the identifier is already taken.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity.id) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    /// Reports whether an entity with the identifier exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.iter().any(|entity| entity.id == id)
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Looks up an entity by identifier for mutation.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    /// Removes an entity, returning it when it existed.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Returns the entity standing on the provided tile, if any.
    #[must_use]
    pub fn occupant(&self, pos: TilePos) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.position == pos)
    }

    /// Reports whether any entity stands on the provided tile.
    #[must_use]
    pub fn is_occupied(&self, pos: TilePos) -> bool {
        self.occupant(pos).is_some()
    }

    /// First entity of the provided kind in collection order.
    #[must_use]
    pub fn first_of_kind(&self, kind: EntityKind) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.kind == kind)
    }

    /// Enemies that still have health remaining, in collection order.
    pub fn living_enemies(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|entity| entity.kind == EntityKind::Enemy && entity.is_living_combatant())
    }

    /// Iterator over all entities in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterator over all entities for mutation.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Number of entities in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether the arena holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Captures value copies of every entity in collection order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<EntitySnapshot> {
        self.entities.iter().map(EntitySnapshot::from).collect()
    }
}

/// The sole vocabulary for entity state mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GameAction {
    /// Relocates an entity.
    #[serde(rename_all = "camelCase")]
    Move {
        /// Entity being moved.
        entity_id: EntityId,
        /// Destination tile.
        to: TilePos,
    },
    /// Deals one hit of damage.
    #[serde(rename_all = "camelCase")]
    Attack {
        /// Entity dealing the hit.
        attacker_id: EntityId,
        /// Entity receiving the hit.
        target_id: EntityId,
    },
    /// Deletes an entity from the match.
    #[serde(rename_all = "camelCase")]
    Remove {
        /// Entity being removed.
        entity_id: EntityId,
    },
}

/// Input messages delivered by the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// The player selected a tile, usually to move onto it.
    SelectTile {
        /// Tile that was selected.
        pos: TilePos,
    },
    /// The player tapped an entity, usually to attack it.
    TapEntity {
        /// Entity that was tapped.
        entity: EntityId,
    },
}

/// Owner of the current turn phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    /// The player may act.
    #[default]
    Player,
    /// Enemies are acting.
    Enemy,
}

/// Outcome of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    /// Every enemy has been defeated.
    Win,
    /// The player has been defeated.
    Lose,
    /// The match is still in progress.
    #[default]
    Playing,
}

impl MatchResult {
    /// Reports whether the match reached a terminal outcome.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, MatchResult::Playing)
    }
}

/// Notifications broadcast by the simulator after it mutates state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// An action was applied and appended to the action log.
    ActionApplied {
        /// Action that was applied.
        action: GameAction,
    },
    /// An entity left the match; presentation layers should tear it down.
    EntityRemoved {
        /// Identifier of the removed entity.
        entity: EntityId,
    },
    /// The turn passed to a new phase.
    TurnChanged {
        /// Phase that became active.
        phase: TurnPhase,
    },
    /// The match reached a terminal outcome.
    MatchConcluded {
        /// Outcome of the match.
        result: MatchResult,
    },
}

/// Serialisable value copy of a single entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Role of the entity.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Tile occupied by the entity.
    pub position: TilePos,
    /// Remaining health, absent for entities exempt from combat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<u32>,
    /// Maximum health, absent for entities exempt from combat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_health: Option<u32>,
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind,
            position: entity.position,
            health: entity.combatant.map(|combatant| combatant.health()),
            max_health: entity.combatant.map(|combatant| combatant.max_health()),
        }
    }
}

/// Serialisable copy of the simulator state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Entities in collection order.
    pub entities: Vec<EntitySnapshot>,
    /// Phase that owned the turn when the snapshot was taken.
    pub turn: TurnPhase,
    /// Outcome recorded when the snapshot was taken.
    pub result: MatchResult,
    /// Every action applied so far, oldest first.
    pub action_log: Vec<GameAction>,
}
