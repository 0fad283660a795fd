use grid_tactics_core::{EntityArena, EntityKind, TilePos};
use grid_tactics_system_visibility::{FogOfWar, FogState};
use grid_tactics_world::World;

const UNEXPLORED_GLYPH: char = ' ';

/// Draws the world as text, one row per line.
///
/// Entities replace the terrain glyph of their tile. With fog, unexplored
/// tiles stay blank and explored tiles show terrain but no entities.
pub(crate) fn render_map(world: &World, entities: &EntityArena, fog: Option<&FogOfWar>) -> String {
    let lines = usize::try_from(world.rows()).unwrap_or(0);
    let mut output = String::with_capacity(world.area() + lines);

    let mut previous_row = None;
    for pos in world.positions() {
        if previous_row.is_some_and(|row| row != pos.row()) {
            output.push('\n');
        }
        previous_row = Some(pos.row());
        output.push(glyph_at(world, entities, fog, pos));
    }
    output.push('\n');
    output
}

fn glyph_at(world: &World, entities: &EntityArena, fog: Option<&FogOfWar>, pos: TilePos) -> char {
    let state = fog.map_or(FogState::Visible, |fog| fog.state(pos));
    if state == FogState::Unexplored {
        return UNEXPLORED_GLYPH;
    }
    if state == FogState::Visible {
        if let Some(entity) = entities.occupant(pos) {
            return entity_glyph(entity.kind);
        }
    }
    world
        .terrain(pos)
        .map_or(UNEXPLORED_GLYPH, |terrain| terrain.glyph())
}

const fn entity_glyph(kind: EntityKind) -> char {
    match kind {
        EntityKind::Player => '@',
        EntityKind::Enemy => 'E',
        EntityKind::Npc => 'N',
    }
}
