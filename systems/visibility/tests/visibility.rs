use grid_tactics_core::{Terrain, TilePos};
use grid_tactics_system_visibility::{
    compute_visible, FogOfWar, FogState, DEFAULT_VISIBILITY_SIZE,
};
use grid_tactics_world::World;
use proptest::prelude::*;

fn walled_world() -> World {
    World::from_glyph_rows(&[
        "GGGGGGGGGGGG",
        "GGGGGGGGGGGG",
        "GGG#GGGG#GGG",
        "GGG#GGGG#GGG",
        "GGGGGG~GGGGG",
        "GGGGGG~GGGGG",
        "GGG####GGGGG",
        "GGGGGGGGGGGG",
    ])
    .expect("valid map")
}

#[test]
fn tile_behind_a_wall_is_hidden() {
    let world = walled_world();
    let visible = compute_visible(&world, TilePos::new(2, 1), DEFAULT_VISIBILITY_SIZE);
    assert!(visible.contains(&TilePos::new(2, 3)));
    assert!(!visible.contains(&TilePos::new(2, 4)));
}

#[test]
fn fog_reports_all_three_states() {
    let world = walled_world();
    let mut fog = FogOfWar::new();
    let _ = fog.reveal(&world, TilePos::new(0, 0), 4);
    let _ = fog.reveal(&world, TilePos::new(7, 11), 4);

    assert_eq!(fog.state(TilePos::new(0, 0)), FogState::Explored);
    assert_eq!(fog.state(TilePos::new(7, 11)), FogState::Visible);
    assert_eq!(fog.state(TilePos::new(4, 4)), FogState::Unexplored);
}

proptest! {
    #[test]
    fn origin_is_always_visible(row in 0_i32..8, col in 0_i32..12, size in 0_u32..16) {
        let world = walled_world();
        let origin = TilePos::new(row, col);
        prop_assert!(compute_visible(&world, origin, size).contains(&origin));
    }

    #[test]
    fn visible_tiles_stay_inside_world_and_window(row in 0_i32..8, col in 0_i32..12, size in 1_u32..16) {
        let world = walled_world();
        let origin = TilePos::new(row, col);
        let half = i32::try_from(size / 2).expect("small size");
        let span = i32::try_from(size).expect("small size");
        for pos in compute_visible(&world, origin, size) {
            prop_assert!(world.contains(pos));
            prop_assert!(pos.row() >= row - half && pos.row() < row - half + span);
            prop_assert!(pos.col() >= col - half && pos.col() < col - half + span);
        }
    }

    #[test]
    fn explored_set_never_shrinks(path in prop::collection::vec((0_i32..8, 0_i32..12), 1..12)) {
        let world = walled_world();
        let mut fog = FogOfWar::new();
        let mut previous = 0;
        for (row, col) in path {
            let origin = TilePos::new(row, col);
            let _ = fog.reveal(&world, origin, DEFAULT_VISIBILITY_SIZE);
            prop_assert!(fog.explored().len() >= previous);
            prop_assert!(fog.visible().is_subset(fog.explored()));
            prop_assert_eq!(fog.state(origin), FogState::Visible);
            previous = fog.explored().len();
        }
    }
}

#[test]
fn blocked_terrain_is_still_seen_from_next_door() {
    let world = walled_world();
    let visible = compute_visible(&world, TilePos::new(5, 3), 3);
    assert!(visible.contains(&TilePos::new(6, 3)));
    assert_eq!(world.terrain(TilePos::new(6, 3)), Some(Terrain::Wall));
}
