use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::EditorCamera;
use crate::components::{AppMode, GameConfig, TileKind};
use crate::grid::TileGrid;
use crate::level;

/// Map a window-relative pointer position to a grid cell. Window
/// coordinates are y-down from the top-left, same as the level, so this is
/// a plain camera offset plus floor division. The result may be outside the
/// grid; mutation entry points ignore those.
pub fn pointer_to_cell(cursor: Vec2, camera_x: f32, camera_y: f32, tile_size: f32) -> (i32, i32) {
    (
        ((cursor.x + camera_x) / tile_size).floor() as i32,
        ((cursor.y + camera_y) / tile_size).floor() as i32,
    )
}

/// Place `kind` at a cell. Coordinates outside the grid are silently
/// dropped: pointer strokes routinely leave the canvas and that is not an
/// error. Singleton handling for spawn/goal happens in the grid itself.
pub fn place_tile(grid: &mut TileGrid, x: i32, y: i32, kind: TileKind) {
    if !grid.in_bounds(x, y) {
        return;
    }
    grid.set(x, y, kind);
}

/// Erase a cell, with the same silent out-of-bounds rule as placement.
pub fn erase_tile(grid: &mut TileGrid, x: i32, y: i32) {
    if !grid.in_bounds(x, y) {
        return;
    }
    grid.clear(x, y);
}

/// Currently selected palette entry plus where the level saves to.
#[derive(Resource)]
pub struct EditorState {
    pub palette: TileKind,
    pub level_path: PathBuf,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            palette: TileKind::Ground,
            level_path: PathBuf::from("level.json"),
        }
    }
}

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EditorState>().add_systems(
            Update,
            (paint_tiles, select_palette, resize_grid, save_level)
                .run_if(in_state(AppMode::Editor)),
        );
    }
}

const PALETTE: [(KeyCode, TileKind); 8] = [
    (KeyCode::Digit1, TileKind::Ground),
    (KeyCode::Digit2, TileKind::Block),
    (KeyCode::Digit3, TileKind::Enemy),
    (KeyCode::Digit4, TileKind::Spike),
    (KeyCode::Digit5, TileKind::Spawn),
    (KeyCode::Digit6, TileKind::Goal),
    (KeyCode::Digit7, TileKind::Coin),
    (KeyCode::Digit8, TileKind::Diamond),
];

fn select_palette(keyboard: Res<ButtonInput<KeyCode>>, mut state: ResMut<EditorState>) {
    for (key, kind) in PALETTE {
        if keyboard.just_pressed(key) {
            state.palette = kind;
            info!("palette: {kind:?}");
        }
    }
}

/// Left button paints the selected kind, right button erases. Held buttons
/// keep the stroke going while the pointer moves.
fn paint_tiles(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera: Res<EditorCamera>,
    config: Res<GameConfig>,
    state: Res<EditorState>,
    mut grid: ResMut<TileGrid>,
) {
    let place = buttons.pressed(MouseButton::Left);
    let erase = buttons.pressed(MouseButton::Right);
    if !place && !erase {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let (x, y) = pointer_to_cell(cursor, camera.0.x, camera.0.y, config.tile_size);
    if erase {
        erase_tile(&mut grid, x, y);
    } else {
        place_tile(&mut grid, x, y, state.palette);
    }
}

/// Bracket keys step the width, minus/equals the height. A rejected resize
/// leaves the grid untouched and just logs the refusal.
fn resize_grid(keyboard: Res<ButtonInput<KeyCode>>, mut grid: ResMut<TileGrid>) {
    let (mut dw, mut dh) = (0i64, 0i64);
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        dw -= 1;
    }
    if keyboard.just_pressed(KeyCode::BracketRight) {
        dw += 1;
    }
    if keyboard.just_pressed(KeyCode::Minus) {
        dh -= 1;
    }
    if keyboard.just_pressed(KeyCode::Equal) {
        dh += 1;
    }
    if dw == 0 && dh == 0 {
        return;
    }
    let new_w = (grid.width() as i64 + dw).max(0) as u32;
    let new_h = (grid.height() as i64 + dh).max(0) as u32;
    match grid.resize(new_w, new_h) {
        Ok(()) => info!("resized level to {new_w}x{new_h}"),
        Err(err) => warn!("{err}"),
    }
}

fn save_level(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<EditorState>,
    grid: Res<TileGrid>,
) {
    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    if !(ctrl && keyboard.just_pressed(KeyCode::KeyS)) {
        return;
    }
    match level::save(&state.level_path, &grid) {
        Ok(()) => info!(
            "saved level ({} tiles) to {}",
            grid.len(),
            state.level_path.display()
        ),
        Err(err) => warn!("save failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileCoord;

    #[test]
    fn pointer_maps_through_camera_offset_and_floor_division() {
        assert_eq!(pointer_to_cell(Vec2::new(0.0, 0.0), 0.0, 0.0, 32.0), (0, 0));
        assert_eq!(
            pointer_to_cell(Vec2::new(31.9, 31.9), 0.0, 0.0, 32.0),
            (0, 0)
        );
        assert_eq!(
            pointer_to_cell(Vec2::new(10.0, 5.0), 64.0, 96.0, 32.0),
            (2, 3)
        );
        // A pointer above/left of the level maps to negative cells.
        assert_eq!(
            pointer_to_cell(Vec2::new(1.0, 1.0), -40.0, -40.0, 32.0),
            (-2, -2)
        );
    }

    #[test]
    fn out_of_bounds_strokes_are_silent_no_ops() {
        let mut grid = TileGrid::new(50, 20).unwrap();
        place_tile(&mut grid, -2, 4, TileKind::Ground);
        place_tile(&mut grid, 4, 60, TileKind::Ground);
        erase_tile(&mut grid, -2, 4);
        assert!(grid.is_empty());
    }

    #[test]
    fn placement_routes_spawn_through_the_singleton_rule() {
        let mut grid = TileGrid::new(50, 20).unwrap();
        place_tile(&mut grid, 1, 1, TileKind::Spawn);
        place_tile(&mut grid, 9, 9, TileKind::Spawn);
        assert_eq!(grid.spawn(), Some(TileCoord::new(9, 9)));
        assert_eq!(grid.get(1, 1), None);
    }

    #[test]
    fn erasing_then_replacing_overwrites_cleanly() {
        let mut grid = TileGrid::new(50, 20).unwrap();
        place_tile(&mut grid, 3, 3, TileKind::Spike);
        place_tile(&mut grid, 3, 3, TileKind::Coin);
        assert_eq!(grid.get(3, 3), Some(TileKind::Coin));
        erase_tile(&mut grid, 3, 3);
        assert_eq!(grid.get(3, 3), None);
    }
}
