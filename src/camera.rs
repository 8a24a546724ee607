use bevy::prelude::*;

use crate::components::{AppMode, GameConfig};
use crate::grid::TileGrid;
use crate::play::Session;

/// Top-left offset of the visible window into the level, in pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraState {
    pub x: f32,
    pub y: f32,
}

impl CameraState {
    pub fn view_rect(&self, config: &GameConfig) -> crate::collision::Aabb {
        crate::collision::Aabb::new(self.x, self.y, config.view_width, config.view_height)
    }
}

/// Center the view on `(cx, cy)`, clamped so it never leaves the level.
/// Levels smaller than the view pin to the top-left corner.
pub fn camera_target(
    cx: f32,
    cy: f32,
    level_px_w: f32,
    level_px_h: f32,
    view_w: f32,
    view_h: f32,
) -> CameraState {
    let max_x = (level_px_w - view_w).max(0.0);
    let max_y = (level_px_h - view_h).max(0.0);
    CameraState {
        x: (cx - view_w * 0.5).clamp(0.0, max_x),
        y: (cy - view_h * 0.5).clamp(0.0, max_y),
    }
}

/// Free-panning camera for the editor (the play camera lives in the
/// session).
#[derive(Resource, Default)]
pub struct EditorCamera(pub CameraState);

#[derive(Component)]
pub struct MainCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(EditorCamera::default())
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (
                    pan_editor_camera.run_if(in_state(AppMode::Editor)),
                    sync_camera_transform.after(pan_editor_camera),
                ),
            );
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((MainCamera, Camera2d, Transform::from_xyz(0.0, 0.0, 100.0)));
}

const PAN_SPEED: f32 = 420.0;

fn pan_editor_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    grid: Res<TileGrid>,
    config: Res<GameConfig>,
    mut camera: ResMut<EditorCamera>,
) {
    let mut dx = 0.0f32;
    let mut dy = 0.0f32;
    if keyboard.pressed(KeyCode::ArrowLeft) {
        dx -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        dx += 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        dy -= 1.0;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        dy += 1.0;
    }
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    let ts = config.tile_size;
    let max_x = (grid.px_width(ts) - config.view_width).max(0.0);
    let max_y = (grid.px_height(ts) - config.view_height).max(0.0);
    let step = PAN_SPEED * time.delta_secs();
    camera.0.x = (camera.0.x + dx * step).clamp(0.0, max_x);
    camera.0.y = (camera.0.y + dy * step).clamp(0.0, max_y);
}

/// Mirror whichever camera is live onto the render transform. The level is
/// authored y-down; Bevy renders y-up, so the flip happens here and in the
/// sprite sync, nowhere else.
fn sync_camera_transform(
    mode: Res<State<AppMode>>,
    session: Option<Res<Session>>,
    editor_camera: Res<EditorCamera>,
    grid: Res<TileGrid>,
    config: Res<GameConfig>,
    mut query: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    let cam = match (mode.get(), session.as_ref()) {
        (AppMode::Playing, Some(session)) => session.0.camera,
        _ => editor_camera.0,
    };
    let level_h = grid.px_height(config.tile_size);
    transform.translation.x = cam.x + config.view_width * 0.5;
    transform.translation.y = level_h - (cam.y + config.view_height * 0.5);
}
