use bevy::prelude::*;

use crate::components::{AppMode, GameConfig, TileKind};
use crate::enemy::ENEMY_SIZE;
use crate::grid::TileGrid;
use crate::play::Session;
use crate::sim::{PLAYER_HEIGHT, PLAYER_WIDTH};

/// Marker for tile quads so they can be despawned on rebuild.
#[derive(Component)]
struct TileSprite;

#[derive(Component)]
struct PlayerSprite;

#[derive(Component)]
struct EnemySprite(usize);

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnExit(AppMode::Playing), despawn_session_sprites)
            .add_systems(
                Update,
                (
                    rebuild_tiles,
                    // The session resource lands one command flush after
                    // OnEnter(Playing), so its sprites spawn on arrival.
                    spawn_session_sprites.run_if(resource_added::<Session>),
                    sync_session_sprites.run_if(in_state(AppMode::Playing)),
                )
                    .chain(),
            );
    }
}

fn tile_color(kind: TileKind) -> Color {
    match kind {
        TileKind::Ground => Color::srgb(0.36, 0.25, 0.16),
        TileKind::Block => Color::srgb(0.45, 0.45, 0.5),
        TileKind::Enemy => Color::srgb(0.6, 0.2, 0.7),
        TileKind::Spike => Color::srgb(0.9, 0.15, 0.15),
        TileKind::Spawn => Color::srgb(0.2, 0.55, 0.95),
        TileKind::Goal => Color::srgb(0.15, 0.9, 0.3),
        TileKind::Coin => Color::srgb(0.95, 0.85, 0.2),
        TileKind::Diamond => Color::srgb(0.3, 0.9, 0.9),
    }
}

/// The level is authored y-down; Bevy's world is y-up. Convert a top-left
/// pixel position and size to the sprite's center translation.
fn sprite_translation(x: f32, y: f32, w: f32, h: f32, level_px_h: f32, z: f32) -> Vec3 {
    Vec3::new(x + w * 0.5, level_px_h - (y + h * 0.5), z)
}

/// Rebuild all tile quads whenever the grid or the mode changes. Marker
/// tiles (spawn, enemy seeds) only show in the editor.
fn rebuild_tiles(
    mut commands: Commands,
    grid: Res<TileGrid>,
    config: Res<GameConfig>,
    mode: Res<State<AppMode>>,
    existing: Query<Entity, With<TileSprite>>,
) {
    if !grid.is_changed() && !mode.is_changed() {
        return;
    }
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    let ts = config.tile_size;
    let level_h = grid.px_height(ts);
    let editing = *mode.get() == AppMode::Editor;
    for (coord, kind) in grid.iter() {
        if kind.is_marker() && !editing {
            continue;
        }
        commands.spawn((
            TileSprite,
            Sprite::from_color(tile_color(kind), Vec2::new(ts, ts)),
            Transform::from_translation(sprite_translation(
                coord.x as f32 * ts,
                coord.y as f32 * ts,
                ts,
                ts,
                level_h,
                0.0,
            )),
        ));
    }
}

fn spawn_session_sprites(mut commands: Commands, session: Res<Session>) {
    commands.spawn((
        PlayerSprite,
        Sprite::from_color(
            Color::srgb(0.2, 0.4, 0.9),
            Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        ),
        Transform::from_xyz(0.0, 0.0, 10.0),
    ));
    for (index, _) in session.0.enemies.iter().enumerate() {
        commands.spawn((
            EnemySprite(index),
            Sprite::from_color(Color::srgb(0.8, 0.3, 0.2), Vec2::new(ENEMY_SIZE, ENEMY_SIZE)),
            Transform::from_xyz(0.0, 0.0, 9.0),
        ));
    }
}

fn despawn_session_sprites(
    mut commands: Commands,
    sprites: Query<Entity, Or<(With<PlayerSprite>, With<EnemySprite>)>>,
) {
    for entity in sprites.iter() {
        commands.entity(entity).despawn();
    }
}

fn sync_session_sprites(
    session: Option<Res<Session>>,
    grid: Res<TileGrid>,
    config: Res<GameConfig>,
    mut player: Query<&mut Transform, (With<PlayerSprite>, Without<EnemySprite>)>,
    mut enemies: Query<(&EnemySprite, &mut Transform), Without<PlayerSprite>>,
) {
    let Some(session) = session else {
        return;
    };
    let level_h = grid.px_height(config.tile_size);
    if let Ok(mut transform) = player.get_single_mut() {
        let p = &session.0.player;
        transform.translation =
            sprite_translation(p.x, p.y, PLAYER_WIDTH, PLAYER_HEIGHT, level_h, 10.0);
    }
    for (sprite, mut transform) in enemies.iter_mut() {
        let Some(enemy) = session.0.enemies.get(sprite.0) else {
            continue;
        };
        transform.translation =
            sprite_translation(enemy.x, enemy.y, ENEMY_SIZE, ENEMY_SIZE, level_h, 9.0);
    }
}
