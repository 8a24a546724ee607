mod camera;
mod collision;
mod components;
mod editor;
mod enemy;
mod grid;
mod input;
mod level;
mod play;
mod render;
mod sim;

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use components::{AppMode, GameConfig};
use grid::TileGrid;

#[derive(serde::Deserialize, Default)]
struct StartupConfig {
    window_title: Option<String>,
    background_color: Option<[f32; 3]>,
    /// Optional gameplay tuning overrides; omitted fields keep their
    /// defaults.
    game: Option<GameConfig>,
}

fn load_startup_config() -> StartupConfig {
    let path = std::env::var("TILEBOUND_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "tilebound.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<StartupConfig>(&contents) {
            Ok(cfg) => {
                println!("[Tilebound] Loaded startup config from {path}");
                cfg
            }
            Err(e) => {
                eprintln!("[Tilebound] Failed to parse {path}: {e}");
                StartupConfig::default()
            }
        },
        Err(_) => StartupConfig::default(),
    }
}

/// Load the level at `path`, falling back to the starter level when the
/// file does not exist yet. In `--play` mode any failure is terminal.
fn load_level_or_starter(path: &Path, must_exist: bool) -> TileGrid {
    if path.exists() {
        match level::load(path) {
            Ok(grid) => {
                println!("[Tilebound] Loaded level from {}", path.display());
                return grid;
            }
            Err(e) => {
                eprintln!("[Tilebound] Unable to load level {}: {e}", path.display());
                if must_exist {
                    std::process::exit(2);
                }
            }
        }
    } else if must_exist {
        eprintln!("[Tilebound] Unable to load level {}: not found", path.display());
        std::process::exit(2);
    }
    TileGrid::starter()
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let play_only = args.iter().any(|a| a == "--play");
    let level_path: PathBuf = args
        .iter()
        .skip(1)
        .filter(|a| !a.starts_with("--"))
        .next_back()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("level.json"));

    let startup = load_startup_config();
    let config = startup.game.unwrap_or_default();
    let grid = load_level_or_starter(&level_path, play_only);
    let initial_mode = if play_only {
        AppMode::Playing
    } else {
        AppMode::Editor
    };

    let window_title = startup
        .window_title
        .unwrap_or_else(|| "Tilebound".to_string());
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: window_title,
            resolution: (config.view_width, config.view_height).into(),
            present_mode: bevy::window::PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));
    let bg = startup.background_color.unwrap_or([0.08, 0.12, 0.2]);
    app.insert_resource(ClearColor(Color::srgb(bg[0], bg[1], bg[2])));

    app.insert_resource(config)
        .insert_resource(grid)
        .insert_resource(editor::EditorState {
            palette: components::TileKind::Ground,
            level_path,
        })
        .insert_state(initial_mode)
        .add_plugins(input::InputPlugin)
        .add_plugins(camera::CameraPlugin)
        .add_plugins(editor::EditorPlugin)
        .add_plugins(play::PlayPlugin)
        .add_plugins(render::RenderPlugin);

    app.run();
}
