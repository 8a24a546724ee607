use bevy::prelude::*;

/// The closed set of tile kinds a level cell can hold.
///
/// `Ground`, `Block` and `Goal` block movement. `Spike` is a non-solid
/// hazard. `Enemy` and `Spawn` are markers consumed when a play session is
/// built; they never collide. `Coin` and `Diamond` are inert decorations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Ground,
    #[serde(rename = "tile")]
    Block,
    Enemy,
    Spike,
    Spawn,
    Goal,
    Coin,
    Diamond,
}

impl TileKind {
    pub fn is_solid(self) -> bool {
        match self {
            TileKind::Ground | TileKind::Block | TileKind::Goal => true,
            TileKind::Enemy
            | TileKind::Spike
            | TileKind::Spawn
            | TileKind::Coin
            | TileKind::Diamond => false,
        }
    }

    pub fn is_hazard(self) -> bool {
        self == TileKind::Spike
    }

    /// Markers are consumed by the session builder and hidden in play mode.
    pub fn is_marker(self) -> bool {
        matches!(self, TileKind::Spawn | TileKind::Enemy)
    }
}

/// Which half of the app is driving: the level editor or a play session.
#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum AppMode {
    #[default]
    Editor,
    Playing,
}

/// Tuning constants (as a resource so they can be overridden from the
/// startup config file). Velocities are in pixels per fixed tick.
#[derive(Resource, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tile_size: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub enemy_speed: f32,
    pub view_width: f32,
    pub view_height: f32,
    /// Extra view margin (per side) inside which dormant enemies wake up.
    pub activation_padding: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            walk_speed: 3.0,
            run_speed: 5.0,
            jump_speed: 12.0,
            gravity: 0.8,
            max_fall_speed: 16.0,
            enemy_speed: 1.2,
            view_width: 960.0,
            view_height: 540.0,
            activation_padding: 64.0,
        }
    }
}
