use crate::camera::{camera_target, CameraState};
use crate::collision::{colliding_tiles, step_body, Body};
use crate::components::{GameConfig, TileKind};
use crate::enemy::{self, EnemyState};
use crate::grid::TileGrid;
use crate::level::LevelError;

pub const PLAYER_WIDTH: f32 = 24.0;
pub const PLAYER_HEIGHT: f32 = 30.0;

/// Fixed physics step, in wall-clock milliseconds.
pub const STEP_MS: f64 = 1000.0 / 60.0;
/// Largest frame delta fed to the accumulator; bounds catch-up work after a
/// stall so the step loop cannot spiral.
pub const MAX_FRAME_DELTA_MS: f64 = 200.0;

/// Players respawn slightly inside the spawn cell rather than flush with
/// its corner.
const RESPAWN_OFFSET_X: f32 = 4.0;
const RESPAWN_OFFSET_Y: f32 = 2.0;

/// Held key states for one fixed tick.
#[derive(Clone, Copy, Default, Debug)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub run: bool,
}

/// Wall-clock accumulator that converts frame deltas into whole fixed
/// steps. The integrator only ever advances in `STEP_MS` increments, no
/// matter how uneven the frame rate is.
#[derive(Default, Debug)]
pub struct StepClock {
    accumulator: f64,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's elapsed milliseconds; returns how many fixed steps
    /// to run before the frame renders.
    pub fn advance(&mut self, delta_ms: f64) -> u32 {
        self.accumulator += delta_ms.min(MAX_FRAME_DELTA_MS);
        let mut steps = 0;
        while self.accumulator >= STEP_MS {
            self.accumulator -= STEP_MS;
            steps += 1;
        }
        steps
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
}

impl PlayerState {
    pub fn aabb(&self) -> crate::collision::Aabb {
        crate::collision::Aabb::new(self.x, self.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }
}

/// One run of a level: player, enemies and camera, owned for the duration
/// of the session. The grid is read-only input; markers were consumed when
/// the session was built.
pub struct PlaySession {
    pub player: PlayerState,
    pub enemies: Vec<EnemyState>,
    pub camera: CameraState,
    pub completed: bool,
    pub deaths: u32,
    spawn_px: (f32, f32),
}

impl PlaySession {
    /// Build a session from applied level data. A level without a spawn
    /// cannot be played; no partial state is constructed.
    pub fn new(grid: &TileGrid, config: &GameConfig) -> Result<Self, LevelError> {
        let spawn = grid.spawn().ok_or(LevelError::MissingSpawn)?;
        let ts = config.tile_size;
        let spawn_px = (spawn.x as f32 * ts, spawn.y as f32 * ts);
        let enemies = grid
            .enemy_cells()
            .map(|cell| EnemyState::at_marker(cell, ts))
            .collect();
        let player = PlayerState {
            x: spawn_px.0 + RESPAWN_OFFSET_X,
            y: spawn_px.1 + RESPAWN_OFFSET_Y,
            vx: 0.0,
            vy: 0.0,
            on_ground: false,
        };
        let (cx, cy) = player.aabb().center();
        let camera = camera_target(
            cx,
            cy,
            grid.px_width(ts),
            grid.px_height(ts),
            config.view_width,
            config.view_height,
        );
        Ok(Self {
            player,
            enemies,
            camera,
            completed: false,
            deaths: 0,
            spawn_px,
        })
    }

    /// One fixed tick. The stage order is load-bearing: intent, jump,
    /// gravity, x-then-y movement, enemies, hazards, camera.
    pub fn step(&mut self, grid: &TileGrid, input: TickInput, config: &GameConfig) {
        let ts = config.tile_size;

        // Horizontal intent: instantaneous, no acceleration ramp.
        let speed = if input.run {
            config.run_speed
        } else {
            config.walk_speed
        };
        let mut dir = 0.0f32;
        if input.left {
            dir -= 1.0;
        }
        if input.right {
            dir += 1.0;
        }
        self.player.vx = dir * speed;

        // Jump while grounded.
        if input.jump && self.player.on_ground {
            self.player.vy = -config.jump_speed;
            self.player.on_ground = false;
        }

        // Gravity, clamped to terminal fall speed.
        self.player.vy = (self.player.vy + config.gravity).min(config.max_fall_speed);

        // Axis-separated movement.
        let mut body = Body {
            x: self.player.x,
            y: self.player.y,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            vx: self.player.vx,
            vy: self.player.vy,
            on_ground: self.player.on_ground,
        };
        let touched = step_body(&mut body, grid, ts);
        self.player.x = body.x;
        self.player.y = body.y;
        self.player.vx = body.vx;
        self.player.vy = body.vy;
        self.player.on_ground = body.on_ground;
        if touched.iter().any(|hit| hit.kind == TileKind::Goal) {
            self.completed = true;
        }

        // Enemies activate against the padded view, then patrol.
        let padded_view = self
            .camera
            .view_rect(config)
            .expanded(config.activation_padding);
        for enemy in &mut self.enemies {
            enemy::update(enemy, grid, &padded_view, config);
        }

        // Hazard contact is a hard respawn, not a health system.
        let player_box = self.player.aabb();
        let spiked = colliding_tiles(&player_box, grid, ts, true)
            .iter()
            .any(|hit| hit.kind == TileKind::Spike);
        let stomped = self
            .enemies
            .iter()
            .any(|enemy| player_box.overlaps(&enemy.bounds()));
        let fell_out = self.player.y > grid.px_height(ts);
        if spiked || stomped || fell_out {
            self.respawn();
        }

        // Camera chases the player's box center inside the level bounds.
        let (cx, cy) = self.player.aabb().center();
        self.camera = camera_target(
            cx,
            cy,
            grid.px_width(ts),
            grid.px_height(ts),
            config.view_width,
            config.view_height,
        );
    }

    fn respawn(&mut self) {
        self.player.x = self.spawn_px.0 + RESPAWN_OFFSET_X;
        self.player.y = self.spawn_px.1 + RESPAWN_OFFSET_Y;
        self.player.vx = 0.0;
        self.player.vy = 0.0;
        self.player.on_ground = false;
        self.deaths += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileCoord;

    const TS: f32 = 32.0;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    fn grid_with_spawn(spawn: (i32, i32), cells: &[(i32, i32, TileKind)]) -> TileGrid {
        let mut grid = TileGrid::new(50, 20).unwrap();
        grid.set(spawn.0, spawn.1, TileKind::Spawn);
        for (x, y, kind) in cells {
            grid.set(*x, *y, *kind);
        }
        grid
    }

    #[test]
    fn session_requires_a_spawn_tile() {
        let grid = TileGrid::new(50, 20).unwrap();
        assert!(matches!(
            PlaySession::new(&grid, &config()),
            Err(LevelError::MissingSpawn)
        ));
    }

    #[test]
    fn clock_emits_whole_steps_and_banks_the_remainder() {
        let mut clock = StepClock::new();
        assert_eq!(clock.advance(STEP_MS), 1);
        assert_eq!(clock.advance(40.0), 2);
        // ~6.7ms banked; 8 more is still short of a step, 10 more tips it.
        assert_eq!(clock.advance(8.0), 0);
        assert_eq!(clock.advance(10.0), 1);
    }

    #[test]
    fn clock_clamps_stalls_to_bound_catch_up_work() {
        let steps_after_stall = StepClock::new().advance(10_000.0);
        assert_eq!(steps_after_stall, StepClock::new().advance(200.0));
        assert!(steps_after_stall <= 12);
    }

    #[test]
    fn gravity_only_run_comes_to_rest_on_the_floor() {
        // Ground row at y=5 spanning the level; spawn up at (1,1).
        let cells: Vec<(i32, i32, TileKind)> =
            (0..50).map(|x| (x, 5, TileKind::Ground)).collect();
        let grid = grid_with_spawn((1, 1), &cells);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        let start_x = session.player.x;
        for _ in 0..100 {
            session.step(&grid, TickInput::default(), &config());
        }
        assert_eq!(session.player.y, 5.0 * TS - PLAYER_HEIGHT);
        assert_eq!(session.player.x, start_x);
        assert!(session.player.on_ground);
        assert_eq!(session.player.vy, 0.0);
    }

    #[test]
    fn fall_speed_never_exceeds_terminal_velocity() {
        let grid = grid_with_spawn((1, 1), &[]);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        let mut max_vy = 0.0f32;
        for _ in 0..60 {
            session.step(&grid, TickInput::default(), &config());
            max_vy = max_vy.max(session.player.vy);
            // Keep the run going: falling out of the level respawns.
        }
        assert_eq!(max_vy, config().max_fall_speed);
    }

    #[test]
    fn run_modifier_selects_the_faster_speed() {
        let floor: Vec<_> = (0..50).map(|x| (x, 19, TileKind::Ground)).collect();
        let grid = grid_with_spawn((1, 17), &floor);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        let walk = TickInput {
            right: true,
            ..Default::default()
        };
        session.step(&grid, walk, &config());
        assert_eq!(session.player.vx, 3.0);
        let run = TickInput {
            right: true,
            run: true,
            ..Default::default()
        };
        session.step(&grid, run, &config());
        assert_eq!(session.player.vx, 5.0);
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        session.step(&grid, both, &config());
        assert_eq!(session.player.vx, 0.0);
    }

    #[test]
    fn jump_requires_ground_and_launches_upward() {
        let cells: Vec<_> = (0..50).map(|x| (x, 5, TileKind::Ground)).collect();
        let grid = grid_with_spawn((1, 1), &cells);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        // Settle onto the floor first.
        for _ in 0..100 {
            session.step(&grid, TickInput::default(), &config());
        }
        let rest_y = session.player.y;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        session.step(&grid, jump, &config());
        assert!(session.player.y < rest_y);
        assert_eq!(session.player.vy, -config().jump_speed + config().gravity);
        assert!(!session.player.on_ground);
    }

    #[test]
    fn spike_contact_respawns_at_spawn_with_offset() {
        // Spike directly below the spawn cell; the player falls into it.
        let grid = grid_with_spawn((1, 1), &[(1, 3, TileKind::Spike)]);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        let mut died = false;
        for _ in 0..30 {
            session.step(&grid, TickInput::default(), &config());
            if session.deaths > 0 {
                died = true;
                break;
            }
        }
        assert!(died);
        assert_eq!(session.player.x, 1.0 * TS + 4.0);
        assert_eq!(session.player.y, 1.0 * TS + 2.0);
        assert_eq!(session.player.vx, 0.0);
        assert_eq!(session.player.vy, 0.0);
    }

    #[test]
    fn enemy_contact_respawns_the_player() {
        let mut cells: Vec<_> = (0..50).map(|x| (x, 5, TileKind::Ground)).collect();
        cells.push((2, 4, TileKind::Enemy));
        let grid = grid_with_spawn((1, 1), &cells);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        assert_eq!(session.enemies.len(), 1);
        let mut died = false;
        let toward = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..200 {
            session.step(&grid, toward, &config());
            if session.deaths > 0 {
                died = true;
                break;
            }
        }
        assert!(died);
        assert_eq!(session.player.vx, 0.0);
        assert_eq!(session.player.vy, 0.0);
    }

    #[test]
    fn falling_out_of_the_level_respawns() {
        let grid = grid_with_spawn((1, 1), &[]);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        for _ in 0..200 {
            session.step(&grid, TickInput::default(), &config());
        }
        assert!(session.deaths > 0);
    }

    #[test]
    fn goal_contact_completes_the_session() {
        // Floor row with the goal standing on it in the player's path.
        let mut cells: Vec<_> = (0..50).map(|x| (x, 5, TileKind::Ground)).collect();
        cells.push((5, 4, TileKind::Goal));
        let grid = grid_with_spawn((1, 4), &cells);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        let toward = TickInput {
            right: true,
            run: true,
            ..Default::default()
        };
        for _ in 0..120 {
            session.step(&grid, toward, &config());
            if session.completed {
                break;
            }
        }
        assert!(session.completed);
    }

    #[test]
    fn camera_tracks_the_player_center_within_bounds() {
        let cells: Vec<_> = (0..50).map(|x| (x, 19, TileKind::Ground)).collect();
        let grid = grid_with_spawn((25, 17), &cells);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        session.step(&grid, TickInput::default(), &config());
        let (cx, _) = session.player.aabb().center();
        assert_eq!(session.camera.x, cx - config().view_width * 0.5);
        // 50x20 tiles = 1600x640 px; y clamps to the 100 px of slack.
        assert_eq!(session.camera.y, 640.0 - config().view_height);
    }

    #[test]
    fn dormant_enemies_wake_when_the_padded_view_reaches_them() {
        let mut grid = TileGrid::new(200, 20).unwrap();
        grid.set(1, 17, TileKind::Spawn);
        for x in 0..200 {
            grid.set(x, 19, TileKind::Ground);
        }
        grid.set(190, 18, TileKind::Enemy);
        let mut session = PlaySession::new(&grid, &config()).unwrap();
        session.step(&grid, TickInput::default(), &config());
        assert!(!session.enemies[0].active);
        // Teleport the player next to the enemy. The camera catches up at
        // the end of the first tick; the enemy wakes on the next one.
        session.player.x = 185.0 * TS;
        session.player.y = 17.0 * TS;
        session.step(&grid, TickInput::default(), &config());
        session.step(&grid, TickInput::default(), &config());
        assert!(session.enemies[0].active);
    }

    #[test]
    fn spawn_marker_is_consumed_not_rendered_as_collision() {
        let grid = grid_with_spawn((1, 1), &[]);
        assert_eq!(grid.spawn(), Some(TileCoord::new(1, 1)));
        assert!(!grid.is_solid(1, 1));
    }
}
