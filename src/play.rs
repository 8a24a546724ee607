use bevy::prelude::*;

use crate::components::{AppMode, GameConfig};
use crate::grid::TileGrid;
use crate::input::PlayerInput;
use crate::sim::{PlaySession, StepClock, TickInput};

/// The live play session. Exists only while in [`AppMode::Playing`].
#[derive(Resource)]
pub struct Session(pub PlaySession);

#[derive(Resource, Default)]
struct Clock(StepClock);

pub struct PlayPlugin;

impl Plugin for PlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Clock>()
            .add_systems(OnEnter(AppMode::Playing), start_session)
            .add_systems(OnExit(AppMode::Playing), end_session)
            .add_systems(Update, toggle_mode)
            .add_systems(
                Update,
                run_fixed_steps
                    .run_if(in_state(AppMode::Playing))
                    .after(toggle_mode),
            );
    }
}

fn toggle_mode(
    keyboard: Res<ButtonInput<KeyCode>>,
    mode: Res<State<AppMode>>,
    mut next: ResMut<NextState<AppMode>>,
) {
    if keyboard.just_pressed(KeyCode::Tab) {
        next.set(match mode.get() {
            AppMode::Editor => AppMode::Playing,
            AppMode::Playing => AppMode::Editor,
        });
    }
}

/// Build the session from the applied level data. Without a spawn tile the
/// level cannot be played; fall straight back to the editor.
fn start_session(
    mut commands: Commands,
    grid: Res<TileGrid>,
    config: Res<GameConfig>,
    mut clock: ResMut<Clock>,
    mut next: ResMut<NextState<AppMode>>,
) {
    match PlaySession::new(&grid, &config) {
        Ok(session) => {
            if grid.goal().is_none() {
                warn!("level has no goal tile; this run cannot be completed");
            }
            clock.0 = StepClock::new();
            commands.insert_resource(Session(session));
            info!("play session started ({} enemies)", grid.enemy_cells().count());
        }
        Err(err) => {
            warn!("unable to load level: {err}");
            next.set(AppMode::Editor);
        }
    }
}

fn end_session(mut commands: Commands) {
    commands.remove_resource::<Session>();
}

/// Drain the accumulator into fixed ticks, then let the frame render once.
/// All catch-up steps see the same sampled input, like any single frame.
fn run_fixed_steps(
    time: Res<Time>,
    grid: Res<TileGrid>,
    config: Res<GameConfig>,
    input: Res<PlayerInput>,
    mut clock: ResMut<Clock>,
    session: Option<ResMut<Session>>,
    mut next: ResMut<NextState<AppMode>>,
) {
    let Some(mut session) = session else {
        return;
    };
    let tick = TickInput {
        left: input.left,
        right: input.right,
        jump: input.jump,
        run: input.run,
    };
    let steps = clock.0.advance(time.delta_secs_f64() * 1000.0);
    for _ in 0..steps {
        session.0.step(&grid, tick, &config);
    }
    if session.0.completed {
        info!(
            "level complete ({} death{})",
            session.0.deaths,
            if session.0.deaths == 1 { "" } else { "s" }
        );
        next.set(AppMode::Editor);
    }
}
