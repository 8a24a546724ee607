use crate::collision::{colliding_tiles, Aabb};
use crate::components::GameConfig;
use crate::grid::{TileCoord, TileGrid};

pub const ENEMY_SIZE: f32 = 26.0;

/// A patrolling enemy, seeded from an `Enemy` marker tile when the session
/// is built. Dormant until first seen by the (padded) camera, then it walks
/// back and forth forever: reversing off walls and ledges.
#[derive(Clone, Copy, Debug)]
pub struct EnemyState {
    pub x: f32,
    pub y: f32,
    /// Horizontal heading, -1.0 or 1.0.
    pub dir: f32,
    pub active: bool,
}

impl EnemyState {
    /// Bottom-center aligned inside the marker cell, walking left.
    pub fn at_marker(cell: TileCoord, tile_size: f32) -> Self {
        Self {
            x: cell.x as f32 * tile_size + (tile_size - ENEMY_SIZE) * 0.5,
            y: cell.y as f32 * tile_size + (tile_size - ENEMY_SIZE),
            dir: -1.0,
            active: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, ENEMY_SIZE, ENEMY_SIZE)
    }
}

/// One enemy tick. Activation is one-way: the flag is never reset once the
/// box has intersected the padded view. Dormant enemies do not move.
pub fn update(enemy: &mut EnemyState, grid: &TileGrid, padded_view: &Aabb, config: &GameConfig) {
    if !enemy.active && enemy.bounds().overlaps(padded_view) {
        enemy.active = true;
    }
    if !enemy.active {
        return;
    }
    patrol(enemy, grid, config);
    if ledge_ahead(enemy, grid, config.tile_size) {
        enemy.dir = -enemy.dir;
    }
}

/// Advance by `speed * dir`; on a wall overlap, reverse once and apply the
/// reversed displacement instead (never iterated within a tick).
fn patrol(enemy: &mut EnemyState, grid: &TileGrid, config: &GameConfig) {
    let dx = config.enemy_speed * enemy.dir;
    let moved = enemy.bounds().translated(dx, 0.0);
    if colliding_tiles(&moved, grid, config.tile_size, false).is_empty() {
        enemy.x += dx;
    } else {
        enemy.dir = -enemy.dir;
        enemy.x += config.enemy_speed * enemy.dir;
    }
}

/// True when the tile just past the leading edge, one pixel below the feet,
/// is not solid. Runs every tick, wall contact or not.
fn ledge_ahead(enemy: &EnemyState, grid: &TileGrid, tile_size: f32) -> bool {
    let bounds = enemy.bounds();
    let lead_x = if enemy.dir > 0.0 {
        bounds.max_x
    } else {
        bounds.min_x
    };
    let probe_y = bounds.max_y + 1.0;
    let tx = (lead_x / tile_size).floor() as i32;
    let ty = (probe_y / tile_size).floor() as i32;
    !grid.is_solid(tx, ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TileKind;

    const TS: f32 = 32.0;

    fn platform_grid(row: i32, from_x: i32, to_x: i32) -> TileGrid {
        let mut grid = TileGrid::new(50, 20).unwrap();
        for x in from_x..=to_x {
            grid.set(x, row, TileKind::Ground);
        }
        grid
    }

    fn everywhere() -> Aabb {
        Aabb::new(-10_000.0, -10_000.0, 20_000.0, 20_000.0)
    }

    fn nowhere() -> Aabb {
        Aabb::new(-10_000.0, -10_000.0, 1.0, 1.0)
    }

    #[test]
    fn dormant_enemy_does_not_move() {
        let grid = platform_grid(6, 0, 20);
        let mut enemy = EnemyState::at_marker(TileCoord::new(10, 5), TS);
        let before_x = enemy.x;
        update(&mut enemy, &grid, &nowhere(), &GameConfig::default());
        assert!(!enemy.active);
        assert_eq!(enemy.x, before_x);
    }

    #[test]
    fn activation_is_permanent() {
        let grid = platform_grid(6, 0, 20);
        let mut enemy = EnemyState::at_marker(TileCoord::new(10, 5), TS);
        update(&mut enemy, &grid, &everywhere(), &GameConfig::default());
        assert!(enemy.active);
        // The view moves away; the enemy keeps patrolling.
        let x_after_activation = enemy.x;
        update(&mut enemy, &grid, &nowhere(), &GameConfig::default());
        assert!(enemy.active);
        assert_ne!(enemy.x, x_after_activation);
    }

    #[test]
    fn walks_at_constant_speed_on_open_ground() {
        let grid = platform_grid(6, 0, 20);
        let mut enemy = EnemyState::at_marker(TileCoord::new(10, 5), TS);
        enemy.active = true;
        let before_x = enemy.x;
        update(&mut enemy, &grid, &everywhere(), &GameConfig::default());
        assert_eq!(enemy.x, before_x - 1.2);
    }

    #[test]
    fn reverses_off_a_wall_once_per_tick() {
        let mut grid = platform_grid(6, 0, 20);
        grid.set(9, 5, TileKind::Block);
        let mut enemy = EnemyState::at_marker(TileCoord::new(10, 5), TS);
        enemy.active = true;
        // Start flush against the wall on the left.
        enemy.x = 10.0 * TS;
        let config = GameConfig::default();
        update(&mut enemy, &grid, &everywhere(), &config);
        assert_eq!(enemy.dir, 1.0);
        assert_eq!(enemy.x, 10.0 * TS + config.enemy_speed);
    }

    #[test]
    fn reverses_at_a_ledge() {
        // Platform ends at x=12; enemy walks right toward the edge.
        let grid = platform_grid(6, 8, 12);
        let mut enemy = EnemyState::at_marker(TileCoord::new(10, 5), TS);
        enemy.active = true;
        enemy.dir = 1.0;
        let mut reversed = false;
        for _ in 0..200 {
            update(&mut enemy, &grid, &everywhere(), &GameConfig::default());
            if enemy.dir < 0.0 {
                reversed = true;
                break;
            }
            // Never walks past the platform edge.
            assert!(enemy.bounds().max_x <= 13.0 * TS + 1.0);
        }
        assert!(reversed);
    }
}
