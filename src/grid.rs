use std::collections::HashMap;

use bevy::prelude::*;

use crate::components::TileKind;

/// Editor-enforced level dimension bounds, in tiles.
pub const MIN_WIDTH: u32 = 10;
pub const MAX_WIDTH: u32 = 200;
pub const MIN_HEIGHT: u32 = 10;
pub const MAX_HEIGHT: u32 = 100;

/// Integer cell coordinate. Row 0 is the top row; y grows downward, matching
/// the pixel space the grid is edited and rendered in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("level dimensions {width}x{height} outside the supported {min_w}-{max_w} x {min_h}-{max_h} range", min_w = MIN_WIDTH, max_w = MAX_WIDTH, min_h = MIN_HEIGHT, max_h = MAX_HEIGHT)]
    InvalidDimensions { width: u32, height: u32 },
}

/// Sparse level geometry: only occupied cells carry a key. At most one cell
/// holds `Spawn` and at most one holds `Goal`; the cached references below
/// are maintained by every mutation and re-derived wholesale on load.
#[derive(Resource, Clone, PartialEq, Debug)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: HashMap<TileCoord, TileKind>,
    spawn: Option<TileCoord>,
    goal: Option<TileCoord>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) || !(MIN_HEIGHT..=MAX_HEIGHT).contains(&height)
        {
            return Err(GridError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            tiles: HashMap::new(),
            spawn: None,
            goal: None,
        })
    }

    /// A small starting level for a fresh editor: a ground floor, a spawn on
    /// the left, a goal on the right.
    pub fn starter() -> Self {
        let mut grid = Self {
            width: 50,
            height: 20,
            tiles: HashMap::new(),
            spawn: None,
            goal: None,
        };
        for x in 0..50 {
            grid.set(x, 19, TileKind::Ground);
        }
        grid.set(2, 18, TileKind::Spawn);
        grid.set(47, 18, TileKind::Goal);
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn px_width(&self, tile_size: f32) -> f32 {
        self.width as f32 * tile_size
    }

    pub fn px_height(&self, tile_size: f32) -> f32 {
        self.height as f32 * tile_size
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileKind> {
        self.tiles.get(&TileCoord::new(x, y)).copied()
    }

    /// Cells outside the grid read as empty.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(TileKind::is_solid)
    }

    pub fn spawn(&self) -> Option<TileCoord> {
        self.spawn
    }

    pub fn goal(&self) -> Option<TileCoord> {
        self.goal
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileKind)> + '_ {
        self.tiles.iter().map(|(c, k)| (*c, *k))
    }

    pub fn enemy_cells(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles
            .iter()
            .filter(|(_, k)| **k == TileKind::Enemy)
            .map(|(c, _)| *c)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Write `kind` at `(x, y)`, overwriting any occupant. Out-of-bounds
    /// writes are ignored. Placing a second `Spawn` or `Goal` clears the
    /// previous one's cell first, so the singletons hold after every call.
    pub fn set(&mut self, x: i32, y: i32, kind: TileKind) {
        if !self.in_bounds(x, y) {
            return;
        }
        let coord = TileCoord::new(x, y);
        match kind {
            TileKind::Spawn => {
                if let Some(prev) = self.spawn.take() {
                    self.tiles.remove(&prev);
                }
                self.spawn = Some(coord);
            }
            TileKind::Goal => {
                if let Some(prev) = self.goal.take() {
                    self.tiles.remove(&prev);
                }
                self.goal = Some(coord);
            }
            _ => {}
        }
        if let Some(prev) = self.tiles.insert(coord, kind) {
            // Overwriting the spawn/goal cell with another kind drops the
            // corresponding reference.
            if prev == TileKind::Spawn && kind != TileKind::Spawn {
                self.spawn = None;
            }
            if prev == TileKind::Goal && kind != TileKind::Goal {
                self.goal = None;
            }
        }
    }

    /// Delete the cell at `(x, y)` if occupied. Out-of-bounds is a no-op.
    pub fn clear(&mut self, x: i32, y: i32) {
        let coord = TileCoord::new(x, y);
        match self.tiles.remove(&coord) {
            Some(TileKind::Spawn) => self.spawn = None,
            Some(TileKind::Goal) => self.goal = None,
            _ => {}
        }
    }

    /// Resize the grid, keeping the level anchored at its bottom-left
    /// corner: every occupied cell's row shifts by `new_height - old_height`
    /// (growing adds empty rows above the existing content). A cell is
    /// dropped when it fails the bounds check against the new dimensions or
    /// its shifted row lands above the top; dropped spawn/goal cells clear
    /// the matching reference, shifted ones move it.
    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), GridError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&new_width)
            || !(MIN_HEIGHT..=MAX_HEIGHT).contains(&new_height)
        {
            return Err(GridError::InvalidDimensions {
                width: new_width,
                height: new_height,
            });
        }
        let dh = new_height as i32 - self.height as i32;
        let mut remapped = HashMap::with_capacity(self.tiles.len());
        let mut spawn = None;
        let mut goal = None;
        for (coord, kind) in self.tiles.drain() {
            if coord.x >= new_width as i32 || coord.y >= new_height as i32 {
                continue;
            }
            let shifted = TileCoord::new(coord.x, coord.y + dh);
            if shifted.y < 0 {
                continue;
            }
            match kind {
                TileKind::Spawn => spawn = Some(shifted),
                TileKind::Goal => goal = Some(shifted),
                _ => {}
            }
            remapped.insert(shifted, kind);
        }
        self.width = new_width;
        self.height = new_height;
        self.tiles = remapped;
        self.spawn = spawn;
        self.goal = goal;
        Ok(())
    }

    /// Re-derive the spawn/goal references from the tile contents, restoring
    /// the singleton invariant if the source held duplicates (first
    /// occurrence in row-major order wins; later ones are deleted). Run once
    /// after loading; stored pointers are never trusted.
    pub fn rederive_markers(&mut self) {
        self.spawn = None;
        self.goal = None;
        let mut occupied: Vec<TileCoord> = self.tiles.keys().copied().collect();
        occupied.sort_by_key(|c| (c.y, c.x));
        let mut extra = Vec::new();
        for coord in occupied {
            match self.tiles[&coord] {
                TileKind::Spawn => {
                    if self.spawn.is_none() {
                        self.spawn = Some(coord);
                    } else {
                        extra.push(coord);
                    }
                }
                TileKind::Goal => {
                    if self.goal.is_none() {
                        self.goal = Some(coord);
                    } else {
                        extra.push(coord);
                    }
                }
                _ => {}
            }
        }
        for coord in extra {
            self.tiles.remove(&coord);
        }
    }
}
