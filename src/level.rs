use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;

use crate::components::TileKind;
use crate::grid::{GridError, TileGrid};

/// Wire shape shared with the level store: sparse cells keyed by `"x,y"`
/// strings. The string keys live only here; everything past this boundary
/// uses [`crate::grid::TileCoord`].
#[derive(serde::Serialize, serde::Deserialize, Clone)]
pub struct LevelData {
    pub width: u32,
    pub height: u32,
    pub tiles: BTreeMap<String, TileKind>,
}

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level data: {0}")]
    Format(#[from] serde_json::Error),
    #[error(transparent)]
    Dimensions(#[from] GridError),
    #[error("level has no spawn tile")]
    MissingSpawn,
}

pub fn to_level_data(grid: &TileGrid) -> LevelData {
    let mut tiles = BTreeMap::new();
    for (coord, kind) in grid.iter() {
        tiles.insert(format!("{},{}", coord.x, coord.y), kind);
    }
    LevelData {
        width: grid.width(),
        height: grid.height(),
        tiles,
    }
}

/// Rebuild a grid from stored level data. Malformed or out-of-bounds keys
/// are skipped (counted in the log), and the spawn/goal references are
/// re-derived from the tile contents rather than trusted from the store,
/// since a resize may have moved or dropped them after they were written.
pub fn from_level_data(data: &LevelData) -> Result<TileGrid, LevelError> {
    let mut grid = TileGrid::new(data.width, data.height)?;
    let mut skipped = 0usize;
    for (key, kind) in &data.tiles {
        match parse_key(key) {
            Some((x, y)) if grid.in_bounds(x, y) => grid.set(x, y, *kind),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("dropped {skipped} invalid tile key(s) while loading level");
    }
    grid.rederive_markers();
    Ok(grid)
}

pub fn load(path: &Path) -> Result<TileGrid, LevelError> {
    let contents = std::fs::read_to_string(path)?;
    let data: LevelData = serde_json::from_str(&contents)?;
    from_level_data(&data)
}

pub fn save(path: &Path, grid: &TileGrid) -> Result<(), LevelError> {
    let data = to_level_data(grid);
    let contents = serde_json::to_string_pretty(&data)?;
    std::fs::write(path, contents)?;
    Ok(())
}

fn parse_key(key: &str) -> Option<(i32, i32)> {
    let (x, y) = key.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
