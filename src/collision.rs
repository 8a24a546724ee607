use crate::components::TileKind;
use crate::grid::{TileCoord, TileGrid};

/// Shaved off a box's far edges when mapping them to tile columns/rows, so a
/// box that merely touches a tile's near face does not count as overlapping.
pub const EDGE_EPSILON: f32 = 0.01;

/// Axis-aligned box in pixel space. y grows downward: `min_y` is the top
/// edge, `max_y` the bottom (feet for an entity).
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    /// Build from a top-left corner and a size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Strict overlap: shared edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max_x > other.min_x
            && self.min_x < other.max_x
            && self.max_y > other.min_y
            && self.min_y < other.max_y
    }
}

pub fn tile_bounds(coord: TileCoord, tile_size: f32) -> Aabb {
    let x = coord.x as f32 * tile_size;
    let y = coord.y as f32 * tile_size;
    Aabb {
        min_x: x,
        min_y: y,
        max_x: x + tile_size,
        max_y: y + tile_size,
    }
}

/// One tile overlapping a queried box.
#[derive(Clone, Copy, Debug)]
pub struct TileHit {
    pub coord: TileCoord,
    pub kind: TileKind,
    pub bounds: Aabb,
}

/// Enumerate the tiles whose bounds overlap `aabb`. Solid tiles only, unless
/// `include_hazards` also admits spikes. Cells are visited in row-major
/// order, so the result order is deterministic for a given box.
pub fn colliding_tiles(
    aabb: &Aabb,
    grid: &TileGrid,
    tile_size: f32,
    include_hazards: bool,
) -> Vec<TileHit> {
    let min_tx = (aabb.min_x / tile_size).floor() as i32;
    let max_tx = ((aabb.max_x - EDGE_EPSILON) / tile_size).floor() as i32;
    let min_ty = (aabb.min_y / tile_size).floor() as i32;
    let max_ty = ((aabb.max_y - EDGE_EPSILON) / tile_size).floor() as i32;

    let mut hits = Vec::new();
    for ty in min_ty..=max_ty {
        for tx in min_tx..=max_tx {
            let Some(kind) = grid.get(tx, ty) else {
                continue;
            };
            if !kind.is_solid() && !(include_hazards && kind.is_hazard()) {
                continue;
            }
            let coord = TileCoord::new(tx, ty);
            let bounds = tile_bounds(coord, tile_size);
            if aabb.overlaps(&bounds) {
                hits.push(TileHit {
                    coord,
                    kind,
                    bounds,
                });
            }
        }
    }
    hits
}

/// A moving box: top-left position, size, per-tick velocity, ground flag.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
}

impl Body {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }
}

/// Snap a horizontally moving body to the near face of the blocking tiles.
/// With several overlapping tiles the nearest face along the direction of
/// travel wins, which is the most restrictive (and order-independent) pick.
pub fn resolve_horizontal(body: &mut Body, dx: f32, hits: &[TileHit]) {
    if dx > 0.0 {
        let face = hits
            .iter()
            .map(|h| h.bounds.min_x)
            .fold(f32::INFINITY, f32::min);
        body.x = face - body.width;
    } else if dx < 0.0 {
        let face = hits
            .iter()
            .map(|h| h.bounds.max_x)
            .fold(f32::NEG_INFINITY, f32::max);
        body.x = face;
    }
    body.vx = 0.0;
}

/// Snap a vertically moving body to the near face of the blocking tiles.
/// Landing (downward travel) grounds the body; bonking (upward travel) only
/// kills the velocity.
pub fn resolve_vertical(body: &mut Body, dy: f32, hits: &[TileHit]) {
    if dy > 0.0 {
        let face = hits
            .iter()
            .map(|h| h.bounds.min_y)
            .fold(f32::INFINITY, f32::min);
        body.y = face - body.height;
        body.on_ground = true;
    } else if dy < 0.0 {
        let face = hits
            .iter()
            .map(|h| h.bounds.max_y)
            .fold(f32::NEG_INFINITY, f32::max);
        body.y = face;
    }
    body.vy = 0.0;
}

/// Advance a body by its velocity, one axis at a time: x first, then y.
/// Combining the axes would change corner resolution and allow diagonal
/// tunneling. Returns every solid tile touched during resolution, so the
/// caller can react to what was hit (goal contact, for one).
pub fn step_body(body: &mut Body, grid: &TileGrid, tile_size: f32) -> Vec<TileHit> {
    let mut touched = Vec::new();

    let dx = body.vx;
    if dx != 0.0 {
        let moved = body.aabb().translated(dx, 0.0);
        let hits = colliding_tiles(&moved, grid, tile_size, false);
        if hits.is_empty() {
            body.x += dx;
        } else {
            resolve_horizontal(body, dx, &hits);
            touched.extend(hits);
        }
    }

    let dy = body.vy;
    if dy != 0.0 {
        let moved = body.aabb().translated(0.0, dy);
        let hits = colliding_tiles(&moved, grid, tile_size, false);
        if hits.is_empty() {
            body.y += dy;
            body.on_ground = false;
        } else {
            resolve_vertical(body, dy, &hits);
            touched.extend(hits);
        }
    }

    touched
}
