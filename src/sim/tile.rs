//! World grid of destructible tiles
//!
//! Coordinates are signed so that neighbour lookups at the world edge never
//! need special casing: anything outside the grid reads as [`Tile::BOUNDARY`].

use serde::{Deserialize, Serialize};

use super::resource::ResourceType;
use crate::consts::TILE_SIZE;

/// Hardness assigned to boundary tiles; never drilled, only reported
pub const BOUNDARY_HARDNESS: f32 = 9999.0;

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Empty,
    SoftMaterial,
    HardMaterial,
    /// Solid, and hurts on contact
    Hazard,
    /// Indestructible world edge
    Boundary,
    ResourceVein(ResourceType),
}

impl TileKind {
    /// Hardness of a freshly generated tile of this kind, before depth scaling
    pub fn base_hardness(&self) -> f32 {
        match self {
            TileKind::Empty => 0.0,
            TileKind::SoftMaterial => 1.0,
            TileKind::HardMaterial => 3.0,
            TileKind::Hazard => 2.5,
            TileKind::Boundary => BOUNDARY_HARDNESS,
            TileKind::ResourceVein(r) => r.hardness(),
        }
    }

    pub fn is_solid(&self) -> bool {
        *self != TileKind::Empty
    }

    /// Can a drill be started against this kind
    pub fn is_drillable(&self) -> bool {
        !matches!(self, TileKind::Empty | TileKind::Boundary)
    }

    pub fn resource(&self) -> Option<ResourceType> {
        match self {
            TileKind::ResourceVein(r) => Some(*r),
            _ => None,
        }
    }

    fn ascii(&self) -> char {
        match self {
            TileKind::Empty => ' ',
            TileKind::SoftMaterial => '.',
            TileKind::HardMaterial => '#',
            TileKind::Hazard => '~',
            TileKind::Boundary => '@',
            TileKind::ResourceVein(r) => match r {
                ResourceType::Copper => 'c',
                ResourceType::Iron => 'i',
                ResourceType::Silver => 's',
                ResourceType::Gold => 'g',
                ResourceType::Platinum => 'p',
                ResourceType::Emerald => 'e',
                ResourceType::Ruby => 'r',
                ResourceType::Diamond => 'd',
            },
        }
    }
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Remaining integrity, never negative
    pub hardness: f32,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        kind: TileKind::Empty,
        hardness: 0.0,
    };

    pub const BOUNDARY: Tile = Tile {
        kind: TileKind::Boundary,
        hardness: BOUNDARY_HARDNESS,
    };

    pub fn new(kind: TileKind, hardness: f32) -> Self {
        Self {
            kind,
            hardness: hardness.max(0.0),
        }
    }
}

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The world: a row-major grid of tiles with a fixed surface line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    /// First row that can hold material; rows above are open sky
    surface_row: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// An open grid: boundary ring, everything inside empty
    pub fn new(width: usize, height: usize, surface_row: usize) -> Self {
        let mut grid = Self {
            width,
            height,
            surface_row,
            tiles: vec![Tile::EMPTY; width * height],
        };
        for y in 0..height {
            for x in 0..width {
                if grid.is_edge(x, y) {
                    grid.tiles[y * width + x] = Tile::BOUNDARY;
                }
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn surface_row(&self) -> usize {
        self.surface_row
    }

    /// World-space width in units
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    /// Whether (x, y) lies on the outermost ring
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Tile at (x, y); out-of-range reads return the boundary sentinel
    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.index(x, y).map_or(Tile::BOUNDARY, |i| self.tiles[i])
    }

    pub fn kind(&self, x: i32, y: i32) -> TileKind {
        self.get(x, y).kind
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.kind(x, y).is_solid()
    }

    /// Overwrite a cell. Boundary cells and out-of-range writes are ignored.
    ///
    /// Only world generation and test setup write arbitrary tiles; gameplay
    /// goes through [`TileGrid::apply_drill`] and [`TileGrid::break_tile`].
    pub(crate) fn set(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.index(x, y) {
            Some(i) if self.tiles[i].kind != TileKind::Boundary && tile.kind != TileKind::Boundary => {
                self.tiles[i] = Tile::new(tile.kind, tile.hardness);
                true
            }
            _ => false,
        }
    }

    /// Wear a tile down by `amount`. Returns the former kind if it broke.
    pub fn apply_drill(&mut self, x: i32, y: i32, amount: f32) -> Option<TileKind> {
        let i = self.index(x, y)?;
        let tile = &mut self.tiles[i];
        if !tile.kind.is_drillable() || amount <= 0.0 {
            return None;
        }
        tile.hardness = (tile.hardness - amount).max(0.0);
        if tile.hardness == 0.0 {
            let former = tile.kind;
            *tile = Tile::EMPTY;
            Some(former)
        } else {
            None
        }
    }

    /// Break a tile outright. Returns the former kind, or `None` if there was
    /// nothing breakable there.
    pub fn break_tile(&mut self, x: i32, y: i32) -> Option<TileKind> {
        let i = self.index(x, y)?;
        let tile = &mut self.tiles[i];
        if !tile.kind.is_drillable() {
            return None;
        }
        let former = tile.kind;
        *tile = Tile::EMPTY;
        Some(former)
    }

    /// Rows below the surface line (0 at and above it)
    pub fn depth_of_row(&self, y: i32) -> u32 {
        (y - self.surface_row as i32).max(0) as u32
    }

    /// All tiles, row-major
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Count of tiles matching a predicate
    pub fn count(&self, pred: impl Fn(&Tile) -> bool) -> usize {
        self.tiles.iter().filter(|t| pred(t)).count()
    }

    /// Checks that the stored dimensions match the tile buffer and the ring is intact
    pub(crate) fn is_consistent(&self) -> bool {
        if self.width < 3 || self.height < 3 || self.tiles.len() != self.width * self.height {
            return false;
        }
        if self.surface_row == 0 || self.surface_row >= self.height - 1 {
            return false;
        }
        (0..self.height).all(|y| {
            (0..self.width).all(|x| {
                let tile = &self.tiles[y * self.width + x];
                let edge_ok = (tile.kind == TileKind::Boundary) == self.is_edge(x, y);
                edge_ok && tile.hardness >= 0.0 && tile.hardness.is_finite()
            })
        })
    }

    /// Text dump of a range of rows, one line per row
    pub fn to_ascii(&self, rows: std::ops::Range<usize>) -> String {
        let mut out = String::with_capacity((self.width + 1) * rows.len());
        for y in rows.start..rows.end.min(self.height) {
            for x in 0..self.width {
                out.push(self.tiles[y * self.width + x].kind.ascii());
            }
            out.push('\n');
        }
        out
    }
}
