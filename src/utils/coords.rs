use serde::{Deserialize, Serialize};

use super::Size;

// ----------------------------------------------
// Grid & View Space Constants
// ----------------------------------------------

/*
Grid space:
 Square GRID_SIZE x GRID_SIZE array of cells. The playable map is a
 smaller rectangle centered inside it. Cells are addressed either by
 `Cell` (x,y) or by a scalar `GridOffset` (x + GRID_SIZE * y).

View space:
 The grid rotated 45 degrees (north up). Each view row holds every
 other diagonal of the grid, so odd view rows are staggered by half a
 tile. View tiles are addressed by `ViewTile` (x,y) and are valid in
 [0, VIEW_X_MAX) x [0, VIEW_Y_MAX).

 Cell(x,y) -> ViewTile((VIEW_X_MAX - 1 + x - y) / 2, 1 + x + y)
*/

pub const GRID_SIZE:  i32 = 162;
pub const VIEW_X_MAX: i32 = 165;
pub const VIEW_Y_MAX: i32 = 325;

// Top-left grid cell of a playable map of the given size, which is
// always centered inside the grid.
#[inline]
pub fn map_start_cell(map_size: Size) -> Cell {
    Cell::new((GRID_SIZE - map_size.width) / 2, (GRID_SIZE - map_size.height) / 2)
}

// ----------------------------------------------
// GridOffset
// ----------------------------------------------

// Scalar index of a cell in the GRID_SIZE x GRID_SIZE grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridOffset(u32);

impl GridOffset {
    pub const MAX: u32 = (GRID_SIZE * GRID_SIZE) as u32;

    #[inline]
    pub const fn new(offset: u32) -> Self {
        debug_assert!(offset < Self::MAX);
        Self(offset)
    }

    #[inline]
    pub fn from_cell(cell: Cell) -> Option<Self> {
        if !cell.is_within_grid() {
            return None;
        }
        Some(Self((cell.x + GRID_SIZE * cell.y) as u32))
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn to_cell(self) -> Cell {
        let offset = self.0 as i32;
        Cell::new(offset % GRID_SIZE, offset / GRID_SIZE)
    }

    // Offset zero doubles as the "no cell" value for navigation requests, so
    // the grid corner can never be navigated to even when a map covers it.
    #[inline]
    pub const fn is_navigable(self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for GridOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ----------------------------------------------
// Cell
// ----------------------------------------------

// X,Y position in the grid of cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_within_grid(&self) -> bool {
        self.x >= 0 && self.x < GRID_SIZE && self.y >= 0 && self.y < GRID_SIZE
    }

    #[inline]
    pub fn to_view_tile(self) -> ViewTile {
        ViewTile::new((VIEW_X_MAX - 1 + self.x - self.y) / 2, 1 + self.x + self.y)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ----------------------------------------------
// ViewTile
// ----------------------------------------------

// X,Y position in the rotated view space, in whole tiles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewTile {
    pub x: i32,
    pub y: i32,
}

impl ViewTile {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_within_view(&self) -> bool {
        self.x >= 0 && self.x < VIEW_X_MAX && self.y >= 0 && self.y < VIEW_Y_MAX
    }

    // Odd view rows are shifted left by half a tile.
    #[inline]
    pub fn is_odd_row(&self) -> bool {
        (self.y & 1) != 0
    }

    // Inverse of `Cell::to_view_tile()`. None if no grid cell lands here.
    pub fn to_cell(self) -> Option<Cell> {
        let sum = self.y - 1; // x + y
        let mut diff = 2 * self.x - (VIEW_X_MAX - 1); // x - y, before parity fix
        if (diff - sum).rem_euclid(2) != 0 {
            diff += 1;
        }

        let cell = Cell::new((sum + diff) / 2, (sum - diff) / 2);
        if cell.is_within_grid() && cell.to_view_tile() == self {
            Some(cell)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ViewTile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ----------------------------------------------
// PixelPoint
// ----------------------------------------------

// Integer screen position, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
