// src/map/tile_layer.rs

use crate::utils::{Cell, RectI};
use serde::{Deserialize, Serialize};

/// Palette reference handed to the renderer. The generator never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u16);

/// Boundary variant assigned to a floor cell by the wall classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallTile {
    TopA,
    TopB,
    BottomA,
    BottomB,
    Left,
    Right,
    /// Floor cell with void on opposite sides (e.g. a 1-wide corridor).
    Edge,
    CornerTopLeft,
    CornerTopRight,
    CornerBottomLeft,
    CornerBottomRight,
    InnerTopLeft,
    InnerTopRight,
    InnerBottomLeft,
    InnerBottomRight,
}

/// Dense grid over a fixed rectangle; cells outside the rectangle are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    bounds: RectI,
    cells: Vec<Option<T>>,
}

impl<T: Clone> Grid<T> {
    pub fn new(bounds: RectI) -> Self {
        let len = (bounds.width.max(0) as usize) * (bounds.height.max(0) as usize);
        Grid {
            bounds,
            cells: vec![None; len],
        }
    }

    pub fn bounds(&self) -> RectI {
        self.bounds
    }

    fn slot(&self, cell: Cell) -> Option<usize> {
        if !self.bounds.contains(cell) {
            return None;
        }
        let lx = (cell.x - self.bounds.x) as usize;
        let ly = (cell.y - self.bounds.y) as usize;
        Some(ly * self.bounds.width as usize + lx)
    }

    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.slot(cell).and_then(|i| self.cells[i].as_ref())
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    /// Returns `false` if the cell lies outside the grid.
    pub fn set(&mut self, cell: Cell, value: T) -> bool {
        match self.slot(cell) {
            Some(i) => {
                self.cells[i] = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, cell: Cell) -> Option<T> {
        self.slot(cell).and_then(|i| self.cells[i].take())
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Occupied cells with their values, row-major from the bottom row.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> + '_ {
        let b = self.bounds;
        self.cells.iter().enumerate().filter_map(move |(i, v)| {
            v.as_ref().map(|v| {
                let x = b.x + (i % b.width as usize) as i32;
                let y = b.y + (i / b.width as usize) as i32;
                (Cell::new(x, y), v)
            })
        })
    }
}

pub type TileLayer = Grid<TileId>;

/// All logical layers emitted for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayers {
    pub floor: TileLayer,
    pub walls: TileLayer,
    pub paths: TileLayer,
    pub hazards: TileLayer,
    pub outside: TileLayer,
    pub wall_kinds: Grid<WallTile>,
}

impl TileLayers {
    pub fn new(bounds: RectI) -> Self {
        TileLayers {
            floor: Grid::new(bounds),
            walls: Grid::new(bounds),
            paths: Grid::new(bounds),
            hazards: Grid::new(bounds),
            outside: Grid::new(bounds),
            wall_kinds: Grid::new(bounds),
        }
    }

    pub fn bounds(&self) -> RectI {
        self.floor.bounds()
    }
}
