// src/utils/geometry.rs

use serde::{Deserialize, Serialize};

/// Integer grid cell. `y` grows towards the north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Cell {
        Cell::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(&self, other: &Cell) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }

    /// Squared distance, for comparisons that don't need the root.
    pub fn distance_sq(&self, other: &Cell) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Centre of the cell in world units.
    pub fn world_center(&self) -> Point2D {
        Point2D::new(self.x as f64 + 0.5, self.y as f64 + 0.5)
    }

    /// The eight Moore neighbours, x-major.
    pub fn neighbors8(&self) -> impl Iterator<Item = Cell> + '_ {
        (-1..=1).flat_map(move |dx| {
            (-1..=1)
                .filter(move |&dy| !(dx == 0 && dy == 0))
                .map(move |dy| self.offset(dx, dy))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The cell containing this point.
    pub fn to_cell(&self) -> Cell {
        Cell::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

/// Half-open integer rectangle: covers `x..x + width` and `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectI {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectI {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// A `width` x `height` rectangle centred on the origin.
    pub fn centered(width: i32, height: i32) -> Self {
        Self::new(-width / 2, -height / 2, width, height)
    }

    pub fn x_min(&self) -> i32 {
        self.x
    }

    pub fn y_min(&self) -> i32 {
        self.y
    }

    /// Exclusive.
    pub fn x_max(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive.
    pub fn y_max(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x_min() && cell.x < self.x_max() && cell.y >= self.y_min() && cell.y < self.y_max()
    }

    pub fn contains_rect(&self, other: &RectI) -> bool {
        other.x_min() >= self.x_min()
            && other.x_max() <= self.x_max()
            && other.y_min() >= self.y_min()
            && other.y_max() <= self.y_max()
    }

    // Checks if two rectangles share at least one cell
    pub fn intersects(&self, other: &RectI) -> bool {
        self.x_min() < other.x_max()
            && other.x_min() < self.x_max()
            && self.y_min() < other.y_max()
            && other.y_min() < self.y_max()
    }

    /// Shrinks every side by `margin`.
    pub fn inset(&self, margin: i32) -> RectI {
        RectI::new(
            self.x + margin,
            self.y + margin,
            self.width - margin * 2,
            self.height - margin * 2,
        )
    }

    /// Grows every side by `padding`.
    pub fn expand(&self, padding: i32) -> RectI {
        self.inset(-padding)
    }

    pub fn union(&self, other: &RectI) -> RectI {
        let x_min = self.x_min().min(other.x_min());
        let y_min = self.y_min().min(other.y_min());
        let x_max = self.x_max().max(other.x_max());
        let y_max = self.y_max().max(other.y_max());
        RectI::new(x_min, y_min, x_max - x_min, y_max - y_min)
    }

    /// Smallest rectangle holding every cell, or `None` for an empty iterator.
    pub fn bounding<I: IntoIterator<Item = Cell>>(cells: I) -> Option<RectI> {
        let mut iter = cells.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for c in iter {
            min_x = min_x.min(c.x);
            min_y = min_y.min(c.y);
            max_x = max_x.max(c.x);
            max_y = max_y.max(c.y);
        }
        Some(RectI::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// Every cell, x-major (x outer, y inner).
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (x0, x1, y0, y1) = (self.x_min(), self.x_max(), self.y_min(), self.y_max());
        (x0..x1).flat_map(move |x| (y0..y1).map(move |y| Cell::new(x, y)))
    }
}

/// Axis-aligned span between two cells, used for corridor segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line2D {
    pub start: Cell,
    pub end: Cell,
}

impl Line2D {
    pub fn new(start: Cell, end: Cell) -> Self {
        Self { start, end }
    }

    pub fn is_axis_aligned(&self) -> bool {
        self.start.x == self.end.x || self.start.y == self.end.y
    }
}
