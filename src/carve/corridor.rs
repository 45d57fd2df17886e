// src/carve/corridor.rs

use crate::carve::FloorCells;
use crate::utils::{Cell, DungeonRng, Line2D};

/// Paints open corridors between room centres.
#[derive(Debug, Clone, Copy)]
pub struct CorridorCarver {
    pub width: i32,
    /// L-shaped corridors; otherwise straight segments split at `(to.x, from.y)`.
    pub manhattan: bool,
}

impl CorridorCarver {
    pub fn new(width: i32, manhattan: bool) -> Self {
        CorridorCarver {
            width: width.max(1),
            manhattan,
        }
    }

    /// Carves `from -> to` into `floor` and returns the axis-aligned segments.
    pub fn carve(&self, from: Cell, to: Cell, floor: &mut FloorCells, rng: &mut DungeonRng) -> Vec<Line2D> {
        let mut segments = Vec::new();
        if self.manhattan {
            let horizontal_first = rng.coin_flip();
            let pivot = if horizontal_first {
                Cell::new(to.x, from.y)
            } else {
                Cell::new(from.x, to.y)
            };
            self.paint_line(from, pivot, floor, &mut segments);
            self.paint_line(pivot, to, floor, &mut segments);
        } else {
            self.paint_line(from, to, floor, &mut segments);
        }
        segments
    }

    fn paint_line(&self, from: Cell, to: Cell, floor: &mut FloorCells, segments: &mut Vec<Line2D>) {
        if from.x != to.x && from.y != to.y {
            let pivot = Cell::new(to.x, from.y);
            self.paint_line(from, pivot, floor, segments);
            self.paint_line(pivot, to, floor, segments);
            return;
        }

        let before = (self.width - 1) / 2;
        let after = self.width / 2;
        let (x_min, x_max) = (from.x.min(to.x), from.x.max(to.x));
        let (y_min, y_max) = (from.y.min(to.y), from.y.max(to.y));

        for x in (x_min - before)..=(x_max + after) {
            for y in (y_min - before)..=(y_max + after) {
                floor.insert(Cell::new(x, y));
            }
        }
        segments.push(Line2D::new(from, to));
    }
}
