// src/carve/mod.rs
pub mod corridor;
pub mod portal;
pub mod walls;

pub use corridor::CorridorCarver;
pub use portal::{PortalCarver, PortalPlan, PortalSide};
pub use walls::{classify_cell, fill_outside, place_walls};

use crate::utils::{Cell, RectI};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How connections between rooms are realised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarveMode {
    /// Open floor corridors between room centres.
    #[default]
    Corridor,
    /// Paired wall openings with short stubs; rooms stay separate.
    Portal,
}

impl std::str::FromStr for CarveMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "corridor" | "corridors" => Ok(CarveMode::Corridor),
            "portal" | "portals" => Ok(CarveMode::Portal),
            other => Err(format!("unknown carve mode '{}'", other)),
        }
    }
}

/// Every walkable cell of the layout, kept ordered so that passes over it are
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloorCells {
    cells: BTreeSet<Cell>,
}

impl FloorCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    pub fn insert_rect(&mut self, rect: &RectI) {
        self.cells.extend(rect.cells());
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Bounding rectangle of all floor cells.
    pub fn bounds(&self) -> Option<RectI> {
        RectI::bounding(self.iter())
    }

    /// Floor cells with at least one non-floor orthogonal neighbour.
    pub fn boundary(&self) -> impl Iterator<Item = Cell> + '_ {
        self.iter().filter(move |c| {
            [(0, 1), (0, -1), (1, 0), (-1, 0)]
                .iter()
                .any(|(dx, dy)| !self.contains(c.offset(*dx, *dy)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carve_mode_parsing() {
        assert_eq!("Portal".parse::<CarveMode>(), Ok(CarveMode::Portal));
        assert_eq!("corridor".parse::<CarveMode>(), Ok(CarveMode::Corridor));
        assert!("tunnel".parse::<CarveMode>().is_err());
        let json = serde_json::to_string(&CarveMode::Portal).unwrap();
        assert_eq!(json, "\"portal\"");
    }

    #[test]
    fn test_floor_cells_bounds_and_boundary() {
        let mut floor = FloorCells::new();
        floor.insert_rect(&RectI::new(0, 0, 3, 3));
        assert_eq!(floor.len(), 9);
        assert_eq!(floor.bounds(), Some(RectI::new(0, 0, 3, 3)));
        let boundary: Vec<Cell> = floor.boundary().collect();
        assert_eq!(boundary.len(), 8);
        assert!(!boundary.contains(&Cell::new(1, 1)));
    }
}
