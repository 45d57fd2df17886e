// src/map/room.rs

use crate::map::Direction;
use crate::utils::{Cell, Point2D, RectI};
use serde::{Deserialize, Serialize};

/// One side of a discrete connector between two rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalInfo {
    /// Index of the room on the other side.
    pub other_room: usize,
    /// Wall cell the opening starts at.
    pub cell: Cell,
    pub world_position: Point2D,
    pub wall_side: Direction,
}

/// A placed room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub index: usize,
    pub rect: RectI,
    /// Bounds of the partition leaf hosting this room.
    pub leaf: RectI,
    pub portals: Vec<PortalInfo>,
    pub safe_spawn_cell: Option<Cell>,
}

impl Room {
    pub fn new(index: usize, rect: RectI, leaf: RectI) -> Self {
        Room {
            index,
            rect,
            leaf,
            portals: Vec::new(),
            safe_spawn_cell: None,
        }
    }

    pub fn center(&self) -> Cell {
        self.rect.center()
    }

    /// Cells of this room's portals, for seeding paths.
    pub fn portal_cells(&self) -> Vec<Cell> {
        self.portals.iter().map(|p| p.cell).collect()
    }

    pub fn connects_to(&self, other: usize) -> bool {
        self.portals.iter().any(|p| p.other_room == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_center_and_portals() {
        let mut room = Room::new(0, RectI::new(10, 10, 8, 6), RectI::new(8, 8, 14, 12));
        assert_eq!(room.center(), Cell::new(14, 13));
        assert!(room.portal_cells().is_empty());

        room.portals.push(PortalInfo {
            other_room: 3,
            cell: Cell::new(17, 13),
            world_position: Point2D::new(18.0, 13.5),
            wall_side: Direction::East,
        });
        assert!(room.connects_to(3));
        assert!(!room.connects_to(2));
        assert_eq!(room.portal_cells(), vec![Cell::new(17, 13)]);
    }
}
