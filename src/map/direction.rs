// src/map/direction.rs

use crate::utils::Cell;
use serde::{Deserialize, Serialize};

/// Cardinal wall side / connection direction. North is +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit step as `(dx, dy)`.
    pub fn to_vector(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Unit step along the wall, perpendicular to `to_vector`.
    pub fn tangent(self) -> (i32, i32) {
        match self {
            Direction::North | Direction::South => (1, 0),
            Direction::East | Direction::West => (0, 1),
        }
    }

    /// Rotation of a connector facing this way, in degrees (east = 0).
    pub fn rotation_degrees(self) -> f32 {
        match self {
            Direction::North => 90.0,
            Direction::South => -90.0,
            Direction::East => 0.0,
            Direction::West => 180.0,
        }
    }

    /// Dominant direction from `from` towards `to`. Ties go to the horizontal axis.
    pub fn dominant(from: Cell, to: Cell) -> Direction {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx.abs() >= dy.abs() {
            if dx >= 0 {
                Direction::East
            } else {
                Direction::West
            }
        } else if dy > 0 {
            Direction::North
        } else {
            Direction::South
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::North => 1 << 0,
            Direction::East => 1 << 1,
            Direction::South => 1 << 2,
            Direction::West => 1 << 3,
        }
    }
}

/// Set of directions a room connects towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DoorMask(u8);

impl DoorMask {
    pub const NONE: DoorMask = DoorMask(0);
    pub const ALL: DoorMask = DoorMask(0b1111);

    pub fn has(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub fn with(self, dir: Direction) -> DoorMask {
        DoorMask(self.0 | dir.bit())
    }

    pub fn directions(self) -> Vec<Direction> {
        Direction::ALL.iter().copied().filter(|d| self.has(*d)).collect()
    }
}

impl FromIterator<Direction> for DoorMask {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter().fold(DoorMask::NONE, |m, d| m.with(d))
    }
}
