// src/map/thing.rs
use crate::utils::{Cell, Point2D, RectI};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThingKind {
    Obstacle,
    Enemy,
    Boss,
    Decoration,
    Particle,
    Portal,
}

impl ThingKind {
    /// Whether this kind claims its cell in the occupancy set.
    pub fn occupies(self) -> bool {
        matches!(
            self,
            ThingKind::Obstacle | ThingKind::Enemy | ThingKind::Boss | ThingKind::Decoration
        )
    }
}

/// Which parent the instantiation layer should attach the object to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThingGroup {
    Objects,
    Enemies,
}

/// An object placed by the generator, to be instantiated by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    pub kind: ThingKind,
    pub prefab: String,
    pub room: usize,
    pub cell: Cell,
    pub position: Point2D,
    pub rotation: f32,
    pub group: ThingGroup,
    pub name: String,
    /// Arena bounds handed to a boss.
    pub arena: Option<RectI>,
    /// Cells claimed by this thing (footprint for obstacles).
    pub footprint: Vec<Cell>,
}

impl Thing {
    pub fn new(kind: ThingKind, prefab: &str, room: usize, cell: Cell, name: String) -> Self {
        let group = match kind {
            ThingKind::Enemy | ThingKind::Boss => ThingGroup::Enemies,
            _ => ThingGroup::Objects,
        };
        Thing {
            kind,
            prefab: prefab.to_string(),
            room,
            cell,
            position: cell.world_center(),
            rotation: 0.0,
            group,
            name,
            arena: None,
            footprint: vec![cell],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_follow_kind() {
        let boss = Thing::new(ThingKind::Boss, "ogre", 2, Cell::new(0, 0), "Boss_2".into());
        let rock = Thing::new(ThingKind::Obstacle, "rock", 1, Cell::new(1, 1), "Obstacle_1_0".into());
        assert_eq!(boss.group, ThingGroup::Enemies);
        assert_eq!(rock.group, ThingGroup::Objects);
        assert_eq!(boss.position, Point2D::new(0.5, 0.5));
    }

    #[test]
    fn test_particles_do_not_occupy() {
        assert!(!ThingKind::Particle.occupies());
        assert!(!ThingKind::Portal.occupies());
        assert!(ThingKind::Decoration.occupies());
    }
}
