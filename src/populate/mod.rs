// src/populate/mod.rs

//! Room population: archetype selection, the populator trait and the helpers
//! the three archetypes share.

pub mod boss;
pub mod combat;
pub mod decor;
pub mod hazard;
pub mod paths;

pub use boss::{BossArenaPopulator, BossSettings};
pub use combat::{CombatRoomPopulator, CombatSettings};
pub use hazard::{EnvironmentalHazardPopulator, HazardSettings};

use crate::error::Result;
use crate::map::{Room, Thing, TileLayers};
use crate::theme::{Prefab, Theme};
use crate::utils::{Cell, DungeonRng, Point2D, RectI};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomArchetype {
    Combat,
    BossArena,
    EnvironmentalHazard,
}

impl fmt::Display for RoomArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomArchetype::Combat => "combat",
            RoomArchetype::BossArena => "boss arena",
            RoomArchetype::EnvironmentalHazard => "environmental hazard",
        };
        f.write_str(name)
    }
}

/// Cells claimed by obstacles, enemies, bosses, decoration and lakes.
/// Shared by every room of a pass.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    cells: HashSet<Cell>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        !self.cells.contains(&cell)
    }

    /// Returns `false` if the cell was already taken.
    pub fn claim(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    /// Claims every cell or none of them.
    pub fn claim_all(&mut self, cells: &[Cell]) -> bool {
        if cells.iter().any(|c| !self.is_free(*c)) {
            return false;
        }
        self.cells.extend(cells.iter().copied());
        true
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Counts of what a populator placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateReport {
    pub obstacles: usize,
    pub enemies: usize,
    pub bosses: usize,
    pub decorations: usize,
    pub particles: usize,
    pub path_cells: usize,
    pub hazard_cells: usize,
    /// Spawns skipped for a missing prefab or an exhausted attempt budget.
    pub skipped: usize,
}

impl AddAssign for PopulateReport {
    fn add_assign(&mut self, rhs: Self) {
        self.obstacles += rhs.obstacles;
        self.enemies += rhs.enemies;
        self.bosses += rhs.bosses;
        self.decorations += rhs.decorations;
        self.particles += rhs.particles;
        self.path_cells += rhs.path_cells;
        self.hazard_cells += rhs.hazard_cells;
        self.skipped += rhs.skipped;
    }
}

/// Everything a populator may read or write while filling one room.
pub struct PopulateContext<'a> {
    pub theme: &'a Theme,
    pub rng: &'a mut DungeonRng,
    pub layers: &'a mut TileLayers,
    pub things: &'a mut Vec<Thing>,
    pub occupancy: &'a mut Occupancy,
}

impl PopulateContext<'_> {
    /// Random entry of `list`. Empty lists and `null` entries yield `None`.
    pub fn pick_prefab(&mut self, list: &[Option<Prefab>], what: &str) -> Option<Prefab> {
        match self.rng.pick(list) {
            Some(Some(prefab)) => Some(prefab.clone()),
            Some(None) => {
                warn!("Null {} prefab in theme '{}'; spawn skipped", what, self.theme.name);
                None
            }
            None => None,
        }
    }

    /// Records `thing`, claiming its footprint when its kind occupies cells.
    /// Fails (and records nothing) if any footprint cell is taken.
    pub fn spawn(&mut self, thing: Thing) -> bool {
        if thing.kind.occupies() && !self.occupancy.claim_all(&thing.footprint) {
            return false;
        }
        debug!("Spawned {} '{}' at {:?}", thing.name, thing.prefab, thing.cell);
        self.things.push(thing);
        true
    }

    /// Repaints the room's floor with the main tile and `variation` chance of a
    /// variant per cell.
    pub fn paint_floor(&mut self, rect: &RectI, variation: f64) {
        for cell in rect.cells() {
            if let Some(tile) = self.theme.floor.pick(variation, self.rng) {
                self.layers.floor.set(cell, tile);
            }
        }
    }
}

/// A content strategy for one archetype.
pub trait RoomPopulator {
    fn archetype(&self) -> RoomArchetype;
    fn populate(&self, room: &Room, ctx: &mut PopulateContext<'_>) -> Result<PopulateReport>;
}

/// Maps room indices to archetypes and routes each room to its populator.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeDispatcher {
    pub boss_room: Option<usize>,
    pub extra_boss_rooms: BTreeSet<usize>,
    pub hazard_rooms: BTreeSet<usize>,
    pub combat: CombatRoomPopulator,
    pub boss: BossArenaPopulator,
    pub hazard: EnvironmentalHazardPopulator,
}

impl ArchetypeDispatcher {
    pub fn select_archetype(&self, index: usize) -> RoomArchetype {
        if self.boss_room == Some(index) || self.extra_boss_rooms.contains(&index) {
            RoomArchetype::BossArena
        } else if self.hazard_rooms.contains(&index) {
            RoomArchetype::EnvironmentalHazard
        } else {
            RoomArchetype::Combat
        }
    }

    pub fn populator(&self, archetype: RoomArchetype) -> &dyn RoomPopulator {
        match archetype {
            RoomArchetype::Combat => &self.combat,
            RoomArchetype::BossArena => &self.boss,
            RoomArchetype::EnvironmentalHazard => &self.hazard,
        }
    }

    pub fn populate_room(&self, room: &Room, ctx: &mut PopulateContext<'_>) -> Result<(RoomArchetype, PopulateReport)> {
        let archetype = self.select_archetype(room.index);
        debug!("Room {} archetype: {}", room.index, archetype);
        let report = self.populator(archetype).populate(room, ctx)?;
        Ok((archetype, report))
    }
}

/// Random point inside `rect` shrunk by `margin`, nudged onto cell centres.
pub fn random_position(rect: &RectI, margin: f64, rng: &mut DungeonRng) -> Point2D {
    let min_x = rect.x_min() as f64 + margin;
    let min_y = rect.y_min() as f64 + margin;
    let mut max_x = rect.x_max() as f64 - margin;
    let mut max_y = rect.y_max() as f64 - margin;
    if max_x <= min_x {
        max_x = min_x + 1.0;
    }
    if max_y <= min_y {
        max_y = min_y + 1.0;
    }
    let x = rng.lerp(min_x, max_x);
    let y = rng.lerp(min_y, max_y);
    Point2D::new(x + 0.5, y + 0.5)
}

/// Square of side `2 * radius + 1` centred on `cell`.
pub fn footprint(cell: Cell, radius: u8) -> Vec<Cell> {
    let r = radius as i32;
    RectI::new(cell.x - r, cell.y - r, 2 * r + 1, 2 * r + 1).cells().collect()
}

/// Nearest free, dry cell of `rect` to its centre, searching outward ring by
/// ring (Chebyshev distance). Within a ring the Euclidean-closest cell wins.
pub fn find_safe_spawn(rect: &RectI, occupancy: &Occupancy, layers: &TileLayers) -> Option<Cell> {
    let center = rect.center();
    let max_ring = rect.width.max(rect.height);
    for ring in 0..=max_ring {
        let mut best: Option<Cell> = None;
        for dx in -ring..=ring {
            for dy in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let cell = center.offset(dx, dy);
                if !rect.contains(cell) || !occupancy.is_free(cell) || layers.hazards.contains(cell) {
                    continue;
                }
                if best.map_or(true, |b| cell.distance_sq(&center) < b.distance_sq(&center)) {
                    best = Some(cell);
                }
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}
