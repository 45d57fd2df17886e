// src/document/document.rs

use crate::bsp::bsp_graph::ConnectionGraph;
use crate::bsp::bsp_procedural::GenerationStats;
use crate::bsp::debug_viz;
use crate::carve::CarveMode;
use crate::error::Result;
use crate::map::{Direction, DoorMask, Room, Thing, ThingKind, TileLayers};
use crate::populate::{PopulateReport, RoomArchetype};
use crate::utils::{Cell, Line2D, RectI};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which tile layer to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Floor,
    Walls,
    Paths,
    Hazards,
    Outside,
}

/// What the narrative layer needs to know about one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBrief {
    pub index: usize,
    pub archetype: RoomArchetype,
    pub is_start: bool,
    pub is_boss: bool,
    /// Directions towards connected rooms, in N, E, S, W order.
    pub directions: Vec<Direction>,
    pub door_mask: DoorMask,
}

/// The emitted document of one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub seed: u64,
    /// Map bounds handed to the partitioner.
    pub bounds: RectI,
    /// Bounds of the tile layers: floor extent plus outside padding.
    pub fill_bounds: RectI,
    pub carve_mode: CarveMode,
    /// Whether walls were classified for this layout.
    pub walled: bool,

    pub layers: TileLayers,
    pub rooms: Vec<Room>,
    pub graph: ConnectionGraph,
    pub corridors: Vec<Line2D>,
    pub archetypes: Vec<RoomArchetype>,
    pub boss_room: Option<usize>,
    pub things: Vec<Thing>,
    /// Wall cells cleared for portals.
    pub portal_openings: Vec<Cell>,

    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,

    pub room_reports: Vec<PopulateReport>,
    pub stats: GenerationStats,
}

impl DungeonLayout {
    pub fn room(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    pub fn start_room(&self) -> Option<&Room> {
        self.rooms.first()
    }

    pub fn boss(&self) -> Option<&Room> {
        self.boss_room.and_then(|i| self.rooms.get(i))
    }

    pub fn archetype(&self, index: usize) -> Option<RoomArchetype> {
        self.archetypes.get(index).copied()
    }

    pub fn things_in_room(&self, room: usize) -> impl Iterator<Item = &Thing> + '_ {
        self.things.iter().filter(move |t| t.room == room)
    }

    pub fn num_things(&self, kind: ThingKind) -> usize {
        self.things.iter().filter(|t| t.kind == kind).count()
    }

    pub fn num_cells(&self, layer: LayerKind) -> usize {
        match layer {
            LayerKind::Floor => self.layers.floor.count(),
            LayerKind::Walls => self.layers.walls.count(),
            LayerKind::Paths => self.layers.paths.count(),
            LayerKind::Hazards => self.layers.hazards.count(),
            LayerKind::Outside => self.layers.outside.count(),
        }
    }

    pub fn is_floor(&self, cell: Cell) -> bool {
        self.layers.floor.contains(cell)
    }

    /// Indices of rooms joined to `room` by a tree or extra edge.
    pub fn neighbors(&self, room: usize) -> Vec<usize> {
        self.graph.neighbors(room)
    }

    /// Per-room summaries. Directions come from the dominant axis between room
    /// centres, which is also the wall side a portal would use.
    pub fn briefs(&self) -> Vec<RoomBrief> {
        self.rooms
            .iter()
            .map(|room| {
                let mut mask = DoorMask::NONE;
                for other in self.graph.neighbors(room.index) {
                    if let Some(o) = self.rooms.get(other) {
                        mask = mask.with(Direction::dominant(room.center(), o.center()));
                    }
                }
                RoomBrief {
                    index: room.index,
                    archetype: self.archetype(room.index).unwrap_or(RoomArchetype::Combat),
                    is_start: room.index == 0,
                    is_boss: self.boss_room == Some(room.index),
                    directions: mask.directions(),
                    door_mask: mask,
                }
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_ascii(&self) -> String {
        debug_viz::render_ascii(self)
    }
}
