// src/document/validate.rs

//! Structural checks over a finished layout. Used by tests and by the CLI's
//! batch mode to catch regressions across many seeds.

use crate::document::DungeonLayout;
use crate::map::ThingKind;
use crate::populate::RoomArchetype;
use crate::utils::Cell;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutViolation {
    #[error("connection graph does not reach every room")]
    Disconnected,

    #[error("spanning tree has {found} edges, expected {expected}")]
    TreeSize { expected: usize, found: usize },

    #[error("extra edge {a}-{b} closes a triangle")]
    TriangleEdge { a: usize, b: usize },

    #[error("rooms {a} and {b} overlap")]
    Overlap { a: usize, b: usize },

    #[error("room {room} leaves its partition leaf")]
    OutsideLeaf { room: usize },

    #[error("boundary floor cell {cell:?} has no wall")]
    OpenWall { cell: Cell },

    #[error("cell {cell:?} claimed by both '{first}' and '{second}'")]
    SharedCell { cell: Cell, first: String, second: String },

    #[error("room {room} has two portal openings on cell {cell:?}")]
    StackedPortal { room: usize, cell: Cell },

    #[error("boss room is {found:?}")]
    BadBossRoom { found: Option<usize> },

    #[error("room {room} holds {count} bosses")]
    BossCount { room: usize, count: usize },
}

/// Every violation found, in check order. Empty means the layout is sound.
pub fn check_layout(layout: &DungeonLayout) -> Vec<LayoutViolation> {
    let mut out = Vec::new();
    check_graph(layout, &mut out);
    check_rooms(layout, &mut out);
    if layout.walled {
        check_walls(layout, &mut out);
    }
    check_occupancy(layout, &mut out);
    check_portals(layout, &mut out);
    check_bosses(layout, &mut out);
    out
}

fn check_graph(layout: &DungeonLayout, out: &mut Vec<LayoutViolation>) {
    let n = layout.rooms.len();
    if !layout.graph.is_connected() {
        out.push(LayoutViolation::Disconnected);
    }
    let expected = n.saturating_sub(1);
    if layout.graph.tree.len() != expected {
        out.push(LayoutViolation::TreeSize {
            expected,
            found: layout.graph.tree.len(),
        });
    }

    let mut adjacency: Vec<HashSet<usize>> = vec![HashSet::new(); n];
    for e in layout.graph.all_edges() {
        if e.a < n && e.b < n {
            adjacency[e.a].insert(e.b);
            adjacency[e.b].insert(e.a);
        }
    }
    for e in &layout.graph.extra {
        if e.a >= n || e.b >= n {
            continue;
        }
        if adjacency[e.a].intersection(&adjacency[e.b]).next().is_some() {
            out.push(LayoutViolation::TriangleEdge { a: e.a, b: e.b });
        }
    }
}

fn check_rooms(layout: &DungeonLayout, out: &mut Vec<LayoutViolation>) {
    for (i, a) in layout.rooms.iter().enumerate() {
        if !a.leaf.contains_rect(&a.rect) {
            out.push(LayoutViolation::OutsideLeaf { room: a.index });
        }
        for b in layout.rooms.iter().skip(i + 1) {
            if a.rect.intersects(&b.rect) {
                out.push(LayoutViolation::Overlap { a: a.index, b: b.index });
            }
        }
    }
}

fn check_walls(layout: &DungeonLayout, out: &mut Vec<LayoutViolation>) {
    let openings: HashSet<Cell> = layout.portal_openings.iter().copied().collect();
    let floor = &layout.layers.floor;
    for (cell, _) in floor.iter() {
        if openings.contains(&cell) {
            continue;
        }
        let boundary = [(0, 1), (0, -1), (1, 0), (-1, 0)]
            .iter()
            .any(|(dx, dy)| !floor.contains(cell.offset(*dx, *dy)));
        if boundary && !layout.layers.wall_kinds.contains(cell) {
            out.push(LayoutViolation::OpenWall { cell });
        }
    }
}

fn check_occupancy(layout: &DungeonLayout, out: &mut Vec<LayoutViolation>) {
    let mut owner: HashMap<Cell, &str> = HashMap::new();
    for thing in layout.things.iter().filter(|t| t.kind.occupies()) {
        for cell in &thing.footprint {
            if let Some(first) = owner.insert(*cell, &thing.name) {
                out.push(LayoutViolation::SharedCell {
                    cell: *cell,
                    first: first.to_string(),
                    second: thing.name.clone(),
                });
            }
        }
    }
}

fn check_portals(layout: &DungeonLayout, out: &mut Vec<LayoutViolation>) {
    for room in &layout.rooms {
        let mut cut = HashSet::new();
        for portal in &room.portals {
            let (tx, ty) = portal.wall_side.tangent();
            for cell in [portal.cell, portal.cell.offset(tx, ty)] {
                if !cut.insert(cell) {
                    out.push(LayoutViolation::StackedPortal { room: room.index, cell });
                }
            }
        }
    }
}

fn check_bosses(layout: &DungeonLayout, out: &mut Vec<LayoutViolation>) {
    let n = layout.rooms.len();
    let expected_some = n >= 2;
    let valid = match layout.boss_room {
        Some(i) => expected_some && i >= 1 && i < n && layout.archetype(i) == Some(RoomArchetype::BossArena),
        None => !expected_some,
    };
    if !valid {
        out.push(LayoutViolation::BadBossRoom {
            found: layout.boss_room,
        });
    }

    for room in &layout.rooms {
        let count = layout
            .things_in_room(room.index)
            .filter(|t| t.kind == ThingKind::Boss)
            .count();
        if count > 1 {
            out.push(LayoutViolation::BossCount {
                room: room.index,
                count,
            });
        }
    }
}
