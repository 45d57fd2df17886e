// src/carve/portal.rs

use crate::bsp::bsp_graph::Edge;
use crate::carve::FloorCells;
use crate::map::{Direction, PortalInfo, Room, Thing, ThingKind, TileLayers, WallTile};
use crate::theme::Theme;
use crate::utils::{Cell, Point2D, RectI};
use log::{debug, error, warn};
use std::collections::HashMap;

/// One room's half of a portal connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalSide {
    pub room: usize,
    pub other: usize,
    pub side: Direction,
    /// First opening cell, on the room's border ring.
    pub attach: Cell,
}

impl PortalSide {
    fn step(&self, along: i32, out: i32) -> Cell {
        let (nx, ny) = self.side.to_vector();
        let (tx, ty) = self.side.tangent();
        self.attach.offset(tx * along + nx * out, ty * along + ny * out)
    }

    /// The two wall cells removed for the opening.
    pub fn opening(&self) -> [Cell; 2] {
        [self.attach, self.step(1, 0)]
    }

    /// Centre of the opening, pushed half a cell outward onto the wall face.
    pub fn world_position(&self) -> Point2D {
        let (nx, ny) = self.side.to_vector();
        let (tx, ty) = self.side.tangent();
        let c = self.attach.world_center();
        Point2D::new(
            c.x + 0.5 * tx as f64 + 0.5 * nx as f64,
            c.y + 0.5 * ty as f64 + 0.5 * ny as f64,
        )
    }

    /// Cells either side of the opening, at the wall row and the first stub row,
    /// paired with whether they sit on the positive tangent side.
    pub fn jambs(&self) -> [(Cell, bool); 4] {
        [
            (self.step(-1, 0), false),
            (self.step(-1, 1), false),
            (self.step(2, 0), true),
            (self.step(2, 1), true),
        ]
    }
}

/// Both halves of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalPlan {
    pub a: PortalSide,
    pub b: PortalSide,
}

/// Cells along the wall one opening needs: a jamb, the two opening cells and
/// the other jamb.
pub const SLOT_WIDTH: i32 = 4;

/// First tangent coordinate of the border on `side` and the border length.
fn wall_span(rect: &RectI, side: Direction) -> (i32, i32) {
    match side {
        Direction::North | Direction::South => (rect.x, rect.width),
        Direction::East | Direction::West => (rect.y, rect.height),
    }
}

/// Border cell on `side` at tangent coordinate `t`.
fn border_cell(rect: &RectI, side: Direction, t: i32) -> Cell {
    match side {
        Direction::North => Cell::new(t, rect.y_max() - 1),
        Direction::South => Cell::new(t, rect.y_min()),
        Direction::East => Cell::new(rect.x_max() - 1, t),
        Direction::West => Cell::new(rect.x_min(), t),
    }
}

/// Midpoint cell of a room's border on `side` (lower/left of two midpoints).
pub fn attach_cell(rect: &RectI, side: Direction) -> Cell {
    let (start, len) = wall_span(rect, side);
    border_cell(rect, side, start + (len - 1) / 2)
}

/// Openings a wall holds with every jamb off the corner cells (`inset`), or
/// with jambs allowed on the corners.
fn wall_capacity(rect: &RectI, side: Direction, inset: bool) -> usize {
    let (_, len) = wall_span(rect, side);
    let usable = if inset { len - 2 } else { len };
    (usable / SLOT_WIDTH).max(0) as usize
}

/// Tangent coordinates of `count` attach cells on a wall starting at `start`.
/// A single opening sits at the midpoint; several are spread evenly, inset
/// from the corners when they fit. Openings beyond what the wall holds reuse
/// the midpoint.
fn spread(start: i32, len: i32, count: usize) -> Vec<i32> {
    let mid = start + (len - 1) / 2;
    if count <= 1 {
        return vec![mid; count];
    }
    let wanted = count as i32 * SLOT_WIDTH;
    let (first, span) = if wanted <= len - 2 { (start + 1, len - 2) } else { (start, len) };
    let fits = (count as i32).min(span / SLOT_WIDTH).max(1);
    let free = span - fits * SLOT_WIDTH;

    let mut out: Vec<i32> = (0..fits)
        .map(|i| first + 1 + i * SLOT_WIDTH + free * (i + 1) / (fits + 1))
        .collect();
    out.resize(count, mid);
    out
}

/// Wall sides to try for a connection from `from` towards `to`: the dominant
/// side, then the perpendicular side facing `to`, the other perpendicular,
/// and the back wall last.
fn side_order(from: Cell, to: Cell) -> [Direction; 4] {
    let first = Direction::dominant(from, to);
    let (tx, ty) = first.tangent();
    let along = (to.x - from.x) * tx + (to.y - from.y) * ty;
    let (pos, neg) = match first {
        Direction::North | Direction::South => (Direction::East, Direction::West),
        Direction::East | Direction::West => (Direction::North, Direction::South),
    };
    if along >= 0 {
        [first, pos, neg, first.opposite()]
    } else {
        [first, neg, pos, first.opposite()]
    }
}

/// Wall of `room` for its connection to `other`, given the openings each wall
/// already carries.
fn choose_side(room: &Room, other: &Room, load: &HashMap<(usize, Direction), usize>) -> Direction {
    let sides = side_order(room.center(), other.center());
    let free = |side: Direction, inset: bool| {
        load.get(&(room.index, side)).copied().unwrap_or(0) < wall_capacity(&room.rect, side, inset)
    };
    let side = [true, false]
        .into_iter()
        .find_map(|inset| sides.iter().copied().find(|&side| free(side, inset)))
        .unwrap_or_else(|| {
            warn!("Room {} has no free wall for room {}; openings overlap", room.index, other.index);
            sides[0]
        });
    if side != sides[0] {
        debug!("Room {} portal to {} moved from {:?} to {:?}", room.index, other.index, sides[0], side);
    }
    side
}

/// One room's end of a connection, waiting for its place on the wall.
#[derive(Debug, Clone, Copy)]
struct Claim {
    plan: usize,
    is_a: bool,
    room: usize,
    other: usize,
    side: Direction,
    rect: RectI,
    /// Partner centre projected onto this wall's tangent.
    toward: i32,
}

fn inner_corner(side: Direction, positive: bool) -> WallTile {
    match (side, positive) {
        (Direction::North, false) => WallTile::InnerTopLeft,
        (Direction::North, true) => WallTile::InnerTopRight,
        (Direction::South, false) => WallTile::InnerBottomLeft,
        (Direction::South, true) => WallTile::InnerBottomRight,
        (Direction::East, false) => WallTile::InnerBottomRight,
        (Direction::East, true) => WallTile::InnerTopRight,
        (Direction::West, false) => WallTile::InnerBottomLeft,
        (Direction::West, true) => WallTile::InnerTopLeft,
    }
}

/// Realises connections as paired wall openings instead of corridors.
#[derive(Debug, Clone, Copy)]
pub struct PortalCarver {
    pub stub_length: i32,
    /// Whether jamb cells get inner-corner wall tiles.
    pub edit_walls: bool,
}

impl PortalCarver {
    pub fn new(stub_length: i32) -> Self {
        PortalCarver {
            stub_length: stub_length.max(1),
            edit_walls: true,
        }
    }

    pub fn with_walls(mut self, edit_walls: bool) -> Self {
        self.edit_walls = edit_walls;
        self
    }

    /// Plans a single connection. Same as `plan_all` over one edge.
    pub fn plan(&self, rooms: &[Room], edge: &Edge) -> Option<PortalPlan> {
        self.plan_all(rooms, std::slice::from_ref(edge)).pop()
    }

    /// Plans every connection at once so openings that share a wall can be
    /// spread along it. Each end takes the dominant side towards its partner
    /// unless that wall is full, then the perpendicular wall facing the
    /// partner, the other perpendicular and the back wall. Walls fill with
    /// inset openings first; jambs on corners are allowed only once no wall of
    /// the room has inset room left. Edges naming a missing room are skipped.
    pub fn plan_all(&self, rooms: &[Room], edges: &[Edge]) -> Vec<PortalPlan> {
        let pairs: Vec<(&Room, &Room)> = edges
            .iter()
            .filter_map(|edge| match (rooms.get(edge.a), rooms.get(edge.b)) {
                (Some(ra), Some(rb)) => Some((ra, rb)),
                _ => {
                    error!("Edge {}-{} references a missing room", edge.a, edge.b);
                    None
                }
            })
            .collect();

        let mut load: HashMap<(usize, Direction), usize> = HashMap::new();
        let mut claims = Vec::with_capacity(pairs.len() * 2);
        for (plan, (ra, rb)) in pairs.iter().enumerate() {
            for (is_a, room, other) in [(true, *ra, *rb), (false, *rb, *ra)] {
                let side = choose_side(room, other, &load);
                *load.entry((room.index, side)).or_insert(0) += 1;
                let (tx, ty) = side.tangent();
                let to = other.center();
                claims.push(Claim {
                    plan,
                    is_a,
                    room: room.index,
                    other: other.index,
                    side,
                    rect: room.rect,
                    toward: to.x * tx + to.y * ty,
                });
            }
        }

        // Lay out each wall's openings, ordered along the wall by partner.
        let mut walls: HashMap<(usize, Direction), Vec<usize>> = HashMap::new();
        for (i, claim) in claims.iter().enumerate() {
            walls.entry((claim.room, claim.side)).or_default().push(i);
        }
        let mut ends: Vec<[Option<PortalSide>; 2]> = vec![[None, None]; pairs.len()];
        for ((_, side), mut members) in walls {
            let rect = claims[members[0]].rect;
            members.sort_by_key(|&i| (claims[i].toward, i));
            let (start, len) = wall_span(&rect, side);
            for (&i, t) in members.iter().zip(spread(start, len, members.len())) {
                let claim = claims[i];
                ends[claim.plan][usize::from(!claim.is_a)] = Some(PortalSide {
                    room: claim.room,
                    other: claim.other,
                    side: claim.side,
                    attach: border_cell(&rect, side, t),
                });
            }
        }

        ends.into_iter()
            .filter_map(|[a, b]| Some(PortalPlan { a: a?, b: b? }))
            .collect()
    }

    /// Pre-carves the floor stub outside one opening: tangent offsets -1..=2,
    /// `stub_length` rows outward.
    pub fn carve_stub(&self, side: &PortalSide, floor: &mut FloorCells) {
        for out in 1..=self.stub_length {
            for along in -1..=2 {
                floor.insert(side.step(along, out));
            }
        }
    }

    pub fn carve_stubs(&self, plan: &PortalPlan, floor: &mut FloorCells) {
        self.carve_stub(&plan.a, floor);
        self.carve_stub(&plan.b, floor);
    }

    /// Opens the wall on both sides, fixes the jamb tiles and records the
    /// portal on both rooms. Returns the cleared opening cells.
    pub fn place(
        &self,
        plan: &PortalPlan,
        rooms: &mut [Room],
        layers: &mut TileLayers,
        theme: &Theme,
        things: &mut Vec<Thing>,
    ) -> Vec<Cell> {
        let mut openings = Vec::with_capacity(4);
        for side in [plan.a, plan.b] {
            for cell in side.opening() {
                layers.walls.clear(cell);
                layers.wall_kinds.clear(cell);
                openings.push(cell);
            }

            if self.edit_walls {
                for (cell, positive) in side.jambs() {
                    let kind = inner_corner(side.side, positive);
                    layers.wall_kinds.set(cell, kind);
                    match theme.walls.tile_for(kind) {
                        Some(tile) => {
                            layers.walls.set(cell, tile);
                        }
                        None => {
                            layers.walls.clear(cell);
                        }
                    }
                }
            }

            let info = PortalInfo {
                other_room: side.other,
                cell: side.attach,
                world_position: side.world_position(),
                wall_side: side.side,
            };
            if let Some(room) = rooms.get_mut(side.room) {
                room.portals.push(info);
            }

            if let Some(prefab) = &theme.portal {
                let mut thing = Thing::new(
                    ThingKind::Portal,
                    &prefab.id,
                    side.room,
                    side.attach,
                    format!("Portal_{:?}_to_Room{}", side.side, side.other),
                );
                thing.position = side.world_position();
                thing.rotation = side.side.rotation_degrees();
                thing.footprint = side.opening().to_vec();
                things.push(thing);
            }
        }
        debug!(
            "Portal {}({:?}) <-> {}({:?})",
            plan.a.room, plan.a.side, plan.b.room, plan.b.side
        );
        openings
    }
}
