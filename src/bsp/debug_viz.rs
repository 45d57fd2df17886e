// src/bsp/debug_viz.rs

//! Quick looks at a generated layout: a text dump for terminals and logs, and
//! (feature `preview`) a PNG with one square per cell.

use crate::document::DungeonLayout;
use crate::map::ThingKind;
use crate::populate::RoomArchetype;
use crate::utils::Cell;
use std::collections::HashMap;

fn thing_glyph(kind: ThingKind) -> char {
    match kind {
        ThingKind::Boss => 'B',
        ThingKind::Enemy => 'e',
        ThingKind::Obstacle => 'O',
        ThingKind::Decoration => '"',
        ThingKind::Particle => '*',
        ThingKind::Portal => 'P',
    }
}

// Lower wins when two things share a cell.
fn thing_rank(kind: ThingKind) -> u8 {
    match kind {
        ThingKind::Boss => 0,
        ThingKind::Portal => 1,
        ThingKind::Enemy => 2,
        ThingKind::Obstacle => 3,
        ThingKind::Decoration => 4,
        ThingKind::Particle => 5,
    }
}

/// Topmost thing per cell.
fn things_by_cell(layout: &DungeonLayout) -> HashMap<Cell, ThingKind> {
    let mut out: HashMap<Cell, ThingKind> = HashMap::new();
    for thing in &layout.things {
        let entry = out.entry(thing.cell).or_insert(thing.kind);
        if thing_rank(thing.kind) < thing_rank(*entry) {
            *entry = thing.kind;
        }
    }
    out
}

/// Text map, north row first.
///
/// ```text
/// #  wall      .  floor     ,  path      ~  hazard
/// :  outside   B  boss      e  enemy     O  obstacle
/// "  decor     *  particle  P  portal
/// ```
pub fn render_ascii(layout: &DungeonLayout) -> String {
    let layers = &layout.layers;
    let b = layers.bounds();
    let things = things_by_cell(layout);
    let mut out = String::with_capacity(((b.width + 1) * b.height.max(0)) as usize);

    for y in (b.y_min()..b.y_max()).rev() {
        for x in b.x_min()..b.x_max() {
            let cell = Cell::new(x, y);
            let glyph = if let Some(kind) = things.get(&cell) {
                thing_glyph(*kind)
            } else if layers.hazards.contains(cell) {
                '~'
            } else if layers.wall_kinds.contains(cell) {
                '#'
            } else if layers.paths.contains(cell) {
                ','
            } else if layers.floor.contains(cell) {
                '.'
            } else if layers.outside.contains(cell) {
                ':'
            } else {
                ' '
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

const VOID: [u8; 3] = [0, 0, 0];
const OUTSIDE: [u8; 3] = [24, 22, 30];
const FLOOR: [u8; 3] = [120, 116, 108];
const WALL: [u8; 3] = [58, 52, 70];
const PATH: [u8; 3] = [166, 146, 104];
const HAZARD: [u8; 3] = [40, 90, 170];

fn archetype_tint(archetype: RoomArchetype) -> [u8; 3] {
    match archetype {
        RoomArchetype::Combat => [120, 116, 108],
        RoomArchetype::BossArena => [150, 84, 84],
        RoomArchetype::EnvironmentalHazard => [96, 128, 104],
    }
}

fn thing_color(kind: ThingKind) -> [u8; 3] {
    match kind {
        ThingKind::Boss => [230, 30, 30],
        ThingKind::Enemy => [240, 140, 40],
        ThingKind::Obstacle => [70, 60, 50],
        ThingKind::Decoration => [90, 170, 80],
        ThingKind::Particle => [250, 240, 160],
        ThingKind::Portal => [190, 90, 240],
    }
}

/// Colour of one cell before things are drawn.
fn cell_color(layout: &DungeonLayout, cell: Cell, room_tint: &HashMap<Cell, [u8; 3]>) -> [u8; 3] {
    let layers = &layout.layers;
    if layers.hazards.contains(cell) {
        HAZARD
    } else if layers.wall_kinds.contains(cell) {
        WALL
    } else if layers.paths.contains(cell) {
        PATH
    } else if layers.floor.contains(cell) {
        room_tint.get(&cell).copied().unwrap_or(FLOOR)
    } else if layers.outside.contains(cell) {
        OUTSIDE
    } else {
        VOID
    }
}

fn room_tints(layout: &DungeonLayout) -> HashMap<Cell, [u8; 3]> {
    let mut tints = HashMap::new();
    for room in &layout.rooms {
        let tint = archetype_tint(layout.archetype(room.index).unwrap_or(RoomArchetype::Combat));
        for cell in room.rect.cells() {
            tints.insert(cell, tint);
        }
    }
    tints
}

/// Raw RGB rows, north row first, `scale` pixels per cell.
pub fn render_rgb(layout: &DungeonLayout, scale: u32) -> (u32, u32, Vec<u8>) {
    let scale = scale.max(1);
    let b = layout.layers.bounds();
    let (w, h) = (b.width.max(0) as u32, b.height.max(0) as u32);
    let (pw, ph) = (w * scale, h * scale);
    let mut buf = vec![0u8; (pw * ph * 3) as usize];

    let tints = room_tints(layout);
    let things = things_by_cell(layout);
    for row in 0..h {
        let y = b.y_max() - 1 - row as i32;
        for col in 0..w {
            let cell = Cell::new(b.x_min() + col as i32, y);
            let color = match things.get(&cell) {
                Some(kind) => thing_color(*kind),
                None => cell_color(layout, cell, &tints),
            };
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = col * scale + dx;
                    let py = row * scale + dy;
                    let i = ((py * pw + px) * 3) as usize;
                    buf[i..i + 3].copy_from_slice(&color);
                }
            }
        }
    }
    (pw, ph, buf)
}

#[cfg(feature = "preview")]
pub fn render_png(layout: &DungeonLayout, scale: u32) -> image::RgbImage {
    use image::{ImageBuffer, Rgb};

    let (w, h, buf) = render_rgb(layout, scale);
    ImageBuffer::from_raw(w, h, buf).unwrap_or_else(|| ImageBuffer::from_pixel(w, h, Rgb(VOID)))
}

#[cfg(feature = "preview")]
pub fn save_png<P: AsRef<std::path::Path>>(layout: &DungeonLayout, path: P, scale: u32) -> crate::error::Result<()> {
    let img = render_png(layout, scale);
    img.save(path.as_ref())?;
    log::info!("Preview written to {}", path.as_ref().display());
    Ok(())
}
