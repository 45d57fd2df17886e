// src/carve/walls.rs

use crate::carve::FloorCells;
use crate::map::{TileLayers, WallTile};
use crate::theme::{Theme, WallPalette};
use crate::utils::{Cell, DungeonRng, RectI};
use log::{debug, warn};
use std::collections::HashSet;

/// Wall variant for a floor cell from its 8-neighbourhood, or `None` for an
/// interior cell with no missing diagonal.
///
/// Outer corners win over single-side edges, which win over the generic edge.
/// Inner corners are only considered when all four orthogonal neighbours exist;
/// the first missing diagonal that `palette` has a tile for wins, otherwise the
/// first missing diagonal is kept as a bare classification.
pub fn classify_cell(cell: Cell, floor: &FloorCells, palette: &WallPalette, rng: &mut DungeonRng) -> Option<WallTile> {
    let void = |dx: i32, dy: i32| !floor.contains(cell.offset(dx, dy));

    let (n, s, e, w) = (void(0, 1), void(0, -1), void(1, 0), void(-1, 0));

    if n && w && !s && !e {
        return Some(WallTile::CornerTopLeft);
    }
    if n && e && !s && !w {
        return Some(WallTile::CornerTopRight);
    }
    if s && w && !n && !e {
        return Some(WallTile::CornerBottomLeft);
    }
    if s && e && !n && !w {
        return Some(WallTile::CornerBottomRight);
    }

    if n && !s {
        return Some(if rng.coin_flip() { WallTile::TopA } else { WallTile::TopB });
    }
    if s && !n {
        return Some(if rng.coin_flip() {
            WallTile::BottomA
        } else {
            WallTile::BottomB
        });
    }
    if w && !e {
        return Some(WallTile::Left);
    }
    if e && !w {
        return Some(WallTile::Right);
    }
    if n || s || e || w {
        return Some(WallTile::Edge);
    }

    let diagonals = [
        (-1, 1, WallTile::InnerTopLeft),
        (-1, -1, WallTile::InnerBottomLeft),
        (1, -1, WallTile::InnerBottomRight),
        (1, 1, WallTile::InnerTopRight),
    ];
    let missing = || {
        diagonals
            .iter()
            .filter(|(dx, dy, _)| void(*dx, *dy))
            .map(|(_, _, kind)| *kind)
    };
    missing()
        .find(|kind| palette.tile_for(*kind).is_some())
        .or_else(|| missing().next())
}

/// Classifies every floor cell into `layers.wall_kinds` and paints the matching
/// palette tile into `layers.walls`. Returns the number of classified cells.
pub fn place_walls(floor: &FloorCells, layers: &mut TileLayers, palette: &WallPalette, rng: &mut DungeonRng) -> usize {
    let mut missing: HashSet<WallTile> = HashSet::new();
    let mut classified = 0;

    for cell in floor.iter() {
        let kind = match classify_cell(cell, floor, palette, rng) {
            Some(kind) => kind,
            None => continue,
        };
        classified += 1;
        layers.wall_kinds.set(cell, kind);
        match palette.tile_for(kind) {
            Some(tile) => {
                layers.walls.set(cell, tile);
            }
            None => {
                if missing.insert(kind) {
                    warn!("Wall palette has no tile for {:?}; cells keep the classification only", kind);
                }
            }
        }
    }

    debug!("Classified {} wall cells out of {} floor cells", classified, floor.len());
    classified
}

/// Paints every non-floor cell of `fill` with an outside tile.
pub fn fill_outside(
    fill: RectI,
    floor: &FloorCells,
    layers: &mut TileLayers,
    theme: &Theme,
    ground_chance: f64,
    rng: &mut DungeonRng,
) -> usize {
    if theme.outside_tiles.is_empty() {
        debug!("Theme has no outside tiles; filling with ground tiles");
    }
    let mut painted = 0;
    for cell in fill.cells() {
        if floor.contains(cell) {
            continue;
        }
        if let Some(tile) = theme.pick_outside(ground_chance, rng) {
            if layers.outside.set(cell, tile) {
                painted += 1;
            }
        }
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileId;

    fn block(rect: RectI) -> FloorCells {
        let mut floor = FloorCells::new();
        floor.insert_rect(&rect);
        floor
    }

    #[test]
    fn test_room_corners_and_sides() {
        let floor = block(RectI::new(0, 0, 3, 3));
        let palette = WallPalette::default();
        let mut rng = DungeonRng::from_seed(1);
        assert_eq!(classify_cell(Cell::new(0, 2), &floor, &palette, &mut rng), Some(WallTile::CornerTopLeft));
        assert_eq!(classify_cell(Cell::new(2, 2), &floor, &palette, &mut rng), Some(WallTile::CornerTopRight));
        assert_eq!(classify_cell(Cell::new(0, 0), &floor, &palette, &mut rng), Some(WallTile::CornerBottomLeft));
        assert_eq!(classify_cell(Cell::new(2, 0), &floor, &palette, &mut rng), Some(WallTile::CornerBottomRight));
        assert_eq!(classify_cell(Cell::new(0, 1), &floor, &palette, &mut rng), Some(WallTile::Left));
        assert_eq!(classify_cell(Cell::new(2, 1), &floor, &palette, &mut rng), Some(WallTile::Right));
        assert!(matches!(
            classify_cell(Cell::new(1, 2), &floor, &palette, &mut rng),
            Some(WallTile::TopA) | Some(WallTile::TopB)
        ));
        assert!(matches!(
            classify_cell(Cell::new(1, 0), &floor, &palette, &mut rng),
            Some(WallTile::BottomA) | Some(WallTile::BottomB)
        ));
        assert_eq!(classify_cell(Cell::new(1, 1), &floor, &palette, &mut rng), None);
    }

    #[test]
    fn test_thin_corridor_is_generic_edge() {
        let floor = block(RectI::new(0, 0, 5, 1));
        let palette = WallPalette::default();
        let mut rng = DungeonRng::from_seed(1);
        assert_eq!(classify_cell(Cell::new(2, 0), &floor, &palette, &mut rng), Some(WallTile::Edge));
    }

    #[test]
    fn test_inner_corner() {
        let mut floor = FloorCells::new();
        for c in RectI::new(0, 0, 3, 3).cells().filter(|c| *c != Cell::new(0, 2)) {
            floor.insert(c);
        }
        let palette = Theme::default().walls;
        let mut rng = DungeonRng::from_seed(1);
        assert_eq!(classify_cell(Cell::new(1, 1), &floor, &palette, &mut rng), Some(WallTile::InnerTopLeft));
    }

    #[test]
    fn test_inner_corner_falls_through_to_painted_variant() {
        let mut floor = FloorCells::new();
        for c in RectI::new(0, 0, 3, 3)
            .cells()
            .filter(|c| *c != Cell::new(0, 2) && *c != Cell::new(2, 0))
        {
            floor.insert(c);
        }
        let center = Cell::new(1, 1);
        let mut rng = DungeonRng::from_seed(1);

        let full = Theme::default().walls;
        assert_eq!(classify_cell(center, &floor, &full, &mut rng), Some(WallTile::InnerTopLeft));

        let partial = WallPalette {
            inner_top_left: None,
            ..full
        };
        assert_eq!(classify_cell(center, &floor, &partial, &mut rng), Some(WallTile::InnerBottomRight));

        let bare = WallPalette::default();
        assert_eq!(classify_cell(center, &floor, &bare, &mut rng), Some(WallTile::InnerTopLeft));
    }

    #[test]
    fn test_every_boundary_cell_is_classified() {
        let mut floor = block(RectI::new(0, 0, 8, 6));
        floor.insert_rect(&RectI::new(8, 2, 6, 1));
        floor.insert_rect(&RectI::new(14, -3, 5, 9));
        let mut layers = TileLayers::new(RectI::new(-2, -5, 24, 14));
        let mut rng = DungeonRng::from_seed(5);
        place_walls(&floor, &mut layers, &WallPalette::default(), &mut rng);
        for cell in floor.boundary() {
            assert!(layers.wall_kinds.contains(cell), "unclassified boundary cell {:?}", cell);
        }
        // empty palette paints nothing
        assert_eq!(layers.walls.count(), 0);
    }

    #[test]
    fn test_fill_outside_skips_floor() {
        let floor = block(RectI::new(2, 2, 2, 2));
        let fill = RectI::new(0, 0, 6, 6);
        let mut layers = TileLayers::new(fill);
        let mut rng = DungeonRng::from_seed(3);
        let theme = Theme::default();
        let painted = fill_outside(fill, &floor, &mut layers, &theme, 0.3, &mut rng);
        assert_eq!(painted, 32);
        assert!(!layers.outside.contains(Cell::new(2, 2)));
        let tile = layers.outside.get(Cell::new(0, 0)).copied();
        assert!(tile == Some(TileId(30)) || tile == Some(TileId(31)));
    }
}
