// src/populate/paths.rs

use crate::automaton::{self, CaRules};
use crate::map::Room;
use crate::populate::PopulateContext;
use crate::utils::Cell;
use log::{debug, warn};

/// Grows walkable-looking paths out of the room's portals and paints them into
/// the path layer. Occupied cells (lakes included) never become path.
/// Returns the number of path cells painted.
pub fn generate_paths(room: &Room, ctx: &mut PopulateContext<'_>) -> usize {
    let theme = ctx.theme;
    let params = &theme.paths;
    if !params.enabled {
        return 0;
    }
    let path_tile = match theme.path_tile {
        Some(tile) => tile,
        None => {
            warn!("Paths enabled but theme '{}' has no path tile", theme.name);
            return 0;
        }
    };
    if room.portals.is_empty() {
        debug!("Room {} has no portals; no paths", room.index);
        return 0;
    }

    let w = room.rect.width.max(0) as usize;
    let h = room.rect.height.max(0) as usize;
    let origin = Cell::new(room.rect.x, room.rect.y);
    let portals = room.portal_cells();
    let rules = CaRules {
        survive_min: params.survive_min,
        birth_min: params.birth_min,
        iterations: params.iterations,
    };

    let grid = automaton::simulate(
        w,
        h,
        automaton::portal_seeded(
            ctx.rng,
            origin,
            &portals,
            params.portal_seed_radius,
            params.portal_density,
            params.ambient_density,
        ),
        &rules,
    );

    let candidates: std::collections::BTreeSet<Cell> = grid
        .live_cells(origin)
        .into_iter()
        .filter(|c| ctx.occupancy.is_free(*c))
        .collect();
    let report = automaton::cleanup_orphans(
        &candidates,
        params.cleanup_min_neighbors,
        params.cleanup_max_iterations,
    );
    if report.cells.is_empty() && !candidates.is_empty() {
        warn!(
            "Room {}: orphan cleanup removed all {} path cells",
            room.index,
            candidates.len()
        );
    }

    for cell in &report.cells {
        if !ctx.layers.floor.contains(*cell) {
            if let Some(main) = theme.floor.main {
                ctx.layers.floor.set(*cell, main);
            }
        }
        ctx.layers.paths.set(*cell, path_tile);
    }

    debug!(
        "Room {}: {} path cells ({} dropped by cleanup)",
        room.index,
        report.cells.len(),
        report.total_removed()
    );
    report.cells.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Direction, PortalInfo, TileLayers};
    use crate::populate::Occupancy;
    use crate::theme::Theme;
    use crate::utils::{DungeonRng, Point2D, RectI};

    fn room_with_portal() -> Room {
        let mut room = Room::new(1, RectI::new(0, 0, 14, 10), RectI::new(-2, -2, 18, 14));
        room.portals.push(PortalInfo {
            other_room: 0,
            cell: Cell::new(0, 4),
            world_position: Point2D::new(0.0, 5.0),
            wall_side: Direction::West,
        });
        room
    }

    #[test]
    fn test_paths_avoid_occupied_cells() {
        let theme = Theme::default();
        let room = room_with_portal();
        let mut rng = DungeonRng::from_seed(17);
        let mut layers = TileLayers::new(room.rect);
        let mut things = Vec::new();
        let mut occupancy = Occupancy::new();
        let blocked: Vec<Cell> = RectI::new(0, 0, 4, 10).cells().collect();
        occupancy.claim_all(&blocked);

        let mut ctx = PopulateContext {
            theme: &theme,
            rng: &mut rng,
            layers: &mut layers,
            things: &mut things,
            occupancy: &mut occupancy,
        };
        let painted = generate_paths(&room, &mut ctx);

        assert_eq!(layers.paths.count(), painted);
        for c in &blocked {
            assert!(!layers.paths.contains(*c));
        }
        for (cell, _) in layers.paths.iter() {
            assert!(layers.floor.contains(cell));
        }
    }

    #[test]
    fn test_no_portals_or_disabled_means_no_paths() {
        let mut theme = Theme::default();
        let plain = Room::new(0, RectI::new(0, 0, 10, 10), RectI::new(0, 0, 12, 12));
        let mut rng = DungeonRng::from_seed(1);
        let mut layers = TileLayers::new(plain.rect);
        let mut things = Vec::new();
        let mut occupancy = Occupancy::new();
        {
            let mut ctx = PopulateContext {
                theme: &theme,
                rng: &mut rng,
                layers: &mut layers,
                things: &mut things,
                occupancy: &mut occupancy,
            };
            assert_eq!(generate_paths(&plain, &mut ctx), 0);
        }

        theme.paths.enabled = false;
        let mut ctx = PopulateContext {
            theme: &theme,
            rng: &mut rng,
            layers: &mut layers,
            things: &mut things,
            occupancy: &mut occupancy,
        };
        assert_eq!(generate_paths(&room_with_portal(), &mut ctx), 0);
    }
}
