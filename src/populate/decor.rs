// src/populate/decor.rs

use crate::automaton::{self, CaRules};
use crate::map::{Room, Thing, ThingKind};
use crate::populate::PopulateContext;
use crate::theme::CaParams;
use crate::utils::Cell;
use log::debug;

/// Decorations keep this many cells away from the room edge.
pub const BORDER_MARGIN: usize = 2;

/// A live automaton cell spawns a decoration when a roll exceeds this.
const SPAWN_THRESHOLD: f64 = 0.6;

/// Scatters non-blocking decoration over the free cells of `room` using a CA
/// grown from `params`. Returns `(placed, skipped)`.
pub fn decorate_room(room: &Room, params: &CaParams, ctx: &mut PopulateContext<'_>) -> (usize, usize) {
    let theme = ctx.theme;
    if theme.decorations.is_empty() {
        return (0, 0);
    }

    let w = room.rect.width.max(0) as usize;
    let h = room.rect.height.max(0) as usize;
    let rules = CaRules::from(*params);
    let grid = automaton::simulate(
        w,
        h,
        automaton::bordered(ctx.rng, params.density, w, h, BORDER_MARGIN),
        &rules,
    );

    let origin = Cell::new(room.rect.x, room.rect.y);
    let (mut placed, mut skipped) = (0, 0);
    for cell in grid.live_cells(origin) {
        if !ctx.occupancy.is_free(cell) {
            continue;
        }
        if ctx.rng.next_f64() <= SPAWN_THRESHOLD {
            continue;
        }
        let prefab = match ctx.pick_prefab(&theme.decorations, "decoration") {
            Some(prefab) => prefab,
            None => {
                skipped += 1;
                continue;
            }
        };
        let thing = Thing::new(
            ThingKind::Decoration,
            &prefab.id,
            room.index,
            cell,
            format!("Decoration_{}_{}", room.index, placed),
        );
        if ctx.spawn(thing) {
            placed += 1;
        }
    }

    debug!(
        "Room {}: {} decorations from {} live cells (density {:.2})",
        room.index,
        placed,
        grid.count_live(),
        params.density
    );
    (placed, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileLayers;
    use crate::populate::Occupancy;
    use crate::theme::Theme;
    use crate::utils::{DungeonRng, RectI};

    fn run(theme: &Theme, rect: RectI, occupancy: &mut Occupancy, seed: u64) -> (Vec<Thing>, usize) {
        let room = Room::new(0, rect, rect.expand(2));
        let mut rng = DungeonRng::from_seed(seed);
        let mut layers = TileLayers::new(rect);
        let mut things = Vec::new();
        let mut ctx = PopulateContext {
            theme,
            rng: &mut rng,
            layers: &mut layers,
            things: &mut things,
            occupancy,
        };
        let params = CaParams {
            density: 0.6,
            iterations: 2,
            survive_min: 3,
            birth_min: 5,
        };
        let (placed, _) = decorate_room(&room, &params, &mut ctx);
        (things, placed)
    }

    #[test]
    fn test_decorations_respect_margin_and_occupancy() {
        let theme = Theme::default();
        let rect = RectI::new(10, 10, 16, 12);
        let mut occupancy = Occupancy::new();
        occupancy.claim(Cell::new(15, 15));
        let (things, placed) = run(&theme, rect, &mut occupancy, 42);

        assert_eq!(things.len(), placed);
        let inner = rect.inset(BORDER_MARGIN as i32);
        for t in &things {
            assert_eq!(t.kind, ThingKind::Decoration);
            assert!(inner.contains(t.cell));
            assert_ne!(t.cell, Cell::new(15, 15));
        }
        assert_eq!(occupancy.len(), placed + 1);
    }

    #[test]
    fn test_no_decoration_prefabs_means_nothing() {
        let mut theme = Theme::default();
        theme.decorations.clear();
        let mut occupancy = Occupancy::new();
        let (things, placed) = run(&theme, RectI::new(0, 0, 10, 10), &mut occupancy, 1);
        assert!(things.is_empty());
        assert_eq!(placed, 0);
    }
}
