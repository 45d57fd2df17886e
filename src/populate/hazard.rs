// src/populate/hazard.rs

use crate::automaton::{self, CaRules};
use crate::error::Result;
use crate::map::{Room, Thing, ThingKind};
use crate::populate::{decor, paths, PopulateContext, PopulateReport, RoomArchetype, RoomPopulator};
use crate::theme::CaParams;
use crate::utils::Cell;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardSettings {
    pub floor_variation: f64,
    pub lake: CaParams,
    pub cleanup_min_neighbors: u8,
    pub cleanup_max_iterations: u32,
    pub min_enemies: i32,
    pub max_enemies: i32,
    pub attempts_per_spawn: i32,
    /// Enemies keep this many cells from the room edge.
    pub enemy_margin: i32,
}

impl Default for HazardSettings {
    fn default() -> Self {
        HazardSettings {
            floor_variation: 0.2,
            lake: CaParams {
                density: 0.4,
                iterations: 6,
                survive_min: 5,
                birth_min: 4,
            },
            cleanup_min_neighbors: 3,
            cleanup_max_iterations: 2,
            min_enemies: 1,
            max_enemies: 3,
            attempts_per_spawn: 5,
            enemy_margin: 2,
        }
    }
}

/// A cellular-automaton lake with enemies along its shore.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentalHazardPopulator {
    pub settings: HazardSettings,
}

impl EnvironmentalHazardPopulator {
    /// Lake cells in world space after smoothing and orphan cleanup.
    pub fn grow_lake(&self, room: &Room, ctx: &mut PopulateContext<'_>) -> BTreeSet<Cell> {
        let s = &self.settings;
        let w = room.rect.width.max(0) as usize;
        let h = room.rect.height.max(0) as usize;
        let grid = automaton::simulate(
            w,
            h,
            automaton::uniform(ctx.rng, s.lake.density),
            &CaRules::from(s.lake),
        );
        let raw = grid.live_cells(Cell::new(room.rect.x, room.rect.y));
        let report = automaton::cleanup_orphans(&raw, s.cleanup_min_neighbors, s.cleanup_max_iterations);
        if report.cells.is_empty() && !raw.is_empty() {
            warn!("Room {}: orphan cleanup removed the whole lake ({} cells)", room.index, raw.len());
        }
        debug!(
            "Room {}: lake {} cells, cleanup removed {:?}",
            room.index,
            report.cells.len(),
            report.removed_per_pass
        );
        report.cells
    }

    fn place_shore_enemies(
        &self,
        room: &Room,
        lake: &BTreeSet<Cell>,
        ctx: &mut PopulateContext<'_>,
        report: &mut PopulateReport,
    ) {
        let theme = ctx.theme;
        if theme.common_enemies.is_empty() {
            warn!("Theme '{}' defines no common enemies", theme.name);
            return;
        }

        let s = &self.settings;
        let r = room.rect;
        let count = ctx.rng.range_inclusive(s.min_enemies, s.max_enemies);
        let max_attempts = count * s.attempts_per_spawn;
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < max_attempts {
            attempts += 1;
            let x = ctx.rng.range(r.x_min() + s.enemy_margin, r.x_max() - s.enemy_margin);
            let y = ctx.rng.range(r.y_min() + s.enemy_margin, r.y_max() - s.enemy_margin);
            let cell = Cell::new(x, y);
            if lake.contains(&cell) || !ctx.occupancy.is_free(cell) {
                continue;
            }
            let prefab = match ctx.pick_prefab(&theme.common_enemies, "enemy") {
                Some(prefab) => prefab,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            let thing = Thing::new(
                ThingKind::Enemy,
                &prefab.id,
                room.index,
                cell,
                format!("ShoreEnemy_{}_{}", room.index, placed),
            );
            if ctx.spawn(thing) {
                placed += 1;
            }
        }
        if placed < count {
            debug!("Room {}: placed {}/{} shore enemies", room.index, placed, count);
            report.skipped += (count - placed) as usize;
        }
        report.enemies += placed as usize;
    }
}

impl RoomPopulator for EnvironmentalHazardPopulator {
    fn archetype(&self) -> RoomArchetype {
        RoomArchetype::EnvironmentalHazard
    }

    fn populate(&self, room: &Room, ctx: &mut PopulateContext<'_>) -> Result<PopulateReport> {
        let mut report = PopulateReport::default();
        ctx.paint_floor(&room.rect, self.settings.floor_variation);

        let lake = match ctx.theme.hazard_tiles.first().copied() {
            Some(water) => {
                let lake = self.grow_lake(room, ctx);
                for cell in &lake {
                    ctx.layers.hazards.set(*cell, water);
                    ctx.occupancy.claim(*cell);
                }
                lake
            }
            None => {
                warn!("Theme '{}' has no hazard tiles; room {} gets no lake", ctx.theme.name, room.index);
                BTreeSet::new()
            }
        };
        report.hazard_cells = lake.len();

        report.path_cells = paths::generate_paths(room, ctx);
        self.place_shore_enemies(room, &lake, ctx, &mut report);

        let decoration = ctx.theme.decoration;
        let (placed, skipped) = decor::decorate_room(room, &decoration, ctx);
        report.decorations = placed;
        report.skipped += skipped;

        debug!("Hazard room {} done: {:?}", room.index, report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Direction, PortalInfo, TileLayers};
    use crate::populate::Occupancy;
    use crate::theme::Theme;
    use crate::utils::{DungeonRng, Point2D, RectI};

    fn hazard_room() -> Room {
        let mut room = Room::new(1, RectI::new(0, 0, 20, 12), RectI::new(-3, -3, 26, 18));
        room.portals.push(PortalInfo {
            other_room: 0,
            cell: Cell::new(0, 5),
            world_position: Point2D::new(0.0, 6.0),
            wall_side: Direction::West,
        });
        room
    }

    fn run(theme: &Theme, seed: u64) -> (PopulateReport, Vec<Thing>, TileLayers) {
        let room = hazard_room();
        let mut rng = DungeonRng::from_seed(seed);
        let mut layers = TileLayers::new(room.rect);
        let mut things = Vec::new();
        let mut occupancy = Occupancy::new();
        let report = {
            let mut ctx = PopulateContext {
                theme,
                rng: &mut rng,
                layers: &mut layers,
                things: &mut things,
                occupancy: &mut occupancy,
            };
            EnvironmentalHazardPopulator::default().populate(&room, &mut ctx).unwrap()
        };
        (report, things, layers)
    }

    #[test]
    fn test_nothing_stands_in_the_lake() {
        let theme = Theme::default();
        for seed in 0..8 {
            let (report, things, layers) = run(&theme, seed);
            assert_eq!(layers.hazards.count(), report.hazard_cells);
            for t in &things {
                assert!(!layers.hazards.contains(t.cell), "{} placed in water", t.name);
            }
            for (cell, _) in layers.paths.iter() {
                assert!(!layers.hazards.contains(cell));
            }
            assert!(report.enemies <= 3);
        }
    }

    #[test]
    fn test_shore_enemies_keep_margin() {
        let theme = Theme::default();
        let inner = hazard_room().rect.inset(2);
        let (_, things, _) = run(&theme, 4);
        for t in things.iter().filter(|t| t.kind == ThingKind::Enemy) {
            assert!(inner.contains(t.cell));
            assert!(t.name.starts_with("ShoreEnemy_1_"));
        }
    }

    #[test]
    fn test_no_hazard_tile_means_no_lake() {
        let mut theme = Theme::default();
        theme.hazard_tiles.clear();
        let (report, _, layers) = run(&theme, 1);
        assert_eq!(report.hazard_cells, 0);
        assert_eq!(layers.hazards.count(), 0);
    }
}
