// src/populate/boss.rs

use crate::error::Result;
use crate::map::{Room, Thing, ThingKind};
use crate::populate::{decor, paths, PopulateContext, PopulateReport, RoomArchetype, RoomPopulator};
use crate::utils::util::scale_density;
use crate::utils::Point2D;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossSettings {
    pub floor_variation: f64,
    /// Added to both axes of the boss spawn point.
    pub center_offset: f64,
    pub heavy_decoration: bool,
    pub decoration_multiplier: f64,
    pub min_particles: i32,
    pub max_particles: i32,
}

impl Default for BossSettings {
    fn default() -> Self {
        BossSettings {
            floor_variation: 0.3,
            center_offset: 0.0,
            heavy_decoration: true,
            decoration_multiplier: 1.5,
            min_particles: 4,
            max_particles: 8,
        }
    }
}

/// One boss at the room centre, dense decoration, atmosphere along the walls.
#[derive(Debug, Clone, Default)]
pub struct BossArenaPopulator {
    pub settings: BossSettings,
}

impl BossArenaPopulator {
    fn place_boss(&self, room: &Room, ctx: &mut PopulateContext<'_>, report: &mut PopulateReport) {
        let prefab = match &ctx.theme.boss {
            Some(prefab) => prefab.clone(),
            None => {
                warn!("Theme '{}' has no boss prefab; arena {} stays empty", ctx.theme.name, room.index);
                report.skipped += 1;
                return;
            }
        };

        let c = room.center();
        let offset = self.settings.center_offset;
        let pos = Point2D::new(c.x as f64 + 0.5 + offset, c.y as f64 + 0.5 + offset);
        let cell = pos.to_cell();

        let mut thing = Thing::new(ThingKind::Boss, &prefab.id, room.index, cell, format!("Boss_{}", room.index));
        thing.position = pos;
        thing.arena = Some(room.rect.inset(1));
        if ctx.spawn(thing) {
            debug!("Boss '{}' placed at {:?}, arena {:?}", prefab.id, pos, room.rect.inset(1));
            report.bosses += 1;
        } else {
            warn!("Boss cell {:?} in room {} already taken", cell, room.index);
            report.skipped += 1;
        }
    }

    /// Markers biased onto the four wall rows. They never claim cells.
    fn place_particles(&self, room: &Room, ctx: &mut PopulateContext<'_>, report: &mut PopulateReport) {
        let theme = ctx.theme;
        if theme.particle_effects.is_empty() {
            return;
        }
        let r = room.rect;
        let (x0, x1) = (r.x_min() as f64, r.x_max() as f64);
        let (y0, y1) = (r.y_min() as f64, r.y_max() as f64);

        let count = ctx
            .rng
            .range_inclusive(self.settings.min_particles, self.settings.max_particles);
        for i in 0..count {
            let edge = ctx.rng.next_f64();
            let pos = if edge < 0.25 {
                Point2D::new(ctx.rng.lerp(x0, x1), y1 - 1.0)
            } else if edge < 0.5 {
                Point2D::new(ctx.rng.lerp(x0, x1), y0 + 1.0)
            } else if edge < 0.75 {
                Point2D::new(x0 + 1.0, ctx.rng.lerp(y0, y1))
            } else {
                Point2D::new(x1 - 1.0, ctx.rng.lerp(y0, y1))
            };

            let prefab = match ctx.pick_prefab(&theme.particle_effects, "particle") {
                Some(prefab) => prefab,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            let mut thing = Thing::new(
                ThingKind::Particle,
                &prefab.id,
                room.index,
                pos.to_cell(),
                format!("ParticleEffect_{}_{}", room.index, i),
            );
            thing.position = pos;
            if ctx.spawn(thing) {
                report.particles += 1;
            }
        }
    }
}

impl RoomPopulator for BossArenaPopulator {
    fn archetype(&self) -> RoomArchetype {
        RoomArchetype::BossArena
    }

    fn populate(&self, room: &Room, ctx: &mut PopulateContext<'_>) -> Result<PopulateReport> {
        let mut report = PopulateReport::default();
        ctx.paint_floor(&room.rect, self.settings.floor_variation);
        report.path_cells = paths::generate_paths(room, ctx);
        self.place_boss(room, ctx, &mut report);

        // boosted copy; the theme itself is never touched
        let mut decoration = ctx.theme.decoration;
        if self.settings.heavy_decoration {
            decoration.density = scale_density(decoration.density, self.settings.decoration_multiplier);
        }
        let (placed, skipped) = decor::decorate_room(room, &decoration, ctx);
        report.decorations = placed;
        report.skipped += skipped;

        self.place_particles(room, ctx, &mut report);
        debug!("Boss arena {} done: {:?}", room.index, report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileLayers;
    use crate::populate::Occupancy;
    use crate::theme::Theme;
    use crate::utils::{Cell, DungeonRng, RectI};

    fn run(theme: &Theme, settings: BossSettings) -> (PopulateReport, Vec<Thing>) {
        let room = Room::new(4, RectI::new(20, 20, 21, 17), RectI::new(18, 18, 25, 21));
        let mut rng = DungeonRng::from_seed(99);
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
            BossArenaPopulator { settings }.populate(&room, &mut ctx).unwrap()
        };
        (report, things)
    }

    #[test]
    fn test_single_boss_at_center_with_arena() {
        let theme = Theme::default();
        let (report, things) = run(&theme, BossSettings::default());
        assert_eq!(report.bosses, 1);
        let bosses: Vec<&Thing> = things.iter().filter(|t| t.kind == ThingKind::Boss).collect();
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].cell, Cell::new(30, 28));
        assert_eq!(bosses[0].arena, Some(RectI::new(21, 21, 19, 15)));
        assert_eq!(bosses[0].name, "Boss_4");
        let on_boss_cell = things
            .iter()
            .filter(|t| t.kind.occupies() && t.cell == bosses[0].cell)
            .count();
        assert_eq!(on_boss_cell, 1);
    }

    #[test]
    fn test_particles_hug_the_walls() {
        let theme = Theme::default();
        let (report, things) = run(&theme, BossSettings::default());
        assert!(report.particles >= 4 && report.particles <= 8);
        let rect = RectI::new(20, 20, 21, 17);
        for p in things.iter().filter(|t| t.kind == ThingKind::Particle) {
            let on_row = p.position.y == (rect.y_max() - 1) as f64 || p.position.y == (rect.y_min() + 1) as f64;
            let on_col = p.position.x == (rect.x_min() + 1) as f64 || p.position.x == (rect.x_max() - 1) as f64;
            assert!(on_row || on_col);
        }
    }

    #[test]
    fn test_boost_does_not_mutate_theme() {
        let theme = Theme::default();
        let before = theme.decoration;
        run(&theme, BossSettings::default());
        assert_eq!(theme.decoration, before);
    }

    #[test]
    fn test_missing_boss_prefab_is_skipped() {
        let mut theme = Theme::default();
        theme.boss = None;
        let (report, things) = run(&theme, BossSettings::default());
        assert_eq!(report.bosses, 0);
        assert!(things.iter().all(|t| t.kind != ThingKind::Boss));
    }
}
