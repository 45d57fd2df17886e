// src/populate/combat.rs

use crate::error::Result;
use crate::map::{Room, Thing, ThingKind};
use crate::populate::{decor, footprint, paths, random_position, PopulateContext, PopulateReport};
use crate::populate::{RoomArchetype, RoomPopulator};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    pub floor_variation: f64,
    pub min_enemies: i32,
    pub max_enemies: i32,
    pub min_obstacles: i32,
    pub max_obstacles: i32,
    /// Placement attempts per requested spawn.
    pub attempts_per_spawn: i32,
    pub obstacle_margin: f64,
    pub enemy_margin: f64,
}

impl Default for CombatSettings {
    fn default() -> Self {
        CombatSettings {
            floor_variation: 0.2,
            min_enemies: 2,
            max_enemies: 5,
            min_obstacles: 2,
            max_obstacles: 6,
            attempts_per_spawn: 3,
            obstacle_margin: 2.0,
            enemy_margin: 1.5,
        }
    }
}

/// Obstacles, a handful of enemies and ambient decoration.
#[derive(Debug, Clone, Default)]
pub struct CombatRoomPopulator {
    pub settings: CombatSettings,
}

impl CombatRoomPopulator {
    fn place_obstacles(&self, room: &Room, ctx: &mut PopulateContext<'_>, report: &mut PopulateReport) {
        let theme = ctx.theme;
        if theme.blocking_obstacles.is_empty() {
            warn!("Theme '{}' defines no blocking obstacles", theme.name);
            return;
        }

        let s = &self.settings;
        let count = ctx.rng.range_inclusive(s.min_obstacles, s.max_obstacles);
        let max_attempts = count * s.attempts_per_spawn;
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < max_attempts {
            attempts += 1;
            let pos = random_position(&room.rect, s.obstacle_margin, ctx.rng);
            let prefab = match ctx.pick_prefab(&theme.blocking_obstacles, "obstacle") {
                Some(prefab) => prefab,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            let cell = pos.to_cell();
            let mut thing = Thing::new(
                ThingKind::Obstacle,
                &prefab.id,
                room.index,
                cell,
                format!("Obstacle_{}_{}", room.index, placed),
            );
            thing.position = pos;
            thing.footprint = footprint(cell, prefab.footprint);
            if ctx.spawn(thing) {
                placed += 1;
            }
        }
        if placed < count {
            debug!("Room {}: placed {}/{} obstacles", room.index, placed, count);
            report.skipped += (count - placed) as usize;
        }
        report.obstacles += placed as usize;
    }

    fn place_enemies(&self, room: &Room, ctx: &mut PopulateContext<'_>, report: &mut PopulateReport) {
        let theme = ctx.theme;
        if theme.common_enemies.is_empty() {
            warn!("Theme '{}' defines no common enemies", theme.name);
            return;
        }

        let s = &self.settings;
        let count = ctx.rng.range_inclusive(s.min_enemies, s.max_enemies);
        let max_attempts = count * s.attempts_per_spawn;
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < max_attempts {
            attempts += 1;
            let pos = random_position(&room.rect, s.enemy_margin, ctx.rng);
            let cell = pos.to_cell();
            if !ctx.occupancy.is_free(cell) {
                continue;
            }
            let prefab = match ctx.pick_prefab(&theme.common_enemies, "enemy") {
                Some(prefab) => prefab,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            let mut thing = Thing::new(
                ThingKind::Enemy,
                &prefab.id,
                room.index,
                cell,
                format!("Enemy_{}_{}", room.index, placed),
            );
            thing.position = pos;
            if ctx.spawn(thing) {
                placed += 1;
            }
        }
        if placed < count {
            debug!("Room {}: placed {}/{} enemies", room.index, placed, count);
            report.skipped += (count - placed) as usize;
        }
        report.enemies += placed as usize;
    }
}

impl RoomPopulator for CombatRoomPopulator {
    fn archetype(&self) -> RoomArchetype {
        RoomArchetype::Combat
    }

    fn populate(&self, room: &Room, ctx: &mut PopulateContext<'_>) -> Result<PopulateReport> {
        let mut report = PopulateReport::default();
        ctx.paint_floor(&room.rect, self.settings.floor_variation);
        report.path_cells = paths::generate_paths(room, ctx);
        self.place_obstacles(room, ctx, &mut report);
        self.place_enemies(room, ctx, &mut report);

        let decoration = ctx.theme.decoration;
        let (placed, skipped) = decor::decorate_room(room, &decoration, ctx);
        report.decorations = placed;
        report.skipped += skipped;

        debug!("Combat room {} done: {:?}", room.index, report);
        Ok(report)
    }
}
