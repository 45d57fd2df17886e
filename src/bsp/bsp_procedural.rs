// src/bsp/bsp_procedural.rs

use crate::bsp::bsp_graph::{ConnectionGraph, Edge};
use crate::bsp::bsp_partition::SpacePartitioner;
use crate::bsp::bsp_rooms::RoomPlacer;
use crate::bsp::PARTITION_GUARD;
use crate::carve::{fill_outside, place_walls, CarveMode, CorridorCarver, FloorCells, PortalCarver, PortalPlan};
use crate::document::DungeonLayout;
use crate::error::{DungeonError, Result};
use crate::map::{Room, Thing, TileLayers};
use crate::populate::{self, ArchetypeDispatcher, Occupancy, PopulateContext, PopulateReport, RoomArchetype};
use crate::populate::{BossSettings, CombatSettings, HazardSettings};
use crate::theme::Theme;
use crate::utils::{Cell, DungeonRng, Line2D, RectI};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

/// Every knob of one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub map_width: i32,
    pub map_height: i32,
    /// Put the map bounds around (0, 0) instead of starting there.
    pub center_at_origin: bool,

    pub room_count: usize,
    /// Loop edges added on top of the spanning tree.
    pub extra_connections: usize,
    pub min_leaf_size: i32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub boss_min_room_size: i32,
    pub boss_max_room_size: i32,
    /// Gap kept between a room and its leaf edge.
    pub room_margin: i32,

    pub carve_mode: CarveMode,
    pub corridor_width: i32,
    pub manhattan_corridors: bool,
    pub stub_length: i32,

    pub surround_with_walls: bool,
    pub fill_outside: bool,
    pub outside_padding: i32,
    pub ground_variation_chance: f64,

    pub extra_boss_rooms: Vec<usize>,
    pub hazard_rooms: Vec<usize>,
    pub partition_guard: usize,

    pub combat: CombatSettings,
    pub boss: BossSettings,
    pub hazard: HazardSettings,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            map_width: 140,
            map_height: 140,
            center_at_origin: true,
            room_count: 8,
            extra_connections: 2,
            min_leaf_size: 24,
            min_room_size: 8,
            max_room_size: 16,
            boss_min_room_size: 14,
            boss_max_room_size: 22,
            room_margin: 2,
            carve_mode: CarveMode::Corridor,
            corridor_width: 3,
            manhattan_corridors: true,
            stub_length: 3,
            surround_with_walls: true,
            fill_outside: true,
            outside_padding: 8,
            ground_variation_chance: 0.3,
            extra_boss_rooms: Vec::new(),
            hazard_rooms: Vec::new(),
            partition_guard: PARTITION_GUARD,
            combat: CombatSettings::default(),
            boss: BossSettings::default(),
            hazard: HazardSettings::default(),
        }
    }
}

fn check(ok: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(DungeonError::InvalidConfig(msg()))
    }
}

fn unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl GeneratorConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Smallest room side the portal geometry can open a wall in.
    pub const MIN_ROOM_SIDE: i32 = 4;

    pub fn validate(&self) -> Result<()> {
        check(self.map_width > 0 && self.map_height > 0, || {
            format!("map size must be positive, got {}x{}", self.map_width, self.map_height)
        })?;
        check(self.room_count >= 1, || "room_count must be at least 1".to_string())?;
        check(self.min_room_size >= Self::MIN_ROOM_SIDE, || {
            format!("min_room_size must be at least {}, got {}", Self::MIN_ROOM_SIDE, self.min_room_size)
        })?;
        check(self.min_room_size <= self.max_room_size, || {
            format!("min_room_size {} > max_room_size {}", self.min_room_size, self.max_room_size)
        })?;
        check(self.boss_min_room_size >= Self::MIN_ROOM_SIDE, || {
            format!("boss_min_room_size must be at least {}", Self::MIN_ROOM_SIDE)
        })?;
        check(self.boss_min_room_size <= self.boss_max_room_size, || {
            format!(
                "boss_min_room_size {} > boss_max_room_size {}",
                self.boss_min_room_size, self.boss_max_room_size
            )
        })?;
        check(self.room_margin >= 1, || "room_margin must be at least 1".to_string())?;
        check(self.min_leaf_size >= self.min_room_size + 2 * self.room_margin, || {
            format!(
                "min_leaf_size {} cannot fit a {} room with margin {}",
                self.min_leaf_size, self.min_room_size, self.room_margin
            )
        })?;
        check(self.map_width >= self.min_leaf_size && self.map_height >= self.min_leaf_size, || {
            format!("map {}x{} is smaller than one leaf", self.map_width, self.map_height)
        })?;
        check(self.corridor_width >= 1, || "corridor_width must be at least 1".to_string())?;
        check(self.stub_length >= 1, || "stub_length must be at least 1".to_string())?;
        check(self.outside_padding >= 0, || "outside_padding must not be negative".to_string())?;
        check(self.partition_guard >= 1, || "partition_guard must be at least 1".to_string())?;

        let densities = [
            ("ground_variation_chance", self.ground_variation_chance),
            ("combat.floor_variation", self.combat.floor_variation),
            ("boss.floor_variation", self.boss.floor_variation),
            ("hazard.floor_variation", self.hazard.floor_variation),
            ("hazard.lake.density", self.hazard.lake.density),
        ];
        for (name, value) in densities {
            check(unit(value), || format!("{} must be in [0, 1], got {}", name, value))?;
        }

        check(self.combat.min_enemies <= self.combat.max_enemies, || "combat enemy range is inverted".to_string())?;
        check(self.combat.min_obstacles <= self.combat.max_obstacles, || {
            "combat obstacle range is inverted".to_string()
        })?;
        check(self.boss.min_particles <= self.boss.max_particles, || "boss particle range is inverted".to_string())?;
        check(self.hazard.min_enemies <= self.hazard.max_enemies, || "hazard enemy range is inverted".to_string())?;
        Ok(())
    }

    pub fn bounds(&self) -> RectI {
        if self.center_at_origin {
            RectI::centered(self.map_width, self.map_height)
        } else {
            RectI::new(0, 0, self.map_width, self.map_height)
        }
    }
}

/// Counters collected over one pass.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation_time_ms: f64,
    pub leaf_count: usize,
    pub room_count: usize,
    pub skipped_leaves: usize,
    pub tree_edges: usize,
    pub extra_edges: usize,
    pub corridor_segments: usize,
    pub portal_count: usize,
    pub floor_cells: usize,
    pub wall_cells: usize,
    pub outside_cells: usize,
    pub thing_count: usize,
    pub population: PopulateReport,
}

/// Runs the whole pipeline for one seed. Holds no per-pass state, so one
/// generator can serve many seeds (and threads).
#[derive(Debug, Clone)]
pub struct ProceduralGenerator {
    config: GeneratorConfig,
    theme: Theme,
}

/// Output of the carving step.
struct Carved {
    floor: FloorCells,
    corridors: Vec<Line2D>,
    plans: Vec<PortalPlan>,
}

impl ProceduralGenerator {
    pub fn new(config: GeneratorConfig, theme: Theme) -> Result<Self> {
        if let Err(e) = config.validate() {
            error!("Rejecting generator configuration: {}", e);
            return Err(e);
        }
        for value in [theme.decoration.density, theme.paths.portal_density, theme.paths.ambient_density] {
            check(unit(value), || format!("theme '{}' has a density outside [0, 1]: {}", theme.name, value))?;
        }
        Ok(ProceduralGenerator { config, theme })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn generate(&self, seed: u64) -> Result<DungeonLayout> {
        let started = Instant::now();
        let cfg = &self.config;
        let theme = &self.theme;
        if theme.floor.main.is_none() {
            error!("Theme '{}' has no main floor tile", theme.name);
            return Err(DungeonError::MissingTile("floor.main"));
        }

        let mut rng = DungeonRng::from_seed(seed);
        let mut stats = GenerationStats::default();
        let bounds = cfg.bounds();

        // Partition and rooms. The tree is dropped once the leaves are read.
        let leaves: Vec<RectI> = {
            let root = SpacePartitioner::new(cfg.min_leaf_size, cfg.room_count)
                .with_guard(cfg.partition_guard)
                .partition(bounds, &mut rng);
            root.leaves().iter().map(|leaf| leaf.bounds).collect()
        };
        stats.leaf_count = leaves.len();

        let placement = RoomPlacer {
            room_count: cfg.room_count,
            min_room_size: cfg.min_room_size,
            max_room_size: cfg.max_room_size,
            boss_min_room_size: cfg.boss_min_room_size,
            boss_max_room_size: cfg.boss_max_room_size,
            margin: cfg.room_margin,
        }
        .place(&leaves, &mut rng);
        if placement.rooms.is_empty() {
            error!("No partition leaf could host a room (seed {})", seed);
            return Err(DungeonError::NoRooms);
        }
        let mut rooms = placement.rooms;
        let boss_room = placement.boss_room;
        stats.skipped_leaves = placement.skipped_leaves;
        stats.room_count = rooms.len();
        if rooms.len() < cfg.room_count {
            warn!("Placed {} of {} requested rooms", rooms.len(), cfg.room_count);
        }

        let centers: Vec<Cell> = rooms.iter().map(Room::center).collect();
        let graph = ConnectionGraph::build(&centers, cfg.extra_connections);
        stats.tree_edges = graph.tree.len();
        stats.extra_edges = graph.extra.len();

        let carved = self.carve(&rooms, &centers, &graph, &mut rng);
        let floor = carved.floor;
        stats.corridor_segments = carved.corridors.len();
        stats.floor_cells = floor.len();

        let fill_bounds = floor
            .bounds()
            .map_or(bounds, |b| bounds.union(&b))
            .expand(cfg.outside_padding);
        let mut layers = TileLayers::new(fill_bounds);
        for cell in floor.iter() {
            if let Some(tile) = theme.floor.pick(cfg.ground_variation_chance, &mut rng) {
                layers.floor.set(cell, tile);
            }
        }

        if cfg.surround_with_walls {
            stats.wall_cells = place_walls(&floor, &mut layers, &theme.walls, &mut rng);
        }

        let mut things: Vec<Thing> = Vec::new();
        let mut portal_openings = Vec::new();
        if !carved.plans.is_empty() {
            if theme.portal.is_none() {
                warn!("Theme '{}' has no portal prefab; portals get no marker", theme.name);
            }
            let carver = PortalCarver::new(cfg.stub_length).with_walls(cfg.surround_with_walls);
            for plan in &carved.plans {
                portal_openings.extend(carver.place(plan, &mut rooms, &mut layers, theme, &mut things));
            }
            stats.portal_count = carved.plans.len() * 2;
        }

        if cfg.fill_outside {
            stats.outside_cells = fill_outside(
                fill_bounds,
                &floor,
                &mut layers,
                theme,
                cfg.ground_variation_chance,
                &mut rng,
            );
        }

        let dispatcher = self.dispatcher(boss_room, rooms.len());
        let archetypes: Vec<RoomArchetype> = rooms.iter().map(|r| dispatcher.select_archetype(r.index)).collect();
        let mut occupancy = Occupancy::new();
        let mut reports = Vec::with_capacity(rooms.len());
        {
            let mut ctx = PopulateContext {
                theme,
                rng: &mut rng,
                layers: &mut layers,
                things: &mut things,
                occupancy: &mut occupancy,
            };
            for room in &rooms {
                match dispatcher.populate_room(room, &mut ctx) {
                    Ok((_, report)) => {
                        stats.population += report;
                        reports.push(report);
                    }
                    Err(e) => {
                        error!("Populating room {} failed: {}", room.index, e);
                        reports.push(PopulateReport::default());
                    }
                }
            }
        }

        for room in rooms.iter_mut() {
            room.safe_spawn_cell = populate::find_safe_spawn(&room.rect, &occupancy, &layers);
            if room.safe_spawn_cell.is_none() {
                warn!("Room {} has no free cell for a spawn point", room.index);
            }
        }

        stats.thing_count = things.len();
        stats.generation_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            "Seed {}: {} rooms, {} tree + {} extra edges, {} floor cells, {} things in {:.2} ms",
            seed,
            stats.room_count,
            stats.tree_edges,
            stats.extra_edges,
            stats.floor_cells,
            stats.thing_count,
            stats.generation_time_ms
        );

        Ok(DungeonLayout {
            seed,
            bounds,
            fill_bounds,
            carve_mode: cfg.carve_mode,
            walled: cfg.surround_with_walls,
            layers,
            rooms,
            graph,
            corridors: carved.corridors,
            archetypes,
            boss_room,
            things,
            portal_openings,
            ambient_color: theme.ambient_color,
            ambient_intensity: theme.ambient_intensity,
            room_reports: reports,
            stats,
        })
    }

    fn carve(&self, rooms: &[Room], centers: &[Cell], graph: &ConnectionGraph, rng: &mut DungeonRng) -> Carved {
        let cfg = &self.config;
        let mut floor = FloorCells::new();
        for room in rooms {
            floor.insert_rect(&room.rect);
        }

        let mut corridors = Vec::new();
        let mut plans = Vec::new();
        match cfg.carve_mode {
            CarveMode::Corridor => {
                let carver = CorridorCarver::new(cfg.corridor_width, cfg.manhattan_corridors);
                for edge in graph.all_edges() {
                    corridors.extend(carver.carve(centers[edge.a], centers[edge.b], &mut floor, rng));
                }
            }
            CarveMode::Portal => {
                let carver = PortalCarver::new(cfg.stub_length);
                let edges: Vec<Edge> = graph.all_edges().copied().collect();
                plans = carver.plan_all(rooms, &edges);
                for plan in &plans {
                    carver.carve_stubs(plan, &mut floor);
                }
            }
        }
        debug!(
            "Carved {} floor cells ({:?}, {} corridor segments, {} portal pairs)",
            floor.len(),
            cfg.carve_mode,
            corridors.len(),
            plans.len()
        );
        Carved { floor, corridors, plans }
    }

    fn dispatcher(&self, boss_room: Option<usize>, room_count: usize) -> ArchetypeDispatcher {
        let cfg = &self.config;
        let in_range = |list: &[usize], what: &str| -> BTreeSet<usize> {
            list.iter()
                .copied()
                .filter(|&i| {
                    if i >= room_count {
                        warn!("{} index {} ignored: only {} rooms", what, i, room_count);
                    }
                    i < room_count
                })
                .collect()
        };
        ArchetypeDispatcher {
            boss_room,
            extra_boss_rooms: in_range(&cfg.extra_boss_rooms, "Extra boss room"),
            hazard_rooms: in_range(&cfg.hazard_rooms, "Hazard room"),
            combat: populate::CombatRoomPopulator {
                settings: cfg.combat.clone(),
            },
            boss: populate::BossArenaPopulator {
                settings: cfg.boss.clone(),
            },
            hazard: populate::EnvironmentalHazardPopulator {
                settings: cfg.hazard.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::validate::check_layout;
    use crate::map::ThingKind;
    use std::collections::HashSet;

    fn scenario_config() -> GeneratorConfig {
        GeneratorConfig {
            map_width: 140,
            map_height: 140,
            room_count: 8,
            min_leaf_size: 36,
            ..Default::default()
        }
    }

    fn generator(config: GeneratorConfig) -> ProceduralGenerator {
        ProceduralGenerator::new(config, Theme::default()).unwrap()
    }

    #[test]
    fn test_seed_54321_scenario() {
        let gen = generator(scenario_config());
        let layout = gen.generate(54321).unwrap();

        let n = layout.rooms.len();
        assert_eq!(n, 8);
        assert_eq!(layout.graph.tree.len(), 7);
        assert!(layout.graph.is_connected());
        let boss = layout.boss_room.unwrap();
        assert!(boss >= 1 && boss < n);
        assert_eq!(layout.archetypes[boss], RoomArchetype::BossArena);
        assert_eq!(layout.archetypes[0], RoomArchetype::Combat);

        let again = gen.generate(54321).unwrap();
        assert_eq!(layout.rooms, again.rooms);
        assert_eq!(layout.layers, again.layers);
        assert_eq!(layout.things, again.things);
        assert_eq!(layout.graph, again.graph);
        assert_eq!(layout.boss_room, again.boss_room);
    }

    #[test]
    fn test_rooms_disjoint_and_inside_leaves() {
        let layout = generator(scenario_config()).generate(7).unwrap();
        for (i, a) in layout.rooms.iter().enumerate() {
            assert!(a.leaf.contains_rect(&a.rect));
            for b in layout.rooms.iter().skip(i + 1) {
                assert!(!a.rect.intersects(&b.rect));
            }
        }
    }

    #[test]
    fn test_generated_layouts_pass_validation() {
        let gen = generator(GeneratorConfig {
            hazard_rooms: vec![1, 2],
            ..GeneratorConfig::default()
        });
        for seed in [1, 2, 3, 99, 2024] {
            let layout = gen.generate(seed).unwrap();
            let violations = check_layout(&layout);
            assert!(violations.is_empty(), "seed {}: {:?}", seed, violations);
        }
    }

    #[test]
    fn test_portal_mode_opens_walls() {
        let gen = generator(GeneratorConfig {
            carve_mode: CarveMode::Portal,
            ..GeneratorConfig::default()
        });
        let layout = gen.generate(11).unwrap();
        assert!(layout.corridors.is_empty());
        assert_eq!(layout.stats.portal_count, layout.graph.all_edges().count() * 2);
        assert_eq!(layout.portal_openings.len(), layout.stats.portal_count * 2);
        for cell in &layout.portal_openings {
            assert!(!layout.layers.wall_kinds.contains(*cell));
        }
        let markers = layout.things.iter().filter(|t| t.kind == ThingKind::Portal).count();
        assert_eq!(markers, layout.stats.portal_count);
        for room in &layout.rooms {
            for portal in &room.portals {
                assert!(layout.rooms[portal.other_room].connects_to(room.index));
            }
        }
        assert!(check_layout(&layout).is_empty());
    }

    #[test]
    fn test_portals_of_one_room_never_share_a_cell() {
        let gen = generator(GeneratorConfig {
            carve_mode: CarveMode::Portal,
            ..GeneratorConfig::default()
        });
        for seed in 0..24 {
            let layout = gen.generate(seed).unwrap();
            for room in &layout.rooms {
                let mut cells = HashSet::new();
                for thing in layout.things_in_room(room.index).filter(|t| t.kind == ThingKind::Portal) {
                    assert!(
                        cells.insert(thing.cell),
                        "seed {}: room {} stacks portals on {:?}",
                        seed,
                        room.index,
                        thing.cell
                    );
                }
            }
            let openings: HashSet<Cell> = layout.portal_openings.iter().copied().collect();
            assert_eq!(openings.len(), layout.portal_openings.len(), "seed {}", seed);
            let violations = check_layout(&layout);
            assert!(violations.is_empty(), "seed {}: {:?}", seed, violations);
        }
    }

    #[test]
    fn test_safe_spawns_are_free_and_dry() {
        let gen = generator(GeneratorConfig {
            hazard_rooms: vec![1, 2, 3],
            ..GeneratorConfig::default()
        });
        let layout = gen.generate(5).unwrap();
        for room in &layout.rooms {
            let cell = room.safe_spawn_cell.unwrap();
            assert!(room.rect.contains(cell));
            assert!(!layout.layers.hazards.contains(cell));
            assert!(layout
                .things
                .iter()
                .filter(|t| t.kind.occupies())
                .all(|t| !t.footprint.contains(&cell)));
        }
    }

    #[test]
    fn test_out_of_range_overrides_are_ignored() {
        let gen = generator(GeneratorConfig {
            hazard_rooms: vec![500],
            extra_boss_rooms: vec![900],
            ..GeneratorConfig::default()
        });
        let layout = gen.generate(3).unwrap();
        let bosses = layout
            .archetypes
            .iter()
            .filter(|a| **a == RoomArchetype::BossArena)
            .count();
        assert_eq!(bosses, 1);
        assert!(layout.archetypes.iter().all(|a| *a != RoomArchetype::EnvironmentalHazard));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let bad = [
            GeneratorConfig {
                map_width: 0,
                ..Default::default()
            },
            GeneratorConfig {
                min_room_size: 20,
                max_room_size: 10,
                ..Default::default()
            },
            GeneratorConfig {
                min_leaf_size: 6,
                ..Default::default()
            },
            GeneratorConfig {
                ground_variation_chance: 1.5,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                ProceduralGenerator::new(config, Theme::default()),
                Err(DungeonError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_missing_main_floor_tile_is_fatal() {
        let mut theme = Theme::default();
        theme.floor.main = None;
        let gen = ProceduralGenerator::new(GeneratorConfig::default(), theme).unwrap();
        assert!(matches!(gen.generate(1), Err(DungeonError::MissingTile("floor.main"))));
    }

    #[test]
    fn test_single_room_has_no_boss_or_edges() {
        let gen = generator(GeneratorConfig {
            room_count: 1,
            ..GeneratorConfig::default()
        });
        let layout = gen.generate(8).unwrap();
        assert_eq!(layout.rooms.len(), 1);
        assert!(layout.boss_room.is_none());
        assert!(layout.graph.tree.is_empty());
        assert!(layout.graph.extra.is_empty());
    }

    #[test]
    fn test_config_json_defaults_missing_fields() {
        let config: GeneratorConfig = serde_json::from_str(r#"{ "room_count": 5, "carve_mode": "portal" }"#).unwrap();
        assert_eq!(config.room_count, 5);
        assert_eq!(config.carve_mode, CarveMode::Portal);
        assert_eq!(config.map_width, 140);
        assert!(config.validate().is_ok());
    }
}
