// src/theme.rs

use crate::error::Result;
use crate::map::{TileId, WallTile};
use crate::utils::DungeonRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A spawnable object reference. `footprint` is the half-size, in tiles, of the
/// square the object blocks (0 = its own cell only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefab {
    pub id: String,
    #[serde(default = "default_footprint")]
    pub footprint: u8,
}

fn default_footprint() -> u8 {
    1
}

impl Prefab {
    pub fn new(id: &str, footprint: u8) -> Self {
        Prefab {
            id: id.to_string(),
            footprint,
        }
    }
}

/// Lists may contain `null` entries; those are logged and skipped at spawn time.
pub type PrefabList = Vec<Option<Prefab>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPalette {
    pub main: Option<TileId>,
    #[serde(default)]
    pub variations: Vec<TileId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallPalette {
    pub top_a: Option<TileId>,
    pub top_b: Option<TileId>,
    pub bottom_a: Option<TileId>,
    pub bottom_b: Option<TileId>,
    pub corner_top_left: Option<TileId>,
    pub corner_top_right: Option<TileId>,
    pub corner_bottom_left: Option<TileId>,
    pub corner_bottom_right: Option<TileId>,
    pub left: Option<TileId>,
    pub right: Option<TileId>,
    pub inner_top_left: Option<TileId>,
    pub inner_top_right: Option<TileId>,
    pub inner_bottom_left: Option<TileId>,
    pub inner_bottom_right: Option<TileId>,
}

impl WallPalette {
    /// Tile for a classified wall cell, applying the fallback chain
    /// (sides fall back to `top_a`, generic edges to `top_a` then `bottom_a`).
    pub fn tile_for(&self, kind: WallTile) -> Option<TileId> {
        match kind {
            WallTile::TopA => self.top_a,
            WallTile::TopB => self.top_b.or(self.top_a),
            WallTile::BottomA => self.bottom_a,
            WallTile::BottomB => self.bottom_b.or(self.bottom_a),
            WallTile::Left => self.left.or(self.top_a),
            WallTile::Right => self.right.or(self.top_a),
            WallTile::Edge => self.top_a.or(self.bottom_a),
            WallTile::CornerTopLeft => self.corner_top_left,
            WallTile::CornerTopRight => self.corner_top_right,
            WallTile::CornerBottomLeft => self.corner_bottom_left,
            WallTile::CornerBottomRight => self.corner_bottom_right,
            WallTile::InnerTopLeft => self.inner_top_left,
            WallTile::InnerTopRight => self.inner_top_right,
            WallTile::InnerBottomLeft => self.inner_bottom_left,
            WallTile::InnerBottomRight => self.inner_bottom_right,
        }
    }
}

/// Parameters of one cellular-automaton call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaParams {
    pub density: f64,
    pub iterations: u32,
    pub survive_min: u8,
    pub birth_min: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathParams {
    pub enabled: bool,
    /// Radius around a portal cell that gets `portal_density`.
    pub portal_seed_radius: f64,
    pub portal_density: f64,
    pub ambient_density: f64,
    pub iterations: u32,
    pub survive_min: u8,
    pub birth_min: u8,
    pub cleanup_min_neighbors: u8,
    pub cleanup_max_iterations: u32,
}

impl Default for PathParams {
    fn default() -> Self {
        PathParams {
            enabled: true,
            portal_seed_radius: 3.0,
            portal_density: 0.65,
            ambient_density: 0.1,
            iterations: 4,
            survive_min: 4,
            birth_min: 5,
            cleanup_min_neighbors: 3,
            cleanup_max_iterations: 2,
        }
    }
}

/// Everything a chapter supplies to the generator: tiles, prefabs, CA tuning.
///
/// Pure data. The generator reads it and never writes it back; boss rooms boost
/// decoration density on a copy of [`CaParams`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub name: String,
    pub floor: FloorPalette,
    pub walls: WallPalette,
    pub outside_tiles: Vec<TileId>,
    pub path_tile: Option<TileId>,
    pub hazard_tiles: Vec<TileId>,

    pub blocking_obstacles: PrefabList,
    pub decorations: PrefabList,
    pub particle_effects: PrefabList,
    pub common_enemies: PrefabList,
    pub boss: Option<Prefab>,
    pub portal: Option<Prefab>,

    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,

    pub decoration: CaParams,
    pub paths: PathParams,
}

impl Default for Theme {
    fn default() -> Self {
        let t = TileId;
        Theme {
            name: "crypt".to_string(),
            floor: FloorPalette {
                main: Some(t(1)),
                variations: vec![t(2), t(3), t(4)],
            },
            walls: WallPalette {
                top_a: Some(t(10)),
                top_b: Some(t(11)),
                bottom_a: Some(t(12)),
                bottom_b: Some(t(13)),
                corner_top_left: Some(t(14)),
                corner_top_right: Some(t(15)),
                corner_bottom_left: Some(t(16)),
                corner_bottom_right: Some(t(17)),
                left: Some(t(18)),
                right: Some(t(19)),
                inner_top_left: Some(t(20)),
                inner_top_right: Some(t(21)),
                inner_bottom_left: Some(t(22)),
                inner_bottom_right: Some(t(23)),
            },
            outside_tiles: vec![t(30), t(31)],
            path_tile: Some(t(40)),
            hazard_tiles: vec![t(50)],
            blocking_obstacles: vec![Some(Prefab::new("pillar", 1)), Some(Prefab::new("rubble", 0))],
            decorations: vec![Some(Prefab::new("moss", 0)), Some(Prefab::new("bones", 0))],
            particle_effects: vec![Some(Prefab::new("dust", 0))],
            common_enemies: vec![Some(Prefab::new("skeleton", 0)), Some(Prefab::new("slime", 0))],
            boss: Some(Prefab::new("lich", 1)),
            portal: Some(Prefab::new("portal", 0)),
            ambient_color: [0.8, 0.78, 0.9],
            ambient_intensity: 1.0,
            decoration: CaParams {
                density: 0.3,
                iterations: 5,
                survive_min: 4,
                birth_min: 3,
            },
            paths: PathParams::default(),
        }
    }
}

impl Default for FloorPalette {
    fn default() -> Self {
        FloorPalette {
            main: None,
            variations: Vec::new(),
        }
    }
}

impl Default for CaParams {
    fn default() -> Self {
        CaParams {
            density: 0.3,
            iterations: 5,
            survive_min: 4,
            birth_min: 3,
        }
    }
}

impl FloorPalette {
    /// The main tile, or with probability `chance` a random variation.
    pub fn pick(&self, chance: f64, rng: &mut DungeonRng) -> Option<TileId> {
        if self.variations.is_empty() {
            return self.main;
        }
        if rng.chance(chance) {
            return rng.pick(&self.variations).copied();
        }
        self.main
    }
}

impl Theme {
    /// Random outside tile, falling back to ground tiles when the theme has none.
    pub fn pick_outside(&self, ground_chance: f64, rng: &mut DungeonRng) -> Option<TileId> {
        match rng.pick(&self.outside_tiles) {
            Some(t) => Some(*t),
            None => self.floor.pick(ground_chance, rng),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_is_complete() {
        let theme = Theme::default();
        assert!(theme.floor.main.is_some());
        assert!(theme.boss.is_some());
        assert!(theme.path_tile.is_some());
        assert!(!theme.hazard_tiles.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let theme = Theme::from_json_str(
            r#"{ "name": "swamp", "floor": { "main": 7 }, "common_enemies": [ { "id": "frog" }, null ] }"#,
        )
        .unwrap();
        assert_eq!(theme.name, "swamp");
        assert_eq!(theme.floor.main, Some(TileId(7)));
        assert!(theme.floor.variations.is_empty());
        assert_eq!(theme.common_enemies.len(), 2);
        assert_eq!(theme.common_enemies[0].as_ref().unwrap().footprint, 1);
        assert!(theme.common_enemies[1].is_none());
        // untouched sections keep the built-in values
        assert_eq!(theme.decoration.iterations, 5);
    }

    #[test]
    fn test_wall_fallbacks() {
        let palette = WallPalette {
            top_a: Some(TileId(10)),
            bottom_a: Some(TileId(12)),
            ..Default::default()
        };
        assert_eq!(palette.tile_for(WallTile::Left), Some(TileId(10)));
        assert_eq!(palette.tile_for(WallTile::TopB), Some(TileId(10)));
        assert_eq!(palette.tile_for(WallTile::BottomB), Some(TileId(12)));
        assert_eq!(palette.tile_for(WallTile::InnerTopLeft), None);

        let bottom_only = WallPalette {
            bottom_a: Some(TileId(12)),
            ..Default::default()
        };
        assert_eq!(bottom_only.tile_for(WallTile::Edge), Some(TileId(12)));
    }

    #[test]
    fn test_floor_pick_without_variations_is_main() {
        let mut rng = DungeonRng::from_seed(12);
        let palette = FloorPalette {
            main: Some(TileId(1)),
            variations: Vec::new(),
        };
        for _ in 0..10 {
            assert_eq!(palette.pick(1.0, &mut rng), Some(TileId(1)));
        }

        let mut theme = Theme::default();
        theme.outside_tiles.clear();
        theme.floor.variations.clear();
        assert_eq!(theme.pick_outside(0.3, &mut rng), Some(TileId(1)));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Theme::from_json_str("{ not json").is_err());
    }
}
