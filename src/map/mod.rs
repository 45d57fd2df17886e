// src/map/mod.rs
pub mod direction;
pub mod room;
pub mod thing;
pub mod tile_layer;

pub use direction::{Direction, DoorMask};
pub use room::{PortalInfo, Room};
pub use thing::{Thing, ThingGroup, ThingKind};
pub use tile_layer::{Grid, TileId, TileLayer, TileLayers, WallTile};
