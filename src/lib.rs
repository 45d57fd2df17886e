// src/lib.rs

//! Deterministic 2D dungeon generation: binary space partition, spanning-tree
//! connections, corridor or portal carving, wall classification and
//! cellular-automaton room population.

pub mod automaton;
pub mod bsp;
pub mod carve;
pub mod document;
pub mod error;
pub mod map;
pub mod populate;
pub mod theme;
pub mod utils;

pub use bsp::{GeneratorConfig, ProceduralGenerator};
pub use document::{DungeonLayout, RoomBrief};
pub use error::{DungeonError, Result};
pub use theme::Theme;
