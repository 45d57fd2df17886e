// src/bsp/mod.rs
pub mod bsp_graph;
pub mod bsp_node;
pub mod bsp_partition;
pub mod bsp_procedural;
pub mod bsp_rooms;
pub mod debug_viz;

pub use bsp_graph::{ConnectionGraph, Edge};
pub use bsp_node::{Leaf, SplitAxis};
pub use bsp_partition::SpacePartitioner;
pub use bsp_procedural::{GenerationStats, GeneratorConfig, ProceduralGenerator};
pub use bsp_rooms::{RoomPlacement, RoomPlacer};

// Constants
pub const PARTITION_GUARD: usize = 10_000; // Upper bound on split attempts per pass
pub const SPLIT_RATIO: f64 = 1.25; // Aspect ratio that forces the split axis
