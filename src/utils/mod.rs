// src/utils/mod.rs
pub mod geometry;
pub mod rng;
pub mod util;

pub use geometry::{Cell, Line2D, Point2D, RectI};
pub use rng::DungeonRng;
