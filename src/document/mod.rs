// src/document/mod.rs
mod document;
pub mod validate;

pub use self::document::{DungeonLayout, LayerKind, RoomBrief};
pub use self::validate::{check_layout, LayoutViolation};
