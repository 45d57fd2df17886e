// src/error.rs

use thiserror::Error;

/// Errors that abort a single generation call.
///
/// Missing optional assets and geometric infeasibility are *not* errors: they are
/// logged and the affected feature is skipped. Only configuration invariants and
/// required tiles end up here.
#[derive(Debug, Error)]
pub enum DungeonError {
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    #[error("theme is missing required tile: {0}")]
    MissingTile(&'static str),

    #[error("no partition leaf could host a room")]
    NoRooms,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "preview")]
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DungeonError>;
