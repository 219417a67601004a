//! Error types
//!
//! Drawing with no bound surface is not an error; those calls are silent no-ops.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the primitive renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("a regular polygon needs at least 3 sides, got {0}")]
    TooFewSides(u32),
    #[error("side length must be positive, got {0}")]
    NonPositiveSideLength(f32),
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("surface error: {0}")]
    Surface(String),
}

/// Failures while loading sprite images
#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("sprite image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no numbered frames found in {}", .0.display())]
    EmptySequence(PathBuf),
    #[error("bad frame geometry for {}: {detail}", .path.display())]
    Geometry { path: PathBuf, detail: String },
}

/// Failures while reading or writing JSON configuration and scenes
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level application error
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("SDL error: {0}")]
    Sdl(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<String> for EngineError {
    fn from(msg: String) -> Self {
        Self::Sdl(msg)
    }
}
