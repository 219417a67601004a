//! Application configuration, loaded from JSON with defaults for every field.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::display::{Color, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::ConfigError;
use crate::geometry::{Point2D, Rect};

pub const DEFAULT_CONFIG_PATH: &str = "rastertoy.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub background: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "2D Engine with Precise Hitboxes".into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            background: Color::rgb(50, 50, 50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start: Point2D,
    /// World units per update tick
    pub speed: f32,
    pub frame_time: f32,
    pub idle_timeout: f32,
    pub sprite_dir: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: Point2D::new(400.0, 300.0),
            speed: 5.0,
            frame_time: crate::animation::DEFAULT_FRAME_TIME,
            idle_timeout: crate::player::DEFAULT_IDLE_TIMEOUT,
            sprite_dir: None,
        }
    }
}

/// Mouse-driven fill colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub flood_color: Color,
    pub boundary_fill_color: Color,
    pub boundary_color: Color,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            flood_color: Color::BLUE,
            boundary_fill_color: Color::YELLOW,
            boundary_color: Color::RED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    /// Defaults to the whole window
    pub world_bounds: Option<Rect>,
    /// Defaults to the built-in demo scene
    pub scene_path: Option<PathBuf>,
    /// Animation time step per update tick, in seconds
    pub tick_dt: f32,
    pub fill: FillConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            player: PlayerConfig::default(),
            world_bounds: None,
            scene_path: None,
            tick_dt: 0.016,
            fill: FillConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `path`; a missing file gives the defaults, a malformed one is an error
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn world_bounds(&self) -> Rect {
        self.world_bounds.unwrap_or_else(|| {
            Rect::new(0.0, 0.0, self.window.width as f32, self.window.height as f32)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"window": {"width": 1024}, "player": {"speed": 3.0}}"#)
                .unwrap();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.player.speed, 3.0);
        assert_eq!(config.player.start, Point2D::new(400.0, 300.0));
        assert_eq!(config.fill.boundary_color, Color::RED);
    }

    #[test]
    fn test_world_bounds_follow_window() {
        let mut config = AppConfig::default();
        config.window.width = 640;
        assert_eq!(config.world_bounds(), Rect::new(0.0, 0.0, 640.0, 600.0));
        config.world_bounds = Some(Rect::new(10.0, 10.0, 100.0, 100.0));
        assert_eq!(config.world_bounds().left, 10.0);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load_or_default(Path::new("/nonexistent/rastertoy.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = std::env::temp_dir().join(format!("rastertoy-config-{}.json", std::process::id()));
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_or_default(&path),
            Err(ConfigError::Json(_))
        ));
        let _ = fs::remove_file(&path);
    }
}
