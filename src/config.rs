//! Game configuration
//!
//! Physics tunables and host settings, stored as RON. Every field has a
//! default, so a config file only needs the values it overrides.

use std::fs;
use std::path::Path;

use log::{info, warn};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

use crate::math::{Fixed, FixedPoint};

/// Error type for config loading and saving
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Player movement tunables, in raw fixed-point units per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub gravity: Fixed,
    /// Gravity while rising with jump held
    pub jump_gravity: Fixed,
    pub jump_speed: Fixed,
    pub max_fall_speed: Fixed,
    pub max_walk_speed: Fixed,
    pub ground_accel: Fixed,
    pub air_accel: Fixed,
    pub friction: Fixed,
    /// Hitbox size in pixels
    pub size: (i32, i32),
    /// Hitbox position relative to a spawn point
    pub spawn_offset: FixedPoint,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            gravity: Fixed(0x50),
            jump_gravity: Fixed(0x20),
            jump_speed: Fixed(0x500),
            max_fall_speed: Fixed(0x600),
            max_walk_speed: Fixed(0x32C),
            ground_accel: Fixed(0x55),
            air_accel: Fixed(0x20),
            friction: Fixed(0x33),
            size: (8, 14),
            spawn_offset: FixedPoint::from_pixels(-4, -14),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Window pixels per game pixel
    pub pixel_scale: u32,
    /// Tile edge in pixels for level grids
    pub tile_size: i32,
    /// Game screen size in pixels
    pub screen: (i32, i32),
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            tick_rate: 50,
            pixel_scale: 3,
            tile_size: 8,
            screen: (320, 240),
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::new())?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("config: loaded {}", path.display());
                config
            }
            Err(ConfigError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("config: {} not found, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("config: failed to load {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Duration of one tick in seconds
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_player_constants() {
        let player = PlayerConfig::default();
        assert_eq!(player.gravity, Fixed(80));
        assert_eq!(player.max_fall_speed, Fixed(1536));
        assert_eq!(player.spawn_offset, FixedPoint::from_pixels(-4, -14));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ron");

        let mut config = GameConfig::default();
        config.player.jump_speed = Fixed(0x400);
        config.pixel_scale = 4;
        config.save(&path).unwrap();

        assert_eq!(GameConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = GameConfig::from_ron_str("(tick_rate: 60, player: (gravity: 100))").unwrap();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.player.gravity, Fixed(100));
        assert_eq!(config.player.friction, PlayerConfig::default().friction);
        assert_eq!(config.pixel_scale, 3);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let result = GameConfig::from_ron_str("(tick_rate: \"fast\")");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = GameConfig::load_or_default(dir.path().join("nope.ron"));
        assert_eq!(config, GameConfig::default());
        assert!((config.tick_seconds() - 0.02).abs() < 1e-9);
    }
}
