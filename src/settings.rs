//! Game settings and tuning
//!
//! Loaded from a JSON file when one is supplied; any missing field keeps its
//! default, and an unreadable file falls back to defaults entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for reproducibility
    pub seed: u64,

    // === Arena ===
    /// Side length of the square ground grid (tiles)
    pub map_size: u32,
    /// Number of enemy tanks placed at startup
    pub enemy_count: u32,

    // === Vehicles ===
    /// Player speed (tiles per second)
    pub player_move_speed: f32,
    /// Enemy speed (tiles per second)
    pub enemy_move_speed: f32,
    /// Enemy starting life
    pub enemy_life: i32,

    // === Projectiles ===
    /// Projectile speed (tiles per second)
    pub projectile_speed: f32,
    /// Seconds a projectile flies before expiring
    pub projectile_lifetime: f32,
    /// Life removed from an enemy per hit
    pub projectile_damage: i32,

    // === Effects ===
    /// Size multiplier for enemy explosions
    pub explosion_size: f32,

    // === Viewport ===
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x7A2C_5EED,

            map_size: 10,
            enemy_count: 3,

            player_move_speed: 2.0,
            enemy_move_speed: 1.0,
            enemy_life: 100,

            projectile_speed: 4.0,
            projectile_lifetime: 2.0,
            projectile_damage: 25,

            explosion_size: 2.0,

            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings at {} ({}); using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Viewport aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.viewport_width as f32 / self.viewport_height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "enemy_count": 7, "seed": 42 }"#).unwrap();
        assert_eq!(settings.enemy_count, 7);
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.player_move_speed, 2.0);
        assert_eq!(settings.enemy_life, 100);
    }

    #[test]
    fn test_json_roundtrip_preserves_tuning() {
        let mut settings = Settings::default();
        settings.projectile_damage = 50;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load("/nonexistent/tank-arena/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_aspect_ratio() {
        let settings = Settings::default();
        assert!((settings.aspect_ratio() - 1280.0 / 720.0).abs() < 1e-6);
    }
}
