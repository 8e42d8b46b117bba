//! Game configuration (window, presentation, controls). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};

/// Persistent settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Start in borderless fullscreen.
    #[serde(default)]
    pub fullscreen: bool,
    /// Multiplier on raw pointer deltas (1.0 = one degree per pixel).
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    /// Camera follow distance behind the bike.
    #[serde(default = "default_follow_radius")]
    pub follow_radius: f32,
    /// Fixed seed for sphere placement; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Fire at the crosshair instead of the pointer.
    #[serde(default)]
    pub fire_at_crosshair: bool,
}

fn default_window_width() -> u32 {
    800
}
fn default_window_height() -> u32 {
    600
}
fn default_true() -> bool {
    true
}
fn default_sensitivity() -> f32 {
    1.0
}
fn default_follow_radius() -> f32 {
    10.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            fullscreen: false,
            sensitivity: default_sensitivity(),
            follow_radius: default_follow_radius(),
            seed: None,
            fire_at_crosshair: false,
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. An invalid file gives defaults; a missing
    /// one gives defaults and writes them out for editing.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save();
                config
            }
            Err(e) => {
                log::warn!("Could not read config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Parse RON text; absent fields take their defaults.
    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = GameConfig::parse("(window_width: 1024, seed: Some(7))").unwrap();
        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.follow_radius, 10.0);
        assert!(config.vsync);
        assert!(!config.fire_at_crosshair);
    }

    #[test]
    fn empty_struct_is_default() {
        assert_eq!(GameConfig::parse("()").unwrap(), GameConfig::default());
    }

    #[test]
    fn round_trips_through_pretty_ron() {
        let config = GameConfig {
            sensitivity: 0.5,
            fire_at_crosshair: true,
            ..Default::default()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(GameConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(GameConfig::parse("window_width = 3").is_err());
    }
}
