// Application configuration.
//
// Every section is `#[serde(default)]`, so a config file only needs to name
// the values it overrides. The file is TOML and is located through the
// SAKURA_BACKDROP_CONFIG environment variable; without it the defaults below
// reproduce the classic backdrop look.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::engine::DisplayMode;

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV_VAR: &str = "SAKURA_BACKDROP_CONFIG";

/// Smallest accepted lattice spacing. Anything finer makes the per-frame
/// pair pass unaffordable.
pub const MIN_GRID_SIZE: f32 = 8.0;

/// Root of the configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub field: FieldConfig,
    pub window: WindowConfig,
    pub debug: DebugConfig,
}

/// Tunables of the point field. Units are logical (layout) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Lattice spacing between neighbouring points.
    pub grid_size: f32,
    /// Jitter span as a fraction of `grid_size`; each axis moves by up to half of it.
    pub jitter: f32,
    /// Opacity floor of every point.
    pub base_alpha: f32,
    /// Extra opacity of a point sitting exactly under the pointer.
    pub illumination_boost: f32,
    /// Points closer than this to the pointer are illuminated.
    pub hover_radius: f32,
    /// Points closer than this to each other are candidates for an edge.
    pub connection_distance: f32,
    /// Degree cap: most edges a point may take part in per frame.
    pub max_connections: u32,
    pub point_radius: f32,
    pub line_width: f32,
    /// Largest accepted viewport side. Larger sizes are clamped.
    pub max_extent: f32,
    /// Upper bound on the point count. The lattice spacing is widened
    /// until the field fits.
    pub max_points: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            grid_size: 50.0,
            jitter: 0.2,
            base_alpha: 0.1,
            illumination_boost: 0.5,
            hover_radius: 150.0,
            connection_distance: 80.0,
            max_connections: 3,
            point_radius: 1.5,
            line_width: 1.0,
            max_extent: 8192.0,
            max_points: 40_000,
        }
    }
}

impl FieldConfig {
    /// Replace unusable values (non-finite, non-positive where a positive
    /// value is required) with their defaults. Logs each repair.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive = |name: &str, value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                log::warn!("field.{name} = {value} is invalid, using {fallback}");
                fallback
            }
        };
        let non_negative = |name: &str, value: f32, fallback: f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                log::warn!("field.{name} = {value} is invalid, using {fallback}");
                fallback
            }
        };

        let mut grid_size = positive("grid_size", self.grid_size, defaults.grid_size);
        if grid_size < MIN_GRID_SIZE {
            log::warn!("field.grid_size = {grid_size} is too fine, using {MIN_GRID_SIZE}");
            grid_size = MIN_GRID_SIZE;
        }
        let max_points = if self.max_points == 0 {
            log::warn!("field.max_points = 0 is invalid, using {}", defaults.max_points);
            defaults.max_points
        } else {
            self.max_points
        };

        Self {
            grid_size,
            jitter: non_negative("jitter", self.jitter, defaults.jitter).min(1.0),
            base_alpha: non_negative("base_alpha", self.base_alpha, defaults.base_alpha),
            illumination_boost: non_negative(
                "illumination_boost",
                self.illumination_boost,
                defaults.illumination_boost,
            ),
            hover_radius: positive("hover_radius", self.hover_radius, defaults.hover_radius),
            connection_distance: positive(
                "connection_distance",
                self.connection_distance,
                defaults.connection_distance,
            ),
            max_connections: self.max_connections,
            point_radius: positive("point_radius", self.point_radius, defaults.point_radius),
            line_width: positive("line_width", self.line_width, defaults.line_width),
            max_extent: positive("max_extent", self.max_extent, defaults.max_extent),
            max_points,
        }
    }
}

/// Host window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
    /// Fixed display mode. `None` follows the system theme.
    pub display_mode: Option<DisplayMode>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Sakura Backdrop".to_string(),
            width: 1280,
            height: 720,
            display_mode: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Show the F3 stats panel on startup.
    pub show_stats: bool,
}

impl AppConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(text).context("invalid backdrop config")?;
        config.field = config.field.sanitized();
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in config file {}", path.display()))
    }

    /// Load from the file named by `SAKURA_BACKDROP_CONFIG`, falling back to
    /// defaults when the variable is unset or the file is unusable.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            log::info!("{CONFIG_ENV_VAR} not set, using default config");
            return Self::default();
        };

        match Self::load(Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded config from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                log::warn!("{e:#}; using default config");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.field.grid_size, 50.0);
        assert_eq!(config.field.max_connections, 3);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [field]
            hover_radius = 200.0
            max_connections = 5

            [window]
            display_mode = "light"

            [debug]
            show_stats = true
            "#,
        )
        .unwrap();

        assert_eq!(config.field.hover_radius, 200.0);
        assert_eq!(config.field.max_connections, 5);
        assert_eq!(config.field.grid_size, 50.0);
        assert_eq!(config.window.display_mode, Some(DisplayMode::Light));
        assert_eq!(config.window.width, 1280);
        assert!(config.debug.show_stats);
    }

    #[test]
    fn invalid_tunables_are_repaired() {
        let config = AppConfig::from_toml(
            r#"
            [field]
            grid_size = -10.0
            connection_distance = 0.0
            jitter = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(config.field.grid_size, 50.0);
        assert_eq!(config.field.connection_distance, 80.0);
        assert_eq!(config.field.jitter, 1.0);
    }

    #[test]
    fn too_fine_grid_is_floored() {
        let config = AppConfig::from_toml("[field]\ngrid_size = 0.5\nmax_points = 0").unwrap();
        assert_eq!(config.field.grid_size, MIN_GRID_SIZE);
        assert_eq!(config.field.max_points, 40_000);
    }

    #[test]
    fn sample_config_matches_defaults() {
        let config = AppConfig::from_toml(include_str!("../sakura_backdrop.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(AppConfig::from_toml("[field\ngrid_size = ").is_err());
        assert!(AppConfig::from_toml("[window]\ndisplay_mode = \"sepia\"").is_err());
    }

    #[test]
    fn missing_file_is_an_error_with_path() {
        let err = AppConfig::load(Path::new("/nonexistent/backdrop.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/backdrop.toml"));
    }
}
