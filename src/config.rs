//! Viewer Configuration
//!
//! Configuration can be loaded from:
//! - Default values
//! - Config file (~/.config/appendix-tree/viewer.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory or base URL holding the catalog and appendix documents
    pub data_root: String,

    /// Catalog manifest path, relative to `data_root`
    pub manifest: String,

    /// Tree layout and animation settings
    pub layout: LayoutConfig,
}

/// Space around the drawn tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Tree layout, viewport and transition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Margin between canvas edge and the tree
    pub margin: Margin,

    /// Canvas width used on wide screens
    pub canvas_width: f32,

    /// Canvas height used on wide screens
    pub canvas_height: f32,

    /// Canvas height used below the mobile breakpoint
    pub mobile_canvas_height: f32,

    /// Available widths below this count as mobile
    pub mobile_breakpoint: f32,

    /// Node circle radius
    pub node_radius: f32,

    /// Duration of enter/update/exit transitions (ms)
    pub transition_ms: u64,

    /// Duration of the animated view reset (ms)
    pub reset_ms: u64,

    /// Zoom bounds
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_root: "./data".to_string(),
            manifest: "config.json".to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 120.0,
            bottom: 20.0,
            left: 120.0,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            canvas_width: 1400.0,
            canvas_height: 800.0,
            mobile_canvas_height: 600.0,
            mobile_breakpoint: 768.0,
            node_radius: 8.0,
            transition_ms: 750,
            reset_ms: 500,
            min_scale: 0.5,
            max_scale: 5.0,
        }
    }
}

impl LayoutConfig {
    /// Transition duration in seconds
    pub fn transition_secs(&self) -> f32 {
        Duration::from_millis(self.transition_ms).as_secs_f32()
    }

    /// View reset duration in seconds
    pub fn reset_secs(&self) -> f32 {
        Duration::from_millis(self.reset_ms).as_secs_f32()
    }

    /// Replace unusable zoom bounds (inverted, non-finite or non-positive) with
    /// the defaults
    pub fn validated(mut self) -> Self {
        let usable = |scale: f32| scale.is_finite() && scale > 0.0;
        if !(usable(self.min_scale) && usable(self.max_scale) && self.min_scale <= self.max_scale) {
            let defaults = Self::default();
            log::warn!(
                "Invalid zoom bounds [{}, {}], using [{}, {}]",
                self.min_scale,
                self.max_scale,
                defaults.min_scale,
                defaults.max_scale
            );
            self.min_scale = defaults.min_scale;
            self.max_scale = defaults.max_scale;
        }
        self
    }

    /// Canvas size for the space available to the viewer
    pub fn canvas_size(&self, available_width: f32) -> (f32, f32) {
        if available_width < self.mobile_breakpoint {
            (available_width, self.mobile_canvas_height)
        } else {
            (self.canvas_width, self.canvas_height)
        }
    }
}

impl ViewerConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("appendix-tree/viewer.toml"))
            .unwrap_or_else(|| PathBuf::from("viewer.toml"))
    }

    /// Load configuration from the default file, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No viewer config at {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<ViewerConfig>(&content) {
                Ok(mut config) => {
                    log::info!("Loaded viewer config from {:?}", path);
                    config.layout = config.layout.validated();
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
