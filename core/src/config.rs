//! Tunables for dragging and weaving.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeaveStyle {
    #[default]
    Helix,
    Arch,
}

/// Shape of the detour a rope takes over a crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaveConfig {
    pub style: WeaveStyle,
    /// Radius of the rendered tube
    pub tube_radius: f64,
    /// Peak lift toward the viewer
    pub height: f64,
    pub wrap_count: u32,
    pub samples: u32,
    /// Clearance added to the tube radius for the wrap
    pub radius_margin: f64,
    /// Extent of the helix along the rope
    pub progress_length: f64,
    /// Extent of the arch along the rope
    pub arch_length: f64,
    pub arch_samples: u32,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            style: WeaveStyle::Helix,
            tube_radius: 0.08,
            height: 0.8,
            wrap_count: 1,
            samples: 20,
            radius_margin: 0.15,
            progress_length: 0.8,
            arch_length: 0.5,
            arch_samples: 10,
        }
    }
}

impl WeaveConfig {
    /// Repair out-of-range values instead of rejecting them.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();
        if !(config.height > 0.0) {
            config.height = defaults.height;
        }
        config.wrap_count = config.wrap_count.max(1);
        config.samples = config.samples.clamp(5, 100);
        config.arch_samples = config.arch_samples.clamp(5, 100);
        config
    }
}

/// Drag feel and the durations handed to the animation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Maximum distance from the pointer to a slot for a snap
    pub snap_radius: f64,
    /// Pin scale multiplier while held
    pub drag_scale: f64,
    /// Seconds
    pub snap_duration: f64,
    pub rollback_duration: f64,
    pub scale_duration: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            snap_radius: 1.0,
            drag_scale: 1.2,
            snap_duration: 0.25,
            rollback_duration: 0.3,
            scale_duration: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub drag: DragConfig,
    pub weave: WeaveConfig,
}

impl PuzzleConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("drag.snap_radius", self.drag.snap_radius),
            ("drag.drag_scale", self.drag.drag_scale),
            ("weave.tube_radius", self.weave.tube_radius),
            ("weave.height", self.weave.height),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        let durations = [
            ("drag.snap_duration", self.drag.snap_duration),
            ("drag.rollback_duration", self.drag.rollback_duration),
            ("drag.scale_duration", self.drag.scale_duration),
        ];
        for (field, value) in durations {
            if !(value >= 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        Ok(())
    }
}
