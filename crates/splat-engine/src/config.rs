use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::sort::{SortCadence, SortFailurePolicy, SortStrategy};
use crate::time::DEFAULT_MAX_FRAMES;
use crate::view::{ProjectionSettings, ViewSettings};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "TelemetryConfig::default_max_frames")]
    pub max_frames: usize,
    /// Log the running FPS every this many drawn frames. 0 disables.
    #[serde(default = "TelemetryConfig::default_log_every_frames")]
    pub log_every_frames: u64,
}

impl TelemetryConfig {
    const fn default_max_frames() -> usize {
        DEFAULT_MAX_FRAMES
    }

    const fn default_log_every_frames() -> u64 {
        600
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            max_frames: Self::default_max_frames(),
            log_every_frames: Self::default_log_every_frames(),
        }
    }
}

/// Everything a [`RenderSession`](crate::session::RenderSession) needs besides
/// the particles themselves. Every field has a default, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_group_size")]
    pub group_size: u32,
    #[serde(default)]
    pub strategy: SortStrategy,
    #[serde(default = "SessionConfig::default_sort_interval")]
    pub sort_interval: u32,
    #[serde(default)]
    pub sort_failure: SortFailurePolicy,
    #[serde(default)]
    pub projection: ProjectionSettings,
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Command-line style overrides applied on top of a loaded config.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigOverrides {
    pub group_size: Option<u32>,
    pub strategy: Option<SortStrategy>,
    pub sort_interval: Option<u32>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("group_size must be at least 1")]
    ZeroGroupSize,

    #[error("sort_interval must be at least 1")]
    ZeroSortInterval,

    #[error("telemetry.max_frames must be at least 1")]
    ZeroMaxFrames,

    #[error("projection needs 0 < near < far and 0 < fov_y < pi (got near {near}, far {far}, fov_y {fov_y})")]
    InvalidProjection { near: f32, far: f32, fov_y: f32 },

    #[error("view.{0} is out of range or not finite")]
    InvalidView(&'static str),
}

impl SessionConfig {
    const fn default_group_size() -> u32 {
        1024
    }

    const fn default_sort_interval() -> u32 {
        1
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &SessionConfigOverrides) {
        if let Some(group_size) = overrides.group_size {
            self.group_size = group_size;
        }
        if let Some(strategy) = overrides.strategy {
            self.strategy = strategy;
        }
        if let Some(interval) = overrides.sort_interval {
            self.sort_interval = interval;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_size == 0 {
            return Err(ConfigError::ZeroGroupSize);
        }
        if self.sort_interval == 0 {
            return Err(ConfigError::ZeroSortInterval);
        }
        if self.telemetry.max_frames == 0 {
            return Err(ConfigError::ZeroMaxFrames);
        }

        let p = &self.projection;
        let projection_ok = p.near > 0.0
            && p.far > p.near
            && p.far.is_finite()
            && p.fov_y > 0.0
            && p.fov_y < std::f32::consts::PI;
        if !projection_ok {
            return Err(ConfigError::InvalidProjection {
                near: p.near,
                far: p.far,
                fov_y: p.fov_y,
            });
        }

        let v = &self.view;
        let positive = |x: f32| x > 0.0 && x.is_finite();
        if !positive(v.radius) {
            return Err(ConfigError::InvalidView("radius"));
        }
        if !positive(v.min_radius) {
            return Err(ConfigError::InvalidView("min_radius"));
        }
        if !v.look_sensitivity.is_finite() {
            return Err(ConfigError::InvalidView("look_sensitivity"));
        }
        if v.max_radius.is_some_and(|r| !(r >= v.min_radius)) {
            return Err(ConfigError::InvalidView("max_radius"));
        }
        if !v.zoom_speed.is_finite() {
            return Err(ConfigError::InvalidView("zoom_speed"));
        }
        if v.elevation_limit.is_some_and(|l| !(l >= 0.0 && l.is_finite())) {
            return Err(ConfigError::InvalidView("elevation_limit"));
        }
        Ok(())
    }

    /// Cadence for `sort_interval`. Call after [`validate`](Self::validate).
    pub fn cadence(&self) -> SortCadence {
        SortCadence::every(self.sort_interval).unwrap_or_default()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            group_size: Self::default_group_size(),
            strategy: SortStrategy::default(),
            sort_interval: Self::default_sort_interval(),
            sort_failure: SortFailurePolicy::default(),
            projection: ProjectionSettings::default(),
            view: ViewSettings::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl SessionConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.group_size.is_none() && self.strategy.is_none() && self.sort_interval.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.group_size.is_some() {
            fields.push("group_size");
        }
        if self.strategy.is_some() {
            fields.push("strategy");
        }
        if self.sort_interval.is_some() {
            fields.push("sort_interval");
        }
        fields
    }
}
