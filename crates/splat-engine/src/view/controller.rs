use glam::Vec3;
use serde::Deserialize;

use super::params::ViewParameters;
use super::transform::{CameraTransform, ProjectionSettings};
use super::viewport::Viewport;

/// Initial view and interaction tuning.
///
/// The first block seeds `ViewParameters`; the second block configures how
/// input deltas map onto them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub up: Vec3,
    pub focus: Vec3,
    pub azimuth: f32,
    pub elevation: f32,
    pub radius: f32,
    /// Degrees swept by dragging across the full viewport.
    pub look_sensitivity: f32,

    /// Exponential dolly rate per wheel pixel.
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: Option<f32>,
    /// Symmetric elevation clamp in radians. `None` lets the orbit cross the poles.
    pub elevation_limit: Option<f32>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        let params = ViewParameters::default();
        Self {
            up: params.up,
            focus: params.focus_position,
            azimuth: params.azimuth,
            elevation: params.elevation,
            radius: params.radius,
            look_sensitivity: params.look_sensitivity,
            zoom_speed: 0.001,
            min_radius: 1e-3,
            max_radius: None,
            elevation_limit: None,
        }
    }
}

impl ViewSettings {
    /// Builds the initial parameters, with the eye already derived.
    pub fn initial_params(&self) -> ViewParameters {
        let mut params = ViewParameters {
            up: self.up,
            eye_position: Vec3::ZERO,
            focus_position: self.focus,
            azimuth: self.azimuth,
            elevation: self.elevation,
            radius: self.radius.max(self.min_radius),
            look_sensitivity: self.look_sensitivity,
        };
        params.refresh_eye();
        params
    }
}

/// Maps input deltas onto `ViewParameters` and derives per-frame matrices.
#[derive(Debug, Clone)]
pub struct ViewController {
    projection: ProjectionSettings,
    zoom_speed: f32,
    min_radius: f32,
    max_radius: f32,
    elevation_limit: Option<f32>,
}

impl ViewController {
    pub fn new(settings: &ViewSettings, projection: ProjectionSettings) -> Self {
        let min_radius = if settings.min_radius > 0.0 { settings.min_radius } else { 1e-3 };
        Self {
            projection,
            zoom_speed: settings.zoom_speed,
            min_radius,
            max_radius: settings.max_radius.unwrap_or(f32::INFINITY).max(min_radius),
            elevation_limit: settings.elevation_limit.filter(|l| l.is_finite()).map(f32::abs),
        }
    }

    pub fn projection(&self) -> &ProjectionSettings {
        &self.projection
    }

    pub fn min_radius(&self) -> f32 {
        self.min_radius
    }

    /// Applies a pointer drag given in pixels.
    pub fn update_from_pointer_drag(
        &self,
        delta_x: f32,
        delta_y: f32,
        viewport: Viewport,
        params: &mut ViewParameters,
    ) {
        if !viewport.is_valid() {
            return;
        }

        let d_azimuth = (delta_x * params.look_sensitivity / viewport.width).to_radians();
        let d_elevation = (delta_y * params.look_sensitivity / viewport.height).to_radians();
        if !d_azimuth.is_finite() || !d_elevation.is_finite() {
            return;
        }

        params.azimuth += d_azimuth;
        params.elevation += d_elevation;
        if let Some(limit) = self.elevation_limit {
            params.elevation = params.elevation.clamp(-limit, limit);
        }
    }

    /// Applies a wheel delta given in pixels. Positive values dolly out.
    pub fn update_from_wheel(&self, delta_y: f32, params: &mut ViewParameters) {
        let radius = params.radius * (delta_y * self.zoom_speed).exp();
        if !radius.is_finite() {
            return;
        }
        params.radius = radius.clamp(self.min_radius, self.max_radius);
    }

    /// Re-derives the eye position and builds this frame's matrices.
    pub fn compute_transform(&self, viewport: Viewport, params: &mut ViewParameters) -> CameraTransform {
        params.refresh_eye();
        CameraTransform::from_params(params, viewport.aspect(), &self.projection)
    }
}
