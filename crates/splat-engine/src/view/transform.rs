use glam::{Mat4, Vec3};
use serde::Deserialize;

use super::params::ViewParameters;

/// Perspective parameters. Fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 20.0,
        }
    }
}

impl ProjectionSettings {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, aspect.max(1e-4), self.near, self.far)
    }
}

/// Matrices for one frame. Recomputed every tick, never stored across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub proj: Mat4,
    pub view: Mat4,
    pub view_proj: Mat4,
}

impl CameraTransform {
    /// Builds the transform from already-refreshed parameters. No side effects.
    pub fn from_params(params: &ViewParameters, aspect: f32, projection: &ProjectionSettings) -> Self {
        let proj = projection.matrix(aspect);
        let view = look_at(params.eye_position, params.focus_position, params.up);
        Self {
            proj,
            view,
            view_proj: proj * view,
        }
    }

    /// World-space direction the camera looks along.
    pub fn forward(&self) -> Vec3 {
        -self.view.row(2).truncate()
    }
}

/// Right-handed look-at that stays finite when the view direction is parallel
/// to `up` (an unclamped orbit crossing a pole).
fn look_at(eye: Vec3, focus: Vec3, up: Vec3) -> Mat4 {
    let dir = focus - eye;
    let up = if dir.cross(up).length_squared() <= f32::EPSILON * dir.length_squared().max(1.0) {
        dir.any_orthogonal_vector()
    } else {
        up
    };
    Mat4::look_at_rh(eye, focus, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finite(m: &Mat4) -> bool {
        m.to_cols_array().iter().all(|v| v.is_finite())
    }

    #[test]
    fn view_direction_row_is_parallel_to_minus_x() {
        let params = ViewParameters {
            eye_position: Vec3::new(5.0, 0.0, 0.0),
            focus_position: Vec3::ZERO,
            up: Vec3::new(0.0, -1.0, 0.0),
            ..ViewParameters::default()
        };
        let xf = CameraTransform::from_params(&params, 16.0 / 9.0, &ProjectionSettings::default());
        let row = xf.view.row(2).truncate().normalize();
        assert!(row.cross(Vec3::NEG_X).length() < 1e-6);
        assert!(xf.forward().abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn pole_crossing_stays_finite() {
        let params = ViewParameters {
            eye_position: Vec3::new(0.0, 5.0, 0.0),
            ..ViewParameters::default()
        };
        let xf = CameraTransform::from_params(&params, 1.0, &ProjectionSettings::default());
        assert!(finite(&xf.view));
        assert!(finite(&xf.view_proj));
    }

    #[test]
    fn view_proj_is_product() {
        let params = ViewParameters::default();
        let projection = ProjectionSettings::default();
        let xf = CameraTransform::from_params(&params, 2.0, &projection);
        assert!(xf.view_proj.abs_diff_eq(projection.matrix(2.0) * xf.view, 1e-6));
    }
}
