use glam::Vec3;

/// Interactive orbit-camera state.
///
/// `eye_position` is derived data: it is rewritten from
/// `(azimuth, elevation, radius, focus_position)` by
/// [`ViewParameters::refresh_eye`] before every use and must not be edited
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParameters {
    pub up: Vec3,
    pub eye_position: Vec3,
    pub focus_position: Vec3,
    pub azimuth: f32,
    pub elevation: f32,
    pub radius: f32,
    pub look_sensitivity: f32,
}

impl ViewParameters {
    /// Re-derives `eye_position` from the spherical parameters and returns it.
    pub fn refresh_eye(&mut self) -> Vec3 {
        self.eye_position =
            eye_from_spherical(self.azimuth, self.elevation, self.radius, self.focus_position);
        self.eye_position
    }
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            up: Vec3::new(0.0, -1.0, 0.0),
            eye_position: Vec3::new(5.0, 0.0, 0.0),
            focus_position: Vec3::ZERO,
            azimuth: 0.0,
            elevation: 0.0,
            radius: 5.0,
            look_sensitivity: 100.0,
        }
    }
}

/// Spherical to Cartesian, relative to `focus`.
///
/// Azimuth rotates in the XZ plane starting at +X; elevation lifts toward +Y.
/// `(0, 0, r)` therefore lands on `focus + (r, 0, 0)`.
#[inline]
pub fn eye_from_spherical(azimuth: f32, elevation: f32, radius: f32, focus: Vec3) -> Vec3 {
    let (sin_az, cos_az) = azimuth.sin_cos();
    let (sin_el, cos_el) = elevation.sin_cos();
    focus + radius * Vec3::new(cos_el * cos_az, sin_el, cos_el * sin_az)
}
