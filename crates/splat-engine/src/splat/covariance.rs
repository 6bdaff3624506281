use glam::{Mat3, Quat, Vec3};

/// Covariance arrays split the way the attribute textures store them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Covariance3d {
    /// `(Σxx, Σyy, Σzz)`
    pub diag: Vec<[f32; 3]>,
    /// `(Σxy, Σxz, Σyz)`
    pub upper: Vec<[f32; 3]>,
}

/// Rotation matrix of a rotor given as `[scalar, yz, zx, xy]`.
///
/// The bivector parts map onto quaternion `(x, y, z)`; the rotor is normalized
/// first and a zero rotor is treated as the identity.
pub fn rotor_to_rotation_matrix(rotor: [f32; 4]) -> Mat3 {
    let [s, yz, zx, xy] = rotor;
    let q = Quat::from_xyzw(yz, zx, xy, s);
    let len = q.length();
    if len <= f32::EPSILON || !len.is_finite() {
        return Mat3::IDENTITY;
    }
    Mat3::from_quat(q / len)
}

/// Derives `Σ = R S Sᵀ Rᵀ` for every particle.
///
/// Called once at load time. Mismatched input lengths are truncated to the
/// shorter array.
pub fn rotors_to_cov3d(scales: &[[f32; 3]], rotors: &[[f32; 4]]) -> Covariance3d {
    let n = scales.len().min(rotors.len());
    let mut out = Covariance3d {
        diag: Vec::with_capacity(n),
        upper: Vec::with_capacity(n),
    };

    for (scale, rotor) in scales.iter().zip(rotors.iter()) {
        let r = rotor_to_rotation_matrix(*rotor);
        let s = Vec3::from_array(*scale);
        let rs = Mat3::from_cols(r.x_axis * s.x, r.y_axis * s.y, r.z_axis * s.z);
        let cov = rs * rs.transpose();

        out.diag.push([cov.x_axis.x, cov.y_axis.y, cov.z_axis.z]);
        out.upper.push([cov.y_axis.x, cov.z_axis.x, cov.z_axis.y]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rotor_gives_squared_scales() {
        let cov = rotors_to_cov3d(&[[1.0, 2.0, 3.0]], &[[1.0, 0.0, 0.0, 0.0]]);
        assert_eq!(cov.diag[0], [1.0, 4.0, 9.0]);
        assert_eq!(cov.upper[0], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn quarter_turn_about_z_swaps_x_and_y() {
        let half = std::f32::consts::FRAC_PI_4;
        // Rotation by 90 degrees in the xy plane.
        let rotor = [half.cos(), 0.0, 0.0, half.sin()];
        let cov = rotors_to_cov3d(&[[2.0, 1.0, 1.0]], &[rotor]);
        let [xx, yy, zz] = cov.diag[0];
        assert!((xx - 1.0).abs() < 1e-5);
        assert!((yy - 4.0).abs() < 1e-5);
        assert!((zz - 1.0).abs() < 1e-5);
        assert!(cov.upper[0].iter().all(|v| v.abs() < 1e-5));
    }

    #[test]
    fn unnormalized_and_zero_rotors_are_handled() {
        let a = rotor_to_rotation_matrix([2.0, 0.0, 0.0, 0.0]);
        let b = rotor_to_rotation_matrix([0.0; 4]);
        assert!(a.abs_diff_eq(Mat3::IDENTITY, 1e-6));
        assert_eq!(b, Mat3::IDENTITY);
    }
}
