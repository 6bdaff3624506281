use super::covariance::rotors_to_cov3d;
use super::SetupError;

/// Static per-particle arrays, loaded once.
///
/// All four arrays always have the same length. The covariance is stored as
/// its diagonal `(xx, yy, zz)` and upper triangle `(xy, xz, yz)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleAttributes {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    cov_diag: Vec<[f32; 3]>,
    cov_upper: Vec<[f32; 3]>,
}

impl ParticleAttributes {
    /// Wraps already-derived arrays. Lengths must match `positions`.
    pub fn new(
        positions: Vec<[f32; 3]>,
        colors: Vec<[f32; 4]>,
        cov_diag: Vec<[f32; 3]>,
        cov_upper: Vec<[f32; 3]>,
    ) -> Result<Self, SetupError> {
        let expected = positions.len();
        check_len("colors", expected, colors.len())?;
        check_len("cov_diag", expected, cov_diag.len())?;
        check_len("cov_upper", expected, cov_upper.len())?;
        Ok(Self {
            positions,
            colors,
            cov_diag,
            cov_upper,
        })
    }

    /// Builds attributes from per-particle scales and rotors, deriving the
    /// covariance once.
    pub fn from_scales_and_rotors(
        positions: Vec<[f32; 3]>,
        colors: Vec<[f32; 4]>,
        scales: &[[f32; 3]],
        rotors: &[[f32; 4]],
    ) -> Result<Self, SetupError> {
        let expected = positions.len();
        check_len("scales", expected, scales.len())?;
        check_len("rotors", expected, rotors.len())?;
        let cov = rotors_to_cov3d(scales, rotors);
        Self::new(positions, colors, cov.diag, cov.upper)
    }

    /// Flat-array form as produced by most loaders (3, 4, 3 and 4 floats per
    /// particle). The particle count is `floor(positions.len() / 3)`; any
    /// dangling floats at the end of `positions` are ignored.
    pub fn from_flat(
        positions: &[f32],
        colors: &[f32],
        scales: &[f32],
        rotors: &[f32],
    ) -> Result<Self, SetupError> {
        let count = positions.len() / 3;
        let positions: Vec<[f32; 3]> = chunk(&positions[..count * 3]);
        let colors = chunk_exact::<4>("colors", colors)?;
        let scales = chunk_exact::<3>("scales", scales)?;
        let rotors = chunk_exact::<4>("rotors", rotors)?;
        Self::from_scales_and_rotors(positions, colors, &scales, &rotors)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    pub fn cov_diag(&self) -> &[[f32; 3]] {
        &self.cov_diag
    }

    pub fn cov_upper(&self) -> &[[f32; 3]] {
        &self.cov_upper
    }

    /// Keeps the first `count` particles.
    pub fn truncate(&mut self, count: usize) {
        self.positions.truncate(count);
        self.colors.truncate(count);
        self.cov_diag.truncate(count);
        self.cov_upper.truncate(count);
    }

    /// Reorders every array so that entry `i` becomes old entry `perm[i]`.
    ///
    /// `perm` must be a bijection over `0..len`.
    pub fn permuted(&self, perm: &[u32]) -> Result<Self, SetupError> {
        if !is_bijection(perm, self.len()) {
            return Err(SetupError::InvalidPermutation { expected: self.len() });
        }
        Ok(Self {
            positions: permute_rows(&self.positions, perm),
            colors: permute_rows(&self.colors, perm),
            cov_diag: permute_rows(&self.cov_diag, perm),
            cov_upper: permute_rows(&self.cov_upper, perm),
        })
    }
}

/// Gathers `rows[perm[i]]` into slot `i`.
pub fn permute_rows<T: Copy>(rows: &[T], perm: &[u32]) -> Vec<T> {
    perm.iter().map(|&src| rows[src as usize]).collect()
}

/// True when `perm` holds every index in `0..n` exactly once.
pub(crate) fn is_bijection(perm: &[u32], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &p in perm {
        let Some(slot) = seen.get_mut(p as usize) else { return false };
        if *slot {
            return false;
        }
        *slot = true;
    }
    true
}

fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<(), SetupError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SetupError::LengthMismatch { name, expected, actual })
    }
}

fn chunk<const W: usize>(flat: &[f32]) -> Vec<[f32; W]> {
    flat.chunks_exact(W)
        .map(|c| {
            let mut out = [0.0; W];
            out.copy_from_slice(c);
            out
        })
        .collect()
}

fn chunk_exact<const W: usize>(name: &'static str, flat: &[f32]) -> Result<Vec<[f32; W]>, SetupError> {
    if flat.len() % W != 0 {
        return Err(SetupError::RaggedFlatArray {
            name,
            len: flat.len(),
            width: W,
        });
    }
    Ok(chunk(flat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> ParticleAttributes {
        let positions = (0..n).map(|i| [i as f32, 0.0, 0.0]).collect();
        let colors = (0..n).map(|i| [i as f32, 1.0, 1.0, 1.0]).collect();
        let diag = (0..n).map(|i| [i as f32; 3]).collect();
        let upper = (0..n).map(|i| [-(i as f32); 3]).collect();
        ParticleAttributes::new(positions, colors, diag, upper).unwrap()
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = ParticleAttributes::new(vec![[0.0; 3]; 2], vec![[0.0; 4]; 1], vec![[0.0; 3]; 2], vec![[0.0; 3]; 2])
            .unwrap_err();
        assert_eq!(err, SetupError::LengthMismatch { name: "colors", expected: 2, actual: 1 });
    }

    #[test]
    fn flat_positions_ignore_dangling_floats() {
        let attrs = ParticleAttributes::from_flat(
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[1.0; 8],
            &[1.0; 6],
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.positions()[1], [3.0, 4.0, 5.0]);
    }

    #[test]
    fn permutation_moves_every_array_together() {
        let attrs = sample(4);
        let permuted = attrs.permuted(&[2, 0, 3, 1]).unwrap();
        assert_eq!(permuted.positions()[0], [2.0, 0.0, 0.0]);
        assert_eq!(permuted.colors()[0][0], 2.0);
        assert_eq!(permuted.cov_diag()[3], [1.0; 3]);
        assert_eq!(permuted.cov_upper()[1], [0.0; 3]);
    }

    #[test]
    fn non_bijective_permutation_is_rejected() {
        let attrs = sample(3);
        assert!(attrs.permuted(&[0, 0, 1]).is_err());
        assert!(attrs.permuted(&[0, 1]).is_err());
        assert!(attrs.permuted(&[0, 1, 3]).is_err());
    }

    #[test]
    fn truncate_keeps_leading_particles() {
        let mut attrs = sample(5);
        attrs.truncate(3);
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.cov_upper().len(), 3);
        assert_eq!(attrs.positions()[2], [2.0, 0.0, 0.0]);
    }
}
