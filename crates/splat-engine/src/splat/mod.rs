//! Per-particle attribute arrays and the group layout they are packed into.

mod attributes;
mod covariance;
mod layout;

pub use attributes::{permute_rows, ParticleAttributes};
pub(crate) use attributes::is_bijection;
pub use covariance::{rotor_to_rotation_matrix, rotors_to_cov3d, Covariance3d};
pub use layout::GroupLayout;

use thiserror::Error;

/// Errors raised while validating particle data or deriving its layout.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SetupError {
    #[error("attribute `{name}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("flat attribute `{name}` has {len} floats, not a multiple of {width}")]
    RaggedFlatArray {
        name: &'static str,
        len: usize,
        width: usize,
    },

    #[error("group size must be positive")]
    ZeroGroupSize,

    #[error("{particles} particles do not fill a single group of {group_size}")]
    NotEnoughParticles { particles: usize, group_size: usize },

    #[error("initial permutation is not a bijection over 0..{expected}")]
    InvalidPermutation { expected: usize },
}
