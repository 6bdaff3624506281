//! CPU-side texel grids for attributes and permutations.
//!
//! Grids follow the same indexing everywhere: texel `(x, y)` holds particle
//! (or draw slot) `y * width + x`. The render backend uploads them verbatim.

mod grid;
mod packer;
mod permutation;

pub use grid::TexelGrid;
pub use packer::{AttributeTextureSet, TexturePacker};
pub use permutation::{PermutationSet, PermutationTexture};
