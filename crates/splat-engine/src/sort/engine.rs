use glam::{Mat4, Vec3};

use crate::splat::GroupLayout;
use crate::texture::PermutationTexture;

use super::SortError;

/// Computes draw-order permutations for a fixed set of positions.
///
/// Every permutation an engine returns must be a bijection over `0..N`; the
/// scheduler validates this and treats a violation as an engine failure.
pub trait SortEngine {
    /// Per-session state for the full strategy.
    type FullPipeline;
    /// Per-session state for the grouped strategy.
    type GroupedPipeline;

    /// Prepares a full sort over `positions` in natural order.
    fn create_full(
        &mut self,
        positions: &[[f32; 3]],
        layout: GroupLayout,
    ) -> Result<Self::FullPipeline, SortError>;

    /// Returns one `group_size × group_count` texture whose texel `i` is the
    /// particle drawn at slot `i`, farthest first.
    fn apply_full(
        &mut self,
        pipeline: &mut Self::FullPipeline,
        view_proj: Mat4,
    ) -> Result<PermutationTexture, SortError>;

    /// Prepares a grouped sort and returns the one-time initial reorder.
    ///
    /// After this call the pipeline refers to particles in reordered order:
    /// index `i` is original particle `initial[i]`.
    fn create_grouped(
        &mut self,
        positions: &[[f32; 3]],
        layout: GroupLayout,
    ) -> Result<(Self::GroupedPipeline, Vec<u32>), SortError>;

    /// Returns the `(outer, inner)` pair for the current camera.
    fn apply_grouped(
        &mut self,
        pipeline: &mut Self::GroupedPipeline,
        eye: Vec3,
        view_proj: Mat4,
    ) -> Result<(PermutationTexture, PermutationTexture), SortError>;
}
