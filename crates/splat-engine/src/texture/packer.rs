use crate::sort::ReorderedAttributes;
use crate::splat::GroupLayout;

use super::grid::TexelGrid;

/// The four attribute grids of a session. Immutable once packed.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTextureSet {
    position: TexelGrid<f32>,
    color: TexelGrid<f32>,
    cov_diag: TexelGrid<f32>,
    cov_upper: TexelGrid<f32>,
    layout: GroupLayout,
}

impl AttributeTextureSet {
    pub fn position(&self) -> &TexelGrid<f32> {
        &self.position
    }

    pub fn color(&self) -> &TexelGrid<f32> {
        &self.color
    }

    pub fn cov_diag(&self) -> &TexelGrid<f32> {
        &self.cov_diag
    }

    pub fn cov_upper(&self) -> &TexelGrid<f32> {
        &self.cov_upper
    }

    pub fn layout(&self) -> GroupLayout {
        self.layout
    }
}

/// Encodes attribute arrays into `group_size × group_count` float grids.
///
/// Accepts only [`ReorderedAttributes`], which exist only after the sort
/// strategy has applied its one-time reorder, so the packed texel order always
/// matches what the permutation textures index into.
pub struct TexturePacker;

impl TexturePacker {
    pub fn pack(attributes: ReorderedAttributes) -> AttributeTextureSet {
        let layout = attributes.layout();
        let (w, h) = layout.texture_size();
        let attrs = attributes.into_inner();

        // `ReorderedAttributes` holds exactly `w * h` particles, so padding
        // never kicks in.
        let set = AttributeTextureSet {
            position: TexelGrid::from_rows_padded(w, h, attrs.positions()),
            color: TexelGrid::from_rows_padded(w, h, attrs.colors()),
            cov_diag: TexelGrid::from_rows_padded(w, h, attrs.cov_diag()),
            cov_upper: TexelGrid::from_rows_padded(w, h, attrs.cov_upper()),
            layout,
        };

        log::debug!(
            "packed {} particles into {w}x{h} attribute textures",
            layout.particle_count()
        );
        set
    }
}
