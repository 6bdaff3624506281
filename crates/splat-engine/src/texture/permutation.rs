use crate::splat::GroupLayout;

use super::grid::TexelGrid;

/// Single-channel grid of particle indices.
pub type PermutationTexture = TexelGrid<u32>;

/// The permutation textures bound for drawing.
///
/// Replaced wholesale on every resort and never edited in place. `generation`
/// identifies a set: two sets with the same generation hold the same data.
#[derive(Debug, Clone, PartialEq)]
pub enum PermutationSet {
    /// `perm[i]` is the particle drawn at slot `i`.
    Full {
        perm: PermutationTexture,
        generation: u64,
    },
    /// `outer` (`group_count × 1`) orders whole groups; row `g` of `inner`
    /// (`group_size × group_count`) orders the particles of source group `g`.
    Grouped {
        outer: PermutationTexture,
        inner: PermutationTexture,
        generation: u64,
    },
}

impl PermutationSet {
    pub fn generation(&self) -> u64 {
        match self {
            PermutationSet::Full { generation, .. } | PermutationSet::Grouped { generation, .. } => {
                *generation
            }
        }
    }

    /// Particle index drawn at `slot`, following the same lookup the vertex
    /// shader performs.
    pub fn resolve(&self, slot: usize) -> Option<u32> {
        match self {
            PermutationSet::Full { perm, .. } => perm.at(slot).map(|t| t[0]),
            PermutationSet::Grouped { outer, inner, .. } => {
                let w = inner.width() as usize;
                if w == 0 {
                    return None;
                }
                let group = *outer.at(slot / w)?.first()?;
                let local = *inner.texel((slot % w) as u32, group)?.first()?;
                Some(group * w as u32 + local)
            }
        }
    }

    /// Every slot's particle, in draw order.
    pub fn draw_order(&self, layout: GroupLayout) -> Option<Vec<u32>> {
        (0..layout.particle_count()).map(|slot| self.resolve(slot)).collect()
    }

    /// True when the shapes match `layout` and the composed lookup is a
    /// bijection over `0..N`.
    pub fn is_valid_for(&self, layout: GroupLayout) -> bool {
        let (w, h) = layout.texture_size();
        let shape_ok = match self {
            PermutationSet::Full { perm, .. } => {
                perm.width() == w && perm.height() == h && perm.channels() == 1
            }
            PermutationSet::Grouped { outer, inner, .. } => {
                outer.width() == h
                    && outer.height() == 1
                    && outer.channels() == 1
                    && inner.width() == w
                    && inner.height() == h
                    && inner.channels() == 1
                    && outer.as_slice().iter().all(|&g| g < h)
                    && inner.as_slice().iter().all(|&x| x < w)
            }
        };
        if !shape_ok {
            return false;
        }
        self.draw_order(layout)
            .is_some_and(|order| crate::splat::is_bijection(&order, layout.particle_count()))
    }
}
