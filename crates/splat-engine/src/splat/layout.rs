use super::SetupError;

/// How particles map onto 2D textures: `group_size` texels per row,
/// `group_count` rows. Texel `(x, y)` is particle `y * group_size + x`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GroupLayout {
    group_size: u32,
    group_count: u32,
}

impl GroupLayout {
    /// Fits as many whole groups as `particle_count` allows.
    ///
    /// Trailing particles that do not fill a group are left out; callers drop
    /// them with [`ParticleAttributes::truncate`](super::ParticleAttributes::truncate).
    pub fn fit(particle_count: usize, group_size: u32) -> Result<Self, SetupError> {
        if group_size == 0 {
            return Err(SetupError::ZeroGroupSize);
        }
        let group_count = particle_count / group_size as usize;
        if group_count == 0 {
            return Err(SetupError::NotEnoughParticles {
                particles: particle_count,
                group_size: group_size as usize,
            });
        }
        Ok(Self {
            group_size,
            group_count: u32::try_from(group_count).unwrap_or(u32::MAX),
        })
    }

    pub fn group_size(&self) -> u32 {
        self.group_size
    }

    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// `N = group_size * group_count`.
    pub fn particle_count(&self) -> usize {
        self.group_size as usize * self.group_count as usize
    }

    /// Texture extent `(width, height)`.
    pub fn texture_size(&self) -> (u32, u32) {
        (self.group_size, self.group_count)
    }

    #[inline]
    pub fn texel_of(&self, index: usize) -> (u32, u32) {
        let w = self.group_size as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.group_size as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_particles_are_dropped() {
        let layout = GroupLayout::fit(3072 + 1023, 1024).unwrap();
        assert_eq!(layout.group_count(), 3);
        assert_eq!(layout.particle_count(), 3072);
    }

    #[test]
    fn fewer_than_one_group_is_rejected() {
        assert_eq!(
            GroupLayout::fit(1023, 1024),
            Err(SetupError::NotEnoughParticles { particles: 1023, group_size: 1024 })
        );
        assert_eq!(GroupLayout::fit(10, 0), Err(SetupError::ZeroGroupSize));
    }

    #[test]
    fn texel_index_round_trip() {
        let layout = GroupLayout::fit(4096, 1024).unwrap();
        assert_eq!(layout.texel_of(1029), (5, 1));
        assert_eq!(layout.index_of(5, 1), 1029);
    }
}
