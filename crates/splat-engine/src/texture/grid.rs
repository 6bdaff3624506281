use bytemuck::Pod;

/// A 2D array of texels with `channels` components each, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TexelGrid<T> {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<T>,
}

impl<T: Pod> TexelGrid<T> {
    /// Wraps `data`; returns `None` when its length is not
    /// `width * height * channels`.
    pub fn from_vec(width: u32, height: u32, channels: u32, data: Vec<T>) -> Option<Self> {
        let expected = width as usize * height as usize * channels as usize;
        (data.len() == expected).then_some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Flattens fixed-width rows into a grid, taking the first
    /// `width * height` rows.
    pub fn from_rows<const C: usize>(width: u32, height: u32, rows: &[[T; C]]) -> Option<Self> {
        let count = width as usize * height as usize;
        let rows = rows.get(..count)?;
        let data: Vec<T> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::from_vec(width, height, C as u32, data)
    }

    /// Like [`from_rows`](Self::from_rows), but missing rows are zero-filled
    /// and surplus rows are ignored.
    pub(crate) fn from_rows_padded<const C: usize>(width: u32, height: u32, rows: &[[T; C]]) -> Self {
        let count = width as usize * height as usize;
        let mut data: Vec<T> = Vec::with_capacity(count * C);
        for row in rows.iter().take(count) {
            data.extend_from_slice(row);
        }
        data.resize(count * C, T::zeroed());
        Self {
            width,
            height,
            channels: C as u32,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Number of texels (`width * height`).
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Channels of texel `(x, y)`.
    pub fn texel(&self, x: u32, y: u32) -> Option<&[T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        self.data.get(start..start + c)
    }

    /// Channels of the texel at linear index `i`.
    pub fn at(&self, i: usize) -> Option<&[T]> {
        let c = self.channels as usize;
        self.data.get(i * c..i * c + c)
    }

    /// Copy of the grid with every texel padded (or cut) to `channels`
    /// components, filling new components with `fill`.
    pub fn widened(&self, channels: u32, fill: T) -> Self {
        let old = self.channels as usize;
        let new = channels as usize;
        let mut data = Vec::with_capacity(self.len() * new);
        for texel in self.data.chunks_exact(old.max(1)) {
            for c in 0..new {
                data.push(texel.get(c).copied().unwrap_or(fill));
            }
        }
        Self {
            width: self.width,
            height: self.height,
            channels,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_addresses_row_major() {
        let rows: Vec<[f32; 3]> = (0..6).map(|i| [i as f32, 10.0 + i as f32, 20.0]).collect();
        let grid = TexelGrid::from_rows(3, 2, &rows).unwrap();
        assert_eq!(grid.texel(1, 1), Some(&[4.0, 14.0, 20.0][..]));
        assert_eq!(grid.texel(3, 0), None);
        assert_eq!(grid.at(5), grid.texel(2, 1));
    }

    #[test]
    fn widening_pads_with_fill() {
        let grid = TexelGrid::from_rows(2, 1, &[[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let wide = grid.widened(4, 1.0);
        assert_eq!(wide.channels(), 4);
        assert_eq!(wide.texel(1, 0), Some(&[4.0, 5.0, 6.0, 1.0][..]));
    }

    #[test]
    fn short_input_is_rejected() {
        assert!(TexelGrid::from_rows(4, 1, &[[0u32; 1]; 3]).is_none());
        assert!(TexelGrid::<u32>::from_vec(2, 2, 1, vec![0; 3]).is_none());
    }
}
