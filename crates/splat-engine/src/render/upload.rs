use bytemuck::Pod;

use crate::texture::TexelGrid;

/// Scalar types a [`TexelGrid`] can be uploaded as.
pub trait GridTexel: Pod {
    /// Value used for channels added when widening to a supported format.
    const FILL: Self;

    /// Format for `channels` channels, or `None` if the grid must be widened.
    fn texture_format(channels: u32) -> Option<wgpu::TextureFormat>;

    /// Fallback channel count for unsupported widths.
    const WIDE_CHANNELS: u32 = 4;
}

impl GridTexel for f32 {
    const FILL: Self = 0.0;

    fn texture_format(channels: u32) -> Option<wgpu::TextureFormat> {
        match channels {
            1 => Some(wgpu::TextureFormat::R32Float),
            2 => Some(wgpu::TextureFormat::Rg32Float),
            4 => Some(wgpu::TextureFormat::Rgba32Float),
            _ => None,
        }
    }
}

impl GridTexel for u32 {
    const FILL: Self = 0;

    fn texture_format(channels: u32) -> Option<wgpu::TextureFormat> {
        match channels {
            1 => Some(wgpu::TextureFormat::R32Uint),
            2 => Some(wgpu::TextureFormat::Rg32Uint),
            4 => Some(wgpu::TextureFormat::Rgba32Uint),
            _ => None,
        }
    }
}

/// Creates a sampled texture holding `grid` and queues its upload.
///
/// wgpu has no three-channel 32-bit formats, so 3-channel grids are widened
/// to four channels first.
pub fn upload_grid<T: GridTexel>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    grid: &TexelGrid<T>,
) -> wgpu::Texture {
    let widened;
    let (grid, format) = match T::texture_format(grid.channels()) {
        Some(format) => (grid, format),
        None => {
            widened = grid.widened(T::WIDE_CHANNELS, T::FILL);
            // `WIDE_CHANNELS` always has a format.
            let format = T::texture_format(T::WIDE_CHANNELS).unwrap_or(wgpu::TextureFormat::Rgba32Float);
            (&widened, format)
        }
    };

    let size = wgpu::Extent3d {
        width: grid.width().max(1),
        height: grid.height().max(1),
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    if grid.is_empty() {
        return texture;
    }

    let texel_bytes = grid.channels() * std::mem::size_of::<T>() as u32;
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        grid.as_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(grid.width() * texel_bytes),
            rows_per_image: Some(grid.height()),
        },
        size,
    );

    texture
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_channel_floats_need_widening() {
        assert_eq!(f32::texture_format(3), None);
        assert_eq!(f32::texture_format(f32::WIDE_CHANNELS), Some(wgpu::TextureFormat::Rgba32Float));
        assert_eq!(u32::texture_format(1), Some(wgpu::TextureFormat::R32Uint));
    }

    #[test]
    fn widened_grid_matches_rgba_row_pitch() {
        let grid = TexelGrid::<f32>::from_rows(2, 1, &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let wide = grid.widened(f32::WIDE_CHANNELS, f32::FILL);
        assert_eq!(wide.as_bytes().len(), 2 * 4 * 4);
        assert_eq!(wide.texel(1, 0), Some(&[4.0, 5.0, 6.0, 0.0][..]));
    }
}
