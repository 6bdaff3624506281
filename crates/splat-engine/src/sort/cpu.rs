use glam::{Mat4, Vec3, Vec4};

use crate::splat::GroupLayout;
use crate::texture::{PermutationTexture, TexelGrid};

use super::engine::SortEngine;
use super::SortError;

/// Bits per axis of the Morton code used for the initial grouped reorder.
const MORTON_BITS: u32 = 10;

/// Reference sort engine running on the CPU.
///
/// Depth is the clip-space `w` of each position, i.e. its distance along the
/// camera's view direction. Ties keep index order, so results are
/// deterministic.
#[derive(Debug, Default)]
pub struct CpuSortEngine;

impl CpuSortEngine {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug)]
pub struct CpuFullPipeline {
    positions: Vec<Vec3>,
    layout: GroupLayout,
    order: Vec<u32>,
    depth: Vec<f32>,
}

#[derive(Debug)]
pub struct CpuGroupedPipeline {
    /// Positions in reordered order.
    positions: Vec<Vec3>,
    centroids: Vec<Vec3>,
    layout: GroupLayout,
    depth: Vec<f32>,
}

impl SortEngine for CpuSortEngine {
    type FullPipeline = CpuFullPipeline;
    type GroupedPipeline = CpuGroupedPipeline;

    fn create_full(
        &mut self,
        positions: &[[f32; 3]],
        layout: GroupLayout,
    ) -> Result<CpuFullPipeline, SortError> {
        let positions = take_positions(positions, layout)?;
        let n = positions.len();
        Ok(CpuFullPipeline {
            positions,
            layout,
            order: (0..n as u32).collect(),
            depth: vec![0.0; n],
        })
    }

    fn apply_full(
        &mut self,
        pipeline: &mut CpuFullPipeline,
        view_proj: Mat4,
    ) -> Result<PermutationTexture, SortError> {
        let w_row = view_proj.row(3);
        for (d, p) in pipeline.depth.iter_mut().zip(&pipeline.positions) {
            *d = view_depth(w_row, *p);
        }

        // Start from natural order every time so ties resolve by index.
        for (i, slot) in pipeline.order.iter_mut().enumerate() {
            *slot = i as u32;
        }
        let depth = &pipeline.depth;
        pipeline
            .order
            .sort_by(|&a, &b| depth[b as usize].total_cmp(&depth[a as usize]));

        let (w, h) = pipeline.layout.texture_size();
        TexelGrid::from_vec(w, h, 1, pipeline.order.clone()).ok_or(SortError::MalformedOutput("full"))
    }

    fn create_grouped(
        &mut self,
        positions: &[[f32; 3]],
        layout: GroupLayout,
    ) -> Result<(CpuGroupedPipeline, Vec<u32>), SortError> {
        let natural = take_positions(positions, layout)?;
        let initial = morton_order(&natural);
        let positions: Vec<Vec3> = initial.iter().map(|&i| natural[i as usize]).collect();

        let group_size = layout.group_size() as usize;
        let centroids = positions
            .chunks_exact(group_size)
            .map(|group| group.iter().copied().sum::<Vec3>() / group_size as f32)
            .collect();

        let n = positions.len();
        Ok((
            CpuGroupedPipeline {
                positions,
                centroids,
                layout,
                depth: vec![0.0; n],
            },
            initial,
        ))
    }

    fn apply_grouped(
        &mut self,
        pipeline: &mut CpuGroupedPipeline,
        eye: Vec3,
        view_proj: Mat4,
    ) -> Result<(PermutationTexture, PermutationTexture), SortError> {
        let (w, h) = pipeline.layout.texture_size();
        let group_size = w as usize;

        // Coarse: whole groups by eye distance to their centroid.
        let group_dist: Vec<f32> = pipeline.centroids.iter().map(|c| c.distance(eye)).collect();
        let mut outer: Vec<u32> = (0..h).collect();
        outer.sort_by(|&a, &b| group_dist[b as usize].total_cmp(&group_dist[a as usize]));

        // Fine: each group's particles by view depth.
        let w_row = view_proj.row(3);
        for (d, p) in pipeline.depth.iter_mut().zip(&pipeline.positions) {
            *d = view_depth(w_row, *p);
        }
        let mut inner: Vec<u32> = Vec::with_capacity(pipeline.positions.len());
        for depth in pipeline.depth.chunks_exact(group_size) {
            let start = inner.len();
            inner.extend(0..w);
            inner[start..].sort_by(|&a, &b| depth[b as usize].total_cmp(&depth[a as usize]));
        }

        let outer = TexelGrid::from_vec(h, 1, 1, outer).ok_or(SortError::MalformedOutput("outer"))?;
        let inner = TexelGrid::from_vec(w, h, 1, inner).ok_or(SortError::MalformedOutput("inner"))?;
        Ok((outer, inner))
    }
}

#[inline]
fn view_depth(w_row: Vec4, p: Vec3) -> f32 {
    w_row.dot(p.extend(1.0))
}

fn take_positions(positions: &[[f32; 3]], layout: GroupLayout) -> Result<Vec<Vec3>, SortError> {
    let n = layout.particle_count();
    let slice = positions.get(..n).ok_or_else(|| {
        SortError::Engine(format!("expected at least {n} positions, got {}", positions.len()))
    })?;
    Ok(slice.iter().map(|p| Vec3::from_array(*p)).collect())
}

/// Stable order of `positions` along a Z-order curve over their bounding box.
fn morton_order(positions: &[Vec3]) -> Vec<u32> {
    let (min, max) = positions.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| {
            if p.is_finite() {
                (lo.min(*p), hi.max(*p))
            } else {
                (lo, hi)
            }
        },
    );
    let extent = (max - min).max(Vec3::splat(f32::EPSILON));
    let cells = ((1u32 << MORTON_BITS) - 1) as f32;

    let codes: Vec<u32> = positions
        .iter()
        .map(|p| {
            let n = ((*p - min) / extent).clamp(Vec3::ZERO, Vec3::ONE) * cells;
            // NaN components quantize to 0.
            morton3(n.x as u32, n.y as u32, n.z as u32)
        })
        .collect();

    let mut order: Vec<u32> = (0..positions.len() as u32).collect();
    order.sort_by_key(|&i| codes[i as usize]);
    order
}

/// Interleaves the low 10 bits of each coordinate.
fn morton3(x: u32, y: u32, z: u32) -> u32 {
    spread_bits(x) | (spread_bits(y) << 1) | (spread_bits(z) << 2)
}

fn spread_bits(v: u32) -> u32 {
    let mut v = v & 0x3ff;
    v = (v | (v << 16)) & 0x0300_00ff;
    v = (v | (v << 8)) & 0x0300_f00f;
    v = (v | (v << 4)) & 0x030c_30c3;
    v = (v | (v << 2)) & 0x0924_9249;
    v
}
