use glam::{Mat4, Vec2, Vec3};

use crate::sort::SortStrategy;
use crate::splat::GroupLayout;
use crate::texture::{AttributeTextureSet, PermutationSet};
use crate::view::{CameraTransform, Viewport};

/// Per-frame values for the shader's uniform block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraUniforms {
    pub view: Mat4,
    pub view_proj: Mat4,
    pub eye_position: Vec3,
    /// Drawable size in pixels.
    pub viewport_scale: Vec2,
    /// `(group_size, group_count)`.
    pub texture_size: Vec2,
}

impl CameraUniforms {
    pub fn new(camera: &CameraTransform, eye: Vec3, viewport: Viewport, layout: GroupLayout) -> Self {
        let (w, h) = layout.texture_size();
        Self {
            view: camera.view,
            view_proj: camera.view_proj,
            eye_position: eye,
            viewport_scale: Vec2::new(viewport.width, viewport.height),
            texture_size: Vec2::new(w as f32, h as f32),
        }
    }
}

/// Everything one draw reads. Borrowed from the session for the call only.
#[derive(Debug, Clone, Copy)]
pub struct FrameBindings<'a> {
    pub camera: CameraUniforms,
    pub strategy: SortStrategy,
    pub attributes: &'a AttributeTextureSet,
    pub permutations: &'a PermutationSet,
    /// Quad instances to draw, one per particle.
    pub instance_count: u32,
    pub frame_index: u64,
}

/// Whether a draw reached the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStatus {
    Presented,
    /// Nothing was presented this tick (minimized window, transient surface error).
    Skipped,
}

/// Draws one frame of splats: four vertices per instance, `instance_count`
/// instances, alpha-blended without depth testing.
pub trait SplatBackend {
    fn draw(&mut self, bindings: &FrameBindings<'_>) -> anyhow::Result<DrawStatus>;
}
