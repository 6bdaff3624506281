//! GPU rendering subsystem.
//!
//! Draws a packed splat cloud with wgpu. Each renderer is responsible for its
//! own GPU resources (pipelines, textures, buffers).
//!
//! Convention:
//! - Particle data lives in 2D textures read with `textureLoad`; there are no
//!   vertex buffers.
//! - One instance per draw slot, four strip vertices per instance. The vertex
//!   shader resolves slot → particle through the permutation textures.

mod ctx;
mod program;
mod renderer;
mod upload;

pub use ctx::{RenderCtx, RenderTarget};
pub use program::{CameraUniform, SplatProgram};
pub use renderer::{SplatRenderer, SplatSurface};
pub use upload::{upload_grid, GridTexel};
