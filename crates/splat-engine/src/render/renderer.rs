use anyhow::{Context, Result};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::session::{DrawStatus, FrameBindings, SplatBackend};
use crate::sort::SortStrategy;
use crate::splat::GroupLayout;
use crate::texture::{AttributeTextureSet, PermutationSet};

use super::ctx::{RenderCtx, RenderTarget};
use super::program::{CameraUniform, SplatProgram};
use super::upload::upload_grid;

struct UploadedAttributes {
    layout: GroupLayout,
    bind_group: wgpu::BindGroup,
    _textures: [wgpu::Texture; 4],
}

struct UploadedPermutations {
    generation: u64,
    bind_group: wgpu::BindGroup,
    _textures: Vec<wgpu::Texture>,
}

/// Draws a splat session with wgpu.
///
/// Attribute textures are uploaded on the first draw and kept; permutation
/// textures are re-uploaded only when the set's generation changes.
pub struct SplatRenderer {
    program: SplatProgram,
    camera_ubo: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    attributes: Option<UploadedAttributes>,
    permutations: Option<UploadedPermutations>,
    surface_lost: bool,
}

impl SplatRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, strategy: SortStrategy) -> Self {
        let program = SplatProgram::new(device, format, strategy);

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("splat camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("splat camera bind group"),
            layout: program.camera_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        Self {
            program,
            camera_ubo,
            camera_bind_group,
            attributes: None,
            permutations: None,
            surface_lost: false,
        }
    }

    /// Set once the surface failed unrecoverably; the owner should shut down.
    pub fn surface_lost(&self) -> bool {
        self.surface_lost
    }

    /// Borrows `gpu` for one frame as a [`SplatBackend`].
    pub fn surface<'a, 'w>(&'a mut self, gpu: &'a mut Gpu<'w>) -> SplatSurface<'a, 'w> {
        SplatSurface { renderer: self, gpu }
    }

    /// Clears `target` and records the splat draw into it.
    pub fn record(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        bindings: &FrameBindings<'_>,
    ) -> Result<()> {
        anyhow::ensure!(
            ctx.target_format == self.program.format(),
            "program targets {:?}, frame is {:?}",
            self.program.format(),
            ctx.target_format
        );
        anyhow::ensure!(
            bindings.strategy == self.program.strategy(),
            "program was built for {} sort, session uses {}",
            self.program.strategy(),
            bindings.strategy
        );

        self.ensure_attributes(ctx, bindings.attributes);
        self.ensure_permutations(ctx, bindings.permutations)?;

        let uniform = CameraUniform::from(&bindings.camera);
        ctx.queue.write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&uniform));

        let attributes = self.attributes.as_ref().context("attribute textures missing")?;
        let permutations = self.permutations.as_ref().context("permutation textures missing")?;

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("splat pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(self.program.pipeline());
        rpass.set_bind_group(0, &self.camera_bind_group, &[]);
        rpass.set_bind_group(1, &attributes.bind_group, &[]);
        rpass.set_bind_group(2, &permutations.bind_group, &[]);
        rpass.draw(0..4, 0..bindings.instance_count);

        Ok(())
    }

    fn ensure_attributes(&mut self, ctx: &RenderCtx<'_>, set: &AttributeTextureSet) {
        if self.attributes.as_ref().is_some_and(|a| a.layout == set.layout()) {
            return;
        }

        let textures = [
            upload_grid(ctx.device, ctx.queue, "splat position texture", set.position()),
            upload_grid(ctx.device, ctx.queue, "splat color texture", set.color()),
            upload_grid(ctx.device, ctx.queue, "splat cov diag texture", set.cov_diag()),
            upload_grid(ctx.device, ctx.queue, "splat cov upper texture", set.cov_upper()),
        ];
        let views: Vec<wgpu::TextureView> = textures
            .iter()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
            .collect();
        let entries: Vec<wgpu::BindGroupEntry<'_>> = views
            .iter()
            .enumerate()
            .map(|(i, view)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("splat attribute bind group"),
            layout: self.program.attribute_layout(),
            entries: &entries,
        });

        let (w, h) = set.layout().texture_size();
        log::info!("uploaded attribute textures ({w}x{h})");

        self.attributes = Some(UploadedAttributes {
            layout: set.layout(),
            bind_group,
            _textures: textures,
        });
    }

    fn ensure_permutations(&mut self, ctx: &RenderCtx<'_>, set: &PermutationSet) -> Result<()> {
        if self.permutations.as_ref().is_some_and(|p| p.generation == set.generation()) {
            return Ok(());
        }

        let textures = match (set, self.program.strategy()) {
            (PermutationSet::Full { perm, .. }, SortStrategy::Full) => {
                vec![upload_grid(ctx.device, ctx.queue, "splat perm texture", perm)]
            }
            (PermutationSet::Grouped { outer, inner, .. }, SortStrategy::Grouped) => vec![
                upload_grid(ctx.device, ctx.queue, "splat perm outer texture", outer),
                upload_grid(ctx.device, ctx.queue, "splat perm inner texture", inner),
            ],
            _ => anyhow::bail!("permutation set does not match the {} program", self.program.strategy()),
        };

        let views: Vec<wgpu::TextureView> = textures
            .iter()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
            .collect();
        let entries: Vec<wgpu::BindGroupEntry<'_>> = views
            .iter()
            .enumerate()
            .map(|(i, view)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(view),
            })
            .collect();

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("splat permutation bind group"),
            layout: self.program.permutation_layout(),
            entries: &entries,
        });

        self.permutations = Some(UploadedPermutations {
            generation: set.generation(),
            bind_group,
            _textures: textures,
        });
        Ok(())
    }
}

/// A [`SplatRenderer`] paired with the window's surface for one frame.
pub struct SplatSurface<'a, 'w> {
    renderer: &'a mut SplatRenderer,
    gpu: &'a mut Gpu<'w>,
}

impl SplatBackend for SplatSurface<'_, '_> {
    fn draw(&mut self, bindings: &FrameBindings<'_>) -> Result<DrawStatus> {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            // Minimized.
            return Ok(DrawStatus::Skipped);
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface error: {err}");
                if self.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                    self.renderer.surface_lost = true;
                    anyhow::bail!("surface lost unrecoverably");
                }
                return Ok(DrawStatus::Skipped);
            }
        };

        {
            let ctx = RenderCtx::new(self.gpu.device(), self.gpu.queue(), self.gpu.surface_format());
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            self.renderer.record(&ctx, &mut target, bindings)?;
        }

        self.gpu.submit(frame);
        Ok(DrawStatus::Presented)
    }
}
