use bytemuck::{Pod, Zeroable};

use crate::session::CameraUniforms;
use crate::sort::SortStrategy;

const SPLAT_BODY: &str = include_str!("shaders/splat.wgsl");
const PERM_FULL: &str = include_str!("shaders/perm_full.wgsl");
const PERM_GROUPED: &str = include_str!("shaders/perm_grouped.wgsl");

/// Uniform block layout shared with `splat.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub eye_position: [f32; 4], // xyz, w unused
    pub viewport_scale: [f32; 2],
    pub texture_size: [f32; 2],
}

impl From<&CameraUniforms> for CameraUniform {
    fn from(u: &CameraUniforms) -> Self {
        Self {
            view: u.view.to_cols_array_2d(),
            view_proj: u.view_proj.to_cols_array_2d(),
            eye_position: u.eye_position.extend(1.0).to_array(),
            viewport_scale: u.viewport_scale.to_array(),
            texture_size: u.texture_size.to_array(),
        }
    }
}

/// `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` for color and `ONE, ONE` for alpha.
fn splat_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// WGSL source for `strategy`: the shared body plus its permutation lookup.
pub(crate) fn shader_source(strategy: SortStrategy) -> String {
    let lookup = match strategy {
        SortStrategy::Full => PERM_FULL,
        SortStrategy::Grouped => PERM_GROUPED,
    };
    format!("{SPLAT_BODY}\n{lookup}")
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Compiled splat shader and pipeline for one strategy and surface format.
///
/// Bind groups: 0 = camera uniform, 1 = the four attribute textures,
/// 2 = permutation textures (`perm_idx` for full; `perm_outer_idx`,
/// `perm_inner_idx` for grouped).
pub struct SplatProgram {
    strategy: SortStrategy,
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    camera_layout: wgpu::BindGroupLayout,
    attribute_layout: wgpu::BindGroupLayout,
    permutation_layout: wgpu::BindGroupLayout,
}

impl SplatProgram {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, strategy: SortStrategy) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("splat shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source(strategy).into()),
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("splat camera bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<CameraUniform>() as u64),
                },
                count: None,
            }],
        });

        let float = wgpu::TextureSampleType::Float { filterable: false };
        let attribute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("splat attribute bgl"),
            entries: &[
                texture_entry(0, float),
                texture_entry(1, float),
                texture_entry(2, float),
                texture_entry(3, float),
            ],
        });

        let index = wgpu::TextureSampleType::Uint;
        let permutation_entries = match strategy {
            SortStrategy::Full => vec![texture_entry(0, index)],
            SortStrategy::Grouped => vec![texture_entry(0, index), texture_entry(1, index)],
        };
        let permutation_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("splat permutation bgl"),
            entries: &permutation_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("splat pipeline layout"),
            bind_group_layouts: &[&camera_layout, &attribute_layout, &permutation_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("splat pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(splat_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            // Back-to-front order comes from the permutation, not a depth test.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("splat program built for {strategy} sort, {format:?} target");

        Self {
            strategy,
            format,
            pipeline,
            camera_layout,
            attribute_layout,
            permutation_layout,
        }
    }

    pub fn strategy(&self) -> SortStrategy {
        self.strategy
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn camera_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_layout
    }

    pub fn attribute_layout(&self) -> &wgpu::BindGroupLayout {
        &self.attribute_layout
    }

    pub fn permutation_layout(&self) -> &wgpu::BindGroupLayout {
        &self.permutation_layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_wgsl_layout() {
        // mat4 + mat4 + vec4 + vec2 + vec2
        assert_eq!(std::mem::size_of::<CameraUniform>(), 160);
    }

    #[test]
    fn each_strategy_gets_its_own_lookup() {
        let full = shader_source(SortStrategy::Full);
        let grouped = shader_source(SortStrategy::Grouped);
        assert!(full.contains("var perm_idx") && !full.contains("perm_outer_idx"));
        assert!(grouped.contains("perm_outer_idx") && grouped.contains("perm_inner_idx"));
        assert!(grouped.contains("fn vs_main"));
    }
}
