//! Fullscreen composite of the two slot textures.
//!
//! The blend coefficient `shown_txt` drives the mix: below zero the whole result
//! fades in from the background, from 0 to 1 it mixes the first slot into the
//! second. [`blend_factors`] is the CPU mirror of the shader math.

use serde::{Deserialize, Serialize};

use crate::gpu::GpuContext;
use crate::mesh::Color;

/// Whether the composite applies FXAA to each slot texture before mixing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FxaaMode {
    /// FXAA only when the slot targets are not multisampled.
    #[default]
    Auto,
    On,
    Off,
}

/// How the composite samples the slot textures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
    Plain,
    Fxaa,
}

impl FxaaMode {
    pub fn sampling(self, multisampled: bool) -> Sampling {
        match self {
            FxaaMode::On => Sampling::Fxaa,
            FxaaMode::Off => Sampling::Plain,
            FxaaMode::Auto if multisampled => Sampling::Plain,
            FxaaMode::Auto => Sampling::Fxaa,
        }
    }
}

/// Opacity of the composite and the weight of the second slot for a coefficient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendFactors {
    pub opacity: f32,
    pub mix: f32,
}

pub fn blend_factors(shown_txt: f32) -> BlendFactors {
    if shown_txt < 0.0 {
        BlendFactors {
            opacity: 1.0 + shown_txt,
            mix: 0.0,
        }
    } else {
        BlendFactors {
            opacity: 1.0,
            mix: shown_txt,
        }
    }
}

impl BlendFactors {
    /// Blend two straight-alpha colors the way the composite shader does.
    pub fn apply(&self, first: Color, second: Color) -> Color {
        let lerp = |a: f32, b: f32| a + (b - a) * self.mix;
        Color::rgba(
            lerp(first.r, second.r),
            lerp(first.g, second.g),
            lerp(first.b, second.b),
            self.opacity * lerp(first.a, second.a),
        )
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BlendUniforms {
    resolution: [f32; 2],
    shown_txt: f32,
    _pad: f32,
}

pub struct BlendPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl BlendPass {
    pub fn new(gpu: &GpuContext, sampling: Sampling) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Crossfade Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/crossfade.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Crossfade Uniforms"),
            size: std::mem::size_of::<BlendUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Crossfade Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let slot_texture = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Crossfade Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                slot_texture(1),
                slot_texture(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Crossfade Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let fragment_entry = match sampling {
            Sampling::Plain => "fs",
            Sampling::Fxaa => "fs_fxaa",
        };
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Crossfade Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group_layout,
            sampler,
        }
    }

    /// Clear `target` to `background` and composite both slots over it.
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        slots: [&wgpu::TextureView; 2],
        shown_txt: f32,
        background: Color,
    ) {
        let uniforms = BlendUniforms {
            resolution: [gpu.width() as f32, gpu.height() as f32],
            shown_txt,
            _pad: 0.0,
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let [first, second] = slots;
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Crossfade Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(first),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(second),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Crossfade Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(background.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_coefficient_fades_first_slot_in() {
        assert_eq!(
            blend_factors(-1.0),
            BlendFactors {
                opacity: 0.0,
                mix: 0.0
            }
        );
        assert_eq!(
            blend_factors(-0.25),
            BlendFactors {
                opacity: 0.75,
                mix: 0.0
            }
        );
    }

    #[test]
    fn unit_range_mixes_slots() {
        let first = Color::rgb(1.0, 0.0, 0.0);
        let second = Color::rgb(0.0, 0.0, 1.0);
        assert_eq!(blend_factors(0.0).apply(first, second), first);
        assert_eq!(blend_factors(1.0).apply(first, second), second);
        let half = blend_factors(0.5).apply(first, second);
        assert_eq!(half, Color::rgb(0.5, 0.0, 0.5));
    }

    #[test]
    fn fxaa_auto_follows_multisampling() {
        assert_eq!(FxaaMode::Auto.sampling(true), Sampling::Plain);
        assert_eq!(FxaaMode::Auto.sampling(false), Sampling::Fxaa);
        assert_eq!(FxaaMode::On.sampling(true), Sampling::Fxaa);
        assert_eq!(FxaaMode::Off.sampling(false), Sampling::Plain);
    }
}
