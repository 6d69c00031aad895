//! Lit model rendering into a slot's offscreen target.
//!
//! The mesh pass uses two bind groups:
//! - **Group 0**: camera uniforms, shared by both slots since they share one camera
//! - **Group 1**: model uniforms (model matrix, normal matrix, color, accent light),
//!   one buffer per slot so both slots can be recorded into the same encoder
//!
//! Every slot pass clears its target to transparent black, so the composite pass
//! sees model coverage in the alpha channel.

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::mesh::{Color, Mesh, Vertex3d};
use crate::scene::{AccentLight, SlotTarget, DEPTH_FORMAT};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _pad: f32,
}

/// Per-slot model and light uniforms.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals under non-uniform scale.
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// World-space light position in xyz, intensity in w.
    pub light: [f32; 4],
    /// Decay exponent, ambient term, reference distance, unused.
    pub light_params: [f32; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4, color: Color, light: &AccentLight, light_position: Vec3) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: color.to_array(),
            light: light_position.extend(light.intensity).to_array(),
            light_params: [light.decay, light.ambient, light.position.length(), 0.0],
        }
    }
}

/// One model to draw in a slot pass.
pub struct MeshDraw<'a> {
    pub mesh: &'a Mesh,
    pub uniforms: ModelUniforms,
}

/// Uniform buffer and bind group owned by one slot.
pub struct ModelBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct MeshPass {
    pipelines: Vec<(u32, wgpu::RenderPipeline)>,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_bind_group_layout: wgpu::BindGroupLayout,
}

impl MeshPass {
    /// Build pipelines for `sample_count` and, when that is above one, for single
    /// sampling too so a target that fell back can still be drawn.
    pub fn new(gpu: &GpuContext, sample_count: u32) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Model Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/model.wgsl").into()),
        });

        let uniform_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[uniform_entry],
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[uniform_entry],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &model_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mut counts = vec![sample_count.max(1)];
        if sample_count > 1 {
            counts.push(1);
        }
        let pipelines = counts
            .into_iter()
            .map(|count| {
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(&format!("Model Pipeline {count}x")),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs"),
                        buffers: &[Vertex3d::LAYOUT],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: gpu.format(),
                            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    // imported meshes do not agree on winding
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState {
                        count,
                        ..Default::default()
                    },
                    multiview: None,
                    cache: None,
                });
                (count, pipeline)
            })
            .collect();

        Self {
            pipelines,
            camera_buffer,
            camera_bind_group,
            model_bind_group_layout,
        }
    }

    /// Create the uniform buffer one slot writes its model and light into.
    pub fn create_model_binding(&self, gpu: &GpuContext, label: &str) -> ModelBinding {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Model Uniforms")),
            size: std::mem::size_of::<ModelUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Model Bind Group")),
            layout: &self.model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        ModelBinding { buffer, bind_group }
    }

    /// Upload the shared camera once per frame.
    pub fn prepare_camera(&self, gpu: &GpuContext, camera: &Camera, aspect: f32) {
        let uniforms = CameraUniforms {
            view_proj: camera.view_projection(aspect).to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _pad: 0.0,
        };
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Clear `target` and draw the model, if there is one.
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &SlotTarget,
        binding: &ModelBinding,
        draw: Option<MeshDraw>,
        label: &str,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(target.color_attachment(wgpu::Color::TRANSPARENT))],
            depth_stencil_attachment: Some(target.depth_attachment()),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(draw) = draw else {
            return;
        };
        let Some(pipeline) = self.pipeline(target.sample_count()) else {
            return;
        };

        gpu.queue
            .write_buffer(&binding.buffer, 0, bytemuck::cast_slice(&[draw.uniforms]));

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_bind_group(1, &binding.bind_group, &[]);
        pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
    }

    fn pipeline(&self, sample_count: u32) -> Option<&wgpu::RenderPipeline> {
        self.pipelines
            .iter()
            .find(|(count, _)| *count == sample_count)
            .map(|(_, pipeline)| pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<CameraUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniforms>() % 16, 0);
    }

    #[test]
    fn model_uniforms_carry_light() {
        let light = AccentLight::default();
        let uniforms = ModelUniforms::new(Mat4::IDENTITY, Color::WHITE, &light, light.position);
        assert_eq!(uniforms.light, [4.0, 6.0, -1.0, 0.6]);
        assert_eq!(uniforms.light_params[0], 3.0);
        assert_eq!(uniforms.normal_matrix, Mat4::IDENTITY.to_cols_array_2d());
    }
}
