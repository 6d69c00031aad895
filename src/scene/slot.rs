use glam::Vec2;

use super::model::{AccentLight, ModelInstance};
use super::render_target::SlotTarget;
use super::state::SlotId;
use super::tween::Pose;
use crate::catalog::ModelAsset;
use crate::gpu::GpuContext;
use crate::mesh_pass::{MeshDraw, MeshPass, ModelBinding, ModelUniforms};

/// One render channel: a private scene (model group and light) and the
/// offscreen target it renders into.
///
/// A slot does not know which model it holds or how it is posed; the caller
/// passes both in at render time.
pub struct Slot {
    id: SlotId,
    label: String,
    pub instance: ModelInstance,
    pub light: AccentLight,
    target: SlotTarget,
    binding: ModelBinding,
}

pub(crate) struct SlotSettings {
    pub size: (u32, u32),
    pub sample_count: u32,
    pub pointer_follow: f32,
}

impl Slot {
    pub(crate) fn new(gpu: &GpuContext, mesh_pass: &MeshPass, id: SlotId, settings: SlotSettings) -> Self {
        let label = format!("Slot {}", id.index());
        let (width, height) = settings.size;
        Self {
            id,
            instance: ModelInstance::new(settings.pointer_follow),
            light: AccentLight::default(),
            target: SlotTarget::new(gpu, width, height, settings.sample_count, &label),
            binding: mesh_pass.create_model_binding(gpu, &label),
            label,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn target(&self) -> &SlotTarget {
        &self.target
    }

    pub(crate) fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        self.target.ensure_size(gpu, width, height, &self.label);
    }

    /// Advance the pointer follow by one frame.
    pub fn update(&mut self, pointer: Vec2) {
        self.instance.follow_pointer(pointer);
    }

    /// Render `model` at `pose` into this slot's target, or just clear it when
    /// the model is not ready.
    pub(crate) fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        mesh_pass: &MeshPass,
        model: Option<&ModelAsset>,
        pose: Pose,
    ) {
        let draw = model.map(|asset| MeshDraw {
            mesh: &asset.mesh,
            uniforms: ModelUniforms::new(
                self.instance.model_matrix(&pose),
                asset.color,
                &self.light,
                self.light.world_position(&self.instance),
            ),
        });
        mesh_pass.render(gpu, encoder, &self.target, &self.binding, draw, &self.label);
    }
}
