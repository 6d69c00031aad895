use glam::Vec2;

use super::slot::{Slot, SlotSettings};
use super::state::{SlotId, TransitionState};
use super::tween::Pose;
use crate::camera::Camera;
use crate::catalog::ModelCatalog;
use crate::gpu::GpuContext;
use crate::mesh_pass::MeshPass;

/// The two slots and the pass that renders models into them.
pub struct DualTargets {
    slots: [Slot; 2],
    mesh_pass: MeshPass,
    size: (u32, u32),
}

impl DualTargets {
    pub fn new(gpu: &GpuContext, size: (u32, u32), pointer_follow: f32) -> Self {
        let mesh_pass = MeshPass::new(gpu, gpu.sample_count());
        let slots = SlotId::ALL.map(|id| {
            Slot::new(
                gpu,
                &mesh_pass,
                id,
                SlotSettings {
                    size,
                    sample_count: gpu.sample_count(),
                    pointer_follow,
                },
            )
        });
        Self {
            slots,
            mesh_pass,
            size,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn resize(&mut self, gpu: &GpuContext, size: (u32, u32)) {
        if size == self.size {
            return;
        }
        let (width, height) = size;
        for slot in &mut self.slots {
            slot.resize(gpu, width, height);
        }
        self.size = size;
    }

    pub fn update(&mut self, pointer: Vec2) {
        for slot in &mut self.slots {
            slot.update(pointer);
        }
    }

    /// Render both slots, first then second, each with the model the state
    /// assigns it at the matching pose.
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        state: &TransitionState,
        poses: [Pose; 2],
        catalog: &ModelCatalog,
        camera: &Camera,
    ) {
        let (width, height) = self.size;
        self.mesh_pass
            .prepare_camera(gpu, camera, width as f32 / height.max(1) as f32);

        for (slot, pose) in self.slots.iter().zip(poses) {
            let model = catalog.get(state.model_in(slot.id()));
            slot.render(gpu, encoder, &self.mesh_pass, model, pose);
        }
    }

    /// Sampled views in slot order, for the composite pass.
    pub fn views(&self) -> [&wgpu::TextureView; 2] {
        [&self.slots[0].target().view, &self.slots[1].target().view]
    }
}
