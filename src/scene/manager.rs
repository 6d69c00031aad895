//! The crossfade scene: two slot renders composited by a smoothed coefficient.

use glam::Vec2;
use log::{debug, info};

use super::blend_pass::{BlendPass, FxaaMode};
use super::director::TransitionDirector;
use super::state::Selection;
use super::targets::DualTargets;
use super::tween::{Easing, Keyframes};
use crate::camera::Camera;
use crate::catalog::ModelCatalog;
use crate::error::Result;
use crate::gpu::GpuContext;
use crate::mesh::Color;

/// Tunables for a [`CrossfadeScene`].
#[derive(Clone, Debug)]
pub struct SceneSettings {
    pub initial_model: usize,
    pub smoothing: f32,
    pub tween_seconds: f32,
    pub easing: Easing,
    pub pointer_follow: f32,
    pub fxaa: FxaaMode,
    pub background: Color,
    pub camera: Camera,
    pub keyframes: Keyframes,
}

/// Per-frame inputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    /// Pointer in `[-1, 1]` per axis, +y up.
    pub pointer: Vec2,
    /// Seconds since the previous frame.
    pub dt: f32,
}

/// Owns the transition and everything that renders it.
///
/// Each frame runs in a fixed order: [`update`](Self::update) steps the blend
/// coefficient and the slot animations, then [`render`](Self::render) draws the
/// first slot, the second slot, and finally the composite. Selections may arrive
/// at any point between frames.
pub struct CrossfadeScene {
    director: TransitionDirector,
    targets: DualTargets,
    blend: BlendPass,
    camera: Camera,
    background: Color,
}

impl CrossfadeScene {
    pub fn new(
        gpu: &GpuContext,
        catalog_len: usize,
        target_size: (u32, u32),
        settings: SceneSettings,
    ) -> Result<Self> {
        let director = TransitionDirector::new(
            settings.initial_model,
            catalog_len,
            settings.smoothing,
            settings.tween_seconds,
            settings.easing,
            settings.keyframes,
        )?;
        let targets = DualTargets::new(gpu, target_size, settings.pointer_follow);

        let sampling = settings.fxaa.sampling(gpu.multisampled());
        info!(
            "crossfade scene: slots {:?}, {}x{} targets, {sampling:?} sampling",
            director.state().assignment(),
            target_size.0,
            target_size.1
        );

        Ok(Self {
            director,
            targets,
            blend: BlendPass::new(gpu, sampling),
            camera: settings.camera,
            background: settings.background,
        })
    }

    /// Show catalog model `index`, crossfading from whatever is shown now.
    pub fn select_model(&mut self, index: usize) -> Result<Selection> {
        self.director.select_model(index)
    }

    /// Resize the offscreen targets.
    pub fn resize(&mut self, gpu: &GpuContext, target_size: (u32, u32)) {
        if target_size != self.targets.size() {
            debug!("resizing slot targets to {}x{}", target_size.0, target_size.1);
            self.targets.resize(gpu, target_size);
        }
    }

    pub fn update(&mut self, input: FrameInput) {
        self.director.step(input.dt);
        self.targets.update(input.pointer);
    }

    /// Record both slot renders and the composite into `encoder`.
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        catalog: &ModelCatalog,
    ) {
        self.targets.render(
            gpu,
            encoder,
            self.director.state(),
            self.director.poses(),
            catalog,
            &self.camera,
        );
        self.blend.render(
            gpu,
            encoder,
            surface_view,
            self.targets.views(),
            self.director.shown_txt(),
            self.background,
        );
    }
}
