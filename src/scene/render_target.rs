//! Offscreen color + depth target owned by one slot.

use log::warn;

use crate::gpu::GpuContext;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Size of the offscreen targets for a window.
///
/// Targets follow the window's logical size times the clamped pixel ratio, so a
/// display with a scale factor above the clamp renders at reduced resolution and
/// the composite pass scales it back up.
pub fn target_size(physical: (u32, u32), scale_factor: f64, pixel_ratio: f32) -> (u32, u32) {
    let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    let scale = pixel_ratio as f64 / scale_factor;
    let (width, height) = physical;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// A slot's offscreen render target.
///
/// With multisampling the model is drawn into `msaa_view` and resolved into the
/// sampled texture; otherwise it is drawn into the sampled texture directly.
pub struct SlotTarget {
    /// Single-sampled texture the composite pass reads.
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    pub(crate) depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    sample_count: u32,
}

impl SlotTarget {
    /// Allocate a target, dropping to single sampling if the multisampled
    /// attachments cannot be created.
    pub fn new(gpu: &GpuContext, width: u32, height: u32, sample_count: u32, label: &str) -> Self {
        if sample_count > 1 {
            match Self::try_allocate(gpu, width, height, sample_count, label) {
                Some(target) => return target,
                None => warn!("{label}: {sample_count}x target unavailable, rendering without MSAA"),
            }
        }
        Self::allocate(gpu, width, height, 1, label)
    }

    /// Reallocate when the requested size differs from the current one.
    ///
    /// Returns true when the textures were replaced, which invalidates any bind
    /// group holding the old view. A target that already fell back to single
    /// sampling stays single-sampled.
    pub fn ensure_size(&mut self, gpu: &GpuContext, width: u32, height: u32, label: &str) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        *self = Self::new(gpu, width, height, self.sample_count, label);
        true
    }

    fn try_allocate(
        gpu: &GpuContext,
        width: u32,
        height: u32,
        sample_count: u32,
        label: &str,
    ) -> Option<Self> {
        gpu.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let target = Self::allocate(gpu, width, height, sample_count, label);
        let validation = pollster::block_on(gpu.device.pop_error_scope());
        let out_of_memory = pollster::block_on(gpu.device.pop_error_scope());

        match validation.or(out_of_memory) {
            Some(err) => {
                warn!("{label}: {err}");
                None
            }
            None => Some(target),
        }
    }

    fn allocate(gpu: &GpuContext, width: u32, height: u32, sample_count: u32, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let attachment = |name: &str, samples: u32, format, usage| {
            gpu.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("{label} {name}")),
                size,
                mip_level_count: 1,
                sample_count: samples,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let texture = attachment(
            "color",
            1,
            gpu.format(),
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let msaa_view = (sample_count > 1).then(|| {
            attachment(
                "msaa",
                sample_count,
                gpu.format(),
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
            .create_view(&wgpu::TextureViewDescriptor::default())
        });
        let depth_view = attachment(
            "depth",
            sample_count,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
        .create_view(&wgpu::TextureViewDescriptor::default());

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            msaa_view,
            depth_view,
            width,
            height,
            sample_count,
        }
    }

    /// Color attachment that clears to `clear` and ends up in [`view`](Self::view).
    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&self.view)),
            None => (&self.view, None),
        };
        wgpu::RenderPassColorAttachment {
            view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: if resolve_target.is_some() {
                    wgpu::StoreOp::Discard
                } else {
                    wgpu::StoreOp::Store
                },
            },
            depth_slice: None,
        }
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Discard,
            }),
            stencil_ops: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per pixel actually allocated, which may be lower than requested.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_scale_keeps_physical_size() {
        assert_eq!(target_size((1280, 720), 1.0, 1.0), (1280, 720));
        assert_eq!(target_size((2560, 1440), 2.0, 2.0), (2560, 1440));
    }

    #[test]
    fn clamped_ratio_shrinks_targets() {
        // scale factor 3 clamped to 2
        assert_eq!(target_size((3000, 1500), 3.0, 2.0), (2000, 1000));
    }

    #[test]
    fn size_never_reaches_zero() {
        assert_eq!(target_size((0, 0), 1.0, 1.0), (1, 1));
        assert_eq!(target_size((100, 100), 0.0, 1.0), (100, 100));
    }
}
