//! Core GPU context and device management.
//!
//! This module provides [`GpuContext`], the struct that holds all wgpu resources
//! needed for rendering: device, queue, surface and surface configuration. It also
//! probes what the adapter can do with the surface format so the offscreen slot
//! targets know whether multisampling is available.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xfade::{GpuContext, Msaa};
//!
//! # fn demo(window: Arc<winit::window::Window>) -> xfade::Result<()> {
//! let gpu = GpuContext::new(window, Msaa::Auto)?;
//! println!("{}x{} with {}x MSAA", gpu.width(), gpu.height(), gpu.sample_count());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use winit::window::Window;

use crate::error::{Error, Result};

/// Highest sample count used for offscreen targets.
const PORTABLE_MAX_SAMPLES: u32 = 4;

/// Sample counts every device accepts for renderable formats.
const GUARANTEED_SAMPLES: [u32; 2] = [1, 4];

/// Requested multisampling for the offscreen slot targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MsaaRepr", into = "MsaaRepr")]
pub enum Msaa {
    /// Pick the highest portable sample count the surface format supports.
    #[default]
    Auto,
    /// Single-sampled targets.
    Off,
    /// A specific sample count; the nearest supported lower count is used otherwise.
    Samples(u32),
}

/// TOML form of [`Msaa`]: `"auto"`, `"off"` or a sample count.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MsaaRepr {
    Named(String),
    Samples(u32),
}

impl TryFrom<MsaaRepr> for Msaa {
    type Error = String;

    fn try_from(repr: MsaaRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            MsaaRepr::Named(name) => match name.as_str() {
                "auto" => Ok(Msaa::Auto),
                "off" => Ok(Msaa::Off),
                other => Err(format!("unknown msaa setting '{other}'")),
            },
            MsaaRepr::Samples(0) => Err("msaa sample count must be at least 1".to_string()),
            MsaaRepr::Samples(1) => Ok(Msaa::Off),
            MsaaRepr::Samples(count) => Ok(Msaa::Samples(count)),
        }
    }
}

impl From<Msaa> for MsaaRepr {
    fn from(msaa: Msaa) -> Self {
        match msaa {
            Msaa::Auto => MsaaRepr::Named("auto".to_string()),
            Msaa::Off => MsaaRepr::Named("off".to_string()),
            Msaa::Samples(count) => MsaaRepr::Samples(count),
        }
    }
}

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
/// The context is created once when the window appears and passed by reference
/// to every pass.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
    sample_count: u32,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// This performs all wgpu initialization:
    /// 1. Creates a wgpu instance with primary backends (Vulkan, Metal, DX12)
    /// 2. Creates a surface for the window
    /// 3. Requests a suitable GPU adapter
    /// 4. Resolves the multisample count for offscreen targets
    /// 5. Creates the logical device and command queue
    /// 6. Configures the surface with an sRGB format and Fifo present mode
    pub fn new(window: Arc<Window>, msaa: Msaa) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let adapter_info = adapter.get_info();
        info!(
            "using adapter {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let Some(&first_format) = surface_caps.formats.first() else {
            return Err(Error::SurfaceUnsupported("no surface formats"));
        };
        let Some(&alpha_mode) = surface_caps.alpha_modes.first() else {
            return Err(Error::SurfaceUnsupported("no surface alpha modes"));
        };
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(first_format);

        // Without this feature only the format's guaranteed sample counts are legal.
        let adapter_specific = adapter
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES);
        let required_features = if adapter_specific {
            wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
        } else {
            wgpu::Features::empty()
        };
        let format_features = if adapter_specific {
            adapter.get_texture_format_features(surface_format)
        } else {
            surface_format.guaranteed_format_features(required_features)
        };
        let supports_resolve = format_features
            .flags
            .contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE);
        let sample_count = pick_sample_count(
            &format_features.flags.supported_sample_counts(),
            msaa,
            supports_resolve,
            adapter_specific,
        );
        info!("offscreen targets use {sample_count}x multisampling (requested {msaa:?})");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("xfade device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sample_count,
        })
    }

    /// Resize the surface to new dimensions.
    ///
    /// Ignores zero-sized dimensions to avoid wgpu validation errors (which can
    /// occur during window minimize).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapply the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Color format shared by the surface and the offscreen targets.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Sample count resolved for offscreen targets (1 when multisampling is unavailable).
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Whether offscreen targets are multisampled.
    pub fn multisampled(&self) -> bool {
        self.sample_count > 1
    }
}

/// Resolve the requested MSAA setting against what the surface format supports.
///
/// Falls back to the nearest lower supported count, and to single sampling when the
/// format cannot resolve multisampled attachments. Unless the device was created
/// with adapter-specific format features, only the guaranteed counts 1 and 4 are
/// kept from `supported`.
pub fn pick_sample_count(
    supported: &[u32],
    requested: Msaa,
    supports_resolve: bool,
    adapter_specific: bool,
) -> u32 {
    let mut supported: Vec<u32> = supported
        .iter()
        .copied()
        .filter(|&count| count <= PORTABLE_MAX_SAMPLES)
        .filter(|count| adapter_specific || GUARANTEED_SAMPLES.contains(count))
        .collect();
    if !supported.contains(&1) {
        supported.push(1);
    }
    supported.sort_unstable();
    supported.dedup();

    let count = match requested {
        Msaa::Off => 1,
        Msaa::Auto => supported.last().copied().unwrap_or(1),
        Msaa::Samples(want) => {
            if supported.contains(&want) {
                want
            } else {
                let fallback = supported
                    .iter()
                    .copied()
                    .filter(|&count| count <= want)
                    .max()
                    .unwrap_or(1);
                warn!("{want}x MSAA not supported, falling back to {fallback}x");
                fallback
            }
        }
    };

    if count > 1 && !supports_resolve {
        warn!("surface format cannot resolve multisampled targets, disabling MSAA");
        return 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_picks_highest_portable_count() {
        assert_eq!(pick_sample_count(&[1, 2, 4, 8], Msaa::Auto, true, true), 4);
    }

    #[test]
    fn unsupported_request_falls_back_lower() {
        assert_eq!(pick_sample_count(&[1, 4], Msaa::Samples(2), true, true), 1);
        assert_eq!(pick_sample_count(&[1, 2, 4], Msaa::Samples(8), true, true), 4);
    }

    #[test]
    fn adapter_specific_counts_need_the_feature() {
        assert_eq!(pick_sample_count(&[1, 2, 4], Msaa::Samples(2), true, false), 1);
        assert_eq!(pick_sample_count(&[1, 2], Msaa::Auto, true, false), 1);
        assert_eq!(pick_sample_count(&[1, 2, 4], Msaa::Samples(2), true, true), 2);
        assert_eq!(pick_sample_count(&[1, 2, 4], Msaa::Auto, true, false), 4);
    }

    #[test]
    fn missing_resolve_disables_msaa() {
        assert_eq!(pick_sample_count(&[1, 4], Msaa::Auto, false, true), 1);
    }

    #[test]
    fn off_and_empty_lists_are_single_sampled() {
        assert_eq!(pick_sample_count(&[1, 4], Msaa::Off, true, true), 1);
        assert_eq!(pick_sample_count(&[], Msaa::Auto, true, true), 1);
    }
}
