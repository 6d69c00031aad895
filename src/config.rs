//! TOML configuration for the showcase.
//!
//! Every section is optional; missing values fall back to the defaults, which
//! reproduce the stool/table/bench showcase with no asset files.
//!
//! ```toml
//! [render]
//! msaa = 4
//! fxaa = "auto"
//!
//! [transition]
//! smoothing = 0.2
//!
//! [[models]]
//! name = "Chair"
//! path = "assets/chair.glb"
//! color = [0.7, 0.5, 0.3]
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::catalog::CatalogEntry;
use crate::error::{Error, Result};
use crate::geometry::Builtin;
use crate::gpu::Msaa;
use crate::mesh::Color;
use crate::scene::{Easing, FxaaMode};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowSection,
    pub render: RenderSection,
    pub transition: TransitionSection,
    pub camera: CameraSection,
    pub models: Vec<CatalogEntry>,
    pub menu: MenuSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowSection::default(),
            render: RenderSection::default(),
            transition: TransitionSection::default(),
            camera: CameraSection::default(),
            models: default_models(),
            menu: MenuSection::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "xfade".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub msaa: Msaa,
    pub fxaa: FxaaMode,
    /// `[min, max]` clamp applied to the window's scale factor.
    pub pixel_ratio: [f32; 2],
    pub clear_color: Color,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            msaa: Msaa::Auto,
            fxaa: FxaaMode::Auto,
            pixel_ratio: [1.0, 2.0],
            clear_color: Color::rgb(0.93, 0.92, 0.9),
        }
    }
}

impl RenderSection {
    /// Clamp a window scale factor into the configured pixel-ratio range.
    pub fn clamp_pixel_ratio(&self, scale_factor: f64) -> f32 {
        let [min, max] = self.pixel_ratio;
        (scale_factor as f32).clamp(min, max)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSection {
    /// Fraction of the remaining distance the blend coefficient covers per frame.
    pub smoothing: f32,
    /// Duration of the per-slot enter/leave pose tweens.
    pub tween_seconds: f32,
    /// Curve of the pose tweens: `linear`, `ease_in`, `ease_out` or `ease_in_out`.
    pub easing: Easing,
    /// Fraction of the remaining angle covered per frame when following the pointer.
    pub pointer_follow: f32,
}

impl Default for TransitionSection {
    fn default() -> Self {
        Self {
            smoothing: 0.2,
            tween_seconds: 0.6,
            easing: Easing::EaseOut,
            pointer_follow: 0.1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    pub position: [f32; 3],
    /// XYZ Euler angles in radians.
    pub rotation: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            position: [-2.5, 1.5, 2.0],
            rotation: [-0.5, -1.0, -0.4],
            fov: 38.0,
            near: 0.1,
            far: 12.0,
        }
    }
}

impl CameraSection {
    pub fn camera(&self) -> Camera {
        let [x, y, z] = self.rotation;
        Camera {
            position: Vec3::from(self.position),
            ..Camera::default()
        }
        .with_euler(x, y, z)
        .with_fov(self.fov)
        .clip_planes(self.near, self.far)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSection {
    /// Labels shown in the showcase list; labels matching a model name select it.
    pub items: Vec<String>,
    /// Item active at startup.
    pub initial: usize,
}

impl Default for MenuSection {
    fn default() -> Self {
        let items = "Lamp base. Stool. Outside table. Dish drainer. Closet door. Table. \
                     Square stool. Clothes rack. Bench. Bird feeder. Shelf. \
                     Handeplane surfing. Marking knife. Cutting board. Watch display";
        Self {
            items: items.split(". ").map(str::to_string).collect(),
            initial: 1,
        }
    }
}

fn default_models() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::builtin("Stool", Builtin::Stool, Color::rgb(0.78, 0.58, 0.38)),
        CatalogEntry::builtin("Table", Builtin::Table, Color::rgb(0.55, 0.38, 0.26)),
        CatalogEntry::builtin("Bench", Builtin::Bench, Color::rgb(0.42, 0.47, 0.4)),
    ]
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.transition;
        if !(t.smoothing > 0.0 && t.smoothing < 1.0) {
            return Err(Error::config(format!(
                "transition.smoothing must be in (0, 1), got {}",
                t.smoothing
            )));
        }
        if !(t.pointer_follow > 0.0 && t.pointer_follow <= 1.0) {
            return Err(Error::config(format!(
                "transition.pointer_follow must be in (0, 1], got {}",
                t.pointer_follow
            )));
        }
        if t.tween_seconds <= 0.0 {
            return Err(Error::config("transition.tween_seconds must be positive"));
        }

        let [min, max] = self.render.pixel_ratio;
        if min <= 0.0 || min > max {
            return Err(Error::config(format!(
                "render.pixel_ratio must be an increasing positive range, got [{min}, {max}]"
            )));
        }

        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(Error::config("camera clip planes must satisfy 0 < near < far"));
        }

        if self.models.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        for entry in &self.models {
            entry.source()?;
        }
        Ok(())
    }

    /// Catalog index of the model named by a menu label, if any.
    pub fn model_index(&self, label: &str) -> Option<usize> {
        self.models.iter().position(|m| m.name == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelSource;

    #[test]
    fn defaults_reproduce_showcase() {
        let config = Config::default();
        config.validate().unwrap();
        let names: Vec<_> = config.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Stool", "Table", "Bench"]);
        assert_eq!(config.menu.items.len(), 15);
        assert_eq!(config.menu.items[config.menu.initial], "Stool");
        assert_eq!(config.model_index("Bench"), Some(2));
        assert_eq!(config.model_index("Shelf"), None);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.models.len(), 3);
        assert_eq!(config.transition.smoothing, 0.2);
    }

    #[test]
    fn parses_sections_and_sources() {
        let config = Config::from_toml(
            r#"
            [render]
            msaa = 2
            fxaa = "on"

            [transition]
            smoothing = 0.1
            easing = "ease_in_out"

            [[models]]
            name = "Chair"
            path = "assets/chair.glb"
            color = [0.5, 0.4, 0.3]

            [[models]]
            name = "Stool"
            builtin = "stool"
            "#,
        )
        .unwrap();

        assert_eq!(config.render.msaa, Msaa::Samples(2));
        assert_eq!(config.render.fxaa, FxaaMode::On);
        assert_eq!(config.transition.smoothing, 0.1);
        assert_eq!(config.transition.tween_seconds, 0.6);
        assert_eq!(config.transition.easing, Easing::EaseInOut);
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].color, Color::rgb(0.5, 0.4, 0.3));
        assert!(matches!(
            config.models[1].source().unwrap(),
            ModelSource::Builtin(Builtin::Stool)
        ));
    }

    #[test]
    fn msaa_accepts_names() {
        let config = Config::from_toml("[render]\nmsaa = \"off\"").unwrap();
        assert_eq!(config.render.msaa, Msaa::Off);
        assert!(Config::from_toml("[render]\nmsaa = \"lots\"").is_err());
    }

    #[test]
    fn rejects_out_of_range_smoothing() {
        for bad in ["0.0", "1.0", "1.5"] {
            let text = format!("[transition]\nsmoothing = {bad}");
            assert!(matches!(Config::from_toml(&text), Err(Error::Config(_))));
        }
    }

    #[test]
    fn rejects_entry_with_two_sources() {
        let text = r#"
            [[models]]
            name = "Both"
            path = "a.stl"
            builtin = "bench"
        "#;
        assert!(matches!(Config::from_toml(text), Err(Error::Config(_))));
    }

    #[test]
    fn pixel_ratio_is_clamped() {
        let render = RenderSection::default();
        assert_eq!(render.clamp_pixel_ratio(0.5), 1.0);
        assert_eq!(render.clamp_pixel_ratio(1.5), 1.5);
        assert_eq!(render.clamp_pixel_ratio(3.0), 2.0);
    }
}
