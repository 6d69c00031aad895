//! # xfade
//!
//! **Crossfade between interchangeable 3D models without popping.**
//!
//! Two offscreen targets each hold one fully rendered model. A fullscreen pass
//! mixes them by a coefficient that eases toward whichever target is shown, and
//! a small state machine decides which target receives a newly selected model,
//! hot-swapping the hidden one when the model is not already resident.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> xfade::Result<()> {
//!     let config = xfade::Config::load("showcase.toml")?;
//!     xfade::run(config)
//! }
//! ```
//!
//! The GPU-free core can be driven on its own:
//!
//! ```
//! use xfade::scene::{Selection, SlotId, TransitionState};
//!
//! let mut state = TransitionState::new(0, 3)?;
//! assert_eq!(state.select_model(1)?, Selection::Switched { shown: SlotId::Second });
//! # Ok::<(), xfade::Error>(())
//! ```

mod app;
mod camera;
mod catalog;
mod config;
mod error;
mod geometry;
mod gpu;
mod input;
mod menu;
mod mesh;
mod mesh_pass;
pub mod scene;

pub use app::run;
pub use camera::Camera;
pub use catalog::{CatalogEntry, ModelAsset, ModelCatalog, ModelSource, load_models};
pub use config::{
    CameraSection, Config, MenuSection, RenderSection, TransitionSection, WindowSection,
};
pub use error::{Error, Result};
pub use geometry::{Builtin, GeometryError, RawGeometry};
pub use gpu::{GpuContext, Msaa, pick_sample_count};
pub use input::Input;
pub use menu::{Menu, MenuItem};
pub use mesh::{Color, Mesh, Vertex3d};
pub use mesh_pass::{CameraUniforms, MeshDraw, MeshPass, ModelBinding, ModelUniforms};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3};
