//! The dual-slot crossfade scene.
//!
//! Two slots each render one catalog model into their own offscreen target. A
//! fullscreen pass mixes the two targets by a scalar coefficient that eases
//! toward the index of the shown slot, so switching models is a crossfade
//! rather than a cut.
//!
//! # Overview
//!
//! - [`TransitionState`] decides which model lives in which slot and which slot
//!   is shown. Selecting a model already in the hidden slot just flips the shown
//!   slot; selecting one that is not resident writes it into the hidden slot first.
//! - [`BlendAnimator`] steps the coefficient once per frame.
//! - [`TransitionDirector`] keeps the state, the animator and the per-slot pose
//!   tweens in step on every selection, without touching the GPU.
//! - [`DualTargets`] owns the slots and renders them in order.
//! - [`BlendPass`] composites the two targets onto the surface.
//! - [`CrossfadeScene`] wires these together for the application.
//!
//! # Example
//!
//! ```ignore
//! let mut scene = CrossfadeScene::new(&gpu, catalog.len(), size, settings)?;
//!
//! scene.select_model(2)?;
//!
//! // every frame
//! scene.update(FrameInput { pointer, dt });
//! scene.render(&gpu, &mut encoder, &surface_view, &catalog);
//! ```

mod animator;
mod blend_pass;
mod director;
mod manager;
mod model;
mod render_target;
mod slot;
mod state;
mod targets;
mod tween;

pub use animator::{BlendAnimator, DEFAULT_SMOOTHING, INITIAL_COEFFICIENT};
pub use blend_pass::{BlendFactors, BlendPass, FxaaMode, Sampling, blend_factors};
pub use director::TransitionDirector;
pub use manager::{CrossfadeScene, FrameInput, SceneSettings};
pub use model::{AccentLight, ModelInstance};
pub use render_target::{DEPTH_FORMAT, SlotTarget, target_size};
pub use slot::Slot;
pub use state::{Selection, SlotId, TransitionState};
pub use targets::DualTargets;
pub use tween::{Easing, Keyframes, Pose, SlotTween, interpolate};
