//! The GPU-free half of the crossfade: which slot is shown and how far the
//! blend and the slot poses have travelled toward it.

use log::debug;

use super::animator::BlendAnimator;
use super::state::{Selection, SlotId, TransitionState};
use super::tween::{Easing, Keyframes, Pose, SlotTween};
use crate::error::Result;

/// Owns the transition state, the blend animator and one pose tween per slot,
/// and keeps the three in step on every selection.
#[derive(Clone, Debug)]
pub struct TransitionDirector {
    state: TransitionState,
    animator: BlendAnimator,
    tweens: [SlotTween; 2],
    keyframes: Keyframes,
}

impl TransitionDirector {
    /// Start with `initial_model` in the first slot, shown and entering.
    ///
    /// The blend coefficient starts below zero so the first frames fade in.
    pub fn new(
        initial_model: usize,
        catalog_len: usize,
        smoothing: f32,
        tween_seconds: f32,
        easing: Easing,
        keyframes: Keyframes,
    ) -> Result<Self> {
        let state = TransitionState::new(initial_model, catalog_len)?;
        let mut tweens =
            SlotId::ALL.map(|_| SlotTween::new(&keyframes, tween_seconds).with_easing(easing));
        tweens[state.shown().index()].set_shown(true, &keyframes);

        Ok(Self {
            state,
            animator: BlendAnimator::new(smoothing),
            tweens,
            keyframes,
        })
    }

    /// Show catalog model `index`. Any change of shown slot retargets the
    /// animator and flips both pose tweens; `Unchanged` touches neither.
    pub fn select_model(&mut self, index: usize) -> Result<Selection> {
        let selection = self.state.select_model(index)?;
        if let Some(shown) = selection.shown() {
            self.animator.retarget(shown);
            self.tweens[shown.index()].set_shown(true, &self.keyframes);
            self.tweens[shown.other().index()].set_shown(false, &self.keyframes);
            debug!("blend heading to {}", self.animator.target());
        }
        Ok(selection)
    }

    /// Advance the blend by one frame and both tweens by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.animator.step();
        for tween in &mut self.tweens {
            tween.advance(dt);
        }
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn animator(&self) -> &BlendAnimator {
        &self.animator
    }

    pub fn tween(&self, slot: SlotId) -> &SlotTween {
        &self.tweens[slot.index()]
    }

    /// Current model pose for both slots, in slot order.
    pub fn poses(&self) -> [Pose; 2] {
        [self.tweens[0].pose(), self.tweens[1].pose()]
    }

    /// Current blend coefficient.
    pub fn shown_txt(&self) -> f32 {
        self.animator.value()
    }
}
