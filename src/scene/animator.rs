use super::state::SlotId;

/// Coefficient before the first frame. Values below zero fade the whole
/// composite in from transparent.
pub const INITIAL_COEFFICIENT: f32 = -1.0;

/// Default fraction of the remaining distance covered per frame.
pub const DEFAULT_SMOOTHING: f32 = 0.2;

/// Drives the scalar blend coefficient toward the shown slot.
///
/// Each [`step`](BlendAnimator::step) moves the coefficient a fixed fraction of
/// the way to its target, so after `n` frames the remaining distance is
/// `(1 - smoothing)^n` of where it started. The rate is per frame, not per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendAnimator {
    current: f32,
    target: f32,
    smoothing: f32,
}

impl Default for BlendAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl BlendAnimator {
    /// Start at [`INITIAL_COEFFICIENT`] heading for the first slot.
    pub fn new(smoothing: f32) -> Self {
        Self {
            current: INITIAL_COEFFICIENT,
            target: SlotId::First.coefficient(),
            smoothing,
        }
    }

    pub fn with_value(mut self, current: f32) -> Self {
        self.current = current;
        self
    }

    /// Head for `shown` from wherever the coefficient currently is.
    pub fn retarget(&mut self, shown: SlotId) {
        self.target = shown.coefficient();
    }

    /// Advance one frame and return the new coefficient.
    pub fn step(&mut self) -> f32 {
        self.current += (self.target - self.current) * self.smoothing;
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        (self.target - self.current).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_from_initial_value() {
        let mut animator = BlendAnimator::default();
        assert_eq!(animator.value(), -1.0);
        assert!((animator.step() + 0.8).abs() < 1e-6);
    }

    #[test]
    fn retarget_keeps_current_value() {
        let mut animator = BlendAnimator::default().with_value(0.3);
        animator.retarget(SlotId::Second);
        assert_eq!(animator.value(), 0.3);
        assert_eq!(animator.target(), 1.0);
        let next = animator.step();
        assert!((next - 0.44).abs() < 1e-6);
    }

    #[test]
    fn settles_on_target() {
        let mut animator = BlendAnimator::default().with_value(1.0);
        animator.retarget(SlotId::First);
        for _ in 0..60 {
            animator.step();
        }
        assert!(animator.is_settled(1e-4));
        assert!(animator.value() >= 0.0);
    }
}
