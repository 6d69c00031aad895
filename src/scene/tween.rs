//! Enter/leave pose tweens for the model in each slot.
//!
//! A slot that becomes shown eases its model from wherever it currently is into
//! the `enter` pose; a slot that becomes hidden eases toward `leave`. A slot that
//! has never been shown rests at `from`. Retargeting mid-tween starts from the
//! current interpolated pose, so there is never a jump.

use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Easing curves for pose tweens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    /// Start fast, decelerate.
    #[default]
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Map linear progress in `[0, 1]` onto the curve.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Rotation (XYZ Euler, radians) and scale of a model in its slot scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Pose {
    pub fn new(rotation: Vec3, scale: f32) -> Self {
        Self {
            rotation,
            scale: Vec3::splat(scale),
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), Vec3::ZERO)
    }
}

/// Component-wise interpolation between two poses.
pub fn interpolate(a: Pose, b: Pose, t: f32) -> Pose {
    Pose {
        rotation: a.rotation.lerp(b.rotation, t),
        scale: a.scale.lerp(b.scale, t),
    }
}

/// The three resting poses a slot model moves between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframes {
    pub from: Pose,
    pub enter: Pose,
    pub leave: Pose,
}

impl Default for Keyframes {
    fn default() -> Self {
        Self {
            from: Pose::new(Vec3::new(0.0, -PI / 10.0, 0.0), 0.8),
            enter: Pose::new(Vec3::ZERO, 1.0),
            leave: Pose::new(Vec3::new(0.0, PI / 10.0, 0.0), 0.8),
        }
    }
}

/// Pose animation for one slot.
#[derive(Clone, Debug)]
pub struct SlotTween {
    start: Pose,
    goal: Pose,
    elapsed: f32,
    duration: f32,
    easing: Easing,
    shown: bool,
}

impl SlotTween {
    /// A tween resting at `keyframes.from`.
    pub fn new(keyframes: &Keyframes, duration: f32) -> Self {
        Self {
            start: keyframes.from,
            goal: keyframes.from,
            elapsed: duration,
            duration,
            easing: Easing::default(),
            shown: false,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Head for `enter` or `leave`. Does nothing if the slot is already heading there.
    pub fn set_shown(&mut self, shown: bool, keyframes: &Keyframes) {
        if shown == self.shown {
            return;
        }
        self.start = self.pose();
        self.goal = if shown { keyframes.enter } else { keyframes.leave };
        self.elapsed = 0.0;
        self.shown = shown;
    }

    pub fn advance(&mut self, dt: f32) -> Pose {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.pose()
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn pose(&self) -> Pose {
        interpolate(self.start, self.goal, self.easing.apply(self.progress()))
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_settled(&self) -> bool {
        self.progress() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Pose, b: Pose) -> bool {
        (a.rotation - b.rotation).length() < 1e-5 && (a.scale - b.scale).length() < 1e-5
    }

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
    }

    #[test]
    fn unshown_slot_rests_at_from() {
        let keyframes = Keyframes::default();
        let mut tween = SlotTween::new(&keyframes, 0.5);
        assert!(close(tween.advance(1.0), keyframes.from));
        assert!(!tween.is_shown());
    }

    #[test]
    fn entering_reaches_enter_pose() {
        let keyframes = Keyframes::default();
        let mut tween = SlotTween::new(&keyframes, 0.5);
        tween.set_shown(true, &keyframes);

        let midway = tween.advance(0.25);
        assert!(midway.scale.x > 0.8 && midway.scale.x < 1.0);

        assert!(close(tween.advance(0.25), keyframes.enter));
        assert!(tween.is_settled());
    }

    #[test]
    fn retarget_mid_tween_is_continuous() {
        let keyframes = Keyframes::default();
        let mut tween = SlotTween::new(&keyframes, 1.0).with_easing(Easing::Linear);
        tween.set_shown(true, &keyframes);
        let before = tween.advance(0.5);

        tween.set_shown(false, &keyframes);

        assert!(close(tween.pose(), before));
        assert!(close(tween.advance(1.0), keyframes.leave));
    }

    #[test]
    fn repeated_show_does_not_restart() {
        let keyframes = Keyframes::default();
        let mut tween = SlotTween::new(&keyframes, 1.0);
        tween.set_shown(true, &keyframes);
        tween.advance(0.5);
        let progress = tween.progress();

        tween.set_shown(true, &keyframes);

        assert_eq!(tween.progress(), progress);
    }
}
