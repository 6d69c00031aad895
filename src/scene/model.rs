use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use super::tween::Pose;

/// Radians of group rotation per unit of normalized pointer offset.
const POINTER_ANGLE: f32 = PI / 150.0;

/// The group holding a slot's model and its accent light.
///
/// The group leans toward the pointer: each frame its orientation slerps a fixed
/// fraction of the way toward a target derived from the pointer position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelInstance {
    orientation: Quat,
    follow: f32,
}

impl ModelInstance {
    pub fn new(follow: f32) -> Self {
        Self {
            orientation: Quat::IDENTITY,
            follow,
        }
    }

    /// Orientation the group leans toward for a pointer in `[-1, 1]`, +y up.
    pub fn target_orientation(pointer: Vec2) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            0.0,
            pointer.x * POINTER_ANGLE,
            -pointer.y * POINTER_ANGLE,
        )
    }

    pub fn follow_pointer(&mut self, pointer: Vec2) {
        let target = Self::target_orientation(pointer);
        self.orientation = self.orientation.slerp(target, self.follow);
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Group transform.
    pub fn group_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation)
    }

    /// World matrix for the model at `pose` inside the group.
    pub fn model_matrix(&self, pose: &Pose) -> Mat4 {
        self.group_matrix() * pose.matrix()
    }
}

/// Point light riding along with a slot's model group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccentLight {
    pub position: Vec3,
    pub intensity: f32,
    pub decay: f32,
    /// Ambient term added to every lit fragment.
    pub ambient: f32,
}

impl Default for AccentLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(4.0, 6.0, -1.0),
            intensity: 0.6,
            decay: 3.0,
            ambient: 0.5,
        }
    }
}

impl AccentLight {
    /// Light position after applying the group transform.
    pub fn world_position(&self, instance: &ModelInstance) -> Vec3 {
        instance.group_matrix().transform_point3(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_pointer_targets_identity() {
        let target = ModelInstance::target_orientation(Vec2::ZERO);
        assert!(target.angle_between(Quat::IDENTITY) < 1e-6);
    }

    #[test]
    fn follow_moves_a_fraction_of_the_way() {
        let mut instance = ModelInstance::new(0.5);
        let target = ModelInstance::target_orientation(Vec2::new(1.0, 0.0));

        instance.follow_pointer(Vec2::new(1.0, 0.0));

        let full = Quat::IDENTITY.angle_between(target);
        let moved = Quat::IDENTITY.angle_between(instance.orientation());
        assert!((moved / full - 0.5).abs() < 0.02);
    }

    #[test]
    fn light_turns_with_group() {
        let light = AccentLight::default();
        let mut instance = ModelInstance::new(1.0);
        assert!((light.world_position(&instance) - light.position).length() < 1e-6);

        instance.follow_pointer(Vec2::new(1.0, 1.0));
        let moved = light.world_position(&instance);
        assert!((moved - light.position).length() > 1e-4);
        assert!((moved.length() - light.position.length()).abs() < 1e-4);
    }
}
