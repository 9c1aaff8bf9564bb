#![doc = r#"
Camera [E]: position/rotation, the projection table sprites consult each
frame, and a frustum clamped into hardware limits (§4.D).
"#]

use super::optics::{Optics, ProjectionTable};
use crate::math::{Frustum, Rotation, Vector3D};

bitflags::bitflags! {
    /// Tracks which derived camera state is stale. Any positional delta sets
    /// `PROJECTION`; any Z delta also sets `SCALE`; any rotation sets
    /// `ROTATION`. Sprites consult these each frame to decide whether their
    /// own projected screen position must be recomputed (§4.D).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CameraFlags: u8 {
        const INVALIDATE_PROJECTION = 0b001;
        const INVALIDATE_SCALE      = 0b010;
        const INVALIDATE_ROTATION   = 0b100;
    }
}

pub struct Camera {
    position: Vector3D,
    rotation: Rotation,
    inverted_rotation: Rotation,
    optics: Optics,
    frustum: Frustum,
    hardware_limits: Frustum,
    /// Stage-size cap: the camera's position is clamped so it never looks
    /// past the edge of the loaded stage.
    stage_size: Vector3D,
    flags: CameraFlags,
}

impl Camera {
    pub fn new(optics: Optics, hardware_limits: Frustum, stage_size: Vector3D) -> Self {
        Camera {
            position: Vector3D::ZERO,
            rotation: Rotation::ZERO,
            inverted_rotation: Rotation::ZERO,
            optics,
            frustum: hardware_limits,
            hardware_limits,
            stage_size,
            flags: CameraFlags::empty(),
        }
    }

    pub fn position(&self) -> Vector3D {
        self.position
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn inverted_rotation(&self) -> Rotation {
        self.inverted_rotation
    }

    pub fn flags(&self) -> CameraFlags {
        self.flags
    }

    pub fn clear_flags(&mut self) {
        self.flags = CameraFlags::empty();
    }

    /// Moves the camera, clamping it within the stage bounds. Sets
    /// `INVALIDATE_PROJECTION` always; additionally sets `INVALIDATE_SCALE`
    /// if the Z component changed, per §4.D.
    pub fn set_position(&mut self, position: Vector3D) {
        let clamped = Vector3D::new(
            position.x.clamp(-self.stage_size.x, self.stage_size.x),
            position.y.clamp(-self.stage_size.y, self.stage_size.y),
            position.z.clamp(-self.stage_size.z, self.stage_size.z),
        );
        let z_changed = clamped.z != self.position.z;
        self.position = clamped;
        self.flags.insert(CameraFlags::INVALIDATE_PROJECTION);
        if z_changed {
            self.flags.insert(CameraFlags::INVALIDATE_SCALE);
        }
    }

    pub fn translate(&mut self, delta: Vector3D) {
        self.set_position(self.position + delta);
    }

    /// Rotates the camera, recaching the inverted rotation and setting
    /// `INVALIDATE_ROTATION`.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.inverted_rotation = rotation.invert();
        self.flags.insert(CameraFlags::INVALIDATE_ROTATION);
    }

    /// Projects a world point relative to the camera (position already
    /// subtracted by the caller's transform pipeline) using the current
    /// optics, then clamps the result into the frustum's hardware limits.
    pub fn project(&self, relative: Vector3D) -> ProjectionTable {
        self.optics.project(relative.x, relative.y, relative.z)
    }

    pub fn frustum(&self) -> Frustum {
        self.frustum
    }

    /// Recomputes the frustum from the optics and clamps it into the
    /// hardware's addressable limits. Called once the camera's Z-dependent
    /// state changes.
    pub fn recompute_frustum(&mut self, candidate: Frustum) {
        self.frustum = candidate.clamp_into(self.hardware_limits);
    }

    pub fn optics(&self) -> &Optics {
        &self.optics
    }

    pub fn optics_mut(&mut self) -> &mut Optics {
        &mut self.optics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fix13;

    fn test_camera() -> Camera {
        let limits = Frustum::new(
            Fix13::from_int(-192),
            Fix13::from_int(192),
            Fix13::from_int(-112),
            Fix13::from_int(112),
            Fix13::ZERO,
            Fix13::from_int(4096),
        );
        Camera::new(Optics::default(), limits, Vector3D::from_ints(1000, 1000, 1000))
    }

    #[test]
    fn positional_delta_sets_projection_flag_only_when_z_unchanged() {
        let mut camera = test_camera();
        camera.clear_flags();
        camera.set_position(Vector3D::from_ints(10, 0, 0));
        assert!(camera.flags().contains(CameraFlags::INVALIDATE_PROJECTION));
        assert!(!camera.flags().contains(CameraFlags::INVALIDATE_SCALE));
    }

    #[test]
    fn z_delta_also_sets_scale_flag() {
        let mut camera = test_camera();
        camera.clear_flags();
        camera.set_position(Vector3D::from_ints(0, 0, 50));
        assert!(camera.flags().contains(CameraFlags::INVALIDATE_SCALE));
    }

    #[test]
    fn rotation_sets_rotation_flag_and_caches_inverse() {
        let mut camera = test_camera();
        camera.set_rotation(Rotation::new(Fix13::from_int(90), Fix13::ZERO, Fix13::ZERO));
        assert!(camera.flags().contains(CameraFlags::INVALIDATE_ROTATION));
        assert_eq!(camera.inverted_rotation().x.to_int(), 270);
    }

    #[test]
    fn position_clamps_to_stage_size() {
        let mut camera = test_camera();
        camera.set_position(Vector3D::from_ints(5000, 0, 0));
        assert_eq!(camera.position().x.to_int(), 1000);
    }

    #[test]
    fn frustum_never_exceeds_hardware_limits() {
        let mut camera = test_camera();
        let oversized = Frustum::new(
            Fix13::from_int(-999),
            Fix13::from_int(999),
            Fix13::from_int(-999),
            Fix13::from_int(999),
            Fix13::ZERO,
            Fix13::from_int(4096),
        );
        camera.recompute_frustum(oversized);
        assert_eq!(camera.frustum().x0.to_int(), -192);
        assert_eq!(camera.frustum().x1.to_int(), 192);
    }
}
