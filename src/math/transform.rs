#![doc = r#"
Transformation: local position/rotation/scale plus derived global values and
an invalidity flag, per §3 DATA MODEL. Concatenation of parent×child is
addition for position/rotation and multiplication for scale (Rotation::concat
/ Scale::concat already encode that). Global values are authoritative only
when `invalidity` is `Clean`.
"#]

use super::rotation::{Rotation, Scale};
use super::vector::Vector3D;

/// Tracks which derived (global) fields are stale and must be recomputed from
/// the parent's global transform before being trusted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Invalidity {
    #[default]
    Clean,
    PositionOnly,
    RotationInvalid,
    ScaleInvalid,
    FullyInvalid,
}

impl Invalidity {
    /// Folds two invalidation requests into the broader of the two, since a
    /// transform that is invalid in one respect and then another becomes
    /// "fully invalid" rather than silently dropping the first request.
    pub fn merge(self, other: Invalidity) -> Invalidity {
        use Invalidity::*;
        match (self, other) {
            (Clean, other) => other,
            (current, Clean) => current,
            (a, b) if a == b => a,
            _ => FullyInvalid,
        }
    }

    pub fn needs_position(self) -> bool {
        !matches!(self, Invalidity::Clean)
    }

    pub fn needs_rotation(self) -> bool {
        matches!(self, Invalidity::RotationInvalid | Invalidity::FullyInvalid)
    }

    pub fn needs_scale(self) -> bool {
        matches!(self, Invalidity::ScaleInvalid | Invalidity::FullyInvalid)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transformation {
    pub local_position: Vector3D,
    pub local_rotation: Rotation,
    pub local_scale: Scale,

    pub global_position: Vector3D,
    pub global_rotation: Rotation,
    pub global_scale: Scale,

    pub invalidity: Invalidity,
}

impl Transformation {
    pub fn identity() -> Self {
        Transformation {
            local_position: Vector3D::ZERO,
            local_rotation: Rotation::ZERO,
            local_scale: Scale::UNIT,
            global_position: Vector3D::ZERO,
            global_rotation: Rotation::ZERO,
            global_scale: Scale::UNIT,
            invalidity: Invalidity::Clean,
        }
    }

    /// Sets the local position, marking the global position stale.
    pub fn set_local_position(&mut self, position: Vector3D) {
        self.local_position = position;
        self.invalidity = self.invalidity.merge(Invalidity::PositionOnly);
    }

    pub fn set_local_rotation(&mut self, rotation: Rotation) {
        self.local_rotation = rotation;
        self.invalidity = self.invalidity.merge(Invalidity::RotationInvalid);
    }

    pub fn set_local_scale(&mut self, scale: Scale) {
        self.local_scale = scale;
        self.invalidity = self.invalidity.merge(Invalidity::ScaleInvalid);
    }

    /// Recomputes global position/rotation/scale from a (clean) parent
    /// transform and clears the invalidity flag. Called by the scene graph
    /// during its transform-propagation pass (§4 Component Q).
    pub fn concatenate(&mut self, parent: &Transformation) {
        if self.invalidity.needs_position() {
            self.global_position = parent.global_position + self.local_position;
        }
        if self.invalidity.needs_rotation() {
            self.global_rotation = parent.global_rotation.concat(self.local_rotation);
        }
        if self.invalidity.needs_scale() {
            self.global_scale = parent.global_scale.concat(self.local_scale);
        }
        self.invalidity = Invalidity::Clean;
    }

    /// Root-of-hierarchy variant: the "parent" is the identity transform.
    pub fn concatenate_as_root(&mut self) {
        let identity = Transformation::identity();
        self.concatenate(&identity);
    }

    pub fn is_clean(&self) -> bool {
        matches!(self.invalidity, Invalidity::Clean)
    }
}
