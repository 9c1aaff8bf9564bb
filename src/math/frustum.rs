#![doc = r#"
Frustum: the screen-space rectangle and depth range against which sprites
and wireframes are culled, per GLOSSARY.
"#]

use super::fixed::Fix13;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frustum {
    pub x0: Fix13,
    pub x1: Fix13,
    pub y0: Fix13,
    pub y1: Fix13,
    pub z0: Fix13,
    pub z1: Fix13,
}

impl Frustum {
    pub fn new(x0: Fix13, x1: Fix13, y0: Fix13, y1: Fix13, z0: Fix13, z1: Fix13) -> Self {
        Frustum { x0, x1, y0, y1, z0, z1 }
    }

    /// Clamps a candidate frustum into hardware limits (the maximum extent the
    /// display controller can actually address), per §4.D.
    pub fn clamp_into(self, limits: Frustum) -> Self {
        Frustum {
            x0: self.x0.max(limits.x0),
            x1: self.x1.min(limits.x1),
            y0: self.y0.max(limits.y0),
            y1: self.y1.min(limits.y1),
            z0: self.z0.max(limits.z0),
            z1: self.z1.min(limits.z1),
        }
    }

    pub fn contains_point(self, x: Fix13, y: Fix13, z: Fix13) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1 && z >= self.z0 && z <= self.z1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_into_shrinks_to_tighter_limits() {
        let wide = Frustum::new(
            Fix13::from_int(-1000),
            Fix13::from_int(1000),
            Fix13::from_int(-1000),
            Fix13::from_int(1000),
            Fix13::ZERO,
            Fix13::from_int(4096),
        );
        let hw_limits = Frustum::new(
            Fix13::from_int(-192),
            Fix13::from_int(192),
            Fix13::from_int(-112),
            Fix13::from_int(112),
            Fix13::ZERO,
            Fix13::from_int(4096),
        );
        let clamped = wide.clamp_into(hw_limits);
        assert_eq!(clamped, hw_limits);
    }

    #[test]
    fn contains_point_checks_all_axes() {
        let f = Frustum::new(
            Fix13::from_int(-10),
            Fix13::from_int(10),
            Fix13::from_int(-10),
            Fix13::from_int(10),
            Fix13::ZERO,
            Fix13::from_int(100),
        );
        assert!(f.contains_point(Fix13::ZERO, Fix13::ZERO, Fix13::from_int(50)));
        assert!(!f.contains_point(Fix13::from_int(20), Fix13::ZERO, Fix13::from_int(50)));
    }
}
