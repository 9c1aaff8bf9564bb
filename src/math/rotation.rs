#![doc = r#"
Rotation and Scale: the other two legs of a Transformation (§3 DATA MODEL).

A Rotation holds three independent angles, each clamped into one full turn
(0 inclusive .. FULL_TURN exclusive, represented in degrees fixed-point so
inspecting a value during debugging is legible). Scale is a multiplicative
triple; concatenating scales down the transform hierarchy is component-wise
multiplication, unlike position/rotation which add.
"#]

use super::fixed::Fix13;

/// One full turn, in degrees, as the clamp modulus for every rotation axis.
pub const FULL_TURN: Fix13 = Fix13::from_int(360);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rotation {
    pub x: Fix13,
    pub y: Fix13,
    pub z: Fix13,
}

fn clamp_to_turn(angle: Fix13) -> Fix13 {
    let mut a = angle;
    while a.raw() >= FULL_TURN.raw() {
        a -= FULL_TURN;
    }
    while a.raw() < 0 {
        a += FULL_TURN;
    }
    a
}

impl Rotation {
    pub const ZERO: Rotation = Rotation {
        x: Fix13::ZERO,
        y: Fix13::ZERO,
        z: Fix13::ZERO,
    };

    pub fn new(x: Fix13, y: Fix13, z: Fix13) -> Self {
        Rotation {
            x: clamp_to_turn(x),
            y: clamp_to_turn(y),
            z: clamp_to_turn(z),
        }
    }

    /// Concatenates a parent and child rotation: component-wise addition, each
    /// axis re-clamped into one full turn.
    pub fn concat(self, child: Self) -> Self {
        Rotation::new(self.x + child.x, self.y + child.y, self.z + child.z)
    }

    /// Inverts the rotation: negate each axis and re-clamp.
    pub fn invert(self) -> Self {
        Rotation::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scale {
    pub x: Fix13,
    pub y: Fix13,
    pub z: Fix13,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::UNIT
    }
}

impl Scale {
    pub const UNIT: Scale = Scale {
        x: Fix13::ONE,
        y: Fix13::ONE,
        z: Fix13::ONE,
    };

    pub fn new(x: Fix13, y: Fix13, z: Fix13) -> Self {
        Scale { x, y, z }
    }

    /// Concatenates parent and child scale: component-wise multiplication.
    pub fn concat(self, child: Self) -> Self {
        Scale {
            x: self.x.mul(child.x),
            y: self.y.mul(child.y),
            z: self.z.mul(child.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_clamps_into_one_turn() {
        let r = Rotation::new(Fix13::from_int(370), Fix13::from_int(-10), Fix13::ZERO);
        assert_eq!(r.x.to_int(), 10);
        assert_eq!(r.y.to_int(), 350);
    }

    #[test]
    fn inverting_rotation_negates_and_reclamps() {
        let r = Rotation::new(Fix13::from_int(90), Fix13::ZERO, Fix13::ZERO);
        let inv = r.invert();
        assert_eq!(inv.x.to_int(), 270);
    }

    #[test]
    fn scale_concat_is_multiplicative() {
        let parent = Scale::new(Fix13::from_int(2), Fix13::ONE, Fix13::ONE);
        let child = Scale::new(Fix13::from_int(3), Fix13::ONE, Fix13::ONE);
        let result = parent.concat(child);
        assert_eq!(result.x.to_int(), 6);
    }
}
