#![doc = r#"
Fixed-point number types.

Purpose
- Every geometry, velocity, acceleration, and time-proportion value in the
  engine is fixed-point rather than floating point. Two formats are in use:
  a 13-bit fractional format (`Fix13`) for world-space distances and a 9-bit
  fractional format (`Fix9`) for tighter-range values such as parallax and
  scanline parallax deltas.
- The two formats are distinct newtypes so that mixing them without an
  explicit conversion is a compile error, per the engine's fixed-point design
  note.
"#]

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Declares a fixed-point newtype with `frac_bits` fractional bits backed by `i32`.
macro_rules! fixed_point_type {
    ($name:ident, $frac_bits:expr) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            pub const FRAC_BITS: u32 = $frac_bits;
            pub const ONE: $name = $name(1 << $frac_bits);
            pub const ZERO: $name = $name(0);

            /// Builds a fixed-point value from its raw fixed-point representation.
            pub const fn from_raw(raw: i32) -> Self {
                $name(raw)
            }

            /// Returns the raw fixed-point representation.
            pub const fn raw(self) -> i32 {
                self.0
            }

            /// Converts a whole integer into fixed-point.
            pub const fn from_int(value: i32) -> Self {
                $name(value << $frac_bits)
            }

            /// Truncates the fractional part and returns the integer part.
            pub const fn to_int(self) -> i32 {
                self.0 >> $frac_bits
            }

            /// Builds a fixed-point value from a float. Host-side convenience only;
            /// never used on the hot per-frame path.
            pub fn from_f32(value: f32) -> Self {
                $name((value * (1i32 << $frac_bits) as f32).round() as i32)
            }

            /// Converts back to a float. Host-side convenience only.
            pub fn to_f32(self) -> f32 {
                self.0 as f32 / (1i32 << $frac_bits) as f32
            }

            pub fn abs(self) -> Self {
                $name(self.0.abs())
            }

            pub fn min(self, other: Self) -> Self {
                if self.0 <= other.0 { self } else { other }
            }

            pub fn max(self, other: Self) -> Self {
                if self.0 >= other.0 { self } else { other }
            }

            pub fn clamp(self, lo: Self, hi: Self) -> Self {
                self.max(lo).min(hi)
            }

            pub fn is_zero(self) -> bool {
                self.0 == 0
            }

            /// Typed multiply: keeps the result in the same format, truncating the
            /// intermediate double-width product's extra fractional bits.
            pub fn mul(self, other: Self) -> Self {
                let product = (self.0 as i64) * (other.0 as i64);
                $name((product >> $frac_bits) as i32)
            }

            /// Typed division; panics on divide-by-zero in debug, saturates in release.
            pub fn div(self, other: Self) -> Self {
                debug_assert!(other.0 != 0, "fixed-point division by zero");
                if other.0 == 0 {
                    return if self.0 >= 0 { $name(i32::MAX) } else { $name(i32::MIN) };
                }
                let numerator = (self.0 as i64) << $frac_bits;
                $name((numerator / other.0 as i64) as i32)
            }

            /// Scales by a plain integer without going through fixed-point multiply.
            pub fn scale_int(self, factor: i32) -> Self {
                $name(self.0.saturating_mul(factor))
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                $name(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                $name(-self.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                $name::mul(self, rhs)
            }
        }

        impl Div for $name {
            type Output = Self;
            fn div(self, rhs: Self) -> Self {
                $name::div(self, rhs)
            }
        }

        impl PartialOrd<i32> for $name {
            fn partial_cmp(&self, other: &i32) -> Option<Ordering> {
                self.0.partial_cmp(&(*other << $frac_bits))
            }
        }
    };
}

fixed_point_type!(Fix13, 13);
fixed_point_type!(Fix9, 9);

impl Fix13 {
    /// Narrows to the 9-bit format, dropping the extra low fractional bits.
    pub const fn to_fix9(self) -> Fix9 {
        Fix9::from_raw(self.raw() >> (Fix13::FRAC_BITS - Fix9::FRAC_BITS))
    }
}

impl Fix9 {
    /// Widens to the 13-bit format.
    pub const fn to_fix13(self) -> Fix13 {
        Fix13::from_raw(self.raw() << (Fix13::FRAC_BITS - Fix9::FRAC_BITS))
    }
}
