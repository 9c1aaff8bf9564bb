#![doc = r#"
Math primitives [D]: fixed-point vectors, rotations, scales, and frustum
clamps. Everything downstream (camera, sprites, physics, collisions) is
built on top of these newtypes so that mixing fixed-point formats without an
explicit conversion is a compile error rather than a runtime bug.
"#]

pub mod fixed;
pub mod frustum;
pub mod rotation;
pub mod transform;
pub mod vector;

pub use fixed::{Fix13, Fix9};
pub use frustum::Frustum;
pub use rotation::{Rotation, Scale, FULL_TURN};
pub use transform::{Invalidity, Transformation};
pub use vector::Vector3D;
