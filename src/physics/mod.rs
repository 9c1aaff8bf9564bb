#![doc = r#"
Physics subsystem [M-N]: AABB colliders with broad/narrow-phase dispatch and
the gravity/friction body integrator.
"#]

pub mod body;
pub mod collider;

pub use body::{Axis, Body, BodyManager, TimeScale};
pub use collider::{Collider, CollisionAxis, CollisionInformation, ColliderManager, Cuboid, Layers};
