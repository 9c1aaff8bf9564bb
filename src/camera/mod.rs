#![doc = r#"
Camera & optics [E] and the camera-effect manager [R]: position/rotation,
the projection table every sprite consults, and fade/brightness transitions.
"#]

pub mod camera;
pub mod effects;
pub mod optics;

pub use camera::{Camera, CameraFlags};
pub use effects::{Brightness, CameraEffectManager};
pub use optics::{Optics, ProjectionTable};
