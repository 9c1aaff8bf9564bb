#![doc = r#"
Stage [Q]: the scene-graph container hierarchy and transform propagation.
"#]

pub mod container;

pub use container::{Container, Stage};
