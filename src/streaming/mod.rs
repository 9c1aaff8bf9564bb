#![doc = r#"
Streaming subsystem [P]: the five-stage entity pipeline and the load/unload
pad culling that feeds it.
"#]

pub mod culling;
pub mod scheduler;

pub use culling::StreamingPads;
pub use scheduler::{Advance, EntityId, StreamingScheduler};
