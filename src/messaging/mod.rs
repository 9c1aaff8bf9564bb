#![doc = r#"
Event/message substrate [B]: the listener registry and delayed-message queue
every other subsystem uses to avoid direct coupling (§1 PURPOSE & SCOPE).
"#]

pub mod event;
pub mod queue;

pub use event::{EventCode, EventListeners, ObjectId, ANY};
pub use queue::{DelayedMessage, Jitter, MessageQueue, Payload};
