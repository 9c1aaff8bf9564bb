#![doc = r#"
Clocks and the hardware timer interrupt [C]: three independently pausable
millisecond clocks (messaging, animation, physics) driven by a configurable
hardware timer.
"#]

pub mod clock;
pub mod timer;

pub use clock::{Clock, ClockKind, Stopwatch};
pub use timer::{Resolution, TimerConfig, TimerManager};
