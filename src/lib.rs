#![doc = r#"
Engine core for a memory-constrained, single-threaded 2D console game engine:
a fixed-block pool allocator, VRAM resource managers (CHAR/BGMAP/param
table), a sprite registry and WORLD-layer render scheduler, a staged
streaming pipeline, a collision engine, a fixed-substep physics integrator, a
tracked sound mixer, and the messaging/event substrate every other subsystem
is built on.

Modules:
- memory: fixed-block pool allocator and the generational registry used for
  scene-graph / listener references
- messaging: event listener registry (firing-counter/tombstone re-entrancy)
  and the delayed-message queue
- clock: pausable millisecond clocks and the hardware-timer interrupt
  dispatcher
- math: fixed-point numbers, vectors, rotations/scales, transforms, frustum
- camera: position/rotation/optics, projection invalidation flags, fade
  effects
- graphics: CHAR/BGMAP/param-table allocators, texture registry, sprite
  registry, animation, wireframe rendering
- physics: bodies, gravity, fixed sub-step integrator, time-scaling
- sound: tracked sound mixer with stereo attenuation
- streaming: the five-stage entity pipeline and camera-centred load/unload
  culling
- stage: the container hierarchy and transform propagation
- vip: drives the per-frame interrupt sequence (FRAMESTART/XPEND/GAMESTART)
- input: pad-button snapshot diffing
- engine: the top-level struct sequencing one game frame across every
  subsystem above

`Engine` in `engine.rs` is the entry point; everything else is a
collaborator it owns.
"#]

pub mod camera;
pub mod clock;
pub mod engine;
pub mod graphics;
pub mod input;
pub mod math;
pub mod memory;
pub mod messaging;
pub mod physics;
pub mod sound;
pub mod stage;
pub mod streaming;
pub mod vip;

pub use engine::{Engine, EngineConfig, EngineError, StageSpec};
