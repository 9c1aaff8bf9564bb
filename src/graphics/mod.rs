#![doc = r#"
Graphics subsystem [F-L]: VRAM resource allocators (CHAR, BGMAP, parameter
table), the texture write scheduler, the sprite WORLD registry, per-sprite
animation, wireframe drawing, and the particle system supplemented from the
original implementation.
"#]

pub mod animation;
pub mod bgmap;
pub mod char_set;
pub mod param_table;
pub mod particle;
pub mod sprite;
pub mod texture;
pub mod visual;
pub mod wireframe;

pub use animation::{AnimationController, AnimationFunction};
pub use bgmap::{BgmapAllocator, Rect};
pub use char_set::{CharSet, CharSetManager, CharSetSpec};
pub use param_table::{ParamTableAllocator, ParamTableHandle};
pub use particle::{ParticleSpec, ParticleSystem};
pub use sprite::{SpriteId, SpriteKind, SpriteRegistry};
pub use texture::{Texture, TextureStatus};
pub use visual::VisualState;
pub use wireframe::{Eye, WireframeBuffers, WireframeObject, WireframeObjectRegistry};
