#![doc = r#"
Memory pool [A]: the fixed-block allocator every engine object lives in.
There is no dynamic heap in the shipped engine — object lifetime is pool
lifetime.
"#]

pub mod pool;
pub mod registry;

pub use pool::{MemoryPool, PoolHandle, POOL_BLOCK_SIZES};
pub use registry::{Handle, Registry};
