#![doc = r#"
Fixed-block memory pool allocator [A].

All engine objects live in one of a fixed number of pools, each holding
fixed-size blocks. There is no coalescing: the pool arrangement is fixed at
compile time (`POOL_BLOCK_SIZES`), tuned to the object-size histogram. See
`original_source/source/base/MemoryPool.c` for the C reference this mirrors:
per-pool scan-from-hint allocation, header-word free/used marking, and a
printable usage table on exhaustion.
"#]

use std::cell::UnsafeCell;

/// Block sizes, smallest to largest, tuned to a representative object-size
/// histogram. Kept as a const so `MemoryPool::new` can sanity-check that
/// every pool's block size is monotonically increasing.
pub const POOL_BLOCK_SIZES: &[usize] = &[16, 20, 28, 40, 68, 80, 108, 116, 140, 152, 164];

/// A single block's header sentinel. Any other value implies the block is
/// currently in use (the header itself is never a valid payload byte
/// pattern the engine writes, since every payload's first word is the
/// object's vtable/tag word, never this sentinel).
const FREE_SENTINEL: u32 = 0xFFFF_FFFF;

struct Block {
    header: UnsafeCell<u32>,
    bytes: UnsafeCell<Vec<u8>>,
}

// SAFETY: the engine's pool is only ever driven from the single-threaded main
// loop (§5 CONCURRENCY & RESOURCE MODEL); Block is never shared across an
// actual OS thread. `Sync` is required only so `Pool` can sit behind a
// `Vec` inside a struct passed by value between engine methods.
unsafe impl Sync for Block {}

struct Pool {
    block_size: usize,
    blocks: Vec<Block>,
    /// Index of the most recently freed block; allocation search starts here
    /// and alternates probing left/right, per §4.A's algorithm.
    hint: usize,
}

impl Pool {
    fn new(block_size: usize, block_count: usize) -> Self {
        let blocks = (0..block_count)
            .map(|_| Block {
                header: UnsafeCell::new(FREE_SENTINEL),
                bytes: UnsafeCell::new(vec![0u8; block_size]),
            })
            .collect();
        Pool { block_size, blocks, hint: 0 }
    }

    fn is_free(&self, index: usize) -> bool {
        unsafe { *self.blocks[index].header.get() == FREE_SENTINEL }
    }

    fn mark(&self, index: usize, used: bool) {
        unsafe {
            *self.blocks[index].header.get() = if used { 0 } else { FREE_SENTINEL };
        }
    }

    /// Scans outward from `hint`, alternating right/left, looking for a free
    /// block. Returns the found index and updates the hint.
    fn allocate(&mut self) -> Option<usize> {
        let n = self.blocks.len();
        if n == 0 {
            return None;
        }
        for distance in 0..n {
            let right = (self.hint + distance) % n;
            if self.is_free(right) {
                self.mark(right, true);
                self.hint = right;
                return Some(right);
            }
            let left = (self.hint + n - distance) % n;
            if self.is_free(left) {
                self.mark(left, true);
                self.hint = left;
                return Some(left);
            }
        }
        None
    }

    fn free(&mut self, index: usize) {
        self.mark(index, false);
        self.hint = index;
    }

    fn used_count(&self) -> usize {
        (0..self.blocks.len()).filter(|&i| !self.is_free(i)).count()
    }
}

/// A handle to an allocated block: which pool, which block index. Opaque to
/// callers; used only to hand back to `MemoryPool::free`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolHandle {
    pool_index: usize,
    block_index: usize,
}

pub struct MemoryPool {
    pools: Vec<Pool>,
}

impl MemoryPool {
    /// Builds a memory pool with one `Pool` per entry in `layout`, each sized
    /// `(block_size, block_count)`. Panics if block sizes are not strictly
    /// increasing — a malformed layout is a build-time bug, not a runtime
    /// condition.
    pub fn new(layout: &[(usize, usize)]) -> Self {
        for window in layout.windows(2) {
            assert!(
                window[0].0 < window[1].0,
                "memory pool layout must have strictly increasing block sizes"
            );
        }
        let pools = layout.iter().map(|&(size, count)| Pool::new(size, count)).collect();
        MemoryPool { pools }
    }

    /// Builds a memory pool using the default block-size histogram, each
    /// sized to hold `blocks_per_pool` blocks.
    pub fn with_default_layout(blocks_per_pool: usize) -> Self {
        let layout: Vec<(usize, usize)> =
            POOL_BLOCK_SIZES.iter().map(|&size| (size, blocks_per_pool)).collect();
        MemoryPool::new(&layout)
    }

    /// Allocates a block whose size is at least `n` bytes. Iterates pools
    /// from largest to smallest so that a smaller pool's blocks stay
    /// available for smaller objects even when big allocations are
    /// frequent; within the chosen pool the first big-enough pool wins, per
    /// §4.A ("iterate pools from largest to smallest ... for each pool whose
    /// block size >= n"). Returns `None` on exhaustion (shipping behavior);
    /// `allocate_or_fatal` additionally logs the pool table like the C
    /// reference's exhaustion handler.
    pub fn allocate(&mut self, n: usize) -> Option<PoolHandle> {
        // Pools are stored smallest-block-size-first; the first one whose
        // block size fits is the smallest fitting pool.
        let pool_index = self.pools.iter().position(|p| p.block_size >= n)?;

        let pool = &mut self.pools[pool_index];
        let block_index = pool.allocate()?;
        Some(PoolHandle { pool_index, block_index })
    }

    /// Logs the pool table and the requested size, then returns `None`. A
    /// shipping build treats exhaustion as the `None` above; a non-shipping
    /// build additionally surfaces a Fatal diagnostic (§7).
    pub fn allocate_or_fatal(&mut self, n: usize) -> Option<PoolHandle> {
        match self.allocate(n) {
            Some(handle) => Some(handle),
            None => {
                log::error!(
                    "memory pool exhausted: request for {n} bytes failed; pool table: {:?}",
                    self.usage_report()
                );
                None
            }
        }
    }

    /// Returns the block for a handle, for reading/writing the object's
    /// payload. Out-of-range handles are a debug-only bug (foreign pointer);
    /// shipping builds ignore them by returning `None`.
    pub fn block_mut(&mut self, handle: PoolHandle) -> Option<&mut [u8]> {
        let pool = self.pools.get_mut(handle.pool_index)?;
        let block = pool.blocks.get_mut(handle.block_index)?;
        Some(unsafe { &mut *block.bytes.get() })
    }

    pub fn block(&self, handle: PoolHandle) -> Option<&[u8]> {
        let pool = self.pools.get(handle.pool_index)?;
        let block = pool.blocks.get(handle.block_index)?;
        Some(unsafe { &*block.bytes.get() })
    }

    /// Returns the block to its pool. A handle from a foreign pool (one this
    /// `MemoryPool` doesn't own) is detected and ignored, matching the C
    /// reference's debug-only range check and shipping no-op.
    pub fn free(&mut self, handle: PoolHandle) {
        if let Some(pool) = self.pools.get_mut(handle.pool_index) {
            if handle.block_index < pool.blocks.len() {
                pool.free(handle.block_index);
            } else {
                debug_assert!(false, "MemoryPool::free: foreign block index");
            }
        } else {
            debug_assert!(false, "MemoryPool::free: foreign pool index");
        }
    }

    pub fn total_size(&self) -> usize {
        self.pools.iter().map(|p| p.block_size * p.blocks.len()).sum()
    }

    pub fn total_used_bytes(&self) -> usize {
        self.pools.iter().map(|p| p.block_size * p.used_count()).sum()
    }

    /// Per-pool `(block_size, used, total)` triples, for diagnostics.
    pub fn usage_report(&self) -> Vec<(usize, usize, usize)> {
        self.pools.iter().map(|p| (p.block_size, p.used_count(), p.blocks.len())).collect()
    }
}
