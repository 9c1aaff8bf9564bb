#![doc = r#"
Parameter table allocator [H]: a linear allocator over the two BGMAP segments
reserved for affine/h-bias sprite scanline transform tables (§4.F/§4.G).

Unlike the general BGMAP packer, the parameter table is never fragmented by
mixed-size releases in normal play: affine entries are a fixed per-scanline
size and h-bias entries are a fixed per-scanline size, so a simple bump
allocator with a free list for same-size reuse suffices, matching the
reference manager's own linear-cursor design.
"#]

/// Bytes available across the two reserved BGMAP segments (2 * 8192 words
/// of VIP parameter memory, expressed here in table "slots").
pub const PARAM_TABLE_TOTAL_SLOTS: u32 = 2 * 4096;

/// An affine transform entry spans one slot per display scanline (28 lines
/// of overscan margin are excluded, leaving 224 visible lines per sprite).
pub const AFFINE_SLOTS_PER_ENTRY: u32 = 224;

/// An h-bias entry needs only a single slot (one horizontal displacement
/// value, not per-scanline).
pub const HBIAS_SLOTS_PER_ENTRY: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamTableHandle {
    offset: u32,
    size: u32,
}

impl ParamTableHandle {
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

struct FreeBlock {
    offset: u32,
    size: u32,
}

pub struct ParamTableAllocator {
    cursor: u32,
    free_list: Vec<FreeBlock>,
}

impl Default for ParamTableAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamTableAllocator {
    pub fn new() -> Self {
        ParamTableAllocator { cursor: 0, free_list: Vec::new() }
    }

    /// Allocates `size` contiguous slots, first checking the free list for
    /// an exact-size match left by a previous release (the common case,
    /// since every entry of a given kind is the same size), then bumping
    /// the cursor.
    fn allocate(&mut self, size: u32) -> Option<ParamTableHandle> {
        if let Some(idx) = self.free_list.iter().position(|b| b.size == size) {
            let block = self.free_list.remove(idx);
            return Some(ParamTableHandle { offset: block.offset, size });
        }

        if self.cursor + size > PARAM_TABLE_TOTAL_SLOTS {
            log::error!("parameter table exhausted: requested {size} slots, {} used of {PARAM_TABLE_TOTAL_SLOTS}", self.cursor);
            return None;
        }

        let offset = self.cursor;
        self.cursor += size;
        Some(ParamTableHandle { offset, size })
    }

    pub fn allocate_affine(&mut self) -> Option<ParamTableHandle> {
        self.allocate(AFFINE_SLOTS_PER_ENTRY)
    }

    pub fn allocate_hbias(&mut self) -> Option<ParamTableHandle> {
        self.allocate(HBIAS_SLOTS_PER_ENTRY)
    }

    pub fn release(&mut self, handle: ParamTableHandle) {
        self.free_list.push(FreeBlock { offset: handle.offset, size: handle.size });
    }

    pub fn used_slots(&self) -> u32 {
        self.cursor - self.free_list.iter().map(|b| b.size).sum::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_entries_are_spaced_by_scanline_count() {
        let mut alloc = ParamTableAllocator::new();
        let a = alloc.allocate_affine().unwrap();
        let b = alloc.allocate_affine().unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), AFFINE_SLOTS_PER_ENTRY);
    }

    #[test]
    fn released_slot_is_reused_for_same_size_request() {
        let mut alloc = ParamTableAllocator::new();
        let a = alloc.allocate_affine().unwrap();
        alloc.release(a);
        let b = alloc.allocate_affine().unwrap();
        assert_eq!(a.offset(), b.offset());
    }

    #[test]
    fn hbias_entries_are_single_slot() {
        let mut alloc = ParamTableAllocator::new();
        let a = alloc.allocate_hbias().unwrap();
        let b = alloc.allocate_hbias().unwrap();
        assert_eq!(b.offset() - a.offset(), HBIAS_SLOTS_PER_ENTRY);
    }

    #[test]
    fn exhaustion_reports_none() {
        let mut alloc = ParamTableAllocator::new();
        let max_entries = PARAM_TABLE_TOTAL_SLOTS / AFFINE_SLOTS_PER_ENTRY;
        for _ in 0..max_entries {
            assert!(alloc.allocate_affine().is_some());
        }
        assert!(alloc.allocate_affine().is_none());
    }
}
