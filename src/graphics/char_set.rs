#![doc = r#"
CHAR allocator [F]: packed allocation and defragmentation of tile memory.

Grounded on `original_source/source/graphics/2d/CharSetManager.c`:
a list of live CharSets kept sorted by assigned offset, shared CharSets
aliasing by source pointer + refcount, and an incremental defragmentation
pass that slides CharSets down to reclaim gaps left by a release.
"#]

use std::rc::Rc;

use crate::memory::registry::{Handle, Registry};

/// Total CHAR budget: 2048 tiles across four hardware segments (§4.E).
pub const CHAR_MEMORY_TOTAL_CHARS: u32 = 2048;

/// Identifies the source data a CharSet was built from. Two `CharSetSpec`s
/// sharing the same `source_id` and both marked `shared` alias the same
/// underlying allocation (§3 DATA MODEL invariant).
pub type SourceId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharSetSpec {
    pub source_id: SourceId,
    pub number_of_chars: u32,
    pub shared: bool,
    /// Per-frame tile count, for multi-frame (animated) CharSets; `1` for a
    /// single-frame CharSet.
    pub frames: u32,
}

impl CharSetSpec {
    /// Total tile footprint across every frame: the unit both the CHAR
    /// budget check and the cursor/offset arithmetic must advance by, since
    /// all of a multi-frame CharSet's frames live in one contiguous range.
    fn total_chars(&self) -> u32 {
        self.number_of_chars * self.frames.max(1)
    }
}

pub struct CharSet {
    spec: CharSetSpec,
    offset: u32,
    usage_count: u32,
    /// Tile bytes, `number_of_chars * frames` tiles of 16 bytes each; kept
    /// here (rather than written straight into a shared VRAM array) so
    /// defragmentation/content tests can assert bytes moved with the
    /// offset.
    data: Rc<Vec<u8>>,
}

impl CharSet {
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn number_of_chars(&self) -> u32 {
        self.spec.number_of_chars
    }

    /// Full tile footprint (`number_of_chars * frames`); the distance the
    /// allocator and defragmenter must advance past this CharSet.
    pub fn total_chars(&self) -> u32 {
        self.spec.total_chars()
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    pub fn spec(&self) -> &CharSetSpec {
        &self.spec
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn increase_usage_count(&mut self) {
        self.usage_count += 1;
    }

    /// Decreases the usage count; returns true once it reaches zero (the
    /// caller should then remove and drop the CharSet).
    fn decrease_usage_count(&mut self) -> bool {
        self.usage_count = self.usage_count.saturating_sub(1);
        self.usage_count == 0
    }
}

pub struct CharSetManager {
    char_sets: Registry<CharSet>,
    /// Live handles in ascending-offset order; mirrors the reference's
    /// offset-sorted linked list. Allocation always appends (new CharSets
    /// land after the current highest offset) and defragmentation only
    /// ever slides entries down, so insertion order stays offset-sorted
    /// without needing to re-sort on every release.
    order: Vec<Handle<CharSet>>,
    /// Lowest offset known to be free after a release; `None` once a
    /// defragmentation pass has fully closed the gap (distinct from offset
    /// `0`, which is never assigned but is not a valid sentinel either
    /// since real offsets start at `1`).
    freed_offset: Option<u32>,
}

impl Default for CharSetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CharSetManager {
    pub fn new() -> Self {
        CharSetManager { char_sets: Registry::new(), order: Vec::new(), freed_offset: None }
    }

    pub fn reset(&mut self) {
        self.char_sets = Registry::new();
        self.order.clear();
        self.freed_offset = None;
    }

    fn find_shared(&self, spec: &CharSetSpec) -> Option<Handle<CharSet>> {
        self.order.iter().copied().find(|&handle| {
            let cs = self.char_sets.get(handle).expect("order only holds live handles");
            cs.spec.shared && cs.spec.source_id == spec.source_id
        })
    }

    /// `get(spec)`: for shared specs, aliases an existing live CharSet with
    /// the same source and increments its usage; otherwise allocates fresh
    /// tile space at the end of the live list (§4.E).
    pub fn get_char_set(&mut self, spec: CharSetSpec, data: Vec<u8>) -> Option<Handle<CharSet>> {
        if spec.shared {
            if let Some(handle) = self.find_shared(&spec) {
                self.char_sets.get_mut(handle).expect("handle just found live").increase_usage_count();
                return Some(handle);
            }
        }

        let total_chars = spec.total_chars();
        let offset = match self.order.last() {
            Some(&handle) => {
                let last = self.char_sets.get(handle).expect("order only holds live handles");
                last.offset + last.total_chars()
            }
            None => 1,
        };

        if offset + total_chars > CHAR_MEMORY_TOTAL_CHARS {
            log::error!(
                "CHAR allocation failure: requested {total_chars} chars at offset {offset}, budget {CHAR_MEMORY_TOTAL_CHARS}"
            );
            return None;
        }

        let handle = self.char_sets.insert(CharSet { spec, offset, usage_count: 1, data: Rc::new(data) });
        self.order.push(handle);
        Some(handle)
    }

    /// Releases a usage of the CharSet at `handle`; on last release removes it
    /// from the list and records the minimum freed offset.
    pub fn release(&mut self, handle: Handle<CharSet>) {
        let Some(cs) = self.char_sets.get_mut(handle) else { return };
        if cs.decrease_usage_count() {
            let offset = cs.offset;
            self.char_sets.remove(handle);
            self.order.retain(|&h| h != handle);
            self.freed_offset = Some(match self.freed_offset {
                Some(current) => current.min(offset),
                None => offset,
            });
        }
    }

    pub fn char_set(&self, handle: Handle<CharSet>) -> Option<&CharSet> {
        self.char_sets.get(handle)
    }

    /// Performs one slide per call when `deferred`, otherwise runs to
    /// completion. Calls `on_changed_offset` for every CharSet that actually
    /// moved, so a listening texture can redraw from that offset (the
    /// `CharSetChangedOffset` event of §4.E) without this module needing a
    /// hard dependency on the texture registry.
    pub fn defragment(&mut self, deferred: bool, mut on_changed_offset: impl FnMut(Handle<CharSet>)) -> Vec<Handle<CharSet>> {
        let mut moved = Vec::new();
        let Some(mut cursor) = self.freed_offset else {
            return moved;
        };

        loop {
            let mut slid_this_pass = false;
            for &handle in &self.order {
                let offset = self.char_sets.get(handle).expect("order only holds live handles").offset;
                if cursor < offset {
                    let cs = self.char_sets.get_mut(handle).expect("order only holds live handles");
                    cs.offset = cursor;
                    cursor += cs.total_chars();
                    on_changed_offset(handle);
                    moved.push(handle);
                    slid_this_pass = true;
                    break;
                } else if cursor == offset {
                    cursor += self.char_sets.get(handle).expect("order only holds live handles").total_chars();
                    slid_this_pass = true;
                }
            }

            if !slid_this_pass {
                self.freed_offset = None;
                break;
            }
            self.freed_offset = Some(cursor);

            if deferred {
                break;
            }
        }

        moved
    }

    pub fn total_used_chars(&self) -> u32 {
        match self.order.last() {
            Some(&handle) => {
                let cs = self.char_sets.get(handle).expect("order only holds live handles");
                cs.offset + cs.total_chars()
            }
            None => 0,
        }
    }

    pub fn total_free_chars(&self) -> u32 {
        CHAR_MEMORY_TOTAL_CHARS - self.total_used_chars()
    }

    pub fn total_char_sets(&self) -> usize {
        self.order.len()
    }
}
