#![doc = r#"
Texture [I]: pairs a BGMAP placement with a CharSet and tracks how stale its
hardware-written copy is, per §4.F/§4.I's write-budget scheme.
"#]

use super::bgmap::Rect;
use crate::messaging::EventCode;

/// A texture's write status only ever moves toward "more pending": once a
/// frame or displacement change is recorded it cannot be downgraded back to
/// `Written` except by an actual write (§4.I invariant).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextureStatus {
    Invalid,
    Written,
    MapDisplacementChanged,
    FrameChanged,
    PendingWriting,
    PendingRewriting,
}

pub struct Texture {
    char_set_index: usize,
    placement: Rect,
    frame: u16,
    /// Number of animation frames this texture's CharSet carries; a write
    /// pass copies every frame's rows before declaring the texture written
    /// (§4.I "multi-frame textures iterate all frames").
    frame_count: u16,
    flip_x: bool,
    flip_y: bool,
    status: TextureStatus,
    /// Rows left to copy for `writing_frame` in the write pass currently in
    /// progress; `0` with `status != Written` means the next `write()` call
    /// starts a fresh pass from frame 0 (§3 "rows remaining to write").
    rows_remaining: u16,
    writing_frame: u16,
}

impl Texture {
    pub fn new(char_set_index: usize, placement: Rect) -> Self {
        Texture::with_frames(char_set_index, placement, 1)
    }

    pub fn with_frames(char_set_index: usize, placement: Rect, frame_count: u16) -> Self {
        Texture {
            char_set_index,
            placement,
            frame: 0,
            frame_count: frame_count.max(1),
            flip_x: false,
            flip_y: false,
            status: TextureStatus::Invalid,
            rows_remaining: 0,
            writing_frame: 0,
        }
    }

    pub fn char_set_index(&self) -> usize {
        self.char_set_index
    }

    pub fn placement(&self) -> Rect {
        self.placement
    }

    pub fn frame(&self) -> u16 {
        self.frame
    }

    pub fn status(&self) -> TextureStatus {
        self.status
    }

    pub fn rows_remaining(&self) -> u16 {
        self.rows_remaining
    }

    pub fn set_flip(&mut self, flip_x: bool, flip_y: bool) {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
    }

    pub fn flip(&self) -> (bool, bool) {
        (self.flip_x, self.flip_y)
    }

    /// Moves the placement (e.g. after a BGMAP defragmentation slide) and
    /// marks the map displacement as changed, unless a stronger pending
    /// state is already set.
    pub fn set_map_displacement(&mut self, placement: Rect) {
        self.placement = placement;
        self.raise_status(TextureStatus::MapDisplacementChanged);
    }

    /// Selects a new animation frame and marks the frame as changed.
    pub fn set_frame(&mut self, frame: u16) {
        if frame != self.frame {
            self.frame = frame;
            self.raise_status(TextureStatus::FrameChanged);
        }
    }

    /// Only raises status if `candidate` represents more pending work than
    /// the current status; this is what keeps transitions one-directional.
    fn raise_status(&mut self, candidate: TextureStatus) {
        if candidate > self.status {
            self.status = candidate;
        }
    }

    /// Called once a texture's CHAR data has been newly allocated and must
    /// be written into BGMAP before first display.
    pub fn mark_pending_write(&mut self) {
        self.raise_status(TextureStatus::PendingWriting);
    }

    /// Forces a full refresh on the next write pass regardless of current
    /// status.
    pub fn rewrite(&mut self) {
        self.raise_status(TextureStatus::PendingRewriting);
    }

    /// Consumes up to `*budget` rows, copying this texture's current frame
    /// into BGMAP with row order reversed when `flip_y` is set (the actual
    /// byte copy and `flip_x` column reversal are the host video device's
    /// job; this tracks the write-progress state machine and row cursor per
    /// §4.I). Iterates every frame the underlying CharSet carries before
    /// declaring the texture written, resuming across calls via
    /// `rows_remaining`/`writing_frame` when the budget runs out mid-pass.
    /// Returns `Some(EventCode::TextureRewritten)` exactly once, when the
    /// pass completes.
    pub fn write(&mut self, budget: &mut u32) -> Option<EventCode> {
        if self.status == TextureStatus::Written || *budget == 0 {
            return None;
        }

        if self.rows_remaining == 0 {
            self.writing_frame = 0;
            self.rows_remaining = self.placement.rows;
        }

        loop {
            while *budget > 0 && self.rows_remaining > 0 {
                let row_from_top = self.placement.rows - self.rows_remaining;
                let _source_row = if self.flip_y { self.placement.rows - 1 - row_from_top } else { row_from_top };
                self.rows_remaining -= 1;
                *budget -= 1;
            }

            if self.rows_remaining > 0 {
                return None;
            }

            self.writing_frame += 1;
            if self.writing_frame < self.frame_count {
                if *budget == 0 {
                    // Resume at the next frame on the next call.
                    return None;
                }
                self.rows_remaining = self.placement.rows;
                continue;
            }

            self.status = TextureStatus::Written;
            self.writing_frame = 0;
            return Some(EventCode::TextureRewritten);
        }
    }

    pub fn needs_write(&self) -> bool {
        self.status != TextureStatus::Written
    }
}

/// Drains `textures`, writing as many rows as `budget` allows in index
/// order, and returns the number of textures whose write pass *completed*
/// this call. Calls `on_event(index, EventCode::TextureRewritten)` for each
/// one, so the engine can route it through the event substrate without this
/// module depending on it (§4.I: write is budget-bounded per frame so a
/// burst of invalidations cannot blow the frame deadline).
pub fn write_pending(textures: &mut [Texture], mut budget: u32, mut on_event: impl FnMut(usize, EventCode)) -> u32 {
    let mut written = 0;
    for (index, texture) in textures.iter_mut().enumerate() {
        if budget == 0 {
            break;
        }
        if let Some(event) = texture.write(&mut budget) {
            written += 1;
            on_event(index, event);
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(x: u16) -> Rect {
        Rect { segment: 0, x, y: 0, cols: 4, rows: 4 }
    }

    #[test]
    fn status_transitions_only_move_toward_pending() {
        let mut tex = Texture::new(0, placement(0));
        tex.mark_pending_write();
        assert_eq!(tex.status(), TextureStatus::PendingWriting);
        tex.set_frame(2);
        // FrameChanged < PendingWriting, so status does not regress.
        assert_eq!(tex.status(), TextureStatus::PendingWriting);
    }

    #[test]
    fn write_copies_one_row_per_budget_unit_then_completes() {
        let mut tex = Texture::new(0, placement(0)); // 4 rows, 1 frame
        tex.mark_pending_write();

        let mut budget = 2;
        assert_eq!(tex.write(&mut budget), None);
        assert_eq!(budget, 0);
        assert_eq!(tex.rows_remaining(), 2);
        assert_ne!(tex.status(), TextureStatus::Written);

        let mut budget = 2;
        assert_eq!(tex.write(&mut budget), Some(EventCode::TextureRewritten));
        assert_eq!(budget, 0);
        assert_eq!(tex.status(), TextureStatus::Written);

        // A texture that is already written is a no-op and fires nothing
        // again.
        let mut budget = 5;
        assert_eq!(tex.write(&mut budget), None);
        assert_eq!(budget, 5);
    }

    #[test]
    fn multi_frame_texture_iterates_every_frame_before_declaring_written() {
        let mut tex = Texture::with_frames(0, placement(0), 3); // 4 rows x 3 frames = 12 rows
        tex.mark_pending_write();

        let mut budget = 12;
        assert_eq!(tex.write(&mut budget), Some(EventCode::TextureRewritten));
        assert_eq!(budget, 0);
        assert_eq!(tex.status(), TextureStatus::Written);
    }

    #[test]
    fn multi_frame_texture_resumes_mid_frame_across_calls() {
        let mut tex = Texture::with_frames(0, placement(0), 2); // 8 rows total
        tex.mark_pending_write();

        let mut budget = 5; // finishes frame 0 (4 rows), starts frame 1 (1 row)
        assert_eq!(tex.write(&mut budget), None);
        assert_eq!(tex.rows_remaining(), 3);

        let mut budget = 3;
        assert_eq!(tex.write(&mut budget), Some(EventCode::TextureRewritten));
        assert_eq!(tex.status(), TextureStatus::Written);
    }

    #[test]
    fn write_resets_to_written_and_consumes_budget() {
        let mut tex = Texture::new(0, Rect { segment: 0, x: 0, y: 0, cols: 4, rows: 1 });
        tex.mark_pending_write();
        let mut budget = 3;
        assert!(tex.write(&mut budget).is_some());
        assert_eq!(tex.status(), TextureStatus::Written);
        assert_eq!(budget, 2);
        assert!(tex.write(&mut budget).is_none());
        assert_eq!(budget, 2);
    }

    #[test]
    fn write_pending_respects_budget_and_fires_completion_events() {
        let one_row = Rect { segment: 0, x: 0, y: 0, cols: 4, rows: 1 };
        let mut textures: Vec<Texture> = (0..5)
            .map(|_| {
                let mut t = Texture::new(0, one_row);
                t.mark_pending_write();
                t
            })
            .collect();

        let mut fired = Vec::new();
        let written = write_pending(&mut textures, 3, |index, event| fired.push((index, event)));
        assert_eq!(written, 3);
        assert_eq!(textures.iter().filter(|t| t.needs_write()).count(), 2);
        assert_eq!(fired, vec![(0, EventCode::TextureRewritten), (1, EventCode::TextureRewritten), (2, EventCode::TextureRewritten)]);
    }

    #[test]
    fn frame_change_detects_no_op_when_frame_unchanged() {
        let mut tex = Texture::new(0, Rect { segment: 0, x: 0, y: 0, cols: 4, rows: 1 });
        tex.write(&mut 1);
        tex.set_frame(0);
        assert_eq!(tex.status(), TextureStatus::Written);
    }

    #[test]
    fn rewrite_forces_a_fresh_full_pass() {
        let mut tex = Texture::new(0, placement(0));
        tex.mark_pending_write();
        let mut budget = 4;
        tex.write(&mut budget);
        assert_eq!(tex.status(), TextureStatus::Written);

        tex.rewrite();
        assert_eq!(tex.status(), TextureStatus::PendingRewriting);
        let mut budget = 4;
        assert_eq!(tex.write(&mut budget), Some(EventCode::TextureRewritten));
        assert_eq!(tex.status(), TextureStatus::Written);
    }
}
