#![doc = r#"
Sprite [J]: the WORLD-layer registry, Z-sort, and per-frame render scheduler.

32 hardware WORLDs are available, numbered 31 (farthest back) down to 0
(nearest). Sprites are Z-sorted once per frame and assigned WORLDs
back-to-front starting at 31, so nearer sprites draw over farther ones; the
first unused layer below the lowest assigned index carries the END head so
the VIP stops there (§4.J).
"#]

use crate::graphics::visual::VisualState;
use crate::math::Fix13;

pub const TOTAL_WORLDS: u8 = 32;
pub const LAST_WORLD: u8 = TOTAL_WORLDS - 1;
/// Every hardware WORLD may carry a sprite; when all 32 are assigned there
/// is no layer left below the lowest one to place the END head on.
pub const MAX_SPRITES: usize = TOTAL_WORLDS as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    /// A BGMAP sprite scaled/rotated per scanline via a parameter table.
    BgmapAffine,
    /// A BGMAP sprite displaced per scanline without scale/rotation.
    BgmapHBias,
    /// A plain BGMAP sprite with no per-scanline transform.
    Bgmap,
    /// An OBJECT sprite; these are drawn from a shared pool of 1024 hardware
    /// objects grouped into at most 4 OBJECT groups (§4.J).
    Object { group: u8 },
}

#[derive(Clone, Copy, Debug)]
pub struct SpriteId(pub u32);

struct SpriteEntry {
    id: SpriteId,
    kind: SpriteKind,
    visual: VisualState,
    /// Toggles every other frame for sprites whose hardware layer shares
    /// bandwidth with another; used to halve the per-frame transparency
    /// write load (§4.J "transparency" note).
    transparent_this_frame: bool,
}

pub struct SpriteRegistry {
    sprites: Vec<SpriteEntry>,
    frame_parity: bool,
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteRegistry {
    pub fn new() -> Self {
        SpriteRegistry { sprites: Vec::new(), frame_parity: false }
    }

    pub fn add(&mut self, id: SpriteId, kind: SpriteKind, z: Fix13) {
        self.sprites.push(SpriteEntry { id, kind, visual: VisualState::new(z), transparent_this_frame: false });
    }

    pub fn remove(&mut self, id: SpriteId) {
        self.sprites.retain(|s| s.id.0 != id.0);
    }

    pub fn set_visible(&mut self, id: SpriteId, visible: bool) {
        if let Some(s) = self.sprites.iter_mut().find(|s| s.id.0 == id.0) {
            if visible {
                s.visual.show();
            } else {
                s.visual.hide();
            }
        }
    }

    pub fn set_z(&mut self, id: SpriteId, z: Fix13) {
        if let Some(s) = self.sprites.iter_mut().find(|s| s.id.0 == id.0) {
            s.visual.set_z(z);
        }
    }

    /// Flips the odd/even transparency parity for the frame; sprites whose
    /// kind participates in transparency alternate which frame they draw on.
    pub fn advance_frame_parity(&mut self) {
        self.frame_parity = !self.frame_parity;
        for s in &mut self.sprites {
            s.transparent_this_frame = self.frame_parity;
        }
    }

    /// Z-sorts visible sprites far-to-near and assigns WORLD indices
    /// 31 downto 0. Sprites beyond `MAX_SPRITES` are dropped from this
    /// frame's render list and logged, matching the reference's "sprite
    /// starvation" behavior rather than silently corrupting adjacent
    /// WORLDs.
    pub fn assign_worlds(&self) -> Vec<(SpriteId, u8)> {
        let mut visible: Vec<&SpriteEntry> = self.sprites.iter().filter(|s| s.visual.is_shown()).collect();
        visible.sort_by(|a, b| b.visual.z().partial_cmp(&a.visual.z()).unwrap_or(std::cmp::Ordering::Equal));

        if visible.len() > MAX_SPRITES {
            log::warn!("sprite registry starved: {} visible sprites exceed {MAX_SPRITES} WORLDs", visible.len());
            visible.truncate(MAX_SPRITES);
        }

        visible
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, LAST_WORLD - i as u8))
            .collect()
    }

    /// The WORLD index that should carry the END head this frame: the first
    /// unused layer below the lowest assigned index, or `None` if every
    /// WORLD (including 0) is already carrying a sprite (§4.J).
    pub fn end_world(assignment: &[(SpriteId, u8)]) -> Option<u8> {
        match assignment.iter().map(|&(_, w)| w).min() {
            Some(0) => None,
            Some(lowest) => Some(lowest - 1),
            None => Some(LAST_WORLD),
        }
    }

    pub fn is_transparent_this_frame(&self, id: SpriteId) -> Option<bool> {
        self.sprites.iter().find(|s| s.id.0 == id.0).map(|s| s.transparent_this_frame)
    }

    pub fn kind_of(&self, id: SpriteId) -> Option<SpriteKind> {
        self.sprites.iter().find(|s| s.id.0 == id.0).map(|s| s.kind)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farthest_sprite_gets_highest_world_index() {
        let mut reg = SpriteRegistry::new();
        reg.add(SpriteId(1), SpriteKind::Bgmap, Fix13::from_int(100));
        reg.add(SpriteId(2), SpriteKind::Bgmap, Fix13::from_int(10));
        let assignment = reg.assign_worlds();
        let world_of = |id: u32| assignment.iter().find(|(s, _)| s.0 == id).unwrap().1;
        assert!(world_of(1) > world_of(2));
    }

    #[test]
    fn invisible_sprites_are_excluded() {
        let mut reg = SpriteRegistry::new();
        reg.add(SpriteId(1), SpriteKind::Bgmap, Fix13::ZERO);
        reg.set_visible(SpriteId(1), false);
        assert!(reg.assign_worlds().is_empty());
    }

    #[test]
    fn starvation_truncates_and_keeps_nearest_sprites() {
        let mut reg = SpriteRegistry::new();
        for i in 0..40u32 {
            reg.add(SpriteId(i), SpriteKind::Bgmap, Fix13::from_int(i as i32));
        }
        let assignment = reg.assign_worlds();
        assert_eq!(assignment.len(), MAX_SPRITES);
        // The nearest (smallest z) sprites should have survived truncation.
        assert!(assignment.iter().any(|(id, _)| id.0 == 0));
        assert!(!assignment.iter().any(|(id, _)| id.0 == 39));
    }

    #[test]
    fn two_sprites_take_the_two_farthest_worlds() {
        // §8 scenario 4: sprites at z = 0 and z = 10 land on 31 and 30.
        let mut reg = SpriteRegistry::new();
        reg.add(SpriteId(1), SpriteKind::Bgmap, Fix13::from_int(0));
        reg.add(SpriteId(2), SpriteKind::Bgmap, Fix13::from_int(10));
        let assignment = reg.assign_worlds();
        let world_of = |id: u32| assignment.iter().find(|(s, _)| s.0 == id).unwrap().1;
        assert_eq!(world_of(2), LAST_WORLD);
        assert_eq!(world_of(1), LAST_WORLD - 1);

        // Moving the farther sprite closer swaps which WORLD each takes,
        // and neither sprite is ever dropped from the render list.
        reg.set_z(SpriteId(2), Fix13::from_int(-5));
        let assignment = reg.assign_worlds();
        assert_eq!(assignment.len(), 2);
        let world_of = |id: u32| assignment.iter().find(|(s, _)| s.0 == id).unwrap().1;
        assert_eq!(world_of(1), LAST_WORLD);
        assert_eq!(world_of(2), LAST_WORLD - 1);
    }

    #[test]
    fn frame_parity_toggles_each_call() {
        let mut reg = SpriteRegistry::new();
        reg.add(SpriteId(1), SpriteKind::Object { group: 0 }, Fix13::ZERO);
        reg.advance_frame_parity();
        let first = reg.is_transparent_this_frame(SpriteId(1)).unwrap();
        reg.advance_frame_parity();
        let second = reg.is_transparent_this_frame(SpriteId(1)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn a_single_sprite_may_take_the_farthest_world() {
        let mut reg = SpriteRegistry::new();
        reg.add(SpriteId(1), SpriteKind::Bgmap, Fix13::ZERO);
        let assignment = reg.assign_worlds();
        assert_eq!(assignment, vec![(SpriteId(1), LAST_WORLD)]);
        assert_eq!(SpriteRegistry::end_world(&assignment), Some(LAST_WORLD - 1));
    }

    #[test]
    fn end_world_sits_below_the_lowest_assigned_index() {
        let mut reg = SpriteRegistry::new();
        for i in 0..5u32 {
            reg.add(SpriteId(i), SpriteKind::Bgmap, Fix13::from_int(i as i32));
        }
        let assignment = reg.assign_worlds();
        let lowest = assignment.iter().map(|&(_, w)| w).min().unwrap();
        assert_eq!(SpriteRegistry::end_world(&assignment), Some(lowest - 1));
    }

    #[test]
    fn end_world_is_none_when_every_layer_is_assigned() {
        let mut reg = SpriteRegistry::new();
        for i in 0..MAX_SPRITES as u32 {
            reg.add(SpriteId(i), SpriteKind::Bgmap, Fix13::from_int(i as i32));
        }
        let assignment = reg.assign_worlds();
        assert_eq!(assignment.len(), MAX_SPRITES);
        assert_eq!(SpriteRegistry::end_world(&assignment), None);
    }
}
