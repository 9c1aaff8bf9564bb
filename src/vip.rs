#![doc = r#"
VIP manager [S]: sequences the three hardware interrupt sources
(FRAMESTART, GAMESTART, XPEND), arms and checks the per-frame deadline, and
raises the overtime event on overrun.

Grounded on `original_source/source/hardware/HardwareManager.c`'s
interrupt-source dispatch and §5 CONCURRENCY & RESOURCE MODEL's ordering:
FRAMESTART arms the deadline, the main loop runs, XPEND commits the display
list shadow, GAMESTART checks whether the prior frame overran.
"#]

use crate::messaging::EventCode;

/// Whether an overrun causes the engine to skip straight to the next frame
/// boundary or simply fall behind and catch up when it can (§7 Overrun
/// policy).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrunPolicy {
    ForceSync,
    DropBehind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameState {
    Idle,
    Armed,
    DrawCommitted,
}

pub struct VipManager {
    target_fps: u32,
    deadline_us: u64,
    state: FrameState,
    elapsed_this_frame_us: u64,
    /// Parity bit toggled by XPEND; the engine's double-buffered display
    /// list consults this to know which DRAM half to write into next.
    frame_parity: bool,
    overrun_policy: OverrunPolicy,
}

impl VipManager {
    pub fn new(target_fps: u32, overrun_policy: OverrunPolicy) -> Self {
        VipManager {
            target_fps,
            deadline_us: 1_000_000 / target_fps as u64,
            state: FrameState::Idle,
            elapsed_this_frame_us: 0,
            frame_parity: false,
            overrun_policy,
        }
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn frame_parity(&self) -> bool {
        self.frame_parity
    }

    /// FRAMESTART: arms the deadline for a fresh game frame.
    pub fn on_frame_start(&mut self) {
        self.state = FrameState::Armed;
        self.elapsed_this_frame_us = 0;
    }

    /// Called by the main loop as it spends time on each ordered stage;
    /// accumulates toward the deadline without itself raising anything —
    /// overrun is only ever detected at GAMESTART, per §5.
    pub fn spend(&mut self, microseconds: u64) {
        self.elapsed_this_frame_us += microseconds;
    }

    /// XPEND: the display list shadow is committed; toggles the
    /// even/odd frame-parity bit hardware double-buffering consults.
    pub fn on_xpend(&mut self) {
        self.state = FrameState::DrawCommitted;
        self.frame_parity = !self.frame_parity;
    }

    /// GAMESTART: checks whether the just-finished frame overran its
    /// deadline. Returns `Some(VIPOvertime)` if so; the caller dispatches
    /// this as an event. Per `OverrunPolicy::ForceSync` the next frame
    /// always starts fresh regardless of overrun; `DropBehind` carries the
    /// overrun amount forward so the caller can choose to skip work.
    pub fn on_game_start(&mut self) -> Option<EventCode> {
        let overran = self.elapsed_this_frame_us > self.deadline_us;
        self.state = FrameState::Idle;

        if overran {
            if self.overrun_policy == OverrunPolicy::DropBehind {
                self.elapsed_this_frame_us -= self.deadline_us;
            } else {
                self.elapsed_this_frame_us = 0;
            }
            Some(EventCode::VipOvertime)
        } else {
            self.elapsed_this_frame_us = 0;
            None
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state != FrameState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_within_deadline_raises_no_overtime() {
        let mut vip = VipManager::new(50, OverrunPolicy::DropBehind);
        vip.on_frame_start();
        vip.spend(1000);
        vip.on_xpend();
        assert_eq!(vip.on_game_start(), None);
    }

    #[test]
    fn frame_over_deadline_raises_overtime() {
        let mut vip = VipManager::new(50, OverrunPolicy::DropBehind);
        vip.on_frame_start();
        vip.spend(30_000);
        vip.on_xpend();
        assert_eq!(vip.on_game_start(), Some(EventCode::VipOvertime));
    }

    #[test]
    fn xpend_toggles_frame_parity_each_call() {
        let mut vip = VipManager::new(50, OverrunPolicy::ForceSync);
        let first = vip.frame_parity();
        vip.on_xpend();
        assert_ne!(first, vip.frame_parity());
        vip.on_xpend();
        assert_eq!(first, vip.frame_parity());
    }

    #[test]
    fn force_sync_drops_carried_overrun() {
        let mut vip = VipManager::new(50, OverrunPolicy::ForceSync);
        vip.on_frame_start();
        vip.spend(100_000);
        vip.on_game_start();
        vip.on_frame_start();
        vip.spend(1);
        assert_eq!(vip.on_game_start(), None);
    }
}
