#![doc = r#"
Camera-effect manager [R / §4.N]: fades and brightness transitions driven by
timer callbacks scheduled on the messaging clock.

Per the Open Question in §9, this implementation fires a single
`EffectFadeComplete` event rather than the split
`EffectFadeInComplete`/`EffectFadeOutComplete` pair some engine revisions
carried — see DESIGN.md.
"#]

use crate::messaging::{EventCode, EventListeners, MessageQueue, ObjectId, Payload};

/// The three brightness channels the hardware exposes (BRTA/B/C, per §6).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Brightness {
    pub dark_red: i16,
    pub medium_red: i16,
    pub bright_red: i16,
}

impl Brightness {
    pub fn new(dark_red: i16, medium_red: i16, bright_red: i16) -> Self {
        Brightness { dark_red, medium_red, bright_red }
    }
}

struct FadeStep {
    increment: Brightness,
    target: Brightness,
    delay_ms: u32,
}

/// Code used internally to schedule the camera effect manager's own
/// messaging-clock callbacks; distinct from any per-game event code.
const FADE_TICK_CODE: u16 = 0xFADE;

pub struct CameraEffectManager {
    current: Brightness,
    fade: Option<FadeStep>,
    listeners: EventListeners,
    self_id: ObjectId,
}

impl CameraEffectManager {
    pub fn new(self_id: ObjectId, initial: Brightness) -> Self {
        CameraEffectManager {
            current: initial,
            fade: None,
            listeners: EventListeners::new(),
            self_id,
        }
    }

    pub fn current(&self) -> Brightness {
        self.current
    }

    pub fn add_event_listener(&mut self, listener: ObjectId, code: EventCode) {
        self.listeners.add(listener, code);
    }

    pub fn remove_event_listener(&mut self, listener: ObjectId, code: Option<EventCode>) {
        self.listeners.remove(listener, code);
    }

    fn step_toward(current: i16, target: i16, increment: i16) -> i16 {
        if current < target {
            (current + increment).min(target)
        } else {
            (current - increment).max(target)
        }
    }

    fn is_at_target(&self) -> bool {
        match &self.fade {
            None => true,
            Some(f) => self.current == f.target,
        }
    }

    /// Computes a per-channel increment vector from the current brightness
    /// toward `target` and schedules the first step on `queue` at `delay_ms`
    /// intervals (§4.N).
    pub fn fade_to(
        &mut self,
        target: Brightness,
        delay_ms: u32,
        increment: i16,
        now_ms: u64,
        queue: &mut MessageQueue,
        jitter: &mut crate::messaging::Jitter,
    ) {
        self.fade = Some(FadeStep { increment: Brightness::new(increment, increment, increment), target, delay_ms });
        queue.send(self.self_id, self.self_id, FADE_TICK_CODE, Payload::None, now_ms, delay_ms, 0, jitter);
    }

    /// Cancels any pending fade and clears its listeners. Corresponds to the
    /// spec's "Stop cancels pending messages and clears the listener."
    pub fn stop(&mut self, queue: &mut MessageQueue) {
        self.fade = None;
        queue.cancel_for_receiver(self.self_id);
        self.listeners = EventListeners::new();
    }

    /// Advances one fade step. Called when a previously scheduled
    /// `FADE_TICK_CODE` message for this manager fires; re-schedules itself
    /// unless the target has been reached, in which case it fires
    /// `EffectFadeComplete` exactly once.
    pub fn on_message(
        &mut self,
        code: u16,
        now_ms: u64,
        queue: &mut MessageQueue,
        jitter: &mut crate::messaging::Jitter,
        mut on_fade_complete: impl FnMut(ObjectId),
    ) {
        if code != FADE_TICK_CODE {
            return;
        }
        let Some(fade) = &self.fade else { return };
        let (increment, target, delay_ms) = (fade.increment, fade.target, fade.delay_ms);

        self.current.dark_red = Self::step_toward(self.current.dark_red, target.dark_red, increment.dark_red);
        self.current.medium_red =
            Self::step_toward(self.current.medium_red, target.medium_red, increment.medium_red);
        self.current.bright_red =
            Self::step_toward(self.current.bright_red, target.bright_red, increment.bright_red);

        if self.is_at_target() {
            self.fade = None;
            let self_id = self.self_id;
            self.listeners.fire(self_id, EventCode::EffectFadeComplete, |listener| {
                on_fade_complete(listener);
            });
        } else {
            queue.send(self.self_id, self.self_id, FADE_TICK_CODE, Payload::None, now_ms, delay_ms, 0, jitter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::Jitter;

    #[test]
    fn fade_to_black_reaches_target_and_fires_once() {
        // §8 scenario 3: from (32, 64, 128), fade_to((0,0,0), delay=8,
        // increment=2); after ceil(128/2) = 64 ticks BRTC == 0 and
        // EffectFadeComplete fired exactly once.
        let mut mgr = CameraEffectManager::new(1, Brightness::new(32, 64, 128));
        let mut queue = MessageQueue::new();
        let mut jitter = Jitter::new(7);
        let mut fire_count = 0;

        mgr.add_event_listener(99, EventCode::EffectFadeComplete);
        mgr.fade_to(Brightness::new(0, 0, 0), 8, 2, 0, &mut queue, &mut jitter);

        let mut now = 0u64;
        let mut ticks = 0;
        loop {
            let due = queue.drain_due(now + 8);
            now += 8;
            if due.is_empty() {
                break;
            }
            for msg in due {
                mgr.on_message(msg.code, now, &mut queue, &mut jitter, |_| fire_count += 1);
            }
            ticks += 1;
            if mgr.current() == Brightness::new(0, 0, 0) {
                break;
            }
            if ticks > 1000 {
                panic!("fade never converged");
            }
        }

        assert_eq!(mgr.current().bright_red, 0);
        assert_eq!(ticks, 64);
        assert_eq!(fire_count, 1);
    }

    #[test]
    fn stop_cancels_pending_messages() {
        let mut mgr = CameraEffectManager::new(1, Brightness::default());
        let mut queue = MessageQueue::new();
        let mut jitter = Jitter::new(1);
        mgr.fade_to(Brightness::new(10, 10, 10), 4, 1, 0, &mut queue, &mut jitter);
        assert!(!queue.is_empty());
        mgr.stop(&mut queue);
        assert!(queue.is_empty());
    }
}
