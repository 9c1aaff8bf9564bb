#![doc = r#"
Delayed-message queue, the other half of the event/message substrate [B].

A single global queue of `DelayedMessage`s ordered by fire time; each game
frame, every message whose `fire_at <= now` is popped in order and handed to
the caller for delivery (the receiver's `handle_message` in the spec's
polymorphic-dispatch terms — here, simply a payload the caller routes).
"#]

/// Any per-message payload. Left engine-agnostic: the distilled spec treats
/// message payloads as opaque beyond delivery timing, so this is a small
/// closed set of primitive shapes a game would actually send, not a
/// game-specific type.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    None,
    Int(i32),
    Code(u16),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DelayedMessage {
    pub sender: u64,
    pub receiver: u64,
    pub code: u16,
    pub payload: Payload,
    pub fire_at_ms: u64,
    /// Monotonically increasing sequence number assigned at enqueue time,
    /// used only to break fire-time ties in FIFO order (§8 "Delayed-message
    /// FIFO").
    sequence: u64,
}

#[derive(Default)]
pub struct MessageQueue {
    pending: Vec<DelayedMessage>,
    next_sequence: u64,
}

/// A minimal linear congruential generator so `rand_ms` jitter doesn't pull
/// in a `rand` dependency the rest of the pack doesn't reach for either; the
/// spec only requires a uniform spread, not cryptographic quality.
pub struct Jitter {
    state: u64,
}

impl Jitter {
    pub fn new(seed: u64) -> Self {
        Jitter { state: seed | 1 }
    }

    /// Returns a value uniformly distributed in `0..=max_ms` (0 if
    /// `max_ms == 0`).
    pub fn uniform(&mut self, max_ms: u32) -> u32 {
        if max_ms == 0 {
            return 0;
        }
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.state >> 32) as u32) % (max_ms + 1)
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a message due at `now_ms + delay_ms + jitter.uniform(rand_ms)`.
    pub fn send(
        &mut self,
        sender: u64,
        receiver: u64,
        code: u16,
        payload: Payload,
        now_ms: u64,
        delay_ms: u32,
        rand_ms: u32,
        jitter: &mut Jitter,
    ) {
        let fire_at_ms = now_ms + delay_ms as u64 + jitter.uniform(rand_ms) as u64;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.push(DelayedMessage { sender, receiver, code, payload, fire_at_ms, sequence });
    }

    /// Pops every message due at or before `now_ms`, in fire-time order with
    /// ties broken by enqueue order (FIFO), for the caller to deliver.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<DelayedMessage> {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|m| m.fire_at_ms <= now_ms);
        self.pending = pending;
        let mut due = due;
        due.sort_by_key(|m| (m.fire_at_ms, m.sequence));
        due
    }

    /// Cancels every pending message.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Cancels every pending message addressed to `receiver`.
    pub fn cancel_for_receiver(&mut self, receiver: u64) {
        self.pending.retain(|m| m.receiver != receiver);
    }

    /// Cancels every pending message sent by `sender`.
    pub fn cancel_from_sender(&mut self, sender: u64) {
        self.pending.retain(|m| m.sender != sender);
    }

    /// Cancels every pending message with the given `code`.
    pub fn cancel_by_code(&mut self, code: u16) {
        self.pending.retain(|m| m.code != code);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_fire_time_preserves_enqueue_order() {
        let mut q = MessageQueue::new();
        let mut jitter = Jitter::new(1);
        q.send(1, 10, 0, Payload::None, 0, 5, 0, &mut jitter);
        q.send(2, 10, 1, Payload::None, 0, 5, 0, &mut jitter);
        let due = q.drain_due(5);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].sender, 1);
        assert_eq!(due[1].sender, 2);
    }

    #[test]
    fn drain_only_pops_due_messages() {
        let mut q = MessageQueue::new();
        let mut jitter = Jitter::new(1);
        q.send(1, 10, 0, Payload::None, 0, 100, 0, &mut jitter);
        let due = q.drain_due(50);
        assert!(due.is_empty());
        assert_eq!(q.len(), 1);
        let due = q.drain_due(100);
        assert_eq!(due.len(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn cancellation_kinds_are_independent() {
        let mut q = MessageQueue::new();
        let mut jitter = Jitter::new(1);
        q.send(1, 10, 0, Payload::None, 0, 0, 0, &mut jitter);
        q.send(2, 11, 1, Payload::None, 0, 0, 0, &mut jitter);
        q.send(3, 10, 2, Payload::None, 0, 0, 0, &mut jitter);

        q.cancel_for_receiver(10);
        assert_eq!(q.len(), 1);

        q.send(1, 10, 0, Payload::None, 0, 0, 0, &mut jitter);
        q.cancel_from_sender(1);
        assert_eq!(q.len(), 1);

        q.cancel_by_code(1);
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn jitter_respects_upper_bound() {
        let mut jitter = Jitter::new(42);
        for _ in 0..1000 {
            assert!(jitter.uniform(10) <= 10);
        }
        assert_eq!(jitter.uniform(0), 0);
    }
}
