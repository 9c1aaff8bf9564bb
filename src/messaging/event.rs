#![doc = r#"
Event/message substrate, listener half [B].

`EventCode` is the process-wide enumeration events are drawn from; an open
`Custom(u16)` variant stands in for per-game event codes the engine core
doesn't need to know about. `EventListeners` is the subscription list a
listener's address owns: a triple of (listener, code, tombstone) per
subscription, with the firing-counter/tombstone re-entrancy scheme from
§4.B so that a handler which unsubscribes mid-fire cannot invalidate the
iterator that is currently calling it.
"#]

/// Address of any engine object that can send, receive, or listen for
/// events. Opaque packed (index, generation) pair — see
/// `crate::memory::registry::Handle::raw`.
pub type ObjectId = u64;

/// Wildcard receiver/sender: cancellation APIs accept this to mean "all".
pub const ANY: ObjectId = u64::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventCode {
    CharSetChangedOffset,
    TextureRewritten,
    EntityLoaded,
    CollisionStart,
    CollisionPersists,
    CollisionEnd,
    SoundFinished,
    SoundReleased,
    EffectFadeComplete,
    VipOvertime,
    CollisionDispatchDirty,
    /// Per-game event codes the engine core is agnostic to.
    Custom(u16),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Subscription {
    listener: ObjectId,
    code: EventCode,
    tombstone: bool,
}

/// Per-subject subscription list plus the re-entrancy guard. One of these is
/// embedded in every object that can fire events (the "Listener object" of
/// §3 DATA MODEL becomes this struct embedded by value rather than a base
/// class).
#[derive(Default)]
pub struct EventListeners {
    subscriptions: Vec<Subscription>,
    /// Depth of nested `fire` calls currently in flight. While > 0, removals
    /// only tombstone; the list is physically compacted once this returns to
    /// zero.
    firings: u32,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `code`. Re-subscribing over an existing
    /// tombstoned slot for the same (listener, code) reuses that slot rather
    /// than growing the list, per §4.B.
    pub fn add(&mut self, listener: ObjectId, code: EventCode) {
        if let Some(existing) = self
            .subscriptions
            .iter_mut()
            .find(|s| s.listener == listener && s.code == code)
        {
            existing.tombstone = false;
            return;
        }
        self.subscriptions.push(Subscription { listener, code, tombstone: false });
    }

    /// Removes subscriptions matching `listener` and `code`. `code == None`
    /// means "all codes for this listener" (the spec's `ANY` removal). While
    /// firing, this only tombstones matching entries; otherwise it removes
    /// them immediately.
    pub fn remove(&mut self, listener: ObjectId, code: Option<EventCode>) {
        for sub in self.subscriptions.iter_mut() {
            if sub.listener == listener && code.is_none_or(|c| c == sub.code) {
                sub.tombstone = true;
            }
        }
        if self.firings == 0 {
            self.compact();
        }
    }

    fn compact(&mut self) {
        self.subscriptions.retain(|s| !s.tombstone);
    }

    pub fn has_subscriptions_for(&self, listener: ObjectId, code: EventCode) -> bool {
        self.subscriptions
            .iter()
            .any(|s| !s.tombstone && s.listener == listener && s.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.iter().all(|s| s.tombstone)
    }

    /// Fires `code`, invoking `deliver` once per live (non-tombstoned)
    /// subscription in registration order. `deliver` may itself call `add`
    /// or `remove` on this same `EventListeners` (re-entrant firing); the
    /// firing-counter guard ensures that is safe and that a listener which
    /// removes itself inside its own handler sees zero subscriptions for
    /// that code afterward, per the §8 "Event re-entry" property.
    pub fn fire(&mut self, firer: ObjectId, code: EventCode, mut deliver: impl FnMut(ObjectId)) {
        self.firings += 1;
        // Snapshot the length so subscriptions added during this fire (by a
        // handler re-subscribing) are not delivered to in the same pass,
        // matching "delivery order equals registration order" for the set
        // that existed when firing began.
        let len = self.subscriptions.len();
        for i in 0..len {
            let (listener, tombstoned, matches) = {
                let sub = &self.subscriptions[i];
                (sub.listener, sub.tombstone, sub.code == code)
            };
            if tombstoned || !matches {
                continue;
            }
            let _ = firer;
            deliver(listener);
        }
        self.firings -= 1;
        if self.firings == 0 {
            self.compact();
        }
    }
}
