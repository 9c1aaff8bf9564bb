#![doc = r#"
Hardware timer interrupt manager [C].

Models the 16-bit down-counter timer device (§6 EXTERNAL INTERFACES): a
configurable resolution (20us or 100us) and period (1..=1000 units) raise an
interrupt; `TimerManager::on_tick` is the ISR body the host calls from its
actual interrupt vector. Reconfiguration is bracketed by stop/start and
preserves the running tally, per §4.C.
"#]

use super::clock::{Clock, ClockKind, Stopwatch};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Us20,
    Us100,
}

impl Resolution {
    fn microseconds(self) -> u32 {
        match self {
            Resolution::Us20 => 20,
            Resolution::Us100 => 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    pub resolution: Resolution,
    /// Target period, 1..=1000 resolution units per interrupt.
    pub period: u16,
}

impl TimerConfig {
    pub fn new(resolution: Resolution, period: u16) -> Self {
        let period = period.clamp(1, 1000);
        TimerConfig { resolution, period }
    }

    fn microseconds_per_interrupt(self) -> u32 {
        self.resolution.microseconds() * self.period as u32
    }
}

pub struct TimerManager {
    config: TimerConfig,
    /// Mirrors the hardware interrupt-enable mask; false while the ISR body
    /// is conceptually running (§4.C steps 1 and 5).
    interrupt_enabled: bool,
    clocks: HashMap<ClockKind, Clock>,
    stopwatches: Vec<Stopwatch>,
}

impl TimerManager {
    pub fn new(config: TimerConfig) -> Self {
        let mut clocks = HashMap::new();
        clocks.insert(ClockKind::Messaging, Clock::new());
        clocks.insert(ClockKind::Animation, Clock::new());
        clocks.insert(ClockKind::Physics, Clock::new());
        TimerManager { config, interrupt_enabled: true, clocks, stopwatches: Vec::new() }
    }

    pub fn clock(&self, kind: ClockKind) -> &Clock {
        self.clocks.get(&kind).expect("every ClockKind has a clock")
    }

    pub fn clock_mut(&mut self, kind: ClockKind) -> &mut Clock {
        self.clocks.get_mut(&kind).expect("every ClockKind has a clock")
    }

    pub fn add_stopwatch(&mut self) -> usize {
        self.stopwatches.push(Stopwatch::new());
        self.stopwatches.len() - 1
    }

    pub fn stopwatch_mut(&mut self, index: usize) -> Option<&mut Stopwatch> {
        self.stopwatches.get_mut(index)
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    /// Reconfigures the timer. Brackets the change with a stop/start of the
    /// interrupt mask; the clocks' running tallies are untouched, matching
    /// "reconfiguration ... preserves the running tally" (§4.C).
    pub fn reconfigure(&mut self, config: TimerConfig) {
        self.interrupt_enabled = false;
        self.config = config;
        self.interrupt_enabled = true;
    }

    /// Runs one ISR tick: masks the interrupt, accumulates microseconds into
    /// every clock, invokes `advance_sound_mixer` with the elapsed
    /// microseconds (the sound mixer itself lives in a different module so
    /// this is dependency-injected rather than imported directly), updates
    /// every stopwatch, then unmasks the interrupt. Returns the elapsed
    /// microseconds for callers (e.g. message-queue dispatch) that also key
    /// off timer ticks.
    pub fn on_tick(&mut self, mut advance_sound_mixer: impl FnMut(u32)) -> u32 {
        self.interrupt_enabled = false;

        let microseconds = self.config.microseconds_per_interrupt();
        for clock in self.clocks.values_mut() {
            clock.advance(microseconds);
        }

        advance_sound_mixer(microseconds);

        for stopwatch in self.stopwatches.iter_mut() {
            stopwatch.update(microseconds);
        }

        self.interrupt_enabled = true;
        microseconds
    }

    pub fn is_interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }
}
