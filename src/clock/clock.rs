#![doc = r#"
Logical clocks [C]: messaging, animation, and physics each get an
independently pausable millisecond clock driven by the hardware timer
interrupt (§4.C). Internally a clock accumulates microseconds so that many
sub-millisecond ticks (20us/100us timer resolution) sum exactly instead of
truncating the remainder on every call.
"#]

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockKind {
    #[default]
    Messaging,
    Animation,
    Physics,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Clock {
    microseconds: u64,
    paused: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn reset(&mut self) {
        self.microseconds = 0;
    }

    /// Accumulates microseconds into this clock's tally, unless paused.
    /// Called from the timer ISR once per tick (§4.C step 2).
    pub fn advance(&mut self, microseconds: u32) {
        if !self.paused {
            self.microseconds += microseconds as u64;
        }
    }

    pub fn millis(&self) -> u64 {
        self.microseconds / 1000
    }

    pub fn microseconds(&self) -> u64 {
        self.microseconds
    }
}

/// A simple elapsed-time stopwatch, started/stopped/read independently of
/// the three named clocks; the spec's "updates stopwatches" step (§4.C).
#[derive(Clone, Copy, Debug, Default)]
pub struct Stopwatch {
    elapsed_us: u64,
    running: bool,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.elapsed_us = 0;
    }

    pub fn update(&mut self, microseconds: u32) {
        if self.running {
            self.elapsed_us += microseconds as u64;
        }
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed_us / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_does_not_accumulate() {
        let mut c = Clock::new();
        c.pause();
        c.advance(5000);
        assert_eq!(c.millis(), 0);
    }

    #[test]
    fn sub_millisecond_ticks_accumulate_exactly() {
        let mut c = Clock::new();
        for _ in 0..50 {
            c.advance(20);
        }
        assert_eq!(c.millis(), 1);
        assert_eq!(c.microseconds(), 1000);
    }

    #[test]
    fn stopwatch_only_runs_while_started() {
        let mut sw = Stopwatch::new();
        sw.update(1000);
        assert_eq!(sw.elapsed_millis(), 0);
        sw.start();
        sw.update(2000);
        sw.stop();
        sw.update(5000);
        assert_eq!(sw.elapsed_millis(), 2);
    }
}
