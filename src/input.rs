#![doc = r#"
Input state [supplemented]: a bitflags-based snapshot of pad buttons, diffed
frame-to-frame into pressed/released/held sets.

Grounded on `original_source/source/Hardware/KeypadManager.h`'s button mask
(`K_RU`/`K_RR`/.../`K_LU`) and its `__KEY_PRESSED`/`__KEY_RELEASED`/
`__KEY_HOLD` per-key state bits; the decoding of a specific physical pad's
wire format is out of scope here, only the diffing contract is implemented.
`process_user_input` (named in §6 EXTERNAL INTERFACES) consumes an already
decoded `Buttons` snapshot produced by a host-supplied `InputDevice`.
"#]

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct Buttons: u16 {
        const RIGHT_UP    = 0x0040;
        const RIGHT_RIGHT = 0x0080;
        const LEFT_RIGHT  = 0x0100;
        const LEFT_LEFT   = 0x0200;
        const LEFT_DOWN   = 0x0400;
        const LEFT_UP     = 0x0800;
        const RIGHT_LEFT  = 0x4000;
        const RIGHT_DOWN  = 0x8000;
        const A = 0x0001;
        const B = 0x0002;
        const START = 0x0004;
        const SELECT = 0x0008;
    }
}

/// Per-key classification the original keeps as a separate status byte per
/// button rather than folding into the raw reading; here it's derived by
/// diffing two consecutive `Buttons` snapshots instead of tracked live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
    Held,
}

/// Frame-to-frame diff of raw pad readings. `pressed`/`released` are edges;
/// `held` is the steady-state mask (down both this frame and last).
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    previous: Buttons,
    current: Buttons,
}

impl InputState {
    pub fn new() -> Self {
        InputState { previous: Buttons::empty(), current: Buttons::empty() }
    }

    /// Feeds a freshly decoded reading; the prior `current` becomes
    /// `previous` for this frame's edge detection.
    pub fn update(&mut self, reading: Buttons) {
        self.previous = self.current;
        self.current = reading;
    }

    pub fn raw(&self) -> Buttons {
        self.current
    }

    /// Buttons that went from up to down this frame.
    pub fn pressed(&self) -> Buttons {
        self.current & !self.previous
    }

    /// Buttons that went from down to up this frame.
    pub fn released(&self) -> Buttons {
        self.previous & !self.current
    }

    /// Buttons down both this frame and last.
    pub fn held(&self) -> Buttons {
        self.current & self.previous
    }

    pub fn state_of(&self, button: Buttons) -> Option<KeyState> {
        if self.pressed().contains(button) {
            Some(KeyState::Pressed)
        } else if self.released().contains(button) {
            Some(KeyState::Released)
        } else if self.held().contains(button) {
            Some(KeyState::Held)
        } else {
            None
        }
    }

    pub fn is_down(&self, button: Buttons) -> bool {
        self.current.contains(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_press_reports_pressed_not_held() {
        let mut input = InputState::new();
        input.update(Buttons::A);
        assert_eq!(input.state_of(Buttons::A), Some(KeyState::Pressed));
    }

    #[test]
    fn sustained_press_reports_held() {
        let mut input = InputState::new();
        input.update(Buttons::A);
        input.update(Buttons::A);
        assert_eq!(input.state_of(Buttons::A), Some(KeyState::Held));
    }

    #[test]
    fn release_reports_released_once() {
        let mut input = InputState::new();
        input.update(Buttons::A);
        input.update(Buttons::empty());
        assert_eq!(input.state_of(Buttons::A), Some(KeyState::Released));
        input.update(Buttons::empty());
        assert_eq!(input.state_of(Buttons::A), None);
    }

    #[test]
    fn unrelated_buttons_do_not_interfere() {
        let mut input = InputState::new();
        input.update(Buttons::A | Buttons::LEFT_UP);
        input.update(Buttons::LEFT_UP);
        assert_eq!(input.state_of(Buttons::A), Some(KeyState::Released));
        assert_eq!(input.state_of(Buttons::LEFT_UP), Some(KeyState::Held));
    }
}
