#![doc = r#"
Visual state [supplemented]: the show/hide, transparency, and Z-sort fields
every on-screen component (sprite, wireframe object, eventually mesh) carries
regardless of kind.

Grounded on `original_source/source/Component/Graphics/VisualComponent.c`'s
`show`/`rendered`/`transparency` fields, factored into one struct embedded by
each concrete visual component rather than duplicated per kind, per §3.1.
"#]

use crate::math::Fix13;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    show: bool,
    transparency: u8,
    z: Fix13,
}

impl VisualState {
    pub fn new(z: Fix13) -> Self {
        VisualState { show: true, transparency: 0, z }
    }

    pub fn show(&mut self) {
        self.show = true;
    }

    pub fn hide(&mut self) {
        self.show = false;
    }

    pub fn is_shown(&self) -> bool {
        self.show
    }

    pub fn set_transparency(&mut self, transparency: u8) {
        self.transparency = transparency;
    }

    pub fn transparency(&self) -> u8 {
        self.transparency
    }

    pub fn set_z(&mut self, z: Fix13) {
        self.z = z;
    }

    pub fn z(&self) -> Fix13 {
        self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshly_constructed_state_is_shown_and_opaque() {
        let state = VisualState::new(Fix13::ZERO);
        assert!(state.is_shown());
        assert_eq!(state.transparency(), 0);
    }

    #[test]
    fn hide_then_show_round_trips() {
        let mut state = VisualState::new(Fix13::ZERO);
        state.hide();
        assert!(!state.is_shown());
        state.show();
        assert!(state.is_shown());
    }
}
