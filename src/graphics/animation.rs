#![doc = r#"
Animation [K]: per-sprite frame clocks advancing a texture's displayed frame
on a fixed cadence, with an end-of-animation callback (§4.K).
"#]

#[derive(Clone, Debug)]
pub struct AnimationFunction {
    pub frames: Vec<u16>,
    pub frame_delay_ms: u32,
    pub loops: bool,
}

pub struct AnimationController {
    function: AnimationFunction,
    cursor: usize,
    elapsed_ms: u32,
    finished: bool,
}

impl AnimationController {
    pub fn new(function: AnimationFunction) -> Self {
        AnimationController { function, cursor: 0, elapsed_ms: 0, finished: false }
    }

    pub fn current_frame(&self) -> u16 {
        self.function.frames[self.cursor]
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
        self.elapsed_ms = 0;
        self.finished = false;
    }

    /// Advances the controller by `delta_ms`; calls `on_loop_end` each time
    /// the last frame is passed, whether or not the animation loops.
    pub fn advance(&mut self, delta_ms: u32, mut on_loop_end: impl FnMut()) {
        if self.finished {
            return;
        }
        self.elapsed_ms += delta_ms;
        while self.elapsed_ms >= self.function.frame_delay_ms {
            self.elapsed_ms -= self.function.frame_delay_ms;
            if self.cursor + 1 < self.function.frames.len() {
                self.cursor += 1;
            } else {
                on_loop_end();
                if self.function.loops {
                    self.cursor = 0;
                } else {
                    self.finished = true;
                    self.elapsed_ms = 0;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(loops: bool) -> AnimationFunction {
        AnimationFunction { frames: vec![0, 1, 2], frame_delay_ms: 10, loops }
    }

    #[test]
    fn advances_frames_on_cadence() {
        let mut anim = AnimationController::new(func(true));
        anim.advance(10, || {});
        assert_eq!(anim.current_frame(), 1);
        anim.advance(10, || {});
        assert_eq!(anim.current_frame(), 2);
    }

    #[test]
    fn looping_animation_wraps_and_calls_callback() {
        let mut anim = AnimationController::new(func(true));
        let mut loop_ends = 0;
        anim.advance(30, || loop_ends += 1);
        assert_eq!(loop_ends, 1);
        assert_eq!(anim.current_frame(), 0);
    }

    #[test]
    fn non_looping_animation_finishes_on_last_frame() {
        let mut anim = AnimationController::new(func(false));
        let mut loop_ends = 0;
        anim.advance(30, || loop_ends += 1);
        assert!(anim.is_finished());
        assert_eq!(loop_ends, 1);
        assert_eq!(anim.current_frame(), 2);
        // Further advances are no-ops once finished.
        anim.advance(100, || loop_ends += 1);
        assert_eq!(loop_ends, 1);
    }

    #[test]
    fn restart_resets_cursor_and_finished_state() {
        let mut anim = AnimationController::new(func(false));
        anim.advance(30, || {});
        assert!(anim.is_finished());
        anim.restart();
        assert!(!anim.is_finished());
        assert_eq!(anim.current_frame(), 0);
    }
}
