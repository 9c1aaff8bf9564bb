#![doc = r#"
Sound mixer [O]: claims hardware voices for tracked sounds, drives their
playback from timer ticks, and computes stereo attenuation from screen
position.

Grounded on `original_source/source/sound/SoundManager.c`: the
`__LEFT_EAR_CENTER`/`__RIGHT_EAR_CENTER` constants and
`SoundManager_calculateSoundPosition`'s per-ear distance attenuation,
translated here from its 384-wide screen-space formula into a reusable
`stereo_level` function.
"#]

use crate::messaging::{EventCode, EventListeners, ObjectId};
use crate::sound::track::{Track, TrackProgram};

pub const TOTAL_VOICES: usize = 6;
pub const SCREEN_WIDTH: i32 = 384;
pub const LEFT_EAR_CENTER: i32 = 96;
pub const RIGHT_EAR_CENTER: i32 = 288;
pub const MAX_OUTPUT_LEVEL: i32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    Normal,
    FadeIn,
    FadeOut,
    Loop,
}

/// Computes the stereo level byte (high nibble left, low nibble right) for
/// a sound at screen-space `x`, attenuated further by `parallax` (distance
/// into the screen), matching the reference formula.
pub fn stereo_level(x: i32, parallax: i32) -> u8 {
    let max_output = MAX_OUTPUT_LEVEL - parallax;
    if max_output <= 0 {
        return 0;
    }

    let unit = SCREEN_WIDTH / MAX_OUTPUT_LEVEL;
    let left_distance = (x - LEFT_EAR_CENTER).abs();
    let right_distance = (x - RIGHT_EAR_CENTER).abs();
    let left_minus = left_distance / unit;
    let right_minus = right_distance / unit;

    let left_output = (max_output - left_minus).clamp(0, 15) as u8;
    let right_output = (max_output - right_minus).clamp(0, 15) as u8;

    (left_output << 4) | right_output
}

pub type SoundSpecId = u64;

struct SoundInstance {
    id: ObjectId,
    spec_id: SoundSpecId,
    track: Track,
    mode: PlaybackMode,
    screen_x: i32,
    parallax: i32,
    fade_level: u8,
    listeners: EventListeners,
}

pub struct SoundMixer {
    instances: Vec<SoundInstance>,
}

impl Default for SoundMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundMixer {
    pub fn new() -> Self {
        SoundMixer { instances: Vec::new() }
    }

    fn find_live(&self, spec_id: SoundSpecId) -> Option<usize> {
        self.instances.iter().position(|s| s.spec_id == spec_id && s.track.playing)
    }

    /// Plays `program` under `spec_id`; reuses a live instance with the same
    /// spec id rather than claiming a second voice for it, per §4.M's
    /// lifecycle. Returns `None` once all `TOTAL_VOICES` are claimed.
    pub fn play(
        &mut self,
        id: ObjectId,
        spec_id: SoundSpecId,
        program: TrackProgram,
        screen_x: i32,
        parallax: i32,
        mode: PlaybackMode,
    ) -> Option<usize> {
        if let Some(index) = self.find_live(spec_id) {
            return Some(index);
        }

        if self.instances.len() >= TOTAL_VOICES {
            log::warn!("sound mixer voice contention: {TOTAL_VOICES} voices already claimed");
            return None;
        }

        let fade_level = match mode {
            PlaybackMode::FadeIn => 0,
            _ => 15,
        };

        self.instances.push(SoundInstance {
            id,
            spec_id,
            track: Track::new(program),
            mode,
            screen_x,
            parallax,
            fade_level,
            listeners: EventListeners::new(),
        });
        Some(self.instances.len() - 1)
    }

    pub fn set_position(&mut self, index: usize, screen_x: i32, parallax: i32) {
        if let Some(inst) = self.instances.get_mut(index) {
            inst.screen_x = screen_x;
            inst.parallax = parallax;
        }
    }

    pub fn add_event_listener(&mut self, index: usize, listener: ObjectId, code: EventCode) {
        if let Some(inst) = self.instances.get_mut(index) {
            inst.listeners.add(listener, code);
        }
    }

    /// Stops the sound at `index`; if `release`, also clears its listeners
    /// so they won't receive `SoundReleased`-unrelated future events.
    pub fn stop(&mut self, index: usize, release: bool) {
        if let Some(inst) = self.instances.get_mut(index) {
            inst.track.playing = false;
            if release {
                inst.listeners = EventListeners::new();
            }
        }
    }

    /// Advances every live track by `microseconds_per_interrupt`, applies
    /// fade-in/out stepping, and fires `SoundFinished` exactly once for a
    /// track that completes this tick. Finished, non-looping instances are
    /// then dropped.
    pub fn on_tick(&mut self, microseconds_per_interrupt: u32, mut dispatch: impl FnMut(ObjectId, EventCode)) {
        for inst in &mut self.instances {
            if !inst.track.playing {
                continue;
            }
            inst.track.advance(microseconds_per_interrupt);

            match inst.mode {
                PlaybackMode::FadeIn if inst.fade_level < 15 => inst.fade_level += 1,
                PlaybackMode::FadeOut if inst.fade_level > 0 => inst.fade_level -= 1,
                _ => {}
            }

            if inst.track.finished {
                let id = inst.id;
                inst.listeners.fire(id, EventCode::SoundFinished, |listener| dispatch(listener, EventCode::SoundFinished));
            }
        }

        self.instances.retain(|inst| inst.track.playing || !inst.track.finished);
    }

    pub fn stereo_level_for(&self, index: usize) -> Option<u8> {
        self.instances.get(index).map(|inst| stereo_level(inst.screen_x, inst.parallax))
    }

    pub fn fade_level_for(&self, index: usize) -> Option<u8> {
        self.instances.get(index).map(|inst| inst.fade_level)
    }

    pub fn claimed_voices(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::track::TrackEvent;

    fn short_program() -> TrackProgram {
        TrackProgram { events: vec![TrackEvent::NoteOn { frequency: 100, waveform: 0 }, TrackEvent::End], loops: false }
    }

    #[test]
    fn centered_sound_has_balanced_stereo() {
        let level = stereo_level((LEFT_EAR_CENTER + RIGHT_EAR_CENTER) / 2, 0);
        let left = level >> 4;
        let right = level & 0x0F;
        assert!((left as i32 - right as i32).abs() <= 1);
    }

    #[test]
    fn sound_at_left_ear_has_max_left_attenuation() {
        let level = stereo_level(LEFT_EAR_CENTER, 0);
        assert_eq!(level >> 4, 15);
    }

    #[test]
    fn deep_parallax_mutes_a_sound() {
        assert_eq!(stereo_level(LEFT_EAR_CENTER, 20), 0);
    }

    #[test]
    fn playing_same_spec_twice_reuses_the_voice() {
        let mut mixer = SoundMixer::new();
        let a = mixer.play(1, 42, short_program(), 0, 0, PlaybackMode::Normal).unwrap();
        let b = mixer.play(1, 42, short_program(), 0, 0, PlaybackMode::Normal).unwrap();
        assert_eq!(a, b);
        assert_eq!(mixer.claimed_voices(), 1);
    }

    #[test]
    fn voice_contention_returns_none_past_total_voices() {
        let mut mixer = SoundMixer::new();
        for spec in 0..TOTAL_VOICES as u64 {
            assert!(mixer.play(1, spec, short_program(), 0, 0, PlaybackMode::Normal).is_some());
        }
        assert!(mixer.play(1, 999, short_program(), 0, 0, PlaybackMode::Normal).is_none());
    }

    #[test]
    fn finished_sound_fires_sound_finished_once() {
        let mut mixer = SoundMixer::new();
        let index = mixer.play(1, 1, short_program(), 0, 0, PlaybackMode::Normal).unwrap();
        mixer.add_event_listener(index, 99, EventCode::SoundFinished);

        let mut fired = 0;
        mixer.on_tick(10, |_, _| fired += 1);
        assert_eq!(fired, 1);
        mixer.on_tick(10, |_, _| fired += 1);
        assert_eq!(fired, 1);
    }

    #[test]
    fn release_on_stop_clears_listeners() {
        let mut mixer = SoundMixer::new();
        let index = mixer.play(1, 1, short_program(), 0, 0, PlaybackMode::Normal).unwrap();
        mixer.add_event_listener(index, 99, EventCode::SoundFinished);
        mixer.stop(index, true);
        let mut fired = 0;
        mixer.on_tick(10, |_, _| fired += 1);
        assert_eq!(fired, 0);
    }
}
