#![doc = r#"
Sound subsystem [O]: the tracked-sound mixer and its per-voice playback
tracks.
"#]

pub mod mixer;
pub mod track;

pub use mixer::{stereo_level, PlaybackMode, SoundMixer, LEFT_EAR_CENTER, RIGHT_EAR_CENTER, TOTAL_VOICES};
pub use track::{Track, TrackEvent, TrackProgram};
