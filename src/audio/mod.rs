//! Audio decoding, playback, and stream merging.

pub mod buffer;
pub mod merger;
pub mod output;
pub mod player;

pub use buffer::{AudioBuffer, AudioEncoding, PcmClip};
pub use merger::AudioStreamMerger;
pub use output::{AudioOutput, MockAudioOutput};
pub use player::{AudioPlaybackEngine, PlaybackOutcome, PlaybackState};

#[cfg(feature = "playback")]
pub use output::CpalAudioOutput;
