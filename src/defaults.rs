//! Default configuration constants for diktat.
//!
//! Shared constants used across configuration types to keep segmentation
//! and playback tuning in one place.

/// Soft character-count bound for one dictation part.
///
/// The segmenter stops appending phrase groups once a part reaches this
/// length. Around 20 characters yields chunks a learner can hold in
/// working memory while writing.
pub const TARGET_PART_LENGTH: usize = 20;

/// Hard character-count bound for one dictation part.
///
/// A part only exceeds this when a single unsplittable phrase group is
/// already longer on its own.
pub const MAX_PART_LENGTH: usize = 40;

/// Duration of one inserted silence unit in rendered audio, in milliseconds.
///
/// Pause gaps in render mode are quantized to multiples of this unit.
pub const SILENCE_UNIT_MS: u64 = 500;

/// Default BCP-47 language code.
pub const DEFAULT_LANGUAGE: &str = "de-DE";

/// Default synthesis voice name for the default language.
pub const DEFAULT_VOICE: &str = "de-DE-Wavenet-B";

/// Frames written to the audio output per chunk during playback.
///
/// 1600 frames is 100ms at 16kHz; the cancellation check between chunks
/// bounds pause latency to roughly one chunk duration.
pub const PLAYBACK_CHUNK_FRAMES: usize = 1600;

/// Sample rate used for generated silence and the mock synthesizer, in Hz.
///
/// Real synthesis output carries its own rate in the WAV header; this value
/// only applies where diktat produces PCM itself.
pub const SAMPLE_RATE: u32 = 16000;
