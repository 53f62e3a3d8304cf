//! diktat - Dictation practice from plain text
//!
//! Segments text into short, pronounceable parts and plays synthesized
//! speech for each part, with pause/resume, sentence stepping, and
//! offline rendering of a whole session to one WAV buffer.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod config;
pub mod defaults;
pub mod dictation;
pub mod error;
pub mod nlp;
pub mod tts;

// Core seams (parse → segment → synthesize → play)
pub use nlp::parser::{ConstituencyParser, FlatParser, ParseNode};
pub use nlp::processor::{NlpProcessor, Sentence};
pub use tts::synthesizer::Synthesizer;
pub use tts::voice::{Gender, Language, SpeakingSpeed, Voice, VoiceDirectory};

// Playback and sequencing
pub use audio::output::AudioOutput;
pub use audio::player::{AudioPlaybackEngine, PlaybackOutcome, PlaybackState};
pub use dictation::options::DictateOptions;
pub use dictation::sequencer::{DictationControls, DictationSequencer, PlaybackPosition};

// Error handling
pub use error::{DiktatError, Result};

#[cfg(feature = "cli")]
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.0+abc1234"` when git hash is available, `"0.3.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
