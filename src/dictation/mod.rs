//! Dictation sessions: options and the sequencing state machine.

pub mod options;
pub mod sequencer;

pub use options::DictateOptions;
pub use sequencer::{DictationControls, DictationSequencer, PlaybackPosition};
