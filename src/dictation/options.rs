//! Session options for dictation.

use crate::defaults;
use crate::tts::voice::{Gender, Language, SpeakingSpeed, Voice};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything that shapes a dictation session.
///
/// Options are applied between runs with
/// [`DictationSequencer::set_options`](crate::dictation::DictationSequencer::set_options),
/// which rebuilds only the components that the changed fields feed into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictateOptions {
    pub language: Language,
    pub voice: Voice,
    pub speaking_speed: SpeakingSpeed,
    /// Read the whole text once before part-by-part dictation starts.
    pub read_full_dictate_once: bool,
    /// Read each sentence in full before its parts.
    pub read_full_sentence_at_start: bool,
    /// Read each sentence in full after its parts.
    pub read_full_sentence_at_end: bool,
    /// How many times each part is spoken.
    pub part_repetitions: u32,
    pub pause_between_repetitions: Duration,
    pub pause_between_sentences: Duration,
    /// Speak punctuation marks out loud.
    pub pronounce_punctuation: bool,
    pub target_part_length: usize,
    pub max_part_length: usize,
    /// UI hint, carried in the options but not interpreted here.
    pub hide_text_while_dictating: bool,
}

impl Default for DictateOptions {
    fn default() -> Self {
        Self {
            language: Language::German,
            voice: Voice::new(Language::German, Gender::Male, defaults::DEFAULT_VOICE),
            speaking_speed: SpeakingSpeed::Normal,
            read_full_dictate_once: false,
            read_full_sentence_at_start: true,
            read_full_sentence_at_end: true,
            part_repetitions: 2,
            pause_between_repetitions: Duration::from_secs(2),
            pause_between_sentences: Duration::from_secs(3),
            pronounce_punctuation: false,
            target_part_length: defaults::TARGET_PART_LENGTH,
            max_part_length: defaults::MAX_PART_LENGTH,
            hide_text_while_dictating: false,
        }
    }
}

impl DictateOptions {
    /// Clamp out-of-range length fields to usable values.
    ///
    /// `part_repetitions` is not clamped; zero means each part is spoken
    /// exactly once.
    pub fn sanitized(mut self) -> Self {
        if self.target_part_length == 0 {
            self.target_part_length = defaults::TARGET_PART_LENGTH;
        }
        if self.max_part_length < self.target_part_length {
            self.max_part_length = self.target_part_length;
        }
        self
    }
}
