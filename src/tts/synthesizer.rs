//! Speech synthesis seam.
//!
//! The synthesizer is an external service: text in, encoded audio bytes
//! out. An empty byte result is a soft failure of the remote side and is
//! passed through as-is; retry policy, if any, belongs to the caller.

use crate::audio::buffer::{AudioEncoding, wav_from_samples};
use crate::defaults;
use crate::error::{DiktatError, Result};
use crate::tts::voice::Voice;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for speech synthesis.
///
/// This trait allows swapping implementations (remote service vs mock).
pub trait Synthesizer: Send + Sync {
    /// Synthesize speech for the given text.
    ///
    /// # Returns
    /// Encoded audio bytes; may be empty when the remote side produced no
    /// audio. Empty output is not an error at this layer.
    fn synthesize(
        &self,
        text: &str,
        encoding: AudioEncoding,
        voice: &Voice,
        speaking_rate: f64,
    ) -> Result<Vec<u8>>;
}

/// Implement Synthesizer for Arc<T> to allow sharing across components.
impl<T: Synthesizer> Synthesizer for Arc<T> {
    fn synthesize(
        &self,
        text: &str,
        encoding: AudioEncoding,
        voice: &Voice,
        speaking_rate: f64,
    ) -> Result<Vec<u8>> {
        (**self).synthesize(text, encoding, voice, speaking_rate)
    }
}

/// Mock synthesizer for testing.
///
/// Produces a deterministic WAV clip whose length is proportional to the
/// text length (10ms per character), so playback and merge behavior can be
/// asserted without a real service.
#[derive(Debug, Default)]
pub struct MockSynthesizer {
    calls: AtomicUsize,
    empty_for: Vec<String>,
    should_fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return empty bytes (remote-failure shape) for this exact text.
    pub fn with_empty_result_for(mut self, text: &str) -> Self {
        self.empty_for.push(text.to_string());
        self
    }

    /// Fail hard on every synthesis call.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of synthesize calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        _encoding: AudioEncoding,
        _voice: &Voice,
        _speaking_rate: f64,
    ) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(DiktatError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        if self.empty_for.iter().any(|t| t == text) {
            return Ok(Vec::new());
        }

        // 10ms of audio per character, sample value derived from the text
        // so distinct texts yield distinct audio
        let frames_per_char = defaults::SAMPLE_RATE as usize / 100;
        let frames = text.chars().count().max(1) * frames_per_char;
        let level = (text.len() % 128) as i16 * 16;
        let samples = vec![level; frames];

        Ok(wav_from_samples(&samples, defaults::SAMPLE_RATE))
    }
}
