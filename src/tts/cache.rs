//! Per-text memoization of synthesized audio.

use crate::audio::buffer::{AudioBuffer, AudioEncoding};
use crate::error::Result;
use crate::tts::synthesizer::Synthesizer;
use crate::tts::voice::{SpeakingSpeed, Voice};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Memoizes synthesized audio per exact chunk text for one
/// (encoding, voice, speed) configuration.
///
/// The map lock is held across the synthesis call, so concurrent requests
/// for the same text never trigger duplicate synthesis — the second caller
/// waits and hits the cache. Synthesis latency dominates lock contention
/// here. A voice, speed or encoding change discards the cache wholesale:
/// the owner constructs a fresh one instead of evicting entries.
pub struct AudioCache {
    encoding: AudioEncoding,
    voice: Voice,
    speed: SpeakingSpeed,
    synthesizer: Arc<dyn Synthesizer>,
    entries: Mutex<HashMap<String, AudioBuffer>>,
}

impl AudioCache {
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        encoding: AudioEncoding,
        voice: Voice,
        speed: SpeakingSpeed,
    ) -> Self {
        log::info!(
            "building audio cache for encoding {} voice {} rate {}",
            encoding.as_str(),
            voice.name,
            speed.rate()
        );

        Self {
            encoding,
            voice,
            speed,
            synthesizer,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get the audio for exact chunk text, synthesizing on first request.
    ///
    /// An empty synthesis result is cached and returned as an empty buffer;
    /// playback of an empty buffer is a no-op, not an error.
    pub fn get_audio(&self, text: &str) -> Result<AudioBuffer> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(buffer) = entries.get(text) {
            log::debug!("audio cache hit for \"{}\"", text);
            return Ok(buffer.clone());
        }

        log::debug!("synthesizing audio for \"{}\"", text);
        let bytes =
            self.synthesizer
                .synthesize(text, self.encoding, &self.voice, self.speed.rate())?;
        let buffer = AudioBuffer::new(bytes, self.encoding);
        entries.insert(text.to_string(), buffer.clone());

        Ok(buffer)
    }

    /// Number of cached entries.
    pub fn entry_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
