//! Raw audio buffers and PCM decoding.

use crate::error::{DiktatError, Result};
use std::io::Cursor;

/// Audio encodings the synthesis service can produce.
///
/// Only `Linear16` (PCM in a WAV container) can be decoded for playback
/// and merging; the compressed encodings are pass-through payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioEncoding {
    Linear16,
    Mp3,
    OggOpus,
}

impl AudioEncoding {
    /// Wire name used by the synthesis service.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::OggOpus => "OGG_OPUS",
        }
    }
}

/// Encoded audio bytes plus their encoding tag.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    bytes: Vec<u8>,
    encoding: AudioEncoding,
}

impl AudioBuffer {
    pub fn new(bytes: Vec<u8>, encoding: AudioEncoding) -> Self {
        Self { bytes, encoding }
    }

    /// An empty buffer, e.g. a synthesis call that returned no audio.
    pub fn empty(encoding: AudioEncoding) -> Self {
        Self {
            bytes: Vec::new(),
            encoding,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn encoding(&self) -> AudioEncoding {
        self.encoding
    }

    /// Decode a LINEAR16 buffer into PCM samples.
    ///
    /// # Errors
    /// `AudioDecode` for compressed encodings, empty buffers, or malformed
    /// WAV data.
    pub fn decode_pcm(&self) -> Result<PcmClip> {
        if self.encoding != AudioEncoding::Linear16 {
            return Err(DiktatError::AudioDecode {
                message: format!("cannot decode {} audio to PCM", self.encoding.as_str()),
            });
        }
        if self.bytes.is_empty() {
            return Err(DiktatError::AudioDecode {
                message: "buffer is empty".to_string(),
            });
        }

        let mut reader =
            hound::WavReader::new(Cursor::new(&self.bytes)).map_err(|e| DiktatError::AudioDecode {
                message: format!("failed to parse WAV stream: {}", e),
            })?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DiktatError::AudioDecode {
                message: format!("failed to read WAV samples: {}", e),
            })?;

        Ok(PcmClip { samples, spec })
    }
}

/// Decoded PCM samples plus their WAV spec.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    pub samples: Vec<i16>,
    pub spec: hound::WavSpec,
}

impl PcmClip {
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> u64 {
        self.samples.len() as u64 / u64::from(self.spec.channels.max(1))
    }
}

/// Encode mono 16-bit PCM samples as a WAV byte stream.
pub fn wav_from_samples(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    // writing to an in-memory cursor cannot fail
    if let Ok(mut writer) = hound::WavWriter::new(&mut cursor, spec) {
        for &sample in samples {
            if writer.write_sample(sample).is_err() {
                return Vec::new();
            }
        }
        if writer.finalize().is_err() {
            return Vec::new();
        }
    }

    cursor.into_inner()
}
