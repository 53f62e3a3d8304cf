//! Concatenation of WAV byte streams into one stream.
//!
//! Merging is best effort: a stream that cannot be decoded, a sample
//! format mismatch, or an encoder failure yields an empty result with an
//! error log instead of propagating, so that a long render is never torn
//! down by one bad clip.

use crate::audio::buffer::{AudioBuffer, AudioEncoding, PcmClip, wav_from_samples};
use crate::defaults;

/// Merges mono 16-bit WAV streams back to back.
pub struct AudioStreamMerger;

impl AudioStreamMerger {
    /// Concatenate WAV streams in order into a single WAV stream.
    ///
    /// Zero inputs produce an empty byte vector and one input is returned
    /// as-is. Empty inputs in between are skipped. Any decode failure or
    /// a sample-spec mismatch between streams aborts the merge and
    /// returns an empty byte vector.
    pub fn merge(streams: &[Vec<u8>]) -> Vec<u8> {
        let non_empty: Vec<&Vec<u8>> = streams.iter().filter(|s| !s.is_empty()).collect();
        match non_empty.len() {
            0 => return Vec::new(),
            1 => return non_empty[0].clone(),
            _ => {}
        }

        let mut merged: Option<PcmClip> = None;
        for (index, stream) in non_empty.iter().enumerate() {
            let buffer = AudioBuffer::new((*stream).clone(), AudioEncoding::Linear16);
            let clip = match buffer.decode_pcm() {
                Ok(clip) => clip,
                Err(e) => {
                    log::error!("cannot merge audio stream {}: {}", index, e);
                    return Vec::new();
                }
            };

            match &mut merged {
                None => merged = Some(clip),
                Some(acc) => {
                    if acc.spec != clip.spec {
                        log::error!(
                            "audio stream {} has mismatched format ({} Hz, {} ch), expected {} Hz, {} ch",
                            index,
                            clip.spec.sample_rate,
                            clip.spec.channels,
                            acc.spec.sample_rate,
                            acc.spec.channels
                        );
                        return Vec::new();
                    }
                    acc.samples.extend_from_slice(&clip.samples);
                }
            }
        }

        match merged {
            Some(clip) => wav_from_samples(&clip.samples, clip.spec.sample_rate),
            None => Vec::new(),
        }
    }

    /// A mono WAV stream of silence lasting `units` pause units
    /// ([`defaults::SILENCE_UNIT_MS`] each) at the given sample rate.
    pub fn silence(units: u32, sample_rate: u32) -> Vec<u8> {
        if units == 0 {
            return Vec::new();
        }
        let frames =
            (u64::from(sample_rate) * u64::from(units) * defaults::SILENCE_UNIT_MS) / 1000;
        let samples = vec![0i16; frames as usize];
        wav_from_samples(&samples, sample_rate)
    }
}
