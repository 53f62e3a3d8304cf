//! Speech synthesis: voice types, the synthesizer seam, and the per-part
//! audio cache.

pub mod cache;
pub mod synthesizer;
pub mod voice;

#[cfg(feature = "remote-tts")]
pub mod remote;

pub use cache::AudioCache;
pub use synthesizer::{MockSynthesizer, Synthesizer};
pub use voice::{CachedVoiceDirectory, Gender, Language, SpeakingSpeed, Voice, VoiceDirectory};

#[cfg(feature = "remote-tts")]
pub use remote::GoogleTtsClient;
