//! Voice, language and speaking speed types for speech synthesis.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Languages supported by the segmentation tables and the voice directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    German,
    EnglishUs,
    EnglishUk,
    Spanish,
    French,
}

impl Language {
    /// BCP-47 code used by the synthesis service.
    pub fn code(&self) -> &'static str {
        match self {
            Language::German => "de-DE",
            Language::EnglishUs => "en-US",
            Language::EnglishUk => "en-GB",
            Language::Spanish => "es-ES",
            Language::French => "fr-FR",
        }
    }

    /// Parse a BCP-47 code (or a bare primary subtag) into a language.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "de-de" | "de" => Some(Language::German),
            "en-us" | "en" => Some(Language::EnglishUs),
            "en-gb" => Some(Language::EnglishUk),
            "es-es" | "es" => Some(Language::Spanish),
            "fr-fr" | "fr" => Some(Language::French),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Voice gender as reported by the synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl Gender {
    /// SSML gender string for the synthesis request.
    pub fn ssml(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Neutral => "NEUTRAL",
        }
    }
}

/// Speaking speed presets mapped to synthesis speaking rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum SpeakingSpeed {
    VerySlow,
    Slow,
    #[default]
    Normal,
    Fast,
    VeryFast,
}

impl SpeakingSpeed {
    /// Speaking rate multiplier passed to the synthesizer.
    pub fn rate(&self) -> f64 {
        match self {
            SpeakingSpeed::VerySlow => 0.70,
            SpeakingSpeed::Slow => 0.85,
            SpeakingSpeed::Normal => 1.0,
            SpeakingSpeed::Fast => 1.15,
            SpeakingSpeed::VeryFast => 1.3,
        }
    }
}

/// One synthesis voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub language: Language,
    pub gender: Gender,
    pub name: String,
}

impl Voice {
    pub fn new(language: Language, gender: Gender, name: &str) -> Self {
        Self {
            language,
            gender,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {})", self.name, self.gender, self.language.code())
    }
}

/// Trait for the external voice directory.
pub trait VoiceDirectory: Send + Sync {
    /// List the voices available for one language.
    fn list_voices(&self, language: Language) -> Result<Vec<Voice>>;
}

/// Per-language memoizing wrapper around a [`VoiceDirectory`].
///
/// Voice listings are read-mostly; one successful lookup per language is
/// kept for the process lifetime.
pub struct CachedVoiceDirectory<D: VoiceDirectory> {
    inner: D,
    cache: Mutex<HashMap<Language, Vec<Voice>>>,
}

impl<D: VoiceDirectory> CachedVoiceDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl<D: VoiceDirectory> VoiceDirectory for CachedVoiceDirectory<D> {
    fn list_voices(&self, language: Language) -> Result<Vec<Voice>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(voices) = cache.get(&language) {
            return Ok(voices.clone());
        }

        let voices = self.inner.list_voices(language)?;
        cache.insert(language, voices.clone());

        Ok(voices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn language_codes_round_trip() {
        for lang in [
            Language::German,
            Language::EnglishUs,
            Language::EnglishUk,
            Language::Spanish,
            Language::French,
        ] {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn language_from_bare_subtag() {
        assert_eq!(Language::from_code("de"), Some(Language::German));
        assert_eq!(Language::from_code("EN"), Some(Language::EnglishUs));
        assert_eq!(Language::from_code("xx"), None);
    }

    #[test]
    fn speaking_speed_rates_are_ordered() {
        assert!(SpeakingSpeed::VerySlow.rate() < SpeakingSpeed::Slow.rate());
        assert!(SpeakingSpeed::Slow.rate() < SpeakingSpeed::Normal.rate());
        assert!(SpeakingSpeed::Normal.rate() < SpeakingSpeed::Fast.rate());
        assert!(SpeakingSpeed::Fast.rate() < SpeakingSpeed::VeryFast.rate());
        assert_eq!(SpeakingSpeed::Normal.rate(), 1.0);
    }

    #[test]
    fn gender_ssml_strings() {
        assert_eq!(Gender::Male.ssml(), "MALE");
        assert_eq!(Gender::Female.ssml(), "FEMALE");
        assert_eq!(Gender::Neutral.ssml(), "NEUTRAL");
    }

    #[test]
    fn voice_display_contains_name_and_code() {
        let voice = Voice::new(Language::German, Gender::Male, "de-DE-Wavenet-B");
        let shown = voice.to_string();
        assert!(shown.contains("de-DE-Wavenet-B"));
        assert!(shown.contains("de-DE"));
    }

    struct CountingDirectory {
        calls: AtomicUsize,
    }

    impl VoiceDirectory for CountingDirectory {
        fn list_voices(&self, language: Language) -> Result<Vec<Voice>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Voice::new(language, Gender::Female, "test-voice")])
        }
    }

    #[test]
    fn cached_directory_queries_each_language_once() {
        let directory = CachedVoiceDirectory::new(CountingDirectory {
            calls: AtomicUsize::new(0),
        });

        let first = directory.list_voices(Language::German).unwrap();
        let second = directory.list_voices(Language::German).unwrap();
        directory.list_voices(Language::French).unwrap();

        assert_eq!(first, second);
        assert_eq!(directory.inner.calls.load(Ordering::SeqCst), 2);
    }
}
