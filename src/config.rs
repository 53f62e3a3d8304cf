use crate::defaults;
use crate::dictation::options::DictateOptions;
use crate::error::{DiktatError, Result};
use crate::tts::voice::{Gender, Language, SpeakingSpeed, Voice};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub voice: VoiceConfig,
    pub dictation: DictationConfig,
    pub segmentation: SegmentationConfig,
    pub synthesis: SynthesisConfig,
}

/// Voice selection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    pub language: String,
    pub name: String,
    pub gender: String,
    pub speed: String,
}

/// Dictation pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DictationConfig {
    pub read_full_dictate_once: bool,
    pub read_full_sentence_at_start: bool,
    pub read_full_sentence_at_end: bool,
    pub part_repetitions: u32,
    pub pause_between_repetitions_ms: u64,
    pub pause_between_sentences_ms: u64,
    pub pronounce_punctuation: bool,
    pub hide_text_while_dictating: bool,
}

/// Part length configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmentationConfig {
    pub target_part_length: usize,
    pub max_part_length: usize,
}

/// Synthesis service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SynthesisConfig {
    pub api_key: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            name: defaults::DEFAULT_VOICE.to_string(),
            gender: "male".to_string(),
            speed: "normal".to_string(),
        }
    }
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            read_full_dictate_once: false,
            read_full_sentence_at_start: true,
            read_full_sentence_at_end: true,
            part_repetitions: 2,
            pause_between_repetitions_ms: 2000,
            pause_between_sentences_ms: 3000,
            pronounce_punctuation: false,
            hide_text_while_dictating: false,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            target_part_length: defaults::TARGET_PART_LENGTH,
            max_part_length: defaults::MAX_PART_LENGTH,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DIKTAT_LANGUAGE → voice.language
    /// - DIKTAT_VOICE → voice.name
    /// - DIKTAT_API_KEY → synthesis.api_key
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("DIKTAT_LANGUAGE")
            && !language.is_empty()
        {
            self.voice.language = language;
        }

        if let Ok(name) = std::env::var("DIKTAT_VOICE")
            && !name.is_empty()
        {
            self.voice.name = name;
        }

        if let Ok(key) = std::env::var("DIKTAT_API_KEY")
            && !key.is_empty()
        {
            self.synthesis.api_key = Some(key);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/diktat/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("diktat")
            .join("config.toml")
    }

    /// Resolve the config into session options.
    ///
    /// # Errors
    /// `ConfigInvalidValue` for an unknown language code, gender, or
    /// speed name.
    pub fn to_options(&self) -> Result<DictateOptions> {
        let language = Language::from_code(&self.voice.language).ok_or_else(|| {
            DiktatError::ConfigInvalidValue {
                key: "voice.language".to_string(),
                message: format!("unknown language code \"{}\"", self.voice.language),
            }
        })?;

        let gender = match self.voice.gender.to_ascii_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            "neutral" => Gender::Neutral,
            other => {
                return Err(DiktatError::ConfigInvalidValue {
                    key: "voice.gender".to_string(),
                    message: format!("unknown gender \"{other}\""),
                });
            }
        };

        let speaking_speed = match self.voice.speed.to_ascii_lowercase().as_str() {
            "very-slow" => SpeakingSpeed::VerySlow,
            "slow" => SpeakingSpeed::Slow,
            "normal" => SpeakingSpeed::Normal,
            "fast" => SpeakingSpeed::Fast,
            "very-fast" => SpeakingSpeed::VeryFast,
            other => {
                return Err(DiktatError::ConfigInvalidValue {
                    key: "voice.speed".to_string(),
                    message: format!("unknown speaking speed \"{other}\""),
                });
            }
        };

        Ok(DictateOptions {
            language,
            voice: Voice::new(language, gender, &self.voice.name),
            speaking_speed,
            read_full_dictate_once: self.dictation.read_full_dictate_once,
            read_full_sentence_at_start: self.dictation.read_full_sentence_at_start,
            read_full_sentence_at_end: self.dictation.read_full_sentence_at_end,
            part_repetitions: self.dictation.part_repetitions,
            pause_between_repetitions: Duration::from_millis(
                self.dictation.pause_between_repetitions_ms,
            ),
            pause_between_sentences: Duration::from_millis(
                self.dictation.pause_between_sentences_ms,
            ),
            pronounce_punctuation: self.dictation.pronounce_punctuation,
            target_part_length: self.segmentation.target_part_length,
            max_part_length: self.segmentation.max_part_length,
            hide_text_while_dictating: self.dictation.hide_text_while_dictating,
        }
        .sanitized())
    }
}
