//! Error types for diktat.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiktatError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Segmentation errors
    #[error("Parser produced an uninterpretable tree: {message}")]
    ParseStructure { message: String },

    // Synthesis errors (hard failures only; an empty synthesis result is
    // not an error and is cached as-is)
    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Voice directory lookup failed: {message}")]
    VoiceLookup { message: String },

    // Audio errors
    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    #[error("Audio output failed: {message}")]
    AudioOutput { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DiktatError>;
