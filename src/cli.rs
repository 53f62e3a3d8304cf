//! Command-line interface for diktat
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dictation practice from plain text
#[derive(Parser, Debug)]
#[command(name = "diktat", version, about = "Dictation practice from plain text")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: progress, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Language code for dictation (e.g., de-DE, en-US, fr-FR)
    #[arg(long, global = true, value_name = "LANG")]
    pub language: Option<String>,

    /// Synthesis voice name (e.g., de-DE-Wavenet-B)
    #[arg(long, global = true, value_name = "VOICE")]
    pub voice: Option<String>,

    /// Pause between part repetitions. Examples: 2s, 1500ms
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_pause_ms)]
    pub pause_repetitions: Option<u64>,

    /// Pause between sentences. Examples: 3s, 2500ms
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_pause_ms)]
    pub pause_sentences: Option<u64>,
}

/// Parse a pause duration string into milliseconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`2s`, `1500ms`), and compound (`1m30s`).
fn parse_pause_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs * 1000);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dictate a text file aloud, sentence by sentence
    Dictate {
        /// Text file to dictate
        file: PathBuf,
    },

    /// Render a text file's dictation session to a WAV file
    Render {
        /// Text file to render
        file: PathBuf,

        /// Output WAV path
        #[arg(long, short = 'o', value_name = "FILE", default_value = "dictate.wav")]
        output: PathBuf,
    },

    /// List synthesis voices for a language
    Voices,

    /// Dump the effective configuration as TOML
    Config,
}
