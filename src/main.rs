use anyhow::{Context, Result, bail};
use clap::Parser;
use diktat::cli::{Cli, Commands};
use diktat::config::Config;
use diktat::dictation::options::DictateOptions;
use diktat::dictation::sequencer::DictationSequencer;
use diktat::nlp::parser::FlatParser;
use diktat::tts::voice::{Language, Voice};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let options = apply_cli_overrides(config.to_options()?, &cli)?;

    match cli.command {
        Commands::Dictate { ref file } => {
            run_dictate(&config, options, file)?;
        }
        Commands::Render { ref file, ref output } => {
            run_render(&config, options, file, output, cli.quiet)?;
        }
        Commands::Voices => {
            run_voices(&config, options.language)?;
        }
        Commands::Config => {
            let toml = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            print!("{toml}");
        }
    }

    Ok(())
}

fn init_logging(quiet: bool, verbose: u8) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/diktat/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

/// Fold command-line flags over the configured options.
fn apply_cli_overrides(mut options: DictateOptions, cli: &Cli) -> Result<DictateOptions> {
    if let Some(code) = &cli.language {
        let language = Language::from_code(code)
            .with_context(|| format!("Unknown language code \"{code}\""))?;
        options.language = language;
        options.voice.language = language;
    }
    if let Some(name) = &cli.voice {
        options.voice = Voice::new(options.voice.language, options.voice.gender, name);
    }
    if let Some(ms) = cli.pause_repetitions {
        options.pause_between_repetitions = Duration::from_millis(ms);
    }
    if let Some(ms) = cli.pause_sentences {
        options.pause_between_sentences = Duration::from_millis(ms);
    }
    Ok(options.sanitized())
}

#[cfg(feature = "remote-tts")]
fn build_synthesizer(config: &Config) -> Result<Arc<diktat::tts::remote::GoogleTtsClient>> {
    let api_key = config
        .synthesis
        .api_key
        .as_deref()
        .context("No synthesis API key configured (synthesis.api_key or DIKTAT_API_KEY)")?;
    Ok(Arc::new(diktat::tts::remote::GoogleTtsClient::new(api_key)?))
}

#[cfg(not(feature = "remote-tts"))]
fn build_synthesizer(_config: &Config) -> Result<Arc<diktat::tts::synthesizer::MockSynthesizer>> {
    bail!("This build has no speech synthesis backend (rebuild with the remote-tts feature)")
}

fn run_dictate(config: &Config, options: DictateOptions, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let synthesizer = build_synthesizer(config)?;

    #[cfg(feature = "playback")]
    {
        let output = diktat::audio::output::CpalAudioOutput::new()
            .context("Failed to open an audio output device")?;
        let mut sequencer = DictationSequencer::new(
            &text,
            options,
            Arc::new(FlatParser),
            synthesizer,
            Box::new(output),
        );
        sequencer.dictate_full_text()?;
        Ok(())
    }
    #[cfg(not(feature = "playback"))]
    {
        let _ = (text, synthesizer, options);
        bail!("This build cannot play audio (rebuild with the playback feature)")
    }
}

fn run_render(
    config: &Config,
    options: DictateOptions,
    file: &Path,
    output: &Path,
    quiet: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let synthesizer = build_synthesizer(config)?;

    let mut sequencer = DictationSequencer::new(
        &text,
        options,
        Arc::new(FlatParser),
        synthesizer,
        Box::new(diktat::audio::output::MockAudioOutput::new()),
    );

    let rendered = sequencer.generate_audio_from_dictate()?;
    if rendered.is_empty() {
        bail!("Nothing to render: no audio was produced for {}", file.display());
    }

    std::fs::write(output, &rendered)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    if !quiet {
        println!("Wrote {} bytes to {}", rendered.len(), output.display());
    }
    Ok(())
}

#[cfg(feature = "remote-tts")]
fn run_voices(config: &Config, language: Language) -> Result<()> {
    use diktat::tts::voice::VoiceDirectory;

    let client = build_synthesizer(config)?;
    let voices = client.list_voices(language)?;

    if voices.is_empty() {
        eprintln!("No voices found for {}", language.code());
        std::process::exit(1);
    }

    println!("Available voices for {}:", language.code());
    for voice in &voices {
        println!("  {}", voice);
    }
    Ok(())
}

#[cfg(not(feature = "remote-tts"))]
fn run_voices(_config: &Config, _language: Language) -> Result<()> {
    bail!("This build has no voice directory (rebuild with the remote-tts feature)")
}
