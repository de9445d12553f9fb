//! fretscribe CLI
//!
//! Transcribes a guitar recording into six-string tablature.
//!
//! # Usage
//!
//! ```bash
//! # riff.txt plus riff-page-N.svg next to the input
//! fretscribe riff.mp3
//!
//! # Drop D, text only, print the tab
//! fretscribe riff.wav --tuning D,A,D,G,B,E --text-only --print
//!
//! # Settings from a file, output under out/
//! fretscribe riff.wav --config fretscribe.toml -o out/riff
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fretscribe::config::TranscriberConfig;
use fretscribe::transcribe::{Transcriber, Tuning};
use fretscribe::{export, io};

#[derive(Parser)]
#[command(name = "fretscribe")]
#[command(about = "Transcribe a guitar recording into tablature")]
#[command(version)]
struct Cli {
    /// Audio file (.mp3 or .wav)
    input: PathBuf,

    /// Output name without extension (default: input file stem)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Open-string labels, lowest first (comma separated)
    #[arg(long, value_parser = parse_tuning)]
    tuning: Option<Tuning>,

    /// Seconds of audio per analysis chunk
    #[arg(long)]
    chunk_duration: Option<f64>,

    /// Skip chroma tuning-deviation estimation
    #[arg(long)]
    no_tuning_estimate: bool,

    /// Write only the .txt file
    #[arg(long)]
    text_only: bool,

    /// Print the tab to stdout
    #[arg(long)]
    print: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => TranscriberConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TranscriberConfig::default(),
    };
    if let Some(tuning) = cli.tuning.clone() {
        config.tuning = Some(tuning);
    }
    if let Some(seconds) = cli.chunk_duration {
        config.chunk_duration = seconds;
    }
    if cli.no_tuning_estimate {
        config.estimate_tuning = false;
    }
    if cli.text_only {
        config.export.document = false;
        config.export.text = true;
    }

    match io::detect_format(&cli.input).as_deref() {
        Some("mp3") | Some("wav") => {}
        other => tracing::warn!(
            extension = other.unwrap_or(""),
            "expected an .mp3 or .wav file, trying to decode anyway"
        ),
    }

    let stem = output_stem(&cli.input, cli.output.as_deref())?;
    let transcriber = Transcriber::new(config).context("invalid configuration")?;
    let transcription = transcriber
        .transcribe_file(&cli.input)
        .with_context(|| format!("failed to transcribe {}", cli.input.display()))?;

    let tab = transcription.tab_text();
    if cli.print {
        println!("{tab}");
    }

    let written = export::export(&tab, &stem, &transcriber.config().export)
        .with_context(|| format!("failed to write output for {}", stem.display()))?;
    for path in &written {
        println!("{}", path.display());
    }

    Ok(())
}

fn output_stem(input: &Path, output: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(output) = output {
        return Ok(output.to_path_buf());
    }
    let stem = input
        .file_stem()
        .with_context(|| format!("cannot derive an output name from {}", input.display()))?;
    Ok(PathBuf::from(stem))
}

fn parse_tuning(s: &str) -> Result<Tuning, String> {
    s.parse::<Tuning>().map_err(|e| e.to_string())
}
