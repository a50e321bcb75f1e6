use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use batchscribe::batch::Orchestrator;
use batchscribe::config::{EngineConfig, Language};
use batchscribe::engine::WhisperCli;

#[derive(Parser)]
#[command(name = "batchscribe")]
#[command(author, version, about = "Batch audio transcription via an external engine", long_about = None)]
struct Cli {
    /// Directory containing the audio files to transcribe
    directory: PathBuf,

    /// Whisper model to use (tiny, base, small, medium, large-v3)
    #[arg(long)]
    model: Option<String>,

    /// Language of the audio, or "auto" to let the engine detect it
    #[arg(long)]
    language: Option<String>,

    /// Output format the engine should produce (txt, srt, vtt, json)
    #[arg(long)]
    output_format: Option<String>,

    /// Directory for transcripts (defaults to the input directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Engine executable to invoke
    #[arg(long)]
    engine: Option<String>,

    /// Extra engine flag as FLAG=VALUE, forwarded as "--FLAG VALUE" (repeatable)
    #[arg(long = "engine-arg", value_name = "FLAG=VALUE", value_parser = parse_engine_arg)]
    engine_args: Vec<(String, String)>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Parse `FLAG=VALUE` into a flag/value pair, tolerating leading dashes.
fn parse_engine_arg(s: &str) -> Result<(String, String), String> {
    let (flag, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FLAG=VALUE, got '{}'", s))?;
    let flag = flag.trim_start_matches('-');
    if flag.is_empty() {
        return Err(format!("empty flag in '{}'", s));
    }
    Ok((flag.to_string(), value.to_string()))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("batchscribe=debug")
    } else {
        EnvFilter::new("batchscribe=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = EngineConfig::load().context("Failed to load configuration")?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(language) = cli.language {
        config.language = Language::from_arg(&language);
    }
    if let Some(format) = cli.output_format {
        config.output_format = format;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = Some(dir);
    }
    if let Some(program) = cli.engine {
        config.program = program;
    }
    config.extra_args.extend(cli.engine_args);
    config.validate()?;

    let engine = WhisperCli::new(config.clone());
    let orchestrator = Orchestrator::new(config, engine);
    let summary = orchestrator.run(&cli.directory)?;

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
