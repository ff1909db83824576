//! Command-line entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse arguments.
//! 3. Load [`AppConfig`] from disk (returns default on first run).
//! 4. Resolve the article text (`--text`, `--file`, `--url`, a message or stdin).
//! 5. Build the [`ApiGateway`] and [`DialoguePipeline`] from config.
//! 6. Run the pipeline; print the transcript or the markup.
//! 7. Optionally synthesize audio and store it as `<uuid>.wav`.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use dialogue_explainer::{
    config::{AppConfig, AppPaths},
    dialogue::ParseStrategy,
    llm::{ApiGateway, ChatGateway},
    pipeline::DialoguePipeline,
    source::{decode_file, ArticleFetcher, HttpArticleFetcher, InputSource},
    synth::{synthesize_to_file, AudioStore, HttpSynthesizer},
};

const FETCH_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Explain an article as a father–daughter dialogue
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the dialogue and its SSML
    Run(RunCommand),

    /// Write a settings file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
struct RunCommand {
    /// Article text or a link to it; read from stdin when omitted
    message: Option<String>,

    /// Use this literal article text, even if it looks like a link
    #[arg(long, conflicts_with_all = ["message", "file", "url"])]
    text: Option<String>,

    /// Read the article from a .txt document
    #[arg(long, conflicts_with_all = ["message", "url"])]
    file: Option<PathBuf>,

    /// Fetch the article from a plain-text URL
    #[arg(long, conflicts_with = "message")]
    url: Option<String>,

    /// Parser used for the markup
    #[arg(long)]
    strategy: Option<StrategyArg>,

    /// Write the SSML document to this file
    #[arg(long)]
    markup_out: Option<PathBuf>,

    /// Print the SSML instead of the transcript
    #[arg(long)]
    markup: bool,

    /// Send the SSML to the synthesizer and store the audio
    #[arg(long)]
    synthesize: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Regex,
    Lines,
}

impl From<StrategyArg> for ParseStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Regex => ParseStrategy::Regex,
            StrategyArg::Lines => ParseStrategy::Lines,
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_config(path: Option<&PathBuf>) -> AppConfig {
    let loaded = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        let mut config = AppConfig::default();
        config.fill_api_key(std::env::var(dialogue_explainer::config::API_KEY_ENV).ok());
        config
    })
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| AppPaths::new().settings_file);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default()
        .save_to(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

async fn fetch(url: &str) -> Result<String> {
    let fetcher = HttpArticleFetcher::new(Duration::from_secs(FETCH_TIMEOUT_SECS));
    fetcher
        .fetch(url)
        .await
        .with_context(|| format!("fetching {url}"))
}

async fn resolve_input(cmd: &RunCommand) -> Result<String> {
    if let Some(text) = &cmd.text {
        return Ok(text.clone());
    }
    if let Some(path) = &cmd.file {
        return decode_file(path).with_context(|| format!("reading {}", path.display()));
    }
    if let Some(url) = &cmd.url {
        return fetch(url).await;
    }
    let message = match &cmd.message {
        Some(message) => message.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    match InputSource::detect(&message) {
        InputSource::Url(url) => fetch(&url).await,
        InputSource::Text(text) => Ok(text),
    }
}

async fn run(cmd: RunCommand, config: AppConfig) -> Result<ExitCode> {
    let text = resolve_input(&cmd).await?;
    if text.trim().is_empty() {
        bail!("no article text given");
    }

    let gateway: Arc<dyn ChatGateway> = Arc::new(ApiGateway::from_config(&config.llm));
    let mut pipeline =
        DialoguePipeline::new(gateway, &config).context("invalid configuration")?;
    if let Some(strategy) = cmd.strategy {
        pipeline = pipeline.with_markup_strategy(strategy.into());
    }

    let output = match pipeline.run(&text).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(path) = &cmd.markup_out {
        std::fs::write(path, &output.markup)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("SSML written to {}", path.display());
    }

    if cmd.markup {
        println!("{}", output.markup);
    } else {
        for turn in &output.transcript {
            println!("{}", turn.utterance);
        }
    }

    if cmd.synthesize {
        let synthesizer = HttpSynthesizer::from_config(&config.synth);
        let store = AudioStore::from_config(&config.synth);
        let path = synthesize_to_file(&synthesizer, &store, &output.markup)
            .await
            .context("speech synthesis")?;
        println!("{}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Arguments
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::InitConfig { force } => init_config(cli.config, force).map(|()| ExitCode::SUCCESS),
        Commands::Run(cmd) => {
            // 3. Configuration
            let config = load_config(cli.config.as_ref());
            run(cmd, config).await
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
