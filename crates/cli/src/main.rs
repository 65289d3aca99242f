//! Binary entry point for the caption translator.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use session::{Session, State, Timeouts};
use srtbot_core::config::API_KEY_ENV;
use srtbot_core::translate::{anthropic::AnthropicBackend, process_file};
use srtbot_core::{clean, BatchTranslator, Language, TranslatorConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod session;

/// Command line options for the binary.
#[derive(Parser)]
#[command(version, about = "Translate and clean SRT subtitle files")]
struct Cli {
    /// Enable verbose debug and trace logs.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate an SRT file into a supported language.
    Translate {
        /// Path to the SRT file we want to translate.
        input: PathBuf,

        /// Target language name, e.g. `french`.
        #[arg(long, short)]
        lang: String,

        /// Where to write the result. Defaults to `<stem>_<code>.srt`.
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Strip known translation preambles and renumber blocks.
    Clean {
        input: PathBuf,

        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Prompt for a file and a language, then translate.
    Interactive {
        /// Seconds to wait for the file path.
        #[arg(long, default_value_t = 120)]
        file_timeout: u64,

        /// Seconds to wait for the language.
        #[arg(long, default_value_t = 30)]
        language_timeout: u64,

        #[command(flatten)]
        backend: BackendArgs,
    },
}

/// Backend settings; flags override the environment, which overrides `--config`.
#[derive(Args)]
struct BackendArgs {
    /// JSON file with translator settings.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier sent to the backend.
    #[arg(long)]
    model: Option<String>,

    /// Number of subtitle blocks to translate per request.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Attempts per request before giving up.
    #[arg(long)]
    max_attempts: Option<u32>,
}

impl BackendArgs {
    fn resolve(&self) -> Result<TranslatorConfig> {
        let mut config = match &self.config {
            Some(path) => TranslatorConfig::load(path)?,
            None => TranslatorConfig::default(),
        };
        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(attempts) = self.max_attempts {
            config.retry.max_attempts = attempts;
        }
        config.validate()?;
        Ok(config)
    }

    fn translator(&self) -> Result<BatchTranslator<AnthropicBackend>> {
        let config = self.resolve()?;
        let backend = AnthropicBackend::new(&config)?;
        Ok(BatchTranslator::new(backend, &config)?)
    }
}

/// Application entry point which parses CLI args and performs actions.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("srtbot=trace".parse().unwrap())
            .add_directive("srtbot_core=trace".parse().unwrap())
            .add_directive("info".parse().unwrap())
    } else {
        EnvFilter::default()
            .add_directive("srtbot=info".parse().unwrap())
            .add_directive("srtbot_core=info".parse().unwrap())
            .add_directive("warn".parse().unwrap())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Translate {
            input,
            lang,
            output,
            backend,
        } => {
            let language: Language = lang.parse().with_context(|| {
                format!("supported languages are: {}", Language::supported_names())
            })?;
            let translator = backend.translator()?;
            process_file(&input, output.as_deref(), &translator, language).await?;
        }
        Command::Clean { input, output } => {
            clean::clean_file(&input, output.as_deref())?;
        }
        Command::Interactive {
            file_timeout,
            language_timeout,
            backend,
        } => {
            let translator = backend.translator()?;
            let timeouts = Timeouts {
                file: Duration::from_secs(file_timeout),
                language: Duration::from_secs(language_timeout),
            };
            let stdin = BufReader::new(tokio::io::stdin());
            let session = Session::new(&translator, stdin, tokio::io::stdout(), timeouts);
            if let State::Failed(message) = session.run().await? {
                info!("session ended without output: {}", message);
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
