use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, CommandOutcome, ModeCommand, ModeController};
use tracing_subscriber::EnvFilter;

mod controller;
mod render;
mod repl;

use controller::events::UiError;

#[derive(Parser, Debug)]
#[command(name = "askio", about = "Terminal client for the Ask.Io assistant backend")]
struct Args {
    /// TOML settings file (defaults to ./askio.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
    /// Print one-shot results as JSON history entries
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a free-form question
    Chat { text: Vec<String> },
    /// Ask a question about a document
    Summary {
        #[arg(long)]
        file: Option<PathBuf>,
        question: Vec<String>,
    },
    /// Correct the grammar of a text
    Grammar { text: Vec<String> },
    /// Translate Indonesian text to English
    Translate { text: Vec<String> },
    /// Interactive session (default)
    Repl,
}

impl Command {
    fn into_mode_command(self) -> Option<ModeCommand> {
        let cmd = match self {
            Command::Chat { text } => ModeCommand::SubmitChat {
                text: text.join(" "),
            },
            Command::Summary { file, question } => ModeCommand::SubmitDocumentQa {
                file,
                text: question.join(" "),
            },
            Command::Grammar { text } => ModeCommand::SubmitGrammarCheck {
                text: text.join(" "),
            },
            Command::Translate { text } => ModeCommand::SubmitTranslation {
                text: text.join(" "),
            },
            Command::Repl => return None,
        };
        Some(cmd)
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_once(controller: Arc<ModeController>, cmd: ModeCommand, json: bool) -> Result<()> {
    let entry = match controller.handle(cmd).await {
        Ok(CommandOutcome::Completed(entry)) => entry,
        Ok(other) => return Err(anyhow!("command produced no answer: {other:?}")),
        Err(err) => return Err(anyhow!(UiError::from_submit_error(&err).message().to_string())),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("{}", entry.answer);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout = Duration::from_secs(secs);
    }
    tracing::debug!(?settings, "resolved client settings");

    let controller =
        ModeController::from_settings(&settings).context("failed to configure backend client")?;

    match args.command.and_then(Command::into_mode_command) {
        Some(cmd) => run_once(controller, cmd, args.json).await,
        None => repl::run(controller).await,
    }
}
