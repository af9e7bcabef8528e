//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use zdx_core::App;

use zdx_core::config::Config;
use zdx_core::core::interrupt;
use crate::executor::EchoExecutor;
use crate::{logging, run_once};

#[derive(Parser)]
#[command(name = "zdx")]
#[command(version = "0.1")]
#[command(about = "Terminal agentic coding assistant")]
struct Cli {
    /// Run a single prompt non-interactively instead of launching the TUI.
    #[arg(short, long)]
    prompt: Option<String>,

    /// With `--prompt`, print the result as JSON instead of plain text.
    #[arg(long, requires = "prompt")]
    json: bool,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut cfg = Config::load().context("load config")?;
    if let Some(level) = cli.log_level {
        cfg.log_level = level;
    }

    let tui_mode = cli.prompt.is_none() && cfg.interactive;
    let _logging_guard = logging::init(&cfg.log_level, tui_mode).context("init logging")?;

    let app = App::with_messages_and_limit(EchoExecutor, Vec::new(), cfg.history_limit);

    match cli.prompt {
        Some(prompt) => {
            let token = CancellationToken::new();
            interrupt::init(token.clone());
            if cli.json {
                run_once::run_json(&app, token, &prompt).await
            } else {
                run_once::run_text(&app, token, &prompt).await
            }
        }
        None if cfg.interactive => run_interactive(app).await,
        None => anyhow::bail!("no prompt given and interactive mode is disabled in config"),
    }
}

#[cfg(feature = "tui")]
async fn run_interactive<S: zdx_core::PromptExecutor + Send + Sync + 'static>(app: Arc<App<S>>) -> Result<()> {
    crate::interactive::run(app).await
}

#[cfg(not(feature = "tui"))]
async fn run_interactive<S: zdx_core::PromptExecutor + Send + Sync + 'static>(_app: Arc<App<S>>) -> Result<()> {
    anyhow::bail!("interactive mode requires the `tui` feature")
}
