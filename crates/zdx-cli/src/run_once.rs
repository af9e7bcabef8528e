//! Headless one-shot execution (`--prompt`, non-interactive / JSON modes).

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use zdx_core::{App, AppEvent, PromptExecutor};

/// Runs a single prompt to completion and prints the final text to stdout.
///
/// Prints streamed chunks as they arrive; falls back to `final_text` when
/// the executor never streamed anything (e.g. [`crate::executor::EchoExecutor`],
/// which reports its result only through the returned `TurnResult`).
pub async fn run_text<S: PromptExecutor>(app: &App<S>, token: CancellationToken, prompt: &str) -> Result<()> {
    let streamed = AtomicBool::new(false);
    let result = app
        .run_once_with_display(token, prompt, |event| {
            if let AppEvent::StreamChunk { content } = event {
                streamed.store(true, Ordering::Relaxed);
                print!("{content}");
            }
        })
        .await
        .context("prompt execution failed")?;
    if !streamed.load(Ordering::Relaxed) {
        print!("{}", result.final_text);
    }
    if result.final_text.is_empty() || !result.final_text.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Runs a single prompt to completion and prints the `TurnResult` as JSON.
pub async fn run_json<S: PromptExecutor>(app: &App<S>, token: CancellationToken, prompt: &str) -> Result<()> {
    let result = app.run_once(token, prompt).await.context("prompt execution failed")?;
    let json = serde_json::to_string(&result).context("failed to serialize turn result")?;
    println!("{json}");
    Ok(())
}
