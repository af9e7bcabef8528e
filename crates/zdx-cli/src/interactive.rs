//! Interactive (TUI) mode entry point.

use std::sync::Arc;

use anyhow::Result;
use zdx_core::{App, PromptExecutor};
use zdx_tui::TuiRuntime;

pub async fn run<S: PromptExecutor + Send + Sync + 'static>(app: Arc<App<S>>) -> Result<()> {
    let runtime = TuiRuntime::new(app)?;
    runtime.run().await
}
