//! Default `PromptExecutor`.
//!
//! Provider integration is explicitly out of scope for this core: `zdx-core`
//! only defines the `PromptExecutor` seam. This executor is the
//! minimal concrete implementation that makes the binary runnable end to
//! end without a real LLM wired in — it echoes the prompt back as the
//! assistant turn. A real deployment swaps this for an executor backed by
//! an actual SDK; nothing else in the binary needs to change.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use zdx_core::{ContentPart, Message, PromptExecutor, SdkEvent, TurnResult};

pub struct EchoExecutor;

impl PromptExecutor for EchoExecutor {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SdkEvent> {
        let (_tx, rx) = mpsc::unbounded_channel();
        rx
    }

    async fn prompt_result(
        &self,
        _token: CancellationToken,
        history: &[Message],
        prompt: &str,
    ) -> anyhow::Result<TurnResult> {
        let mut messages = history.to_vec();
        messages.push(Message::user(prompt));
        let reply = format!("echo: {prompt}");
        messages.push(Message::assistant(reply.clone()));
        Ok(TurnResult {
            final_text: reply,
            messages,
            usage: None,
        })
    }
}
