//! A deterministic [`crate::sdk::PromptExecutor`] test double.
//!
//! A scripted, deterministic stand-in for a real provider integration,
//! used to drive the orchestrator through fixed scenarios in tests.

use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;

use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio_util::sync::CancellationToken;

use crate::message::Message;
use crate::sdk::{PromptExecutor, SdkEvent, TurnResult};

/// One scripted step: the events to emit, and how the step concludes.
pub struct ScriptedTurn {
    pub events: Vec<SdkEvent>,
    pub outcome: ScriptedOutcome,
    /// If set, `prompt_result` blocks receiving from this channel before
    /// doing anything else — lets a test hold a step open until it
    /// explicitly releases the gate.
    pub gate: Option<mpsc::Receiver<()>>,
}

impl ScriptedTurn {
    pub fn text(response: impl Into<String>) -> Self {
        let text = response.into();
        Self {
            events: vec![SdkEvent::AssistantDelta { text: text.clone() }],
            outcome: ScriptedOutcome::Success(TurnResult {
                final_text: text.clone(),
                messages: vec![Message::assistant(text)],
                usage: None,
            }),
            gate: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            events: Vec::new(),
            outcome: ScriptedOutcome::Error(message.into()),
            gate: None,
        }
    }

    pub fn wait_for_cancellation() -> Self {
        Self {
            events: Vec::new(),
            outcome: ScriptedOutcome::WaitForCancellation,
            gate: None,
        }
    }

    #[must_use]
    pub fn gated(mut self, gate: mpsc::Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }
}

pub enum ScriptedOutcome {
    Success(TurnResult),
    Error(String),
    /// Waits for the step's cancellation token to fire, then returns an
    /// error — simulates an SDK that genuinely observes `ctx` cancellation.
    WaitForCancellation,
}

/// A queue of [`ScriptedTurn`]s played back in order, one per
/// `prompt_result` call.
#[derive(Default)]
pub struct ScriptedSdk {
    turns: AsyncMutex<VecDeque<ScriptedTurn>>,
    subscriber: StdMutex<Option<mpsc::UnboundedSender<SdkEvent>>>,
    calls: StdMutex<Vec<String>>,
}

impl ScriptedSdk {
    pub fn new(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            turns: AsyncMutex::new(turns.into_iter().collect()),
            subscriber: StdMutex::new(None),
            calls: StdMutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }
}

impl PromptExecutor for ScriptedSdk {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SdkEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.subscriber.lock().expect("subscriber lock poisoned") = Some(tx);
        rx
    }

    async fn prompt_result(
        &self,
        token: CancellationToken,
        _history: &[Message],
        prompt: &str,
    ) -> anyhow::Result<TurnResult> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(prompt.to_string());

        let mut turn = {
            let mut turns = self.turns.lock().await;
            turns
                .pop_front()
                .expect("ScriptedSdk: ran out of scripted turns")
        };

        if let Some(mut gate) = turn.gate.take() {
            gate.recv().await;
        }

        let subscriber = self.subscriber.lock().expect("subscriber lock poisoned").clone();
        if let Some(tx) = subscriber {
            for ev in turn.events {
                let _ = tx.send(ev);
            }
        }

        match turn.outcome {
            ScriptedOutcome::Success(result) => Ok(result),
            ScriptedOutcome::Error(message) => Err(anyhow::anyhow!(message)),
            ScriptedOutcome::WaitForCancellation => {
                token.cancelled().await;
                Err(anyhow::anyhow!("cancelled"))
            }
        }
    }
}
