//! The App orchestrator.
//!
//! Owns the agentic loop, the prompt queue, cancellation, shutdown, and
//! event fan-out to the UI. All public methods are safe to call from any
//! thread; none of them hold the internal mutex across an `.await` or an
//! event delivery.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::core::events::{AppEvent, PromptRequest, PromptResponse};
use crate::message::{Message, MessageStore};
use crate::sdk::{PromptExecutor, SdkEvent, TurnResult};
use crate::usage::UsageTracker;

/// Thread-safe delivery of events to a UI.
///
/// `App` reads the `program` reference under its mutex, releases it, then
/// calls `send` — no event is ever emitted while the App mutex is held.
pub trait EventSink: Send + Sync {
    fn send(&self, event: AppEvent);
}

impl<F: Fn(AppEvent) + Send + Sync> EventSink for F {
    fn send(&self, event: AppEvent) {
        self(event)
    }
}

struct Inner {
    busy: bool,
    queue: VecDeque<String>,
    cancel_step: Option<CancellationToken>,
    closed: bool,
    program: Option<Arc<dyn EventSink>>,
    worker: Option<JoinHandle<()>>,
}

/// The application-orchestration core.
///
/// Generic over the SDK collaborator so the common case (one concrete
/// executor for the lifetime of a session) uses static dispatch rather than
/// a `dyn` trait object.
pub struct App<S: PromptExecutor> {
    inner: Mutex<Inner>,
    executor: S,
    store: MessageStore,
    usage: UsageTracker,
    root_token: CancellationToken,
}

impl<S: PromptExecutor> App<S> {
    /// Constructs a new `App` with no pre-loaded messages.
    pub fn new(executor: S) -> Arc<Self> {
        Self::with_messages(executor, Vec::new())
    }

    /// Constructs a new `App` pre-loaded with `initial` messages.
    pub fn with_messages(executor: S, initial: Vec<Message>) -> Arc<Self> {
        Self::with_messages_and_limit(executor, initial, None)
    }

    /// Constructs a new `App` pre-loaded with `initial` messages, capping
    /// retained history at `history_limit` (oldest dropped first).
    pub fn with_messages_and_limit(executor: S, initial: Vec<Message>, history_limit: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                busy: false,
                queue: VecDeque::new(),
                cancel_step: None,
                closed: false,
                program: None,
                worker: None,
            }),
            executor,
            store: MessageStore::with_messages(initial).with_history_limit(history_limit),
            usage: UsageTracker::new(),
            root_token: CancellationToken::new(),
        })
    }

    /// Attaches (or detaches, with `None`) the UI event sink.
    pub fn set_event_sink(&self, sink: Option<Arc<dyn EventSink>>) {
        let mut inner = self.lock();
        inner.program = sink;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("App mutex poisoned")
    }

    /// Read-only access to the conversation history store.
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Read-only access to accumulated usage.
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// `true` once `close()` has completed or is in progress.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Snapshot of the current queue depth.
    pub fn queue_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Truncates the queue without affecting the in-flight step.
    pub fn clear_queue(&self) {
        self.lock().queue.clear();
    }

    /// Empties the message store.
    pub fn clear_messages(&self) {
        self.store.clear();
    }

    /// Cancels the per-step token. No-op when idle. Never blocks.
    pub fn cancel_current_step(&self) {
        if let Some(token) = self.lock().cancel_step.clone() {
            token.cancel();
        }
    }

    /// Thread-safe delivery of a typed event to the UI; no-op if no UI is
    /// attached. Special-cases interactive-extension events that carry a
    /// response channel: with no UI attached, they are answered with a
    /// cancelled result immediately so the sender never blocks forever.
    pub fn send_event(&self, event: AppEvent) {
        let program = self.lock().program.clone();
        match (program, event) {
            (None, AppEvent::ToolApprovalNeeded { respond_to, .. }) => {
                let _ = respond_to.try_send(false);
            }
            (None, AppEvent::PromptRequest(req)) => {
                let _ = req.respond_to.try_send(PromptResponse::Cancelled);
            }
            (None, AppEvent::OverlayRequest(req)) => {
                let _ = req.respond_to.try_send(PromptResponse::Cancelled);
            }
            (None, _) => {}
            (Some(sink), event) => sink.send(event),
        }
    }

    /// If idle, starts a background worker draining the queue beginning
    /// with `prompt`; if busy, appends `prompt` to the queue. Returns the
    /// queue depth after the operation: `0` means the prompt started
    /// immediately (or the app is closed — use [`App::is_closed`] to tell
    /// those apart). Never blocks and never emits an event synchronously.
    pub fn run(self: &Arc<Self>, prompt: impl Into<String>) -> usize {
        let prompt = prompt.into();
        let mut inner = self.lock();
        if inner.closed {
            return 0;
        }
        if inner.busy {
            inner.queue.push_back(prompt);
            return inner.queue.len();
        }
        inner.busy = true;
        let app = Arc::clone(self);
        let handle = tokio::spawn(async move {
            app.drain(prompt).await;
        });
        inner.worker = Some(handle);
        0
    }

    /// The single background drain loop: executes `prompt`, then keeps
    /// popping the queue head until it's empty or shutdown is signalled.
    /// At most one of these is ever active (the single-in-flight
    /// invariant): `run` only spawns it while transitioning busy
    /// false -> true under the mutex.
    async fn drain(self: Arc<Self>, mut prompt: String) {
        loop {
            let token = self.root_token.child_token();
            {
                let mut inner = self.lock();
                inner.cancel_step = Some(token.clone());
            }

            let history = self.store.get_all();
            let sink = {
                let app = Arc::clone(&self);
                move |ev: AppEvent| app.send_event(ev)
            };
            let _ = self.execute_step(&prompt, token, &history, &sink).await;

            {
                let mut inner = self.lock();
                inner.cancel_step = None;
            }

            let next = {
                let mut inner = self.lock();
                if inner.closed || self.root_token.is_cancelled() {
                    inner.queue.clear();
                    inner.busy = false;
                    None
                } else if let Some(next_prompt) = inner.queue.pop_front() {
                    Some((next_prompt, inner.queue.len()))
                } else {
                    inner.busy = false;
                    None
                }
            };

            match next {
                None => break,
                Some((next_prompt, remaining)) => {
                    tracing::debug!(remaining, "queue drained one step, starting next");
                    self.send_event(AppEvent::QueueUpdated { length: remaining });
                    prompt = next_prompt;
                }
            }
        }
    }

    /// Executes one agent step: subscribes to the SDK's event stream,
    /// invokes it, translates and forwards intermediate events, and
    /// applies the outcome (store replacement / usage / terminal event).
    async fn execute_step(
        &self,
        prompt: &str,
        token: CancellationToken,
        history: &[Message],
        emit: &dyn Fn(AppEvent),
    ) -> Result<TurnResult, AppError> {
        struct CancelOnDrop(CancellationToken);
        impl Drop for CancelOnDrop {
            fn drop(&mut self) {
                // Always cancelled on exit regardless of outcome, so a
                // lingering clone of this token never reports the step as
                // still live.
                self.0.cancel();
            }
        }
        let _guard = CancelOnDrop(token.clone());

        tracing::info!(prompt_len = prompt.len(), "starting agent step");
        emit(AppEvent::Spinner { show: true });

        let mut rx = self.executor.subscribe();
        let mut pending_tools: HashMap<String, (String, Value)> = HashMap::new();
        let mut streamed = false;

        let result_fut = self.executor.prompt_result(token.clone(), history, prompt);
        tokio::pin!(result_fut);

        let mut rx_open = true;
        let result = loop {
            if rx_open {
                tokio::select! {
                    biased;
                    maybe_ev = rx.recv() => {
                        match maybe_ev {
                            Some(ev) => Self::translate(ev, emit, &mut pending_tools, &mut streamed),
                            None => rx_open = false,
                        }
                    }
                    res = &mut result_fut => break res,
                }
            } else {
                break (&mut result_fut).await;
            }
        };

        let was_cancelled = token.is_cancelled();

        match result {
            Ok(turn) => {
                self.store.replace(turn.messages.clone());
                if let Some(usage) = turn.usage {
                    self.usage.record(usage);
                }
                tracing::info!("agent step completed");
                emit(AppEvent::StepComplete {
                    response_text: turn.final_text.clone(),
                });
                Ok(turn)
            }
            Err(err) => {
                if was_cancelled {
                    tracing::info!("agent step cancelled");
                    emit(AppEvent::StepCancelled);
                    Err(AppError::Cancelled)
                } else {
                    tracing::warn!(error = %err, "agent step failed");
                    emit(AppEvent::StepError {
                        message: Some(err.to_string()),
                    });
                    Err(AppError::Sdk(err))
                }
            }
        }
    }

    fn translate(
        ev: SdkEvent,
        emit: &dyn Fn(AppEvent),
        pending_tools: &mut HashMap<String, (String, Value)>,
        streamed: &mut bool,
    ) {
        match ev {
            SdkEvent::TurnStarted => {}
            SdkEvent::AssistantDelta { text } => {
                *streamed = true;
                emit(AppEvent::StreamChunk { content: text });
            }
            SdkEvent::AssistantCompleted { text } => {
                let content = if *streamed { String::new() } else { text };
                emit(AppEvent::ResponseComplete { content });
            }
            SdkEvent::ToolCallContent { text } => {
                if !*streamed {
                    emit(AppEvent::ToolCallContent { content: text });
                }
            }
            SdkEvent::ToolRequested { id, name, input } => {
                pending_tools.insert(id, (name.clone(), input.clone()));
                emit(AppEvent::ToolCallStarted {
                    name,
                    args_json: input,
                });
            }
            SdkEvent::ToolStarted { id, name } => {
                let _ = id;
                emit(AppEvent::ToolExecution {
                    name,
                    is_starting: true,
                });
            }
            SdkEvent::ToolCompleted {
                id,
                name,
                result,
                is_error,
            } => {
                let args_json = pending_tools
                    .remove(&id)
                    .map_or(Value::Null, |(_, input)| input);
                emit(AppEvent::ToolExecution {
                    name: name.clone(),
                    is_starting: false,
                });
                emit(AppEvent::ToolResult {
                    name,
                    args_json,
                    result,
                    is_error,
                });
            }
            SdkEvent::ToolApprovalNeeded {
                id,
                name,
                input,
                respond_to,
            } => {
                let _ = id;
                emit(AppEvent::ToolApprovalNeeded {
                    name,
                    args_json: input,
                    respond_to,
                });
            }
        }
    }

    /// Synchronous single-step execution without queueing or events
    /// (non-interactive mode).
    pub async fn run_once(&self, token: CancellationToken, prompt: &str) -> Result<TurnResult, AppError> {
        if self.is_closed() {
            return Err(AppError::Closed);
        }
        let history = self.store.get_all();
        self.execute_step(prompt, token, &history, &|_| {}).await
    }

    /// Synchronous execution that routes intermediate events to `on_event`
    /// rather than the UI.
    pub async fn run_once_with_display(
        &self,
        token: CancellationToken,
        prompt: &str,
        on_event: impl Fn(AppEvent) + Send + Sync,
    ) -> Result<TurnResult, AppError> {
        if self.is_closed() {
            return Err(AppError::Closed);
        }
        let history = self.store.get_all();
        self.execute_step(prompt, token, &history, &on_event).await
    }

    /// Idempotent. Sets `closed`, cancels the current step and the root
    /// token, then blocks until the background worker (if any) has exited.
    /// After this returns, no further events are emitted.
    pub async fn close(&self) {
        let (already_closed, worker, cancel_step) = {
            let mut inner = self.lock();
            let already_closed = inner.closed;
            inner.closed = true;
            (already_closed, inner.worker.take(), inner.cancel_step.clone())
        };
        if already_closed {
            if let Some(worker) = worker {
                let _ = worker.await;
            }
            return;
        }
        if let Some(token) = cancel_step {
            token.cancel();
        }
        self.root_token.cancel();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
    }

    /// Pushes a [`PromptRequest`] through the event sink and awaits the
    /// response. In non-interactive mode (`send_event`'s no-UI
    /// short-circuit) this resolves immediately to `Cancelled`.
    pub async fn request_prompt(
        &self,
        message: String,
        kind: crate::core::events::PromptKind,
    ) -> PromptResponse {
        let (tx, mut rx) = crate::core::events::response_channel();
        self.send_event(AppEvent::PromptRequest(PromptRequest {
            message,
            kind,
            respond_to: tx,
        }));
        rx.recv().await.unwrap_or(PromptResponse::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::PromptKind;
    use crate::testing::{ScriptedSdk, ScriptedTurn};

    fn collecting_sink() -> (Arc<dyn EventSink>, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn EventSink> = Arc::new(move |ev: AppEvent| {
            let _ = tx.send(ev);
        });
        (sink, rx)
    }

    #[tokio::test]
    async fn single_prompt_completes() {
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::text("hi")]);
        let app = App::new(sdk);
        let (sink, mut rx) = collecting_sink();
        app.set_event_sink(Some(sink));

        assert_eq!(app.run("hello"), 0);

        let mut saw_spinner = false;
        let mut saw_complete = false;
        while let Some(ev) = rx.recv().await {
            match ev {
                AppEvent::Spinner { show: true } => saw_spinner = true,
                AppEvent::StepComplete { response_text } => {
                    assert_eq!(response_text, "hi");
                    saw_complete = true;
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_spinner && saw_complete);
        assert_eq!(app.queue_len(), 0);
        assert_eq!(app.store().len(), 1);
    }

    #[tokio::test]
    async fn queued_prompts_preserve_order() {
        let (gate_tx, gate_rx) = mpsc::channel(1);
        let sdk = ScriptedSdk::new(vec![
            ScriptedTurn::text("A").gated(gate_rx),
            ScriptedTurn::text("B"),
            ScriptedTurn::text("C"),
        ]);
        let app = App::new(sdk);
        let (sink, mut rx) = collecting_sink();
        app.set_event_sink(Some(sink));

        assert_eq!(app.run("a"), 0);
        assert_eq!(app.run("b"), 1);
        assert_eq!(app.run("c"), 2);

        gate_tx.send(()).await.unwrap();

        let mut queue_updates = Vec::new();
        let mut completes = 0;
        while completes < 3 {
            match rx.recv().await.unwrap() {
                AppEvent::QueueUpdated { length } => queue_updates.push(length),
                AppEvent::StepComplete { .. } => completes += 1,
                _ => {}
            }
        }
        assert_eq!(queue_updates, vec![1, 0]);
    }

    #[tokio::test]
    async fn cancel_mid_step_emits_cancelled_not_error() {
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::wait_for_cancellation()]);
        let app = App::new(sdk);
        let (sink, mut rx) = collecting_sink();
        app.set_event_sink(Some(sink));

        assert_eq!(app.run("x"), 0);

        // Wait for the spinner (step has started) before cancelling.
        loop {
            if let AppEvent::Spinner { show: true } = rx.recv().await.unwrap() {
                break;
            }
        }
        app.cancel_current_step();

        loop {
            match rx.recv().await.unwrap() {
                AppEvent::StepCancelled => break,
                AppEvent::StepError { .. } => panic!("expected cancellation, got error"),
                _ => {}
            }
        }
        assert_eq!(app.store().len(), 0, "store must not change on cancel");
    }

    #[tokio::test]
    async fn shutdown_with_in_flight_step_blocks_until_drained() {
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::wait_for_cancellation()]);
        let app = App::new(sdk);
        assert_eq!(app.run("slow"), 0);
        app.close().await;
        assert!(app.is_closed());
        // Run after close is a silent no-op.
        assert_eq!(app.run("too-late"), 0);
        assert_eq!(app.queue_len(), 0);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::text("hi")]);
        let app = App::new(sdk);
        app.close().await;
        app.close().await;
        assert!(app.is_closed());
    }

    #[tokio::test]
    async fn clear_messages_resets_store() {
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::text("R")]);
        let app = App::new(sdk);
        let (sink, mut rx) = collecting_sink();
        app.set_event_sink(Some(sink));
        app.run("go");
        loop {
            if let AppEvent::StepComplete { .. } = rx.recv().await.unwrap() {
                break;
            }
        }
        assert!(app.store().len() > 0);
        app.clear_messages();
        assert_eq!(app.store().len(), 0);
    }

    #[tokio::test]
    async fn cancel_when_idle_is_a_noop() {
        let sdk = ScriptedSdk::new(vec![]);
        let app = App::new(sdk);
        app.cancel_current_step();
        assert_eq!(app.queue_len(), 0);
    }

    #[tokio::test]
    async fn clear_queue_then_length_is_zero() {
        let (gate_tx, gate_rx) = mpsc::channel(1);
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::text("a").gated(gate_rx), ScriptedTurn::text("b")]);
        let app = App::new(sdk);
        app.run("a");
        app.run("b");
        assert_eq!(app.queue_len(), 1);
        app.clear_queue();
        assert_eq!(app.queue_len(), 0);
        let _ = gate_tx.send(()).await;
        app.close().await;
    }

    #[tokio::test]
    async fn run_after_close_returns_zero_and_no_side_effects() {
        let sdk = ScriptedSdk::new(vec![]);
        let app = App::new(sdk);
        app.close().await;
        assert_eq!(app.run("anything"), 0);
        assert_eq!(app.queue_len(), 0);
        assert_eq!(app.store().len(), 0);
    }

    #[tokio::test]
    async fn non_interactive_prompt_request_resolves_cancelled() {
        let sdk = ScriptedSdk::new(vec![]);
        let app = App::new(sdk);
        let response = app
            .request_prompt("pick one".into(), PromptKind::Confirm { default: true })
            .await;
        assert_eq!(response, PromptResponse::Cancelled);
    }

    #[tokio::test]
    async fn step_error_emits_step_error_not_cancelled() {
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::error("boom")]);
        let app = App::new(sdk);
        let (sink, mut rx) = collecting_sink();
        app.set_event_sink(Some(sink));
        app.run("x");
        loop {
            match rx.recv().await.unwrap() {
                AppEvent::StepError { message } => {
                    assert_eq!(message.as_deref(), Some("boom"));
                    break;
                }
                AppEvent::StepCancelled => panic!("expected error, got cancelled"),
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn run_with_empty_prompt_is_still_enqueued() {
        // App does not inspect content; rejecting an empty prompt is the
        // UI's job, not App's.
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::text("ok")]);
        let app = App::new(sdk);
        let (sink, mut rx) = collecting_sink();
        app.set_event_sink(Some(sink));
        assert_eq!(app.run(""), 0);
        loop {
            if let AppEvent::StepComplete { .. } = rx.recv().await.unwrap() {
                break;
            }
        }
        assert_eq!(app.store().len(), 1);
    }

    #[tokio::test]
    async fn run_once_does_not_queue_or_emit() {
        let sdk = ScriptedSdk::new(vec![ScriptedTurn::text("r1")]);
        let app = App::new(sdk);
        let token = CancellationToken::new();
        let result = app.run_once(token, "hi").await.unwrap();
        assert_eq!(result.final_text, "r1");
        assert_eq!(app.queue_len(), 0);
    }
}
