//! TUI reducer.
//!
//! All state mutations happen here. The runtime calls `update(model, event)`
//! and executes the returned effects; `update` never touches the terminal or
//! `App` directly.

use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use zdx_core::{AppEvent, PromptKind, PromptResponse};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::input::InputOutcome;
use crate::overlays::{ConfirmOverlay, OverlayComponent, SelectOverlay, TextOverlay};
use crate::state::{AppModel, Modal, Phase, ScrollbackEntry};

pub fn update(model: &mut AppModel, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            model.stream.tick();
            model.expire_cancel_gesture_if_due(Instant::now());
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(model, term_event),
        UiEvent::App(app_event) => handle_app_event(model, app_event),
    }
}

fn handle_terminal_event(model: &mut AppModel, event: Event) -> Vec<UiEffect> {
    let Event::Key(key) = event else {
        return vec![];
    };
    // Ctrl+C always terminates, regardless of phase or modal.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        model.should_quit = true;
        return vec![UiEffect::Quit];
    }

    if model.modal.is_some() {
        return handle_modal_key(model, key);
    }

    match model.phase {
        Phase::Input => handle_input_phase_key(model, key),
        Phase::Working => handle_working_phase_key(model, key),
    }
}

fn handle_modal_key(model: &mut AppModel, key: KeyEvent) -> Vec<UiEffect> {
    let Some(modal) = model.modal.as_mut() else {
        return vec![];
    };
    match modal {
        Modal::Approval { component, .. } => {
            let Some(approved) = component.handle_key(key) else {
                return vec![];
            };
            let Some(Modal::Approval { respond_to, .. }) = model.modal.take() else {
                unreachable!()
            };
            model.phase = Phase::Working;
            vec![UiEffect::RespondApproval { respond_to, approved }]
        }
        Modal::Prompt { component, .. } | Modal::Overlay { component, .. } => {
            let Some(response) = component.handle_key(key) else {
                return vec![];
            };
            let modal = model.modal.take().unwrap();
            model.phase = Phase::Working;
            let respond_to = match modal {
                Modal::Prompt { respond_to, .. } | Modal::Overlay { respond_to, .. } => respond_to,
                Modal::Approval { .. } => unreachable!(),
            };
            vec![UiEffect::RespondPrompt { respond_to, response }]
        }
    }
}

/// Editing keys shared by both phases: the textarea stays live while
/// `Working` per spec.md §4.3 ("Input remains editable for queueing
/// further prompts"), so this is reached from both `Phase::Input` and
/// `Phase::Working` (the latter after `handle_working_phase_key` has
/// handled ESC itself).
fn handle_input_phase_key(model: &mut AppModel, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            model.input.insert_newline();
            vec![]
        }
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            model.input.insert_newline();
            vec![]
        }
        KeyCode::Enter => match model.input.enter() {
            InputOutcome::Handled => vec![],
            InputOutcome::Submit(text) => submit(model, text),
        },
        KeyCode::Backspace => {
            model.input.backspace();
            vec![]
        }
        KeyCode::Up => {
            model.input.popup_move(false);
            vec![]
        }
        KeyCode::Down => {
            model.input.popup_move(true);
            vec![]
        }
        KeyCode::Char(ch) => {
            model.input.insert_char(ch);
            vec![]
        }
        _ => vec![],
    }
}

/// While `Working`, ESC drives the two-stage cancel gesture; every other
/// key still reaches the textarea so the user can type and queue further
/// prompts while a step is in flight.
fn handle_working_phase_key(model: &mut AppModel, key: KeyEvent) -> Vec<UiEffect> {
    if key.code != KeyCode::Esc {
        return handle_input_phase_key(model, key);
    }
    if model.canceling {
        model.clear_cancel_gesture();
        vec![UiEffect::CancelStep]
    } else {
        model.start_cancel_gesture(Instant::now());
        vec![]
    }
}

/// `/quit` and `/clear` are special-cased to effects the runtime must act on
/// before App ever sees the text. `/clear-queue` is likewise special-cased to
/// `ClearQueue` rather than forwarded as a generic prompt, since a literal
/// `/clear-queue` string has no meaning to `App::run`. Anything else
/// (including unrecognized slash input) is submitted as a normal prompt:
/// staged straight to scrollback when starting immediately from `Input`, or
/// held in `pending_queue` (per spec.md §4.3 "Queued user messages") when
/// submitted while already `Working`, to be committed to scrollback once its
/// own step starts.
fn submit(model: &mut AppModel, text: String) -> Vec<UiEffect> {
    match text.as_str() {
        "/quit" => {
            model.should_quit = true;
            vec![UiEffect::Quit]
        }
        "/clear" => {
            model.scrollback.clear();
            vec![UiEffect::ClearMessages]
        }
        "/clear-queue" => {
            model.pending_queue.clear();
            vec![UiEffect::ClearQueue]
        }
        _ if model.phase == Phase::Working => {
            model.pending_queue.push_back(text.clone());
            vec![UiEffect::Submit(text)]
        }
        _ => {
            model.scrollback.push(ScrollbackEntry::User(text.clone()));
            model.phase = Phase::Working;
            model.stream.reset();
            model.streamed_this_step = false;
            vec![UiEffect::Submit(text)]
        }
    }
}

fn handle_app_event(model: &mut AppModel, event: AppEvent) -> Vec<UiEffect> {
    match event {
        AppEvent::Spinner { show } => {
            if show {
                model.stream.show_spinner();
                // Drives Input -> Working for a queued step's own start
                // (spec.md §4.3: "Input | SpinnerEvent{true} (next queued
                // step) | Working"); a no-op when already Working.
                model.phase = Phase::Working;
            }
            vec![]
        }
        AppEvent::StreamChunk { content } => {
            model.stream.push_chunk(&content);
            model.streamed_this_step = true;
            vec![]
        }
        AppEvent::ToolCallStarted { name, args_json } => {
            flush_stream(model);
            model.scrollback.push(ScrollbackEntry::ToolCall { name, args_json });
            vec![]
        }
        AppEvent::ToolExecution { name, is_starting } => {
            model.stream.set_tool_execution(&name, is_starting);
            vec![]
        }
        AppEvent::ToolResult {
            name,
            args_json: _,
            result,
            is_error,
        } => {
            model.scrollback.push(ScrollbackEntry::ToolResult { name, result, is_error });
            // Re-arm the spinner for the next LLM turn: `ToolCallStarted`
            // flushed and reset the stream to Idle, so without this the
            // live region would show no progress indicator for the rest
            // of the step.
            model.stream.show_spinner();
            vec![]
        }
        AppEvent::ToolCallContent { content } => {
            if !model.streamed_this_step {
                model.stream.push_chunk(&content);
            }
            vec![]
        }
        AppEvent::ResponseComplete { content } => {
            if !model.streamed_this_step && !content.is_empty() {
                model.stream.push_chunk(&content);
            }
            vec![]
        }
        AppEvent::StepComplete { response_text } => {
            flush_stream_with_fallback(model, response_text);
            end_step(model);
            vec![]
        }
        AppEvent::StepError { message } => {
            flush_stream(model);
            if let Some(message) = message {
                model.scrollback.push(ScrollbackEntry::Error(message));
            }
            end_step(model);
            vec![]
        }
        AppEvent::StepCancelled => {
            flush_stream(model);
            model.scrollback.push(ScrollbackEntry::System("cancelled".into()));
            end_step(model);
            vec![]
        }
        AppEvent::QueueUpdated { length } => {
            model.queue_len = length;
            if let Some(text) = model.pending_queue.pop_front() {
                model.scrollback.push(ScrollbackEntry::User(text));
            }
            vec![]
        }
        AppEvent::ToolApprovalNeeded { name, args_json, respond_to } => {
            model.modal = Some(Modal::Approval {
                component: crate::approval::ApprovalComponent::new(name, args_json),
                respond_to,
            });
            vec![]
        }
        AppEvent::PromptRequest(request) => {
            model.modal = Some(Modal::Prompt {
                message: request.message.clone(),
                component: overlay_component_for(request.message, request.kind),
                respond_to: request.respond_to,
            });
            vec![]
        }
        AppEvent::OverlayRequest(request) => {
            model.modal = Some(Modal::Overlay {
                component: overlay_component_for(request.title, request.kind),
                respond_to: request.respond_to,
            });
            vec![]
        }
    }
}

fn overlay_component_for(title: String, kind: PromptKind) -> OverlayComponent {
    match kind {
        PromptKind::Select { options } => OverlayComponent::Select(SelectOverlay::new(title, options)),
        PromptKind::Confirm { default } => OverlayComponent::Confirm(ConfirmOverlay::new(title, default)),
        PromptKind::Text { placeholder } => OverlayComponent::Text(TextOverlay::new(title, placeholder)),
    }
}

fn flush_stream(model: &mut AppModel) {
    let content = model.stream.get_rendered_content();
    if !content.is_empty() {
        model.scrollback.push(ScrollbackEntry::Assistant(content));
    }
    model.stream.reset();
}

/// Flushes accumulated stream content, falling back to `response_text` when
/// nothing was streamed (a provider that only returns a final response).
fn flush_stream_with_fallback(model: &mut AppModel, response_text: String) {
    let content = model.stream.get_rendered_content();
    model.stream.reset();
    if !content.is_empty() {
        model.scrollback.push(ScrollbackEntry::Assistant(content));
    } else if !response_text.is_empty() {
        model.scrollback.push(ScrollbackEntry::Assistant(response_text));
    }
}

/// Always returns to `Input`, even when the queue is non-empty: spec.md
/// §4.3's transition table sends `Working` to `Input` on every terminal
/// step event unconditionally. The next queued prompt's own `SpinnerEvent{true}`
/// (which `QueueUpdatedEvent` is always emitted before, per spec.md §5)
/// drives the transition back to `Working`.
fn end_step(model: &mut AppModel) {
    model.streamed_this_step = false;
    model.phase = Phase::Input;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zdx_core::response_channel;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(model: &mut AppModel, text: &str) {
        for ch in text.chars() {
            update(model, UiEvent::Terminal(Event::Key(key(KeyCode::Char(ch)))));
        }
    }

    #[test]
    fn submitting_text_transitions_to_working_and_stages_scrollback() {
        let mut model = AppModel::new();
        type_text(&mut model, "hello");
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Enter))));
        assert!(matches!(effects.as_slice(), [UiEffect::Submit(text)] if text == "hello"));
        assert_eq!(model.phase, Phase::Working);
        assert_eq!(model.scrollback, vec![ScrollbackEntry::User("hello".into())]);
    }

    #[test]
    fn slash_quit_emits_quit_effect_directly() {
        let mut model = AppModel::new();
        type_text(&mut model, "/quit");
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Enter))));
        assert!(matches!(effects.as_slice(), [UiEffect::Quit]));
        assert!(model.should_quit);
    }

    #[test]
    fn slash_clear_queue_clears_pending_and_emits_clear_queue() {
        let mut model = AppModel::new();
        model.pending_queue.push_back("queued".into());
        type_text(&mut model, "/clear-queue");
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Enter))));
        assert!(matches!(effects.as_slice(), [UiEffect::ClearQueue]));
        assert!(model.pending_queue.is_empty());
    }

    #[test]
    fn first_esc_while_working_only_arms_the_gesture() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Esc))));
        assert!(effects.is_empty());
        assert!(model.canceling);
    }

    #[test]
    fn second_esc_within_window_cancels() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Esc))));
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Esc))));
        assert!(matches!(effects.as_slice(), [UiEffect::CancelStep]));
        assert!(!model.canceling);
    }

    #[test]
    fn esc_input_phase_is_a_noop() {
        let mut model = AppModel::new();
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Esc))));
        assert!(effects.is_empty());
        assert!(!model.canceling);
    }

    #[test]
    fn ctrl_c_always_quits_even_mid_modal() {
        let (tx, _rx) = response_channel::<bool>();
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        model.modal = Some(Modal::Approval {
            component: crate::approval::ApprovalComponent::new("bash".into(), json!({})),
            respond_to: tx,
        });
        let mut ctrl_c = key(KeyCode::Char('c'));
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(ctrl_c)));
        assert!(matches!(effects.as_slice(), [UiEffect::Quit]));
    }

    #[test]
    fn approval_modal_routes_key_and_returns_to_working() {
        let (tx, _rx) = response_channel::<bool>();
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        model.modal = Some(Modal::Approval {
            component: crate::approval::ApprovalComponent::new("bash".into(), json!({})),
            respond_to: tx,
        });
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Char('y')))));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::RespondApproval { approved: true, .. }]
        ));
        assert!(model.modal.is_none());
        assert_eq!(model.phase, Phase::Working);
    }

    #[test]
    fn step_complete_flushes_stream_and_returns_to_input_when_queue_empty() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        model.stream.push_chunk("hi there");
        update(
            &mut model,
            UiEvent::App(AppEvent::StepComplete { response_text: String::new() }),
        );
        assert_eq!(model.phase, Phase::Input);
        assert_eq!(model.scrollback, vec![ScrollbackEntry::Assistant("hi there".into())]);
    }

    #[test]
    fn step_complete_returns_to_input_even_when_queue_nonempty() {
        // spec.md §8 Testable Property #8 requires every terminal step
        // event to end in Input unconditionally; the next queued step's
        // own SpinnerEvent{true} is what drives back to Working.
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        model.queue_len = 1;
        update(
            &mut model,
            UiEvent::App(AppEvent::StepComplete { response_text: "done".into() }),
        );
        assert_eq!(model.phase, Phase::Input);

        update(&mut model, UiEvent::App(AppEvent::Spinner { show: true }));
        assert_eq!(model.phase, Phase::Working);
    }

    #[test]
    fn queue_updated_pops_pending_into_scrollback() {
        let mut model = AppModel::new();
        model.pending_queue.push_back("second prompt".into());
        update(&mut model, UiEvent::App(AppEvent::QueueUpdated { length: 0 }));
        assert_eq!(model.queue_len, 0);
        assert_eq!(model.scrollback, vec![ScrollbackEntry::User("second prompt".into())]);
        assert!(model.pending_queue.is_empty());
    }

    #[test]
    fn tool_call_content_is_ignored_when_already_streamed() {
        let mut model = AppModel::new();
        model.streamed_this_step = true;
        update(&mut model, UiEvent::App(AppEvent::ToolCallContent { content: "dup".into() }));
        assert_eq!(model.stream.get_rendered_content(), "");
    }

    #[test]
    fn step_error_with_message_pushes_error_entry() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        update(
            &mut model,
            UiEvent::App(AppEvent::StepError { message: Some("boom".into()) }),
        );
        assert_eq!(model.scrollback, vec![ScrollbackEntry::Error("boom".into())]);
        assert_eq!(model.phase, Phase::Input);
    }

    #[test]
    fn step_cancelled_pushes_system_entry_not_error() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        update(&mut model, UiEvent::App(AppEvent::StepCancelled));
        assert_eq!(model.scrollback, vec![ScrollbackEntry::System("cancelled".into())]);
    }

    #[test]
    fn typing_while_working_reaches_the_textarea() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        type_text(&mut model, "another prompt");
        assert_eq!(model.input.text(), "another prompt");
        assert_eq!(model.phase, Phase::Working);
    }

    #[test]
    fn submitting_while_working_queues_instead_of_scrollback() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        type_text(&mut model, "queued prompt");
        let effects = update(&mut model, UiEvent::Terminal(Event::Key(key(KeyCode::Enter))));
        assert!(matches!(effects.as_slice(), [UiEffect::Submit(text)] if text == "queued prompt"));
        assert_eq!(model.pending_queue, vec!["queued prompt".to_string()]);
        assert!(model.scrollback.is_empty());
        assert_eq!(model.phase, Phase::Working);
    }

    #[test]
    fn tool_result_rearms_the_spinner() {
        let mut model = AppModel::new();
        model.phase = Phase::Working;
        update(
            &mut model,
            UiEvent::App(AppEvent::ToolCallStarted { name: "bash".into(), args_json: json!({}) }),
        );
        assert!(!model.stream.is_active());
        update(
            &mut model,
            UiEvent::App(AppEvent::ToolResult {
                name: "bash".into(),
                args_json: json!({}),
                result: "ok".into(),
                is_error: false,
            }),
        );
        assert!(model.stream.is_active());
    }
}
