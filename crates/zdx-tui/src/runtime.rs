//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here; `update` stays pure and only produces
//! `UiEffect`s. `App` runs on the ambient tokio runtime (spawned via
//! `App::run`'s background worker); this loop drives crossterm input with a
//! blocking poll and drains an inbox of forwarded `AppEvent`s each pass.

use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use tokio::sync::mpsc;
use zdx_core::{App, AppEvent, PromptExecutor};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppModel, ScrollbackEntry};
use crate::{layout, render, terminal, update};

/// Tick cadence while the stream is animating.
pub const ACTIVE_TICK: Duration = Duration::from_millis(1000 / 14);
/// Tick cadence while idle, to keep CPU usage low.
pub const IDLE_TICK: Duration = Duration::from_millis(150);

pub struct TuiRuntime<S: PromptExecutor> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<App<S>>,
    model: AppModel,
    inbox_rx: mpsc::UnboundedReceiver<AppEvent>,
    printed: usize,
    last_tick: Instant,
}

impl<S: PromptExecutor + Send + Sync + 'static> TuiRuntime<S> {
    pub fn new(app: Arc<App<S>>) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal =
            terminal::setup_terminal(layout::viewport_height(layout::DEFAULT_STREAM_HEIGHT)).context("setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn zdx_core::EventSink> = Arc::new(move |ev: AppEvent| {
            let _ = inbox_tx.send(ev);
        });
        app.set_event_sink(Some(sink));

        Ok(Self {
            terminal,
            app,
            model: AppModel::new(),
            inbox_rx,
            printed: 0,
            last_tick: Instant::now(),
        })
    }

    /// Runs the event loop until `/quit`, Ctrl+C, or an unrecoverable error.
    /// Restores the terminal (via `Drop`) and closes `App` on the way out.
    pub async fn run(mut self) -> Result<()> {
        let mut dirty = true;
        while !self.model.should_quit {
            let mut events = Vec::new();
            self.drain_inbox(&mut events);

            let tick_interval = if self.model.stream.is_active() || self.model.canceling {
                ACTIVE_TICK
            } else {
                IDLE_TICK
            };
            let wait = tick_interval.saturating_sub(self.last_tick.elapsed());
            let poll_for = if events.is_empty() { wait } else { Duration::ZERO };

            if event::poll(poll_for).context("poll terminal events")? {
                events.push(UiEvent::Terminal(event::read().context("read terminal event")?));
                while event::poll(Duration::ZERO)? {
                    events.push(UiEvent::Terminal(event::read()?));
                }
            }
            if self.last_tick.elapsed() >= tick_interval {
                events.push(UiEvent::Tick);
                self.last_tick = Instant::now();
                dirty = true;
            }

            for event in events {
                if matches!(event, UiEvent::Terminal(_)) {
                    dirty = true;
                }
                let effects = update::update(&mut self.model, event);
                for effect in effects {
                    self.execute_effect(effect);
                }
            }

            self.flush_scrollback()?;

            if dirty {
                self.terminal.draw(|frame| render::render(&mut self.model, frame))?;
                dirty = false;
            }
        }

        self.flush_scrollback()?;
        self.app.close().await;
        Ok(())
    }

    fn drain_inbox(&mut self, events: &mut Vec<UiEvent>) {
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(UiEvent::App(ev));
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => self.model.should_quit = true,
            UiEffect::Submit(text) => {
                let depth = self.app.run(text);
                self.model.queue_len = depth;
            }
            UiEffect::CancelStep => self.app.cancel_current_step(),
            UiEffect::ClearMessages => self.app.clear_messages(),
            UiEffect::ClearQueue => {
                self.app.clear_queue();
                self.model.queue_len = 0;
            }
            UiEffect::RespondApproval { respond_to, approved } => {
                let _ = respond_to.try_send(approved);
            }
            UiEffect::RespondPrompt { respond_to, response } => {
                let _ = respond_to.try_send(response);
            }
        }
    }

    /// Writes any scrollback entries added since the last flush above the
    /// live viewport, via `Terminal::insert_before`. This is the `Println`
    /// primitive the layout contract calls for: the terminal's own history
    /// owns everything printed here, not ratatui.
    fn flush_scrollback(&mut self) -> Result<()> {
        while self.printed < self.model.scrollback.len() {
            let entry = &self.model.scrollback[self.printed];
            let lines = scrollback_lines(entry);
            let height = lines.len() as u16;
            self.terminal.insert_before(height, |buf| {
                let paragraph = ratatui::widgets::Paragraph::new(lines.clone());
                ratatui::widgets::Widget::render(paragraph, buf.area, buf);
            })?;
            self.printed += 1;
        }
        Ok(())
    }
}

impl<S: PromptExecutor> Drop for TuiRuntime<S> {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

fn scrollback_lines(entry: &ScrollbackEntry) -> Vec<Line<'static>> {
    match entry {
        ScrollbackEntry::User(text) => text
            .lines()
            .enumerate()
            .map(|(i, line)| {
                let prefix = if i == 0 { "> " } else { "  " };
                Line::styled(format!("{prefix}{line}"), Style::default().fg(Color::White))
            })
            .collect(),
        ScrollbackEntry::Assistant(text) => text.lines().map(|line| Line::raw(line.to_string())).collect(),
        ScrollbackEntry::ToolCall { name, args_json } => {
            vec![Line::styled(format!("→ {name}({args_json})"), Style::default().fg(Color::DarkGray))]
        }
        ScrollbackEntry::ToolResult { name, result, is_error } => {
            let marker = if *is_error { "✗" } else { "✓" };
            let color = if *is_error { Color::Red } else { Color::Green };
            vec![Line::styled(format!("{marker} {name}: {result}"), Style::default().fg(color))]
        }
        ScrollbackEntry::System(text) => vec![Line::styled(text.clone(), Style::default().fg(Color::DarkGray))],
        ScrollbackEntry::Error(text) => vec![Line::styled(format!("error: {text}"), Style::default().fg(Color::Red))],
    }
}
