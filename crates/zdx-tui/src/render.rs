//! View functions for the inline viewport.
//!
//! Draws into a ratatui `Frame` from `&mut AppModel`; the only mutation is
//! `StreamComponent::set_height`, applied from the actual stream region's
//! height right before reading its rendered content. Scrollback is printed
//! separately via `Terminal::insert_before`, not drawn here.

use ratatui::Frame;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::input::SLASH_COMMANDS;
use crate::layout::{self, Regions};
use crate::overlays::OverlayComponent;
use crate::state::{AppModel, Modal, Phase};

const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

pub fn render(model: &mut AppModel, frame: &mut Frame) {
    let Regions { stream, separator, input } = layout::split(frame.area(), layout::DEFAULT_STREAM_HEIGHT);

    render_stream(model, frame, stream);
    render_separator(model, frame, separator);
    match &model.modal {
        Some(modal) => render_modal(modal, frame, input),
        None => render_input(model, frame, input),
    }
}

/// Clamps the stream to `area`'s height before reading it, so overflowing
/// text is head-truncated (tail stays visible) rather than clipped from the
/// bottom by ratatui's own `Paragraph` rendering. One row is reserved for
/// the spinner line while active, since that's appended after the clamp.
fn render_stream(model: &mut AppModel, frame: &mut Frame, area: ratatui::layout::Rect) {
    let reserved_for_spinner = u16::from(model.stream.is_active());
    model.stream.set_height(area.height.saturating_sub(reserved_for_spinner) as usize);

    let mut lines: Vec<Line> = model
        .stream
        .get_rendered_content()
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect();

    if model.stream.is_active() {
        let idx = (model.stream.spinner_frame() as usize / 4) % SPINNER_FRAMES.len();
        let spinner = SPINNER_FRAMES[idx];
        let label = model.stream.spinner_label().unwrap_or("Working…");
        lines.push(Line::from(vec![
            Span::styled(spinner, Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(label, Style::default().fg(Color::Cyan)),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, area);
}

fn render_separator(model: &AppModel, frame: &mut Frame, area: ratatui::layout::Rect) {
    let line = if model.canceling {
        Line::from(Span::styled(
            "press esc again to cancel",
            Style::default().fg(Color::Yellow),
        ))
    } else if model.queue_len > 0 {
        Line::from(Span::styled(
            format!("{} queued", model.queue_len),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(Span::styled(
            "─".repeat(area.width as usize),
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(model: &AppModel, frame: &mut Frame, area: ratatui::layout::Rect) {
    let matches_visible = model.input.popup_open();
    let input_height = if matches_visible {
        area.height.saturating_sub(SLASH_COMMANDS.len() as u16 + 1)
    } else {
        area.height
    };
    let chunks = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            ratatui::layout::Constraint::Length(input_height),
            ratatui::layout::Constraint::Min(0),
        ])
        .split(area);

    let text = model.input.text();
    let placeholder_style = Style::default().fg(Color::DarkGray);
    let paragraph = if text.is_empty() {
        Paragraph::new(Span::styled("Type a message…", placeholder_style))
    } else {
        Paragraph::new(text)
    };
    frame.render_widget(
        paragraph.block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(Color::DarkGray))),
        chunks[0],
    );

    if matches_visible {
        let lines: Vec<Line> = SLASH_COMMANDS
            .iter()
            .map(|cmd| Line::from(format!("/{} — {}", cmd.name, cmd.description)))
            .collect();
        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }
}

fn render_modal(modal: &Modal, frame: &mut Frame, area: ratatui::layout::Rect) {
    let (title, body): (String, Line) = match modal {
        Modal::Approval { component, .. } => {
            let title = format!("Allow {} to run?", component.tool_name);
            let yes_style = if component.highlighted_yes() {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::Green)
            };
            let no_style = if component.highlighted_yes() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Black).bg(Color::Red)
            };
            let body = Line::from(vec![
                Span::styled(" Yes ", yes_style),
                Span::raw("  "),
                Span::styled(" No ", no_style),
            ]);
            (title, body)
        }
        Modal::Prompt { message, component, .. } => (message.clone(), overlay_body(component)),
        Modal::Overlay { component, .. } => (component.title().to_string(), overlay_body(component)),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(body).block(block), area);
}

fn overlay_body(component: &OverlayComponent) -> Line<'static> {
    match component {
        OverlayComponent::Select(select) => {
            let spans: Vec<Span> = select
                .options
                .iter()
                .enumerate()
                .map(|(idx, option)| {
                    if idx == select.selected {
                        Span::styled(format!("> {option} "), Style::default().fg(Color::Cyan))
                    } else {
                        Span::raw(format!("  {option} "))
                    }
                })
                .collect();
            Line::from(spans)
        }
        OverlayComponent::Confirm(confirm) => Line::from(Span::raw(confirm.title.clone())),
        OverlayComponent::Text(text) => {
            let shown = if text.buffer.is_empty() {
                text.placeholder.clone().unwrap_or_default()
            } else {
                text.buffer.text()
            };
            Line::from(Span::raw(shown))
        }
    }
}

pub fn phase_label(model: &AppModel) -> &'static str {
    match model.phase {
        Phase::Input => "input",
        Phase::Working => "working",
    }
}
