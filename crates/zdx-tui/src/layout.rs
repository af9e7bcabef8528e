//! Three-region layout for the inline viewport.
//!
//! Scrollback isn't a region ratatui draws: it's printed above the viewport
//! via `Terminal::insert_before` and then lives in the terminal's own
//! history. The viewport itself holds exactly three stacked regions: the
//! live stream, a one-line separator carrying the queue badge, and the
//! input textarea.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const SEPARATOR_HEIGHT: u16 = 1;
pub const INPUT_HEIGHT: u16 = 5;

/// Rows the live stream region is allowed before older lines scroll off
/// (and get flushed to scrollback instead).
pub const DEFAULT_STREAM_HEIGHT: u16 = 6;

/// Total inline viewport height for a stream region of `stream_height` rows.
pub const fn viewport_height(stream_height: u16) -> u16 {
    stream_height + SEPARATOR_HEIGHT + INPUT_HEIGHT
}

pub struct Regions {
    pub stream: Rect,
    pub separator: Rect,
    pub input: Rect,
}

/// Splits `area` (the whole inline viewport) into its three regions.
pub fn split(area: Rect, stream_height: u16) -> Regions {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(stream_height),
            Constraint::Length(SEPARATOR_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
        ])
        .split(area);
    Regions {
        stream: chunks[0],
        separator: chunks[1],
        input: chunks[2],
    }
}
