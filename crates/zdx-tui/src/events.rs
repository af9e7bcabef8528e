//! Events the TUI runtime feeds into the reducer.

use zdx_core::AppEvent;

/// Events consumed by `update`. Wraps terminal input, the animation tick,
/// and App-originated events into one taxonomy the reducer switches on.
pub enum UiEvent {
    /// Animation/timer tick (~14fps while active, slower while idle).
    Tick,
    Terminal(crossterm::event::Event),
    App(AppEvent),
}
