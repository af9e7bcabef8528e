//! Error taxonomy for the App orchestrator.
//!
//! Hand-rolled, not `thiserror` — matches `core::interrupt::InterruptedError`,
//! which implements `Display`/`Error` directly rather than deriving them.

use std::fmt;

/// Errors an `App` method can return synchronously to a caller.
///
/// Most failure modes in this system surface asynchronously as events (see
/// [`crate::core::events::AppEvent`]) rather than as a `Result` here;
/// `AppError` is reserved for the handful of operations that fail
/// synchronously (`run_once`, and non-queueable operations called while
/// busy).
#[derive(Debug)]
pub enum AppError {
    /// The SDK returned an error that was not a cancellation.
    Sdk(anyhow::Error),
    /// The per-step token was cancelled before the SDK returned.
    Cancelled,
    /// `App::close()` has already been called; the operation was dropped.
    Closed,
    /// A non-queueable operation was attempted while a step is in flight.
    Busy,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Sdk(err) => write!(f, "SDK error: {err}"),
            AppError::Cancelled => write!(f, "step cancelled"),
            AppError::Closed => write!(f, "app is closed"),
            AppError::Busy => write!(f, "agent is busy"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Sdk(err) => Some(err.as_ref()),
            AppError::Cancelled | AppError::Closed | AppError::Busy => None,
        }
    }
}
