//! Process-wide Ctrl+C handling.
//!
//! `App`'s own cancellation is per-step (a [`tokio_util::sync::CancellationToken`]
//! derived from a root token, see [`super::agent`]). This module only bridges
//! the OS signal into that root token: one Ctrl+C cancels the current step
//! (and, in one-shot mode with no step running, the whole process); a second
//! Ctrl+C force-exits immediately since that is not meant to be debounced the
//! way the TUI's two-stage ESC gesture is.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static RESTORE_HOOK: OnceLock<Box<dyn Fn() + Send + Sync>> = OnceLock::new();

#[derive(Debug)]
pub struct InterruptedError;

impl std::fmt::Display for InterruptedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "interrupted")
    }
}

impl std::error::Error for InterruptedError {}

/// Installs the Ctrl+C handler, wiring it to cancel `token` (typically an
/// `App`'s root token). A second Ctrl+C force-exits, restoring the terminal
/// first if a hook was registered via [`set_restore_hook`].
///
/// # Panics
/// Panics if a Ctrl+C handler is already registered for this process.
pub fn init(token: CancellationToken) {
    ctrlc::set_handler(move || {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            if let Some(hook) = RESTORE_HOOK.get() {
                hook();
            }
            std::process::exit(130);
        }
        token.cancel();
    })
    .expect("error setting Ctrl+C handler");
}

/// `true` once the first Ctrl+C has been observed.
pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Registers a restore hook called on the second Ctrl+C before exit.
/// Typically used by the TUI to restore terminal state.
pub fn set_restore_hook<F>(hook: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let _ = RESTORE_HOOK.set(Box::new(hook));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_interrupted_initially() {
        // INTERRUPTED is process-global; only assert it has a stable read,
        // not a specific value (another test in this binary may have
        // already flipped it).
        let _ = is_interrupted();
    }
}
