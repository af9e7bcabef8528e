//! Token usage accounting (best-effort, never surfaced as an error).

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Token counters for a single turn or an accumulated session total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub cache_creation_input_tokens: u64,
}

impl Usage {
    pub fn add(&mut self, other: Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cache_read_input_tokens += other.cache_read_input_tokens;
        self.cache_creation_input_tokens += other.cache_creation_input_tokens;
    }
}

/// Accumulates [`Usage`] across a session.
///
/// Recording is infallible by construction: there is nothing to fail.
/// Callers that have no real token counts simply record a zeroed or
/// estimated `Usage` rather than propagating an error.
#[derive(Default)]
pub struct UsageTracker {
    total: Mutex<Usage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: Usage) {
        let mut total = self.total.lock().expect("usage tracker lock poisoned");
        total.add(usage);
    }

    pub fn total(&self) -> Usage {
        *self.total.lock().expect("usage tracker lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_turns() {
        let tracker = UsageTracker::new();
        tracker.record(Usage {
            input_tokens: 10,
            output_tokens: 5,
            ..Default::default()
        });
        tracker.record(Usage {
            input_tokens: 3,
            output_tokens: 7,
            cache_read_input_tokens: 1,
            cache_creation_input_tokens: 0,
        });
        let total = tracker.total();
        assert_eq!(total.input_tokens, 13);
        assert_eq!(total.output_tokens, 12);
        assert_eq!(total.cache_read_input_tokens, 1);
    }
}
