//! Oracle usage accounting, shared across workers.

use std::sync::Mutex;

/// Point-in-time usage totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub calls: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub failures: u64,
}

/// Thread-safe call and token counter for the AI oracle
#[derive(Debug, Default)]
pub struct UsageTracker {
    inner: Mutex<UsageSnapshot>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful oracle call and its token cost
    pub fn record(&self, prompt_tokens: u64, completion_tokens: u64) {
        let mut inner = self.inner.lock().expect("usage lock poisoned");
        inner.calls += 1;
        inner.prompt_tokens += prompt_tokens;
        inner.completion_tokens += completion_tokens;
    }

    /// Record one failed oracle call
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("usage lock poisoned");
        inner.calls += 1;
        inner.failures += 1;
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        *self.inner.lock().expect("usage lock poisoned")
    }

    pub fn reset(&self) {
        *self.inner.lock().expect("usage lock poisoned") = UsageSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_accumulate() {
        let tracker = UsageTracker::new();
        tracker.record(100, 20);
        tracker.record(50, 10);
        tracker.record_failure();

        let snap = tracker.snapshot();
        assert_eq!(snap.calls, 3);
        assert_eq!(snap.prompt_tokens, 150);
        assert_eq!(snap.completion_tokens, 30);
        assert_eq!(snap.failures, 1);
    }

    #[test]
    fn reset_clears_totals() {
        let tracker = UsageTracker::new();
        tracker.record(1, 1);
        tracker.reset();
        assert_eq!(tracker.snapshot(), UsageSnapshot::default());
    }
}
