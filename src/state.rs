//! Per-unit debounce state and the settle decision.

use crate::options::Settings;
use crate::scheduler::TimerId;
use crate::types::TargetId;

/// Mutable record owned by exactly one monitoring unit.
#[derive(Debug, Clone, Default)]
pub(crate) struct DebounceState {
    /// A signal arrived since the last notification (or init counted as one).
    pub dirty: bool,
    pub last_notified: Option<String>,
    pub last_changed: Option<TargetId>,
    pub pending_timer: Option<TimerId>,
    pub evaluations: u64,
    pub notifications: u64,
}

/// Outcome of the pure part of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Notify,
    Unchanged,
    Empty,
}

impl DebounceState {
    pub fn new(last_changed: Option<TargetId>, dirty: bool) -> Self {
        Self {
            dirty,
            last_changed,
            ..Self::default()
        }
    }

    /// Record a signal from `target`.
    pub fn mark(&mut self, target: TargetId) {
        self.dirty = true;
        self.last_changed = Some(target);
    }

    /// Decide whether `value` (already trimmed) settles, committing the
    /// notification state when it does. The caller emits on `Notify`.
    pub fn settle(&mut self, value: &str, settings: &Settings) -> Verdict {
        self.evaluations += 1;

        if !self.dirty || self.last_notified.as_deref() == Some(value) {
            return Verdict::Unchanged;
        }
        if value.is_empty() && !settings.empty_value_triggers {
            return Verdict::Empty;
        }

        self.last_notified = Some(value.to_string());
        self.dirty = false;
        self.notifications += 1;
        Verdict::Notify
    }
}

/// Leading/trailing whitespace removal applied before every comparison.
pub(crate) fn normalize(raw: &str) -> &str {
    raw.trim()
}
