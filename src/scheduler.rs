//! Virtual-clock task queue.
//!
//! Holds at most one debounce timer per unit plus zero-delay deferred
//! evaluations. Tasks due at the same instant run in the order they were
//! scheduled. Canceling removes the entry, so a canceled timer can never fire.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::state::DebounceState;
use crate::types::{TargetId, UnitId};

/// Key of a scheduled task: due time, then scheduling sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TimerId {
    pub at: Duration,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
    /// Quiet period elapsed; evaluate using the unit's last changed target.
    Tick(UnitId),
    /// Evaluation deferred from a paste on `TargetId`.
    Deferred(UnitId, TargetId),
}

impl Task {
    fn unit(&self) -> UnitId {
        match *self {
            Task::Tick(unit) | Task::Deferred(unit, _) => unit,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<TimerId, Task>,
}

impl Scheduler {
    pub fn starting_at(now: Duration) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, at: Duration, task: Task) -> TimerId {
        let id = TimerId {
            at,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.insert(id, task);
        id
    }

    /// Replace the unit's debounce timer with one due `frequency` from now.
    /// A zero frequency only cancels.
    pub fn arm(&mut self, unit: UnitId, state: &mut DebounceState, frequency: Duration) {
        self.cancel(state);
        if !frequency.is_zero() {
            let at = self.now.saturating_add(frequency);
            state.pending_timer = Some(self.schedule(at, Task::Tick(unit)));
        }
    }

    pub fn cancel(&mut self, state: &mut DebounceState) {
        if let Some(id) = state.pending_timer.take() {
            self.queue.remove(&id);
        }
    }

    /// Queue an evaluation for the next turn.
    pub fn defer(&mut self, unit: UnitId, target: TargetId) -> TimerId {
        self.schedule(self.now, Task::Deferred(unit, target))
    }

    /// Drop every task belonging to `unit`, timers and deferred work alike.
    pub fn forget(&mut self, unit: UnitId) {
        self.queue.retain(|_, task| task.unit() != unit);
    }

    /// Pop the earliest task due at or before `until`, moving the clock to it.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Task)> {
        let (&id, _) = self.queue.first_key_value()?;
        if id.at > until {
            return None;
        }
        let task = self.queue.remove(&id)?;
        self.now = self.now.max(id.at);
        Some((id, task))
    }

    /// Move the clock forward without running anything.
    pub fn settle_clock(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.first_key_value().map(|(id, _)| id.at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_for(&self, unit: UnitId) -> usize {
        self.queue.values().filter(|task| task.unit() == unit).count()
    }
}
