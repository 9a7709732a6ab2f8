use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

/// Opaque identity of a monitored target.
///
/// Hosts pick the numbering; the engine only compares and hashes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Identity of one monitoring unit inside an [`Engine`](crate::Engine).
///
/// Ids are never reused, so a stale id simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub(crate) u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Returned by `attach`; names every unit created by that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub(crate) u64);

/// What the engine did with a delivered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The target is not monitored; nothing changed.
    Ignored,
    /// The unit was marked dirty, no evaluation ran.
    Marked,
    /// The unit was marked dirty and an evaluation was queued for the next turn.
    Deferred,
    /// The unit was marked dirty and evaluated immediately.
    Evaluated(Evaluation),
}

/// Result of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The consumer was notified.
    Notified,
    /// Nothing changed since the last notification, or the unit is clean.
    Unchanged,
    /// The value was empty and empty values are not reported.
    Empty,
    /// No target has produced a signal yet.
    NoSource,
    /// The backing target is gone; the unit detached itself.
    Detached,
}

/// Side-channel report of a condition that was handled without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The `on_value_changed` callback returned an error or panicked.
    CallbackFailed {
        target: TargetId,
        value: String,
        message: String,
    },
    /// A target vanished from the host; its unit was detached.
    StaleTarget { unit: UnitId, target: TargetId },
}

/// Named operations, for hosts that bridge a string-keyed command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Attach,
    Detach,
    IsMonitored,
}

impl FromStr for Operation {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attach" | "init" => Ok(Operation::Attach),
            "detach" | "destroy" => Ok(Operation::Detach),
            "is_monitored" | "isMonitored" => Ok(Operation::IsMonitored),
            other => Err(MonitorError::UnknownOperation(other.to_string())),
        }
    }
}
