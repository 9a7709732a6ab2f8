//! Error types for the monitoring engine.

use thiserror::Error;

use crate::types::TargetId;

/// Error type consumers return from `on_value_changed`.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported to the caller of a public operation.
///
/// Faults inside the consumer callback never surface here; they are
/// reported through [`Diagnostic`](crate::Diagnostic) instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// `attach` was called with an empty target list.
    #[error("attach requires at least one target")]
    NoTargets,

    /// The same target appeared twice in one `attach` call.
    #[error("{0} listed more than once")]
    DuplicateTarget(TargetId),

    /// The target already belongs to a live unit. Detach it first.
    #[error("{0} is already monitored")]
    AlreadyMonitored(TargetId),

    /// An operation name that does not exist on the public surface.
    #[error("operation '{0}' does not exist")]
    UnknownOperation(String),
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
