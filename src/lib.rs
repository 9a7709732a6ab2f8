//! Debounced settle detection for text inputs.
//!
//! Attach an [`Engine`] to one or more targets, forward the host's key,
//! paste and commit signals, and advance its clock. The consumer callback
//! fires once per settled value: after a quiet period, on a trigger key, or
//! on commit, and only when the trimmed value actually changed.

pub mod buffer;
pub mod engine;
pub mod error;
pub mod key;
pub mod options;
pub mod traits;
pub mod types;

mod emitter;
mod group;
mod scheduler;
mod state;

pub use crate::buffer::FieldBuffer;
pub use crate::engine::{Engine, EngineBuilder, UnitSnapshot};
pub use crate::error::{CallbackError, MonitorError};
pub use crate::key::{KeyCode, KeyEvent, Modifiers, Signal};
pub use crate::options::{DEFAULT_FREQUENCY, MonitorOptions, MonitorOptionsBuilder, Settings};
pub use crate::traits::ValueSource;
pub use crate::types::{Diagnostic, Evaluation, Handle, Operation, SignalOutcome, TargetId, UnitId};
