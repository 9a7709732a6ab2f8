//! Fault boundary around the consumer callback.
//!
//! The callback is the only foreign code the engine runs. An `Err` or a panic
//! from it is turned into a message for the diagnostics channel and never
//! unwinds into the scheduler.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::options::ValueChanged;
use crate::types::TargetId;

#[derive(Clone, Default)]
pub(crate) struct Emitter {
    callback: Option<ValueChanged>,
}

impl Emitter {
    pub fn new(callback: Option<ValueChanged>) -> Self {
        Self { callback }
    }

    /// Deliver `value` to the consumer. Returns the fault message, if any.
    pub fn emit(&self, value: &str, source: TargetId) -> Result<(), String> {
        let Some(callback) = &self.callback else {
            return Ok(());
        };
        let Ok(mut f) = callback.try_borrow_mut() else {
            return Err("callback re-entered while already running".to_string());
        };

        match catch_unwind(AssertUnwindSafe(|| (*f)(value, source))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic_info) => Err(format!("callback panicked: {}", panic_message(&panic_info))),
        }
    }
}

fn panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
