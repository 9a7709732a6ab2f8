use std::cell::RefCell;
use std::rc::Rc;

use input_settle::{MonitorOptions, MonitorOptionsBuilder, TargetId};

/// Collects every notification delivered to the consumer callback.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Rc<RefCell<Vec<(String, TargetId)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish `builder` with a callback that records into this recorder.
    pub fn options(&self, builder: MonitorOptionsBuilder) -> MonitorOptions {
        let sink = self.seen.clone();
        builder
            .on_value_changed(move |value, source| {
                sink.borrow_mut().push((value.to_string(), source));
                Ok(())
            })
            .build()
    }

    pub fn calls(&self) -> Vec<(String, TargetId)> {
        self.seen.borrow().clone()
    }

    pub fn values(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|(v, _)| v.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}
