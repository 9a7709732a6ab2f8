use std::collections::BTreeMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::traits::ValueSource;
use crate::types::TargetId;

/// In-memory text fields keyed by target.
///
/// A ready-made [`ValueSource`] for hosts that keep their own text, for
/// headless front ends, and for tests. Editing helpers only change text;
/// delivering the matching [`Signal`](crate::Signal) is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct FieldBuffer {
    fields: BTreeMap<TargetId, String>,
}

impl FieldBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) a field with an initial value.
    pub fn insert(&mut self, target: TargetId, text: &str) {
        self.fields.insert(target, text.to_string());
    }

    pub fn with(mut self, target: TargetId, text: &str) -> Self {
        self.insert(target, text);
        self
    }

    /// Drop a field, as if the host tore the element down.
    pub fn remove(&mut self, target: TargetId) -> Option<String> {
        self.fields.remove(&target)
    }

    pub fn get(&self, target: TargetId) -> Option<&str> {
        self.fields.get(&target).map(String::as_str)
    }

    /// Replace the whole value. Returns false if the field does not exist.
    pub fn set(&mut self, target: TargetId, text: &str) -> bool {
        match self.fields.get_mut(&target) {
            Some(field) => {
                field.clear();
                field.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Append typed (or pasted) text at the end of the field.
    pub fn type_str(&mut self, target: TargetId, text: &str) -> bool {
        match self.fields.get_mut(&target) {
            Some(field) => {
                field.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Remove the last grapheme cluster, so "e" + combining accent or an
    /// emoji sequence goes away in one keystroke.
    pub fn backspace(&mut self, target: TargetId) -> bool {
        let Some(field) = self.fields.get_mut(&target) else {
            return false;
        };
        match field.grapheme_indices(true).next_back() {
            Some((idx, _)) => {
                field.truncate(idx);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl ValueSource for FieldBuffer {
    fn current_value(&self, target: TargetId) -> Option<String> {
        self.fields.get(&target).cloned()
    }
}
