use crate::types::TargetId;

/// Read access to the text held by the host's targets.
///
/// The engine borrows the source only for the duration of a call; the host
/// keeps ownership and may edit values between calls.
pub trait ValueSource {
    /// Current raw value of `target`, or `None` if the target no longer exists.
    ///
    /// The engine trims the result; implementors return it verbatim.
    fn current_value(&self, target: TargetId) -> Option<String>;
}

impl<F> ValueSource for F
where
    F: Fn(TargetId) -> Option<String>,
{
    fn current_value(&self, target: TargetId) -> Option<String> {
        self(target)
    }
}
