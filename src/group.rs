//! Membership and authority for monitoring units.
//!
//! A unit is a group of one or more targets sharing one `DebounceState`.
//! In a real group the authoritative target is always the most recent
//! signal sender; the shared `last_notified` means switching authority
//! between members with different values counts as a change.

use smallvec::SmallVec;

use crate::options::Settings;
use crate::state::{DebounceState, normalize};
use crate::traits::ValueSource;
use crate::types::TargetId;

#[derive(Debug, Clone)]
pub(crate) struct Members {
    targets: SmallVec<[TargetId; 4]>,
    grouped: bool,
}

impl Members {
    pub fn single(target: TargetId) -> Self {
        Self {
            targets: SmallVec::from_slice(&[target]),
            grouped: false,
        }
    }

    pub fn group(targets: &[TargetId]) -> Self {
        Self {
            targets: SmallVec::from_slice(targets),
            grouped: true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.iter().copied()
    }

    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Target whose value an evaluation reads and reports.
    ///
    /// Groups only trust the latest sender; a lone target may also be named
    /// by the trigger itself.
    pub fn authority(&self, state: &DebounceState, triggering: Option<TargetId>) -> Option<TargetId> {
        if self.grouped {
            state.last_changed
        } else {
            triggering.or(state.last_changed)
        }
    }

    /// Starting state for a freshly attached unit.
    ///
    /// With `trigger_on_init`, the first member holding a non-empty value
    /// makes the unit dirty and becomes the last changed target.
    pub fn initial_state<S>(&self, source: &S, settings: &Settings) -> DebounceState
    where
        S: ValueSource + ?Sized,
    {
        let seeded = settings
            .trigger_on_init
            .then(|| {
                self.iter().find(|&t| {
                    source
                        .current_value(t)
                        .is_some_and(|v| !normalize(&v).is_empty())
                })
            })
            .flatten();

        match (seeded, self.grouped) {
            (Some(target), _) => DebounceState::new(Some(target), true),
            (None, false) => DebounceState::new(self.targets.first().copied(), false),
            (None, true) => DebounceState::new(None, false),
        }
    }
}
