//! Per-attach configuration.
//!
//! `Settings` is plain data and can be loaded from a config file with the
//! `serde` feature. `MonitorOptions` adds the consumer callback.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::CallbackError;
use crate::key::KeyCode;
use crate::types::TargetId;

/// Fallback evaluation period used when none is configured.
pub const DEFAULT_FREQUENCY: Duration = Duration::from_millis(3500);

/// Consumer callback, shared by every unit created from one attach call.
pub(crate) type ValueChanged = Rc<RefCell<dyn FnMut(&str, TargetId) -> Result<(), CallbackError>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Quiet period before a timer-driven evaluation. Zero disables the timer.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub frequency: Duration,
    /// Keys that force an immediate evaluation. Empty means every key does.
    pub trigger_keys: BTreeSet<KeyCode>,
    /// Whether a paste queues an evaluation for the next turn.
    pub paste_triggers: bool,
    /// Whether an empty trimmed value may be reported.
    pub empty_value_triggers: bool,
    /// Whether a non-empty value present at attach time counts as a change.
    pub trigger_on_init: bool,
    /// One shared unit for all targets instead of one unit per target.
    pub monitor_as_group: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            trigger_keys: [KeyCode::Char(','), KeyCode::Char('.')]
                .into_iter()
                .collect(),
            paste_triggers: true,
            empty_value_triggers: true,
            trigger_on_init: true,
            monitor_as_group: false,
        }
    }
}

impl Settings {
    pub(crate) fn triggers_on(&self, code: KeyCode) -> bool {
        self.trigger_keys.is_empty() || self.trigger_keys.contains(&code)
    }

    pub(crate) fn timer_enabled(&self) -> bool {
        !self.frequency.is_zero()
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Everything `attach` needs: settings plus the consumer callback.
#[derive(Clone)]
pub struct MonitorOptions {
    pub settings: Settings,
    pub(crate) on_value_changed: Option<ValueChanged>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptionsBuilder::default().build()
    }
}

impl fmt::Debug for MonitorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorOptions")
            .field("settings", &self.settings)
            .field("has_callback", &self.on_value_changed.is_some())
            .finish()
    }
}

impl MonitorOptions {
    pub fn builder() -> MonitorOptionsBuilder {
        MonitorOptionsBuilder::default()
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings,
            on_value_changed: None,
        }
    }
}

#[derive(Default)]
pub struct MonitorOptionsBuilder {
    settings: Settings,
    on_value_changed: Option<ValueChanged>,
}

impl MonitorOptionsBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn frequency(mut self, frequency: Duration) -> Self {
        self.settings.frequency = frequency;
        self
    }

    pub fn frequency_ms(self, ms: u64) -> Self {
        self.frequency(Duration::from_millis(ms))
    }

    /// Only signal-driven evaluations; no quiet-period timer.
    pub fn without_timer(self) -> Self {
        self.frequency(Duration::ZERO)
    }

    pub fn trigger_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = KeyCode>,
    {
        self.settings.trigger_keys = keys.into_iter().collect();
        self
    }

    /// Evaluate on every key activity.
    pub fn trigger_on_every_key(mut self) -> Self {
        self.settings.trigger_keys.clear();
        self
    }

    pub fn paste_triggers(mut self, on: bool) -> Self {
        self.settings.paste_triggers = on;
        self
    }

    pub fn empty_value_triggers(mut self, on: bool) -> Self {
        self.settings.empty_value_triggers = on;
        self
    }

    pub fn trigger_on_init(mut self, on: bool) -> Self {
        self.settings.trigger_on_init = on;
        self
    }

    pub fn monitor_as_group(mut self, on: bool) -> Self {
        self.settings.monitor_as_group = on;
        self
    }

    pub fn on_value_changed<F>(mut self, f: F) -> Self
    where
        F: FnMut(&str, TargetId) -> Result<(), CallbackError> + 'static,
    {
        self.on_value_changed = Some(Rc::new(RefCell::new(f)));
        self
    }

    pub fn build(self) -> MonitorOptions {
        MonitorOptions {
            settings: self.settings,
            on_value_changed: self.on_value_changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.frequency, Duration::from_millis(3500));
        assert!(s.triggers_on(KeyCode::Char(',')));
        assert!(s.triggers_on(KeyCode::Char('.')));
        assert!(!s.triggers_on(KeyCode::Char('a')));
        assert!(s.paste_triggers && s.empty_value_triggers && s.trigger_on_init);
        assert!(!s.monitor_as_group);
    }

    #[test]
    fn empty_trigger_set_matches_everything() {
        let opts = MonitorOptions::builder().trigger_on_every_key().build();
        assert!(opts.settings.triggers_on(KeyCode::Char('z')));
        assert!(opts.settings.triggers_on(KeyCode::Raw(13)));
    }

    #[test]
    fn zero_frequency_disables_timer() {
        let opts = MonitorOptions::builder().without_timer().build();
        assert!(!opts.settings.timer_enabled());
        assert!(MonitorOptions::default().settings.timer_enabled());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn settings_load_from_json_with_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{ "frequency": 1000, "monitor_as_group": true }"#).unwrap();
        assert_eq!(s.frequency, Duration::from_millis(1000));
        assert!(s.monitor_as_group);
        assert_eq!(s.trigger_keys, Settings::default().trigger_keys);
    }
}
