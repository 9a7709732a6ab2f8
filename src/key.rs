/// Key codes representing individual keys on the keyboard.
///
/// This enum provides a platform-agnostic representation of keys.
/// Hosts should map their platform-specific key events to these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyCode {
    /// A character key, as produced by the keyboard layout (',' for comma).
    Char(char),
    /// The Enter/Return key.
    Enter,
    /// The Backspace key.
    Backspace,
    /// The Delete key.
    Delete,
    /// The Tab key.
    Tab,
    /// The Escape key.
    Esc,
    /// A host-specific numeric key code with no portable mapping.
    ///
    /// Hosts that only see numeric codes (e.g. legacy web `keyCode` values)
    /// can configure triggers in these terms.
    Raw(u32),
}

bitflags::bitflags! {
    /// Keyboard modifier flags.
    ///
    /// These can be combined to represent multiple modifiers held simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key release reported by the host for a monitored target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was released.
    pub code: KeyCode,
    /// Modifier keys held at the time.
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            mods: Modifiers::empty(),
        }
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Signals a host delivers for one target.
///
/// Modifiers never affect triggering; only the key code is matched against
/// the configured trigger set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Key activity on the target (typically key-up).
    Key(KeyEvent),
    /// Text was pasted. The new value is not readable until the next turn.
    Paste,
    /// The host committed the value (blur, enter, native change).
    Commit,
}

impl Signal {
    pub fn key(c: char) -> Self {
        Signal::Key(KeyEvent::char(c))
    }
}
