#![allow(dead_code)]

pub mod recorder;

use input_settle::{KeyCode, KeyEvent, Modifiers, Signal, TargetId};

pub const A: TargetId = TargetId(1);
pub const B: TargetId = TargetId(2);
pub const C: TargetId = TargetId(3);

pub fn key(c: char) -> Signal {
    Signal::Key(KeyEvent {
        code: KeyCode::Char(c),
        mods: Modifiers::empty(),
    })
}

pub fn ms(n: u64) -> std::time::Duration {
    std::time::Duration::from_millis(n)
}
