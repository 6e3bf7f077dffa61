//! Menu macros
//!
//! Timed key sequences that move the game between story mode and an online
//! session through the pause menu.

use std::sync::Arc;
use std::time::Duration;

use super::keys::{InputError, Key, KeyInjector};
use crate::timing::Clock;

/// Pause menu → Online tab → Play GTA Online → invite-only session
pub const ONLINE_SEQUENCE: &[Key] = &[
    Key::Menu,
    Key::Right,
    Key::Right,
    Key::Right,
    Key::Right,
    Key::Right,
    Key::Confirm,
    Key::Up,
    Key::Confirm,
    Key::Up,
    Key::Confirm,
    Key::Confirm,
];

/// Pause menu → Online tab → Find new session → Story mode
pub const OFFLINE_SEQUENCE: &[Key] = &[
    Key::Menu,
    Key::Right,
    Key::Confirm,
    Key::Up,
    Key::Up,
    Key::Up,
    Key::Confirm,
    Key::Confirm,
];

/// Plays key sequences with a fixed hold and settle time per press
pub struct MacroPlayer {
    keyboard: Box<dyn KeyInjector>,
    clock: Arc<dyn Clock>,
    /// How long each key stays down
    hold: Duration,
    /// Pause after each key-up
    settle: Duration,
}

impl MacroPlayer {
    pub fn new(
        keyboard: Box<dyn KeyInjector>,
        clock: Arc<dyn Clock>,
        hold: Duration,
        settle: Duration,
    ) -> Self {
        Self {
            keyboard,
            clock,
            hold,
            settle,
        }
    }

    /// Key-down, hold, key-up, settle
    pub fn press(&mut self, key: Key) -> Result<(), InputError> {
        self.keyboard.key_down(key)?;
        self.clock.sleep(self.hold);
        self.keyboard.key_up(key)?;
        self.clock.sleep(self.settle);
        Ok(())
    }

    /// Play a whole sequence; the first injection error aborts it
    pub fn play(&mut self, sequence: &[Key]) -> Result<(), InputError> {
        for &key in sequence {
            self.press(key)?;
        }
        Ok(())
    }

    /// Switch from story mode to an online session
    pub fn to_online(&mut self) -> Result<(), InputError> {
        log::info!("Executing macro: switch to online session...");
        self.play(ONLINE_SEQUENCE)?;
        log::info!("Macro 'switch to online' completed");
        Ok(())
    }

    /// Leave the online session for story mode
    pub fn to_offline(&mut self) -> Result<(), InputError> {
        log::info!("Executing macro: return to story mode...");
        self.play(OFFLINE_SEQUENCE)?;
        log::info!("Macro 'return to story mode' completed");
        Ok(())
    }
}
