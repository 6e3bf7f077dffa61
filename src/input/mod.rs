//! Keyboard input and menu macros

pub mod keys;
pub mod macros;

pub use keys::{system_keyboard, InputError, Key, KeyInjector};
pub use macros::{MacroPlayer, OFFLINE_SEQUENCE, ONLINE_SEQUENCE};
