//! Key injection
//!
//! Macros are written against the abstract [`Key`] set; a [`KeyInjector`]
//! turns them into real key events.

/// Keys the menu macros use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Opens the pause menu
    Menu,
    /// Accepts the highlighted entry
    Confirm,
    Up,
    Down,
    Left,
    Right,
}

/// Key injection errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to initialise keyboard injection: {0}")]
    Init(String),
    #[error("failed to inject {key:?}: {reason}")]
    Injection { key: Key, reason: String },
    #[error("key injection is not supported on this platform")]
    Unsupported,
}

/// Sends key-down and key-up events to the foreground window
pub trait KeyInjector {
    fn key_down(&mut self, key: Key) -> Result<(), InputError>;
    fn key_up(&mut self, key: Key) -> Result<(), InputError>;
}

/// enigo-backed keyboard
#[cfg(windows)]
pub struct EnigoKeyboard {
    enigo: enigo::Enigo,
}

#[cfg(windows)]
impl EnigoKeyboard {
    pub fn new() -> Result<Self, InputError> {
        let enigo = enigo::Enigo::new(&enigo::Settings::default())
            .map_err(|e| InputError::Init(e.to_string()))?;
        Ok(Self { enigo })
    }

    fn map_key(key: Key) -> enigo::Key {
        match key {
            Key::Menu => enigo::Key::Escape,
            Key::Confirm => enigo::Key::Return,
            Key::Up => enigo::Key::UpArrow,
            Key::Down => enigo::Key::DownArrow,
            Key::Left => enigo::Key::LeftArrow,
            Key::Right => enigo::Key::RightArrow,
        }
    }

    fn send(&mut self, key: Key, direction: enigo::Direction) -> Result<(), InputError> {
        use enigo::Keyboard;

        self.enigo
            .key(Self::map_key(key), direction)
            .map_err(|e| InputError::Injection {
                key,
                reason: e.to_string(),
            })
    }
}

#[cfg(windows)]
impl KeyInjector for EnigoKeyboard {
    fn key_down(&mut self, key: Key) -> Result<(), InputError> {
        self.send(key, enigo::Direction::Press)
    }

    fn key_up(&mut self, key: Key) -> Result<(), InputError> {
        self.send(key, enigo::Direction::Release)
    }
}

/// Keyboard for platforms without an injection backend
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedKeyboard;

impl KeyInjector for UnsupportedKeyboard {
    fn key_down(&mut self, _key: Key) -> Result<(), InputError> {
        Err(InputError::Unsupported)
    }

    fn key_up(&mut self, _key: Key) -> Result<(), InputError> {
        Err(InputError::Unsupported)
    }
}

/// The keyboard for the current platform
pub fn system_keyboard() -> Result<Box<dyn KeyInjector>, InputError> {
    #[cfg(windows)]
    {
        Ok(Box::new(EnigoKeyboard::new()?))
    }
    #[cfg(not(windows))]
    {
        log::warn!("no key injection backend on this platform");
        Ok(Box::new(UnsupportedKeyboard))
    }
}
