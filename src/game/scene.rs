//! Classified screen states of the game window

use std::fmt;

/// A scene recognised on screen. "Nothing recognised" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    /// Loading spinner shown while joining an online session
    JoiningOnline,
    /// Single-player story mode
    StoryMode,
    /// Spinner shown while a purchase or cloud save is in flight
    Transaction,
}

impl Scene {
    pub fn label(&self) -> &'static str {
        match self {
            Scene::JoiningOnline => "JOINING_ONLINE",
            Scene::StoryMode => "STORY_MODE",
            Scene::Transaction => "TRANSACTION",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
