use serde::{Deserialize, Serialize};
use std::fmt;

/// Device class currently considered active for UI prompts
///
/// The numeric index is what prompt tables are keyed by:
/// `0` for the gamepad, `1` for the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputMode {
    #[default]
    Gamepad,
    Keyboard,
}

impl InputMode {
    pub fn index(self) -> i32 {
        match self {
            InputMode::Gamepad => 0,
            InputMode::Keyboard => 1,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(InputMode::Gamepad),
            1 => Some(InputMode::Keyboard),
            _ => None,
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Gamepad => write!(f, "gamepad"),
            InputMode::Keyboard => write!(f, "keyboard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_prompt_table_order() {
        assert_eq!(InputMode::Gamepad.index(), 0);
        assert_eq!(InputMode::Keyboard.index(), 1);
        assert_eq!(InputMode::from_index(1), Some(InputMode::Keyboard));
        assert_eq!(InputMode::from_index(2), None);
    }

    #[test]
    fn default_mode_is_gamepad() {
        assert_eq!(InputMode::default(), InputMode::Gamepad);
    }
}
