//! Keyboard polling and the command each frame should send.

use macroquad::prelude::*;
use shared::Command;

/// Key presses detected this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEvents {
    /// Paddle movement held this frame, if any.
    pub movement: Option<Command>,
    pub restart: bool,
    pub confirm: bool,
    pub back: bool,
}

/// Samples the keyboard each frame and turns key state into events.
pub struct InputManager {
    // Previous frame key states for edge detection
    prev_key_r: bool,
    prev_key_enter: bool,
    prev_key_escape: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            prev_key_r: false,
            prev_key_enter: false,
            prev_key_escape: false,
        }
    }

    pub fn update(&mut self) -> InputEvents {
        // Support both W/S and arrow keys
        let up = is_key_down(KeyCode::W) || is_key_down(KeyCode::Up);
        let down = is_key_down(KeyCode::S) || is_key_down(KeyCode::Down);

        let key_r = is_key_down(KeyCode::R);
        let key_enter = is_key_down(KeyCode::Enter) || is_key_down(KeyCode::KpEnter);
        let key_escape = is_key_down(KeyCode::Escape);

        let events = InputEvents {
            movement: movement_command(up, down),
            restart: pressed(key_r, self.prev_key_r),
            confirm: pressed(key_enter, self.prev_key_enter),
            back: pressed(key_escape, self.prev_key_escape),
        };

        self.prev_key_r = key_r;
        self.prev_key_enter = key_enter;
        self.prev_key_escape = key_escape;

        events
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Up wins when both directions are held.
pub fn movement_command(up: bool, down: bool) -> Option<Command> {
    if up {
        Some(Command::Up)
    } else if down {
        Some(Command::Down)
    } else {
        None
    }
}

fn pressed(current: bool, previous: bool) -> bool {
    current && !previous
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_command() {
        assert_eq!(movement_command(true, false), Some(Command::Up));
        assert_eq!(movement_command(false, true), Some(Command::Down));
        assert_eq!(movement_command(true, true), Some(Command::Up));
        assert_eq!(movement_command(false, false), None);
    }

    #[test]
    fn test_press_is_edge_triggered() {
        assert!(pressed(true, false));
        assert!(!pressed(true, true));
        assert!(!pressed(false, true));
    }

    #[test]
    fn test_input_manager_creation() {
        let input_manager = InputManager::new();
        assert!(!input_manager.prev_key_r);
        assert!(!input_manager.prev_key_enter);
        assert!(!input_manager.prev_key_escape);
    }
}
