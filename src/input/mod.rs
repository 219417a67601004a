//! Logical input actions, sampled once per tick.

/// Movement actions the player responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
}

impl Action {
    /// Evaluation order for movement; later entries win facing ties
    pub const MOVEMENT: [Action; 4] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
    ];
}

/// Anything that can answer "is this action held right now"
pub trait InputSource {
    fn is_pressed(&self, action: Action) -> bool;
}

/// A snapshot of held actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper, mostly for tests
    pub fn with(mut self, action: Action) -> Self {
        self.set(action, true);
        self
    }

    pub fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::MoveUp => self.up = pressed,
            Action::MoveDown => self.down = pressed,
            Action::MoveLeft => self.left = pressed,
            Action::MoveRight => self.right = pressed,
        }
    }
}

impl InputSource for InputState {
    fn is_pressed(&self, action: Action) -> bool {
        match action {
            Action::MoveUp => self.up,
            Action::MoveDown => self.down,
            Action::MoveLeft => self.left,
            Action::MoveRight => self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_tracks_each_action() {
        let state = InputState::new().with(Action::MoveUp).with(Action::MoveRight);
        assert!(state.is_pressed(Action::MoveUp));
        assert!(state.is_pressed(Action::MoveRight));
        assert!(!state.is_pressed(Action::MoveDown));
        assert!(!state.is_pressed(Action::MoveLeft));
    }

    #[test]
    fn test_release_clears_action() {
        let mut state = InputState::new().with(Action::MoveLeft);
        state.set(Action::MoveLeft, false);
        assert!(Action::MOVEMENT.iter().all(|&a| !state.is_pressed(a)));
    }
}
