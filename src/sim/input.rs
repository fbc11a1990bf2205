//! Merged input state
//!
//! Keyboard and touch buttons both feed the same three logical controls.
//! Movement is level-triggered (held), fire is edge-triggered (queued on
//! press, consumed by the next frame).

use super::tick::TickInput;

/// Where a control change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Touch,
}

impl InputSource {
    fn slot(self) -> usize {
        match self {
            InputSource::Keyboard => 0,
            InputSource::Touch => 1,
        }
    }
}

/// Logical control a key or on-screen button maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Fire,
}

/// Held/pressed controls across all sources
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: [bool; 2],
    right: [bool; 2],
    fire_queued: bool,
}

impl InputState {
    pub fn set_left(&mut self, source: InputSource, held: bool) {
        self.left[source.slot()] = held;
    }

    pub fn set_right(&mut self, source: InputSource, held: bool) {
        self.right[source.slot()] = held;
    }

    /// Press (`held = true`) or release a control; releasing fire is a no-op
    pub fn apply(&mut self, control: Control, source: InputSource, held: bool) {
        match control {
            Control::Left => self.set_left(source, held),
            Control::Right => self.set_right(source, held),
            Control::Fire => {
                if held {
                    self.press_fire();
                }
            }
        }
    }

    /// Register a fire press (auto-repeat of a held key is the caller's to filter)
    pub fn press_fire(&mut self) {
        self.fire_queued = true;
    }

    /// Current controls without consuming the fire press
    pub fn peek(&self) -> TickInput {
        TickInput {
            left: self.left.iter().any(|h| *h),
            right: self.right.iter().any(|h| *h),
            fire: self.fire_queued,
        }
    }

    /// Controls for the next frame; the fire press is spent
    pub fn take(&mut self) -> TickInput {
        let input = self.peek();
        self.fire_queued = false;
        input
    }

    /// Release everything (new session, lost focus)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_merge() {
        let mut input = InputState::default();
        input.set_left(InputSource::Keyboard, true);
        input.set_left(InputSource::Touch, true);
        input.set_left(InputSource::Keyboard, false);
        // Touch still holds left
        assert!(input.peek().left);
        input.set_left(InputSource::Touch, false);
        assert!(!input.peek().left);
    }

    #[test]
    fn test_fire_is_edge_triggered() {
        let mut input = InputState::default();
        input.set_right(InputSource::Keyboard, true);
        input.press_fire();
        let first = input.take();
        assert!(first.fire && first.right);
        let second = input.take();
        assert!(!second.fire && second.right);
    }

    #[test]
    fn test_apply_controls() {
        let mut input = InputState::default();
        input.apply(Control::Right, InputSource::Touch, true);
        input.apply(Control::Fire, InputSource::Touch, true);
        input.apply(Control::Fire, InputSource::Touch, false);
        let first = input.take();
        assert!(first.right && first.fire);
        input.apply(Control::Right, InputSource::Touch, false);
        assert_eq!(input.peek(), TickInput::default());
    }

    #[test]
    fn test_clear() {
        let mut input = InputState::default();
        input.set_right(InputSource::Touch, true);
        input.press_fire();
        input.clear();
        assert_eq!(input.peek(), TickInput::default());
    }
}
