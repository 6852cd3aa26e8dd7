//! Polled input snapshots.

use std::{collections::BTreeSet, mem};

use crate::geom::Point;

/// Pointer buttons.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum PointerButton {
    /// Primary (usually left) button.
    Primary,
    /// Secondary (usually right) button.
    Secondary,
    /// Middle button or wheel press.
    Middle,
}

/// Keyboard keys.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    /// A character key.
    Char(char),
    /// Backspace key.
    Backspace,
    /// Enter/return key.
    Enter,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up key.
    PageUp,
    /// Page down key.
    PageDown,
    /// Tab key.
    Tab,
    /// Delete key.
    Delete,
    /// Escape key.
    Esc,
    /// Shift modifier.
    Shift,
    /// Control modifier.
    Ctrl,
    /// Alt modifier.
    Alt,
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

/// Which logical input kind is being dispatched.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum InputKind {
    /// Continuous pointer input.
    Pointing,
    /// Discrete key input, delivered along the focus chain.
    Button,
}

/// Input as polled from the host at the start of the current update, with
/// edges derived from the previous update's poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    /// Pointer position, if the pointer is over the surface.
    pointer: Option<Point>,
    /// Pointer buttons held now.
    buttons: BTreeSet<PointerButton>,
    /// Pointer buttons held at the previous poll.
    prev_buttons: BTreeSet<PointerButton>,
    /// Keys held now.
    keys: BTreeSet<Key>,
    /// Keys held at the previous poll.
    prev_keys: BTreeSet<Key>,
}

impl InputState {
    /// Record a new poll, retaining the previous one for edge detection.
    pub fn advance(
        &mut self,
        pointer: Option<Point>,
        buttons: impl IntoIterator<Item = PointerButton>,
        keys: impl IntoIterator<Item = Key>,
    ) {
        self.pointer = pointer;
        self.prev_buttons = mem::replace(&mut self.buttons, buttons.into_iter().collect());
        self.prev_keys = mem::replace(&mut self.keys, keys.into_iter().collect());
    }

    /// Pointer position.
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Is the button held?
    pub fn is_down(&self, b: PointerButton) -> bool {
        self.buttons.contains(&b)
    }

    /// Did the button go down since the previous poll?
    pub fn just_pressed(&self, b: PointerButton) -> bool {
        self.buttons.contains(&b) && !self.prev_buttons.contains(&b)
    }

    /// Did the button come up since the previous poll?
    pub fn just_released(&self, b: PointerButton) -> bool {
        !self.buttons.contains(&b) && self.prev_buttons.contains(&b)
    }

    /// Is the key held?
    pub fn key_down(&self, k: Key) -> bool {
        self.keys.contains(&k)
    }

    /// Did the key go down since the previous poll?
    pub fn key_just_pressed(&self, k: Key) -> bool {
        self.keys.contains(&k) && !self.prev_keys.contains(&k)
    }

    /// Did the key come up since the previous poll?
    pub fn key_just_released(&self, k: Key) -> bool {
        !self.keys.contains(&k) && self.prev_keys.contains(&k)
    }

    /// Keys held now.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let mut s = InputState::default();
        s.advance(Some(Point::new(1, 1)), [PointerButton::Primary], [Key::from('a')]);
        assert!(s.just_pressed(PointerButton::Primary));
        assert!(s.key_just_pressed(Key::Char('a')));
        assert_eq!(s.pointer(), Some(Point::new(1, 1)));

        s.advance(None, [PointerButton::Primary], Vec::<Key>::new());
        assert!(s.is_down(PointerButton::Primary));
        assert!(!s.just_pressed(PointerButton::Primary));
        assert!(s.key_just_released(Key::Char('a')));
        assert_eq!(s.pointer(), None);

        s.advance(None, Vec::<PointerButton>::new(), [Key::Enter]);
        assert!(s.just_released(PointerButton::Primary));
        assert!(s.key_down(Key::Enter));
        assert_eq!(s.keys().collect::<Vec<_>>(), vec![Key::Enter]);
    }
}
