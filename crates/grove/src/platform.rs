//! The host runtime contract and a headless implementation.

use std::cell::Cell;

use crate::{
    color::ColorMode,
    cursor::CursorShape,
    geom::Point,
    input::{Key, PointerButton},
};

/// What the engine polls from, and reports back to, the host runtime.
pub trait Platform {
    /// Pointer position in drawable pixels, if the pointer is over the surface.
    fn pointer_position(&self) -> Option<Point>;

    /// Pointer buttons currently held.
    fn pointer_buttons(&self) -> Vec<PointerButton>;

    /// Keys currently held.
    fn pressed_keys(&self) -> Vec<Key>;

    /// Device pixels per logical pixel.
    fn device_scale(&self) -> f64;

    /// The system's light/dark preference. May be slow; the engine caches it.
    fn color_mode(&self) -> ColorMode;

    /// Show a cursor shape.
    fn set_cursor_shape(&mut self, shape: CursorShape);
}

/// A scriptable host without a window, for tests and offscreen rendering.
#[derive(Debug, Clone)]
pub struct Headless {
    /// Pointer position.
    pub pointer: Option<Point>,
    /// Held pointer buttons.
    pub buttons: Vec<PointerButton>,
    /// Held keys.
    pub keys: Vec<Key>,
    /// Device scale.
    pub scale: f64,
    /// Reported color mode.
    pub color_mode: ColorMode,
    /// Last cursor shape the engine set.
    pub cursor: CursorShape,
    /// Number of times the engine asked for the color mode.
    pub color_queries: Cell<usize>,
}

impl Default for Headless {
    fn default() -> Self {
        Self {
            pointer: None,
            buttons: Vec::new(),
            keys: Vec::new(),
            scale: 1.0,
            color_mode: ColorMode::Light,
            cursor: CursorShape::Default,
            color_queries: Cell::new(0),
        }
    }
}

impl Headless {
    /// A headless host with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the pointer.
    pub fn move_pointer(&mut self, p: impl Into<Point>) {
        self.pointer = Some(p.into());
    }

    /// Press a pointer button.
    pub fn press(&mut self, b: PointerButton) {
        if !self.buttons.contains(&b) {
            self.buttons.push(b);
        }
    }

    /// Release a pointer button.
    pub fn release(&mut self, b: PointerButton) {
        self.buttons.retain(|x| *x != b);
    }

    /// Press a key.
    pub fn key_down(&mut self, k: impl Into<Key>) {
        let k = k.into();
        if !self.keys.contains(&k) {
            self.keys.push(k);
        }
    }

    /// Release a key.
    pub fn key_up(&mut self, k: impl Into<Key>) {
        let k = k.into();
        self.keys.retain(|x| *x != k);
    }
}

impl Platform for Headless {
    fn pointer_position(&self) -> Option<Point> {
        self.pointer
    }

    fn pointer_buttons(&self) -> Vec<PointerButton> {
        self.buttons.clone()
    }

    fn pressed_keys(&self) -> Vec<Key> {
        self.keys.clone()
    }

    fn device_scale(&self) -> f64 {
        self.scale
    }

    fn color_mode(&self) -> ColorMode {
        self.color_queries.set(self.color_queries.get() + 1);
        self.color_mode
    }

    fn set_cursor_shape(&mut self, shape: CursorShape) {
        self.cursor = shape;
    }
}
