use std::{any::Any, cell::Cell, fmt};

use convert_case::{Case, Casing};

use crate::{
    geom::{Expanse, Point, Rect},
    id::WidgetId,
    render::{CompositeFn, Offscreen},
};

/// Return true if the character is valid in a widget name.
fn valid_name_char(c: char) -> bool {
    (c.is_ascii_lowercase() || c.is_ascii_digit()) || c == '_'
}

/// A diagnostic widget name: lowercase ASCII alphanumerics plus underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetName {
    /// Stored name string.
    name: String,
}

impl WidgetName {
    /// Munge a string into a valid widget name by converting it to snake case
    /// and dropping invalid characters.
    pub fn convert(name: &str) -> Self {
        let raw = name.to_case(Case::Snake);
        let filtered: String = raw.chars().filter(|x| valid_name_char(*x)).collect();
        let name = if filtered.is_empty() {
            "widget".to_string()
        } else {
            filtered
        };
        Self { name }
    }
}

impl fmt::Display for WidgetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq<&str> for WidgetName {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

/// What a parent remembers about one of its children from the previous frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildSnapshot {
    /// Child identity.
    pub id: WidgetId,
    /// Cumulative z of the child.
    pub z: i64,
    /// The child's own z-delta.
    pub z_delta: i32,
    /// Effective visibility of the child.
    pub visible: bool,
    /// Visible bounds of the child in screen coordinates.
    pub bounds: Rect,
}

/// Engine-owned mutable record backing one widget.
pub struct WidgetState {
    /// Enclosing widget, or `None` for the root and detached widgets.
    pub(crate) parent: Option<WidgetId>,
    /// Children registered in the current build pass, in declaration order.
    pub(crate) children: Vec<WidgetId>,
    /// Top-left corner in screen coordinates.
    pub(crate) position: Point,
    /// Explicit size; `None` falls back to the widget's default size.
    pub(crate) size: Option<Expanse>,
    /// Hidden widgets are not drawn, hit or offered input, nor are their children.
    pub(crate) hidden: bool,
    /// Disabled widgets and their children are not offered input.
    pub(crate) disabled: bool,
    /// 0.0 is fully opaque, 1.0 fully transparent.
    pub(crate) transparency: f32,
    /// Custom blend applied when compositing the offscreen buffer.
    pub(crate) composite: Option<CompositeFn>,
    /// Cached cumulative z, valid for the current build pass.
    pub(crate) z_cache: Cell<Option<i64>>,
    /// The widget's z-delta as reported at registration.
    pub(crate) z_delta: i32,
    /// The widget's pass-through flag as reported at registration.
    pub(crate) pass_through: bool,
    /// The widget's default size as reported at registration.
    pub(crate) default_size: Expanse,
    /// Build pass in which this widget was last registered.
    pub(crate) registered: u64,
    /// Children as they were at the end of the previous update.
    pub(crate) prev_snapshot: Vec<ChildSnapshot>,
    /// Buffer used to composite this widget's subtree.
    pub(crate) offscreen: Option<Offscreen>,
    /// Self-requested redraw.
    pub(crate) dirty: bool,
    /// Transient events emitted by this widget during the current frame.
    pub(crate) events: Vec<Box<dyn Any>>,
    /// Diagnostic name.
    pub(crate) name: WidgetName,
}

impl WidgetState {
    /// Fresh state for a newly created widget.
    pub(crate) fn new(name: WidgetName) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            position: Point::zero(),
            size: None,
            hidden: false,
            disabled: false,
            transparency: 0.0,
            composite: None,
            z_cache: Cell::new(None),
            z_delta: 0,
            pass_through: false,
            default_size: Expanse::default(),
            registered: 0,
            prev_snapshot: Vec::new(),
            offscreen: None,
            dirty: false,
            events: Vec::new(),
            name,
        }
    }

    /// Current size, explicit or default.
    pub(crate) fn size(&self) -> Expanse {
        self.size.unwrap_or(self.default_size)
    }

    /// Unclipped bounds in screen coordinates.
    pub(crate) fn bounds(&self) -> Rect {
        Rect::at(self.position, self.size())
    }

    /// Does drawing this widget go through its offscreen buffer?
    pub(crate) fn needs_compositing(&self) -> bool {
        self.transparency > 0.0 || self.composite.is_some()
    }

    /// Reset the per-pass structure ahead of a build pass.
    pub(crate) fn begin_pass(&mut self) {
        self.parent = None;
        self.children.clear();
        self.z_cache.set(None);
    }
}

impl fmt::Debug for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetState")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("bounds", &self.bounds())
            .field("hidden", &self.hidden)
            .field("disabled", &self.disabled)
            .field("transparency", &self.transparency)
            .field("z_delta", &self.z_delta)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_convert() {
        assert_eq!(WidgetName::convert("foo"), "foo");
        assert_eq!(WidgetName::convert("Foo"), "foo");
        assert_eq!(WidgetName::convert("FooBar"), "foo_bar");
        assert_eq!(WidgetName::convert("FooBar Voing"), "foo_bar_voing");
        assert_eq!(WidgetName::convert(""), "widget");
        assert_eq!(WidgetName::convert("!!!"), "widget");
    }

    #[test]
    fn size_falls_back_to_default() {
        let mut s = WidgetState::new(WidgetName::convert("x"));
        s.default_size = Expanse::new(3, 4);
        s.position = Point::new(1, 1);
        assert_eq!(s.bounds(), Rect::new(1, 1, 3, 4));
        s.size = Some(Expanse::new(10, 10));
        assert_eq!(s.bounds(), Rect::new(1, 1, 10, 10));
        assert!(!s.needs_compositing());
        s.transparency = 0.5;
        assert!(s.needs_compositing());
    }
}
