use std::{cell::RefCell, collections::BTreeSet};

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    geom::{Rect, Region},
    id::WidgetId,
    state::WidgetState,
    widget::Widget,
    zorder::HitCache,
};

/// A widget and its engine-owned state.
pub struct Node {
    /// The widget. `None` only while one of its callbacks is running.
    pub(crate) widget: Option<Box<dyn Widget>>,
    /// Engine state for the widget.
    pub(crate) state: WidgetState,
}

/// Arena holding every live widget, plus the per-frame structures derived
/// from it.
pub struct Tree {
    /// Widget storage.
    pub(crate) nodes: SlotMap<WidgetId, Node>,
    /// The root widget.
    pub(crate) root: WidgetId,
    /// Focused widget, if any.
    pub(crate) focus: Option<WidgetId>,
    /// Current build pass generation.
    pub(crate) pass: u64,
    /// Distinct cumulative z values present in the attached tree, ascending.
    pub(crate) layers: Vec<i64>,
    /// Screen area awaiting repaint.
    pub(crate) damage: Region,
    /// Recent hit-test results.
    pub(crate) hits: RefCell<HitCache>,
}

impl Tree {
    /// Create a tree holding only the root widget. The root starts focused.
    pub fn new(root: Box<dyn Widget>) -> Self {
        let mut nodes = SlotMap::with_key();
        let state = WidgetState::new(root.name());
        let root = nodes.insert(Node {
            widget: Some(root),
            state,
        });
        Self {
            nodes,
            root,
            focus: Some(root),
            pass: 0,
            layers: Vec::new(),
            damage: Region::new(),
            hits: RefCell::new(HitCache::default()),
        }
    }

    /// The root widget id.
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Add a detached widget to the arena.
    pub fn insert(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let state = WidgetState::new(widget.name());
        self.nodes.insert(Node {
            widget: Some(widget),
            state,
        })
    }

    /// Remove a widget from the arena. Its children stay in the arena, detached
    /// until they are registered again.
    pub fn remove(&mut self, id: WidgetId) -> Result<()> {
        if id == self.root {
            return Err(Error::Tree("cannot remove the root".into()));
        }
        let current = self.nodes.get(id).ok_or(Error::NotFound(id))?;
        if current.widget.is_none() {
            return Err(Error::Tree(format!(
                "cannot remove {} while it is running",
                current.state.name
            )));
        }
        let focus_inside = self.is_on_focus_chain(id);
        let node = self.nodes.remove(id).ok_or(Error::NotFound(id))?;
        if let Some(parent) = node.state.parent
            && let Some(p) = self.nodes.get_mut(parent)
        {
            p.state.children.retain(|c| *c != id);
            p.state.dirty = true;
        }
        for c in node.state.children {
            if let Some(n) = self.nodes.get_mut(c) {
                n.state.parent = None;
            }
        }
        if focus_inside {
            debug!(target: "grove::focus", widget = %node.state.name, "removed with focus, refocusing root");
            self.focus = Some(self.root);
        }
        self.hits.borrow_mut().clear();
        Ok(())
    }

    /// Does the arena hold this widget?
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a widget's state.
    pub(crate) fn state(&self, id: WidgetId) -> Option<&WidgetState> {
        self.nodes.get(id).map(|n| &n.state)
    }

    /// Mutably borrow a widget's state.
    pub(crate) fn state_mut(&mut self, id: WidgetId) -> Option<&mut WidgetState> {
        self.nodes.get_mut(id).map(|n| &mut n.state)
    }

    /// Borrow the state of a widget the engine knows to be live.
    pub(crate) fn live(&self, id: WidgetId) -> &WidgetState {
        &self
            .nodes
            .get(id)
            .expect("engine-held widget id must be live")
            .state
    }

    /// Children of a widget in declaration order.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.state(id).map_or(&[], |s| s.children.as_slice())
    }

    /// Parent of a widget.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.state(id).and_then(|s| s.parent)
    }

    /// Is `ancestor` equal to `id` or on its parent chain?
    pub fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Does the widget's parent chain reach the root?
    pub fn is_attached(&self, id: WidgetId) -> bool {
        self.contains(id) && self.is_ancestor_or_self(self.root, id)
    }

    /// Take a widget out of its slot for the duration of `f`, giving `f`
    /// mutable access to both the widget and the rest of the tree.
    pub(crate) fn with_widget_mut<R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut dyn Widget, &mut Self) -> R,
    ) -> Result<R> {
        let node = self.nodes.get_mut(id).ok_or(Error::NotFound(id))?;
        let mut widget = node.widget.take().ok_or_else(|| {
            Error::Tree(format!("{} re-entered while running", node.state.name))
        })?;
        let out = f(widget.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }
        Ok(out)
    }

    /// Reset per-pass structure across the whole arena and open a new pass.
    pub(crate) fn begin_pass(&mut self) {
        self.pass += 1;
        for (_, node) in self.nodes.iter_mut() {
            node.state.begin_pass();
        }
        let pass = self.pass;
        let root = self.root;
        self.register(root, pass);
        self.hits.borrow_mut().clear();
    }

    /// Mark a widget as registered in `pass`, snapshotting its capabilities.
    pub(crate) fn register(&mut self, id: WidgetId, pass: u64) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(w) = node.widget.as_deref() {
            node.state.z_delta = w.z_delta();
            node.state.pass_through = w.pass_through();
            node.state.default_size = w.default_size();
        }
        node.state.registered = pass;
    }

    /// Attached widgets in pre-order, children in declaration order.
    pub fn walk(&self) -> Vec<WidgetId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Effective visibility: the widget and all of its ancestors are shown.
    pub fn is_visible(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            match self.state(c) {
                Some(s) if !s.hidden => current = s.parent,
                _ => return false,
            }
        }
        true
    }

    /// Effective enablement: the widget and all of its ancestors are enabled.
    pub fn is_enabled(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            match self.state(c) {
                Some(s) if !s.disabled => current = s.parent,
                _ => return false,
            }
        }
        true
    }

    /// Cumulative z: the parent's cumulative z plus the widget's own z-delta.
    pub fn cumulative_z(&self, id: WidgetId) -> i64 {
        let Some(state) = self.state(id) else {
            return 0;
        };
        if let Some(z) = state.z_cache.get() {
            return z;
        }
        let base = state.parent.map_or(0, |p| self.cumulative_z(p));
        let z = base + i64::from(state.z_delta);
        state.z_cache.set(Some(z));
        z
    }

    /// Bounds intersected with every ancestor's visible bounds. Widgets with a
    /// non-zero z-delta are not clipped by their parent.
    pub fn visible_bounds(&self, id: WidgetId) -> Rect {
        let Some(state) = self.state(id) else {
            return Rect::zero();
        };
        let bounds = state.bounds();
        match state.parent {
            Some(p) if state.z_delta == 0 => self
                .visible_bounds(p)
                .intersect(&bounds)
                .unwrap_or_else(Rect::zero),
            _ => bounds,
        }
    }

    /// Recompute the sorted set of distinct cumulative z values.
    pub(crate) fn compute_layers(&mut self) {
        let layers: BTreeSet<i64> = self
            .walk()
            .into_iter()
            .map(|id| self.cumulative_z(id))
            .collect();
        self.layers = layers.into_iter().collect();
    }

    /// The z layers, ascending.
    pub fn layers(&self) -> &[i64] {
        &self.layers
    }

    /// Flag a widget for repaint. Hit results may depend on the change, so the
    /// hit cache is dropped too.
    pub(crate) fn mark_dirty(&mut self, id: WidgetId) {
        if let Some(s) = self.state_mut(id) {
            s.dirty = true;
            self.hits.borrow_mut().clear();
        }
    }

    /// Add a screen rectangle to the damage region.
    pub(crate) fn invalidate(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.damage.add(rect);
        self.hits.borrow_mut().clear();
    }

    /// Move focus to `id`. Refuses hidden, disabled or detached targets.
    pub fn set_focus(&mut self, id: WidgetId) -> bool {
        if !self.is_attached(id) || !self.is_visible(id) || !self.is_enabled(id) {
            warn!(target: "grove::focus", widget = ?id, "refusing focus on hidden, disabled or detached widget");
            return false;
        }
        if self.focus != Some(id) {
            debug!(target: "grove::focus", widget = %self.live(id).name, "focus");
            self.focus = Some(id);
        }
        true
    }

    /// Clear focus from a subtree, handing it to the root when the focused
    /// widget lies inside.
    pub fn blur(&mut self, id: WidgetId) {
        if let Some(f) = self.focus
            && self.is_ancestor_or_self(id, f)
        {
            debug!(target: "grove::focus", widget = %self.live(f).name, "blur to root");
            self.focus = Some(self.root);
        }
    }

    /// Hand focus back to the root if the focused widget is no longer
    /// attached.
    pub(crate) fn repair_focus(&mut self) {
        if let Some(f) = self.focus
            && !self.is_attached(f)
        {
            debug!(target: "grove::focus", widget = ?f, "focused widget detached, refocusing root");
            self.focus = Some(self.root);
        }
    }

    /// Is the widget focused, or is one of its descendants?
    pub fn is_on_focus_chain(&self, id: WidgetId) -> bool {
        self.focus.is_some_and(|f| self.is_ancestor_or_self(id, f))
    }
}
