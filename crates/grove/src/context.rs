//! The facade handed to every widget callback.

use std::any::Any;

use tracing::debug;

use crate::{
    color::{ColorMode, ColorModeCache},
    config::DebugConfig,
    error::{Error, Result},
    geom::{Expanse, Point, Rect},
    id::{TypedId, WidgetId},
    input::InputState,
    render::CompositeFn,
    state::WidgetName,
    tree::Tree,
    widget::Widget,
    zorder,
};

/// App-wide values shared by every callback in a frame.
#[derive(Debug)]
pub struct Env {
    /// Debug toggles.
    pub(crate) config: DebugConfig,
    /// Input polled at the start of the update.
    pub(crate) input: InputState,
    /// Device scale in effect.
    pub(crate) device_scale: f64,
    /// Application zoom on top of the device scale.
    pub(crate) app_scale: f64,
    /// Explicit color mode, overriding auto-detection.
    pub(crate) color_override: Option<ColorMode>,
    /// Auto-detected color mode.
    pub(crate) color_cache: ColorModeCache,
    /// Drawable size requested by the last layout.
    pub(crate) viewport: Expanse,
    /// Repaint everything after the next diff.
    pub(crate) full_invalidation: bool,
}

impl Env {
    /// Environment for a new app.
    pub(crate) fn new(config: DebugConfig) -> Self {
        Self {
            device_scale: config.device_scale.unwrap_or(1.0),
            config,
            input: InputState::default(),
            app_scale: 1.0,
            color_override: None,
            color_cache: ColorModeCache::default(),
            viewport: Expanse::default(),
            full_invalidation: true,
        }
    }

    /// The color mode in effect.
    pub(crate) fn color_mode(&self) -> ColorMode {
        self.color_override
            .unwrap_or_else(|| self.color_cache.current())
    }

    /// Request a full repaint, logging why.
    pub(crate) fn invalidate_all(&mut self, cause: &str) {
        if !self.full_invalidation {
            debug!(target: "grove::damage", cause, "full invalidation");
        }
        self.full_invalidation = true;
    }
}

/// Engine access for one widget callback. `id()` names the widget being called;
/// every other method can address any widget.
pub struct Context<'a> {
    /// The widget arena.
    tree: &'a mut Tree,
    /// App-wide values.
    env: &'a mut Env,
    /// The widget being called.
    id: WidgetId,
}

impl<'a> Context<'a> {
    /// A context for a callback on `id`.
    pub(crate) fn new(tree: &'a mut Tree, env: &'a mut Env, id: WidgetId) -> Self {
        Self { tree, env, id }
    }

    /// The widget this callback runs for.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// The root widget.
    pub fn root(&self) -> WidgetId {
        self.tree.root()
    }

    /// Diagnostic name of a widget.
    pub fn name(&self, id: impl Into<WidgetId>) -> Option<WidgetName> {
        self.tree.state(id.into()).map(|s| s.name.clone())
    }

    /// Parent of a widget in the current pass.
    pub fn parent(&self, id: impl Into<WidgetId>) -> Option<WidgetId> {
        self.tree.parent(id.into())
    }

    /// Children of a widget in the current pass.
    pub fn children(&self, id: impl Into<WidgetId>) -> Vec<WidgetId> {
        self.tree.children(id.into()).to_vec()
    }

    /// Combined device and application scale.
    pub fn scale(&self) -> f64 {
        self.env.device_scale * self.env.app_scale
    }

    /// Device pixels per logical pixel.
    pub fn device_scale(&self) -> f64 {
        self.env.device_scale
    }

    /// Application zoom factor.
    pub fn app_scale(&self) -> f64 {
        self.env.app_scale
    }

    /// Change the application zoom factor, repainting everything.
    pub fn set_app_scale(&mut self, scale: f64) -> Result<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Config(format!("app scale must be positive: {scale}")));
        }
        if (scale - self.env.app_scale).abs() > f64::EPSILON {
            self.env.app_scale = scale;
            self.env.invalidate_all("app scale");
        }
        Ok(())
    }

    /// The color mode: the explicit override, or the auto-detected mode.
    pub fn color_mode(&self) -> ColorMode {
        self.env.color_mode()
    }

    /// Set or clear the color mode override.
    pub fn set_color_mode(&mut self, mode: Option<ColorMode>) {
        let before = self.env.color_mode();
        self.env.color_override = mode;
        if self.env.color_mode() != before {
            self.env.invalidate_all("color mode");
        }
    }

    /// Drawable size of the whole surface.
    pub fn viewport(&self) -> Expanse {
        self.env.viewport
    }

    /// Input polled for this update.
    pub fn input(&self) -> &InputState {
        &self.env.input
    }

    /// Debug toggles.
    pub fn config(&self) -> &DebugConfig {
        &self.env.config
    }

    /// Top-left corner of a widget in screen coordinates.
    pub fn position(&self, id: impl Into<WidgetId>) -> Point {
        self.tree
            .state(id.into())
            .map_or_else(Point::zero, |s| s.position)
    }

    /// Size of a widget: explicit if assigned, otherwise its default size.
    pub fn size(&self, id: impl Into<WidgetId>) -> Expanse {
        self.tree
            .state(id.into())
            .map_or_else(Expanse::default, |s| s.size())
    }

    /// Position and size of a widget.
    pub fn bounds(&self, id: impl Into<WidgetId>) -> Rect {
        self.tree
            .state(id.into())
            .map_or_else(Rect::zero, |s| s.bounds())
    }

    /// Bounds clipped by every ancestor. Overlays are not clipped by their
    /// parent.
    pub fn visible_bounds(&self, id: impl Into<WidgetId>) -> Rect {
        self.tree.visible_bounds(id.into())
    }

    /// Cumulative z of a widget.
    pub fn z(&self, id: impl Into<WidgetId>) -> i64 {
        self.tree.cumulative_z(id.into())
    }

    /// Is the widget and every ancestor shown?
    pub fn is_visible(&self, id: impl Into<WidgetId>) -> bool {
        self.tree.is_visible(id.into())
    }

    /// Show or hide a widget.
    pub fn set_visible(&mut self, id: impl Into<WidgetId>, visible: bool) {
        let id = id.into();
        if let Some(s) = self.tree.state_mut(id)
            && s.hidden == visible
        {
            s.hidden = !visible;
            self.tree.mark_dirty(id);
        }
    }

    /// Is the widget and every ancestor enabled?
    pub fn is_enabled(&self, id: impl Into<WidgetId>) -> bool {
        self.tree.is_enabled(id.into())
    }

    /// Enable or disable a widget.
    pub fn set_enabled(&mut self, id: impl Into<WidgetId>, enabled: bool) {
        let id = id.into();
        if let Some(s) = self.tree.state_mut(id)
            && s.disabled == enabled
        {
            s.disabled = !enabled;
            self.tree.mark_dirty(id);
        }
    }

    /// The focused widget.
    pub fn focused(&self) -> Option<WidgetId> {
        self.tree.focus
    }

    /// Is this widget focused?
    pub fn is_focused(&self, id: impl Into<WidgetId>) -> bool {
        self.tree.focus == Some(id.into())
    }

    /// Is this widget or one of its descendants focused?
    pub fn is_focused_or_has_focused_child(&self, id: impl Into<WidgetId>) -> bool {
        self.tree.is_on_focus_chain(id.into())
    }

    /// Focus a widget. Returns false, leaving focus unchanged, if the target is
    /// hidden, disabled or detached.
    pub fn set_focus(&mut self, id: impl Into<WidgetId>) -> bool {
        self.tree.set_focus(id.into())
    }

    /// Clear focus from a subtree. Focus moves to the root if it was inside.
    pub fn blur(&mut self, id: impl Into<WidgetId>) {
        self.tree.blur(id.into());
    }

    /// Opacity of a widget: 1.0 is opaque.
    pub fn opacity(&self, id: impl Into<WidgetId>) -> f32 {
        self.tree
            .state(id.into())
            .map_or(1.0, |s| 1.0 - s.transparency)
    }

    /// Set a widget's opacity, clamped to `0.0..=1.0`.
    pub fn set_opacity(&mut self, id: impl Into<WidgetId>, opacity: f32) {
        let id = id.into();
        let transparency = 1.0 - opacity.clamp(0.0, 1.0);
        if let Some(s) = self.tree.state_mut(id)
            && s.transparency != transparency
        {
            s.transparency = transparency;
            self.tree.mark_dirty(id);
        }
    }

    /// Set or clear a widget's custom composite function.
    pub fn set_composite(&mut self, id: impl Into<WidgetId>, composite: Option<CompositeFn>) {
        let id = id.into();
        if let Some(s) = self.tree.state_mut(id) {
            s.composite = composite;
            self.tree.mark_dirty(id);
        }
    }

    /// Is the widget hit at the current pointer position?
    pub fn is_hit(&self, id: impl Into<WidgetId>) -> bool {
        self.env
            .input
            .pointer()
            .is_some_and(|p| zorder::is_hit(self.tree, id.into(), p))
    }

    /// Is the widget hit at `p`?
    pub fn is_hit_at(&self, id: impl Into<WidgetId>, p: Point) -> bool {
        zorder::is_hit(self.tree, id.into(), p)
    }

    /// Widgets covering `p`, topmost first.
    pub fn widgets_at(&self, p: Point) -> Vec<WidgetId> {
        zorder::hit_list(self.tree, p)
    }

    /// Add a new, detached widget to the arena. It joins the tree when a
    /// parent appends it.
    pub fn create<W: Widget>(&mut self, widget: W) -> TypedId<W> {
        TypedId::new(self.tree.insert(Box::new(widget)))
    }

    /// Ask for a widget's visible bounds to be repainted.
    pub fn request_redraw(&mut self, id: impl Into<WidgetId>) {
        self.tree.mark_dirty(id.into());
    }

    /// Queue an event on the calling widget. Events live until the end of the
    /// current update.
    pub fn emit<E: Any>(&mut self, event: E) {
        if let Some(s) = self.tree.state_mut(self.id) {
            s.events.push(Box::new(event));
        }
    }

    /// Events of type `E` emitted by a widget during this update, in order.
    pub fn events<E: Any>(&self, id: impl Into<WidgetId>) -> impl Iterator<Item = &E> {
        self.tree
            .state(id.into())
            .into_iter()
            .flat_map(|s| s.events.iter())
            .filter_map(|e| e.downcast_ref::<E>())
    }
}
