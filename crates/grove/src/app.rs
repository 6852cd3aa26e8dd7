//! The frame engine: rebuilds the tree, dispatches input, diffs snapshots and
//! paints the invalidated region.

use std::{
    any::{Any, type_name},
    mem,
    time::Instant,
};

use image::{Rgba, RgbaImage};

use crate::{
    appender::ChildAppender,
    color::ColorMode,
    config::DebugConfig,
    context::{Context, Env},
    cursor::CursorShape,
    error::{Error, Result},
    geom::{Expanse, Point, Rect, Region},
    id::{TypedId, WidgetId},
    input::InputKind,
    platform::Platform,
    render::{Canvas, Offscreen, TRANSPARENT},
    state::ChildSnapshot,
    tree::Tree,
    widget::Widget,
    zorder,
};

/// Outline color for the redraw-region debug overlay.
const REDRAW_OUTLINE: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Owns the widget tree and drives it from the host's update and draw
/// callbacks.
pub struct App {
    /// The widget arena.
    tree: Tree,
    /// App-wide values shared with widget callbacks.
    env: Env,
    /// Viewport at the previous diff.
    last_viewport: Expanse,
    /// Effective color mode at the previous poll.
    last_color_mode: ColorMode,
}

impl App {
    /// Create an app around a root widget.
    pub fn new(root: impl Widget, config: DebugConfig) -> Self {
        let env = Env::new(config);
        Self {
            tree: Tree::new(Box::new(root)),
            last_color_mode: env.color_mode(),
            env,
            last_viewport: Expanse::default(),
        }
    }

    /// The root widget.
    pub fn root(&self) -> WidgetId {
        self.tree.root()
    }

    /// The widget arena.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Debug toggles in effect.
    pub fn config(&self) -> &DebugConfig {
        &self.env.config
    }

    /// Add a detached widget. It joins the tree when a parent appends it.
    pub fn insert<W: Widget>(&mut self, widget: W) -> TypedId<W> {
        TypedId::new(self.tree.insert(Box::new(widget)))
    }

    /// Remove a widget and release its state, including any offscreen buffer.
    pub fn remove(&mut self, id: impl Into<WidgetId>) -> Result<()> {
        self.tree.remove(id.into())
    }

    /// Run `f` with mutable access to a widget of type `W` and a context for it.
    pub fn with_widget<W, R>(
        &mut self,
        id: impl Into<WidgetId>,
        f: impl FnOnce(&mut W, &mut Context<'_>) -> R,
    ) -> Result<R>
    where
        W: Widget,
    {
        let id = id.into();
        let env = &mut self.env;
        self.tree.with_widget_mut(id, |widget, tree| {
            let any = widget as &mut dyn Any;
            let widget = any
                .downcast_mut::<W>()
                .ok_or(Error::TypeMismatch(type_name::<W>()))?;
            let mut ctx = Context::new(tree, env, id);
            Ok(f(widget, &mut ctx))
        })?
    }

    /// A context addressing `id`, for host code running between frames.
    pub fn context(&mut self, id: impl Into<WidgetId>) -> Context<'_> {
        Context::new(&mut self.tree, &mut self.env, id.into())
    }

    /// Negotiate the drawable size: the outside size times the device scale,
    /// recorded as the viewport for the next update.
    pub fn layout(&mut self, outside: Expanse, device_scale: f64) -> Expanse {
        let scale = self.env.config.device_scale.unwrap_or(device_scale);
        let size = outside.scale(scale);
        self.env.viewport = size;
        size
    }

    /// The region awaiting repaint.
    pub fn invalidated(&self) -> &Region {
        &self.tree.damage
    }

    /// Widgets covering `p`, topmost first.
    pub fn widgets_at(&self, p: Point) -> Vec<WidgetId> {
        zorder::hit_list(&self.tree, p)
    }

    /// Run one update: build, dispatch input, rebuild, resolve the cursor,
    /// tick, then diff the tree into the invalidated region. A failing build
    /// or tick aborts the rest of the update.
    pub fn update(&mut self, platform: &mut dyn Platform) -> Result<()> {
        self.poll(platform);

        self.build_pass()?;
        self.tree.compute_layers();

        self.dispatch(InputKind::Pointing);
        self.dispatch(InputKind::Button);

        self.build_pass()?;
        self.tree.compute_layers();

        platform.set_cursor_shape(self.cursor_shape());

        self.tick()?;
        for (_, node) in self.tree.nodes.iter_mut() {
            node.state.events.clear();
        }

        self.diff();
        self.collect_dirty();
        Ok(())
    }

    /// Snapshot host input and scale, refresh the color mode and size the root.
    fn poll(&mut self, platform: &dyn Platform) {
        self.env.input.advance(
            platform.pointer_position(),
            platform.pointer_buttons(),
            platform.pressed_keys(),
        );

        let device = self
            .env
            .config
            .device_scale
            .unwrap_or_else(|| platform.device_scale());
        if (device - self.env.device_scale).abs() > f64::EPSILON {
            self.env.device_scale = device;
            self.env.invalidate_all("device scale");
        }

        self.env
            .color_cache
            .refresh(Instant::now(), || platform.color_mode());
        let mode = self.env.color_mode();
        if mode != self.last_color_mode {
            self.last_color_mode = mode;
            self.env.invalidate_all("color mode");
        }

        let root = self.tree.root();
        let viewport = self.env.viewport;
        if let Some(s) = self.tree.state_mut(root) {
            s.position = Point::zero();
            s.size = Some(viewport);
        }
    }

    /// Rebuild the tree from the root down. Focus left on a widget that was
    /// not appended this pass returns to the root.
    fn build_pass(&mut self) -> Result<()> {
        self.tree.begin_pass();
        tracing::trace!(pass = self.tree.pass, "build pass");
        let root = self.tree.root();
        self.build(root)?;
        self.tree.repair_focus();
        Ok(())
    }

    /// Build one widget, commit its children, then build them in order.
    fn build(&mut self, id: WidgetId) -> Result<()> {
        let mut children = ChildAppender::new(id);
        let env = &mut self.env;
        self.tree.with_widget_mut(id, |w, tree| {
            w.build(&mut Context::new(tree, env, id), &mut children)
        })??;
        for child in children.commit(&mut self.tree)? {
            self.build(child)?;
        }
        Ok(())
    }

    /// Offer one input kind to widgets, topmost first, until one stops it.
    fn dispatch(&mut self, kind: InputKind) {
        let tree = &self.tree;
        let order = zorder::topmost_first(tree, &|id, s| {
            s.hidden
                || s.disabled
                || s.pass_through
                || (kind == InputKind::Button && !tree.is_on_focus_chain(id))
        });
        for (_, id) in order {
            let env = &mut self.env;
            let outcome = self
                .tree
                .with_widget_mut(id, |w, tree| {
                    let mut ctx = Context::new(tree, env, id);
                    match kind {
                        InputKind::Pointing => w.handle_pointing_input(&mut ctx),
                        InputKind::Button => w.handle_button_input(&mut ctx),
                    }
                })
                .expect("dispatch target must be live and not running");
            if outcome.stops() {
                if self.env.config.log_input {
                    tracing::info!(
                        target: "grove::input",
                        widget = %self.tree.live(id).name,
                        ?kind,
                        ?outcome,
                        "input handled"
                    );
                }
                break;
            }
        }
    }

    /// Cursor shape under the pointer: the first enabled widget in the topmost
    /// hit layer that supplies one.
    fn cursor_shape(&mut self) -> CursorShape {
        let Some(p) = self.env.input.pointer() else {
            return CursorShape::Default;
        };
        let hits = zorder::hit_list(&self.tree, p);
        let Some(top) = hits.first().map(|id| self.tree.cumulative_z(*id)) else {
            return CursorShape::Default;
        };
        for id in hits {
            if self.tree.cumulative_z(id) != top {
                break;
            }
            if !self.tree.is_enabled(id) {
                continue;
            }
            let env = &mut self.env;
            let shape = self
                .tree
                .with_widget_mut(id, |w, tree| w.cursor_shape(&Context::new(tree, env, id)))
                .expect("hit widget must be live and not running");
            if let Some(shape) = shape {
                return shape;
            }
        }
        CursorShape::Default
    }

    /// Tick every attached widget, depth-first.
    fn tick(&mut self) -> Result<()> {
        for id in self.tree.walk() {
            let env = &mut self.env;
            self.tree
                .with_widget_mut(id, |w, tree| w.tick(&mut Context::new(tree, env, id)))??;
        }
        Ok(())
    }

    /// Current snapshot of a widget's children.
    fn snapshot(&self, id: WidgetId) -> Vec<ChildSnapshot> {
        self.tree
            .children(id)
            .iter()
            .map(|&c| ChildSnapshot {
                id: c,
                z: self.tree.cumulative_z(c),
                z_delta: self.tree.live(c).z_delta,
                visible: self.tree.is_visible(c),
                bounds: self.tree.visible_bounds(c),
            })
            .collect()
    }

    /// Invalidate what changed since the previous update and store the new
    /// snapshots.
    fn diff(&mut self) {
        let full = self.env.viewport != self.last_viewport || self.env.full_invalidation;
        self.last_viewport = self.env.viewport;
        self.env.full_invalidation = false;
        if full {
            tracing::debug!(target: "grove::damage", viewport = ?self.env.viewport, "repainting viewport");
            self.tree.invalidate(self.env.viewport.rect());
        }

        for id in self.tree.walk() {
            let current = self.snapshot(id);
            let prev = &self.tree.live(id).prev_snapshot;
            if !full && current != *prev {
                let mut damage = vec![self.tree.visible_bounds(id)];
                damage.extend(overlay_bounds(&current));
                damage.extend(overlay_bounds(prev));
                tracing::trace!(target: "grove::damage", widget = %self.tree.live(id).name, "children changed");
                for r in damage {
                    self.tree.invalidate(r);
                }
            }
            if let Some(s) = self.tree.state_mut(id) {
                s.prev_snapshot = current;
            }
        }
    }

    /// Fold self-requested redraws into the invalidated region.
    fn collect_dirty(&mut self) {
        let dirty: Vec<WidgetId> = self
            .tree
            .nodes
            .iter()
            .filter(|(_, n)| n.state.dirty)
            .map(|(id, _)| id)
            .collect();
        for id in dirty {
            if self.tree.is_attached(id) {
                let r = self.tree.visible_bounds(id);
                self.tree.invalidate(r);
            }
            if let Some(s) = self.tree.state_mut(id) {
                s.dirty = false;
            }
        }
    }

    /// Paint the invalidated region onto `screen` and clear it. Returns false,
    /// touching nothing, when there is nothing to paint.
    pub fn draw(&mut self, screen: &mut RgbaImage) -> bool {
        let mut region = mem::take(&mut self.tree.damage);
        let surface = Rect::new(0, 0, screen.width(), screen.height());
        match self.env.viewport.rect().intersect(&surface) {
            Some(clip) => region.clip(&clip),
            None => region.clear(),
        }
        if region.is_empty() {
            return false;
        }
        tracing::debug!(
            target: "grove::damage",
            rects = region.rects().len(),
            area = region.area(),
            "draw"
        );

        let root = self.tree.root();
        let layers = self.tree.layers.clone();
        for rect in region.rects() {
            let mut canvas = Canvas::new(screen, Point::zero(), *rect);
            canvas.clear(TRANSPARENT);
            for layer in &layers {
                self.draw_node(root, *layer, &mut canvas);
            }
        }
        if self.env.config.show_redraw_regions {
            for rect in region.rects() {
                Canvas::new(screen, Point::zero(), *rect).stroke_rect(*rect, REDRAW_OUTLINE);
            }
        }
        true
    }

    /// Paint the subtree at `id` for one z layer.
    fn draw_node(&mut self, id: WidgetId, layer: i64, canvas: &mut Canvas<'_>) {
        let state = self.tree.live(id);
        if state.hidden {
            return;
        }
        let children = state.children.clone();
        let composited = state.needs_compositing();
        if self.tree.cumulative_z(id) != layer {
            for c in children {
                self.draw_node(c, layer, canvas);
            }
            return;
        }
        if composited {
            self.draw_composited(id, layer, canvas, &children);
            return;
        }
        if let Some(s) = self.tree.state_mut(id) {
            s.offscreen = None;
        }
        let visible = self.tree.visible_bounds(id);
        self.paint(id, &mut canvas.clipped(visible));
        for c in children {
            self.draw_node(c, layer, canvas);
        }
    }

    /// Paint a widget and its same-layer descendants into its offscreen
    /// buffer, then composite the buffer onto `canvas`.
    fn draw_composited(
        &mut self,
        id: WidgetId,
        layer: i64,
        canvas: &mut Canvas<'_>,
        children: &[WidgetId],
    ) {
        let visible = self.tree.visible_bounds(id);
        let Some(state) = self.tree.state_mut(id) else {
            return;
        };
        let bounds = state.bounds();
        let opacity = 1.0 - state.transparency;
        let blend = state.composite;
        let Some(mut off) = Offscreen::fit(state.offscreen.take(), bounds) else {
            return;
        };
        let Some(clip) = canvas.clip().intersect(&visible) else {
            state.offscreen = Some(off);
            return;
        };
        {
            let mut target = off.canvas(clip);
            target.clear(TRANSPARENT);
            self.paint(id, &mut target);
            for c in children {
                self.draw_node(*c, layer, &mut target);
            }
        }
        canvas.clipped(clip).composite(&off, opacity, blend);
        if let Some(s) = self.tree.state_mut(id) {
            s.offscreen = Some(off);
        }
    }

    /// Call a widget's `draw`.
    fn paint(&mut self, id: WidgetId, canvas: &mut Canvas<'_>) {
        let env = &mut self.env;
        self.tree
            .with_widget_mut(id, |w, tree| w.draw(&Context::new(tree, env, id), canvas))
            .expect("drawn widget must be live and not running");
    }
}

/// Bounds of the overlay children in a snapshot.
fn overlay_bounds(snap: &[ChildSnapshot]) -> impl Iterator<Item = Rect> + '_ {
    snap.iter().filter(|c| c.z_delta != 0).map(|c| c.bounds)
}
