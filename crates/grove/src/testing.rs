//! Test helpers: a configurable widget that journals its callbacks, and a
//! harness driving an [`App`] against a [`Headless`] host.

use std::{cell::RefCell, rc::Rc};

use image::RgbaImage;

use crate::{
    App, ChildAppender, Context, CursorShape, DebugConfig, Headless, InputOutcome, TypedId,
    Widget, WidgetId,
    error::{Error, Result},
    geom::{Expanse, Point, Rect},
    render::{Canvas, Color},
};

/// A widget callback recorded in a [`Journal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// `build` ran.
    Build,
    /// `handle_pointing_input` ran.
    Pointing,
    /// `handle_button_input` ran.
    Button,
    /// `tick` ran.
    Tick,
    /// `draw` ran.
    Draw,
}

/// Shared, ordered record of widget callbacks.
pub type Journal = Rc<RefCell<Vec<(WidgetId, Call)>>>;

/// How a [`Block`] registers one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `append`.
    Default,
    /// `append_at`.
    At(Point),
    /// `append_with_bounds`.
    Bounds(Rect),
}

/// A widget whose every capability is configured by plain fields.
#[derive(Debug, Default)]
pub struct Block {
    /// Children to register, in order.
    pub children: Vec<(WidgetId, Slot)>,
    /// Fill painted over the widget's bounds.
    pub fill: Option<Color>,
    /// Reported z-delta.
    pub z_delta: i32,
    /// Reported pass-through flag.
    pub pass_through: bool,
    /// Reported default size.
    pub default_size: Expanse,
    /// Reported cursor shape.
    pub cursor: Option<CursorShape>,
    /// Outcome returned for pointing input.
    pub pointing: Option<InputOutcome>,
    /// Outcome returned for button input.
    pub button: Option<InputOutcome>,
    /// Fail the next build with this message.
    pub fail_build: Option<String>,
    /// Fail the next tick with this message.
    pub fail_tick: Option<String>,
    /// Where callbacks are recorded.
    pub journal: Journal,
}

impl Block {
    /// A block painting `fill`.
    pub fn filled(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            ..Default::default()
        }
    }

    /// Record a callback.
    fn log(&self, id: WidgetId, call: Call) {
        self.journal.borrow_mut().push((id, call));
    }
}

impl Widget for Block {
    fn build(&mut self, ctx: &mut Context<'_>, children: &mut ChildAppender) -> Result<()> {
        self.log(ctx.id(), Call::Build);
        if let Some(msg) = &self.fail_build {
            return Err(Error::Build(msg.clone()));
        }
        for (id, slot) in &self.children {
            match slot {
                Slot::Default => children.append(*id),
                Slot::At(p) => children.append_at(*id, *p),
                Slot::Bounds(r) => children.append_with_bounds(*id, *r),
            }
        }
        Ok(())
    }

    fn draw(&self, ctx: &Context<'_>, canvas: &mut Canvas<'_>) {
        self.log(ctx.id(), Call::Draw);
        if let Some(fill) = self.fill {
            canvas.fill_rect(ctx.bounds(ctx.id()), fill);
        }
    }

    fn handle_pointing_input(&mut self, ctx: &mut Context<'_>) -> InputOutcome {
        self.log(ctx.id(), Call::Pointing);
        self.pointing.unwrap_or(InputOutcome::Ignore)
    }

    fn handle_button_input(&mut self, ctx: &mut Context<'_>) -> InputOutcome {
        self.log(ctx.id(), Call::Button);
        self.button.unwrap_or(InputOutcome::Ignore)
    }

    fn tick(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.log(ctx.id(), Call::Tick);
        match &self.fail_tick {
            Some(msg) => Err(Error::Tick(msg.clone())),
            None => Ok(()),
        }
    }

    fn cursor_shape(&self, _ctx: &Context<'_>) -> Option<CursorShape> {
        self.cursor
    }

    fn z_delta(&self) -> i32 {
        self.z_delta
    }

    fn default_size(&self) -> Expanse {
        self.default_size
    }

    fn pass_through(&self) -> bool {
        self.pass_through
    }
}

/// Drives an [`App`] with a [`Block`] root against a [`Headless`] host and an
/// in-memory screen.
pub struct Harness {
    /// The app under test.
    pub app: App,
    /// The host.
    pub host: Headless,
    /// Drawing target, sized to the viewport.
    pub screen: RgbaImage,
    /// Callbacks of every block created through the harness.
    pub journal: Journal,
}

impl Harness {
    /// A harness with a `size` viewport at device scale 1.
    pub fn new(size: Expanse) -> Self {
        Self::with_config(size, DebugConfig::default())
    }

    /// A harness with explicit debug configuration.
    pub fn with_config(size: Expanse, config: DebugConfig) -> Self {
        let journal = Journal::default();
        let root = Block {
            journal: journal.clone(),
            ..Default::default()
        };
        let mut app = App::new(root, config);
        let size = app.layout(size, 1.0);
        Self {
            app,
            host: Headless::new(),
            screen: RgbaImage::new(size.w, size.h),
            journal,
        }
    }

    /// The root block.
    pub fn root(&self) -> WidgetId {
        self.app.root()
    }

    /// Add a detached block that shares the harness journal.
    pub fn block(&mut self, mut block: Block) -> TypedId<Block> {
        block.journal = self.journal.clone();
        self.app.insert(block)
    }

    /// Mutate a block between frames.
    pub fn with_block<R>(&mut self, id: impl Into<WidgetId>, f: impl FnOnce(&mut Block) -> R) -> R {
        self.app
            .with_widget(id, |b: &mut Block, _| f(b))
            .expect("harness widget is a live block")
    }

    /// Register `child` under `parent`.
    pub fn attach(&mut self, parent: impl Into<WidgetId>, child: impl Into<WidgetId>, slot: Slot) {
        let child = child.into();
        self.with_block(parent, |b| b.children.push((child, slot)));
    }

    /// Run the host's update callback.
    pub fn update(&mut self) -> Result<()> {
        self.app.update(&mut self.host)
    }

    /// Run the host's draw callback.
    pub fn draw(&mut self) -> bool {
        self.app.draw(&mut self.screen)
    }

    /// Update, then draw.
    pub fn frame(&mut self) -> Result<bool> {
        self.update()?;
        Ok(self.draw())
    }

    /// Change the viewport, resizing the screen to match.
    pub fn resize(&mut self, size: Expanse) {
        let size = self.app.layout(size, 1.0);
        self.screen = RgbaImage::new(size.w, size.h);
    }

    /// A screen pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        *self.screen.get_pixel(x, y)
    }

    /// Drain the journal.
    pub fn take_journal(&self) -> Vec<(WidgetId, Call)> {
        self.journal.take()
    }

    /// Drained journal entries for one kind of callback.
    pub fn take_calls(&self, call: Call) -> Vec<WidgetId> {
        self.take_journal()
            .into_iter()
            .filter(|(_, c)| *c == call)
            .map(|(id, _)| id)
            .collect()
    }
}
