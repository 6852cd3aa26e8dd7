//! Widget trait and input outcome types.

use std::any::{Any, type_name};

use crate::{
    appender::ChildAppender,
    context::Context,
    cursor::CursorShape,
    error::Result,
    geom::Expanse,
    render::Canvas,
    state::WidgetName,
};

/// Z-delta conventionally used by popups and other overlays, lifting them well
/// above their logical siblings.
pub const OVERLAY_Z_DELTA: i32 = 16;

/// The result of an input handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InputOutcome {
    /// The input was processed; no other widget sees this input kind this frame.
    Handle,
    /// Stop offering this input kind to other widgets without handling it.
    Abort,
    /// The input was not handled and is offered to the next widget.
    Ignore,
}

impl InputOutcome {
    /// Does this outcome end dispatch for the frame?
    pub fn stops(self) -> bool {
        !matches!(self, Self::Ignore)
    }
}

/// Widgets are the behavior attached to nodes in the tree arena.
///
/// Only `build` and `draw` are required; every other capability has a no-op
/// default.
pub trait Widget: Any {
    /// Declare this widget's children for the current pass. Called twice per
    /// frame, so it must not have external side effects.
    fn build(&mut self, ctx: &mut Context<'_>, children: &mut ChildAppender) -> Result<()>;

    /// Paint this widget. Children are painted by the engine.
    fn draw(&self, ctx: &Context<'_>, canvas: &mut Canvas<'_>);

    /// Offered continuous pointer input.
    fn handle_pointing_input(&mut self, _ctx: &mut Context<'_>) -> InputOutcome {
        InputOutcome::Ignore
    }

    /// Offered discrete key input when this widget is on the focus chain.
    fn handle_button_input(&mut self, _ctx: &mut Context<'_>) -> InputOutcome {
        InputOutcome::Ignore
    }

    /// Advance animations and timers.
    fn tick(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Cursor shape to show while the pointer is over this widget.
    fn cursor_shape(&self, _ctx: &Context<'_>) -> Option<CursorShape> {
        None
    }

    /// Offset added to the parent's cumulative z.
    fn z_delta(&self) -> i32 {
        0
    }

    /// Size used when the parent did not assign one.
    fn default_size(&self) -> Expanse {
        Expanse::default()
    }

    /// Exclude this widget and its subtree from hit testing and input.
    fn pass_through(&self) -> bool {
        false
    }

    /// Name used in diagnostics.
    fn name(&self) -> WidgetName {
        let name = type_name::<Self>();
        let short = name.rsplit("::").next().unwrap_or(name);
        WidgetName::convert(short)
    }
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}
