//! Grove: a retained-mode widget tree engine.
//!
//! The host runtime calls [`App::update`] and [`App::draw`] once per tick. Each
//! update rebuilds the tree twice around input dispatch, resolves the cursor,
//! ticks every widget and diffs each widget's children against the previous
//! frame. Draw repaints only the invalidated region, layer by layer.

#![warn(missing_docs)]

pub use grove_geom as geom;

/// The frame engine.
mod app;
/// Child registration during build.
mod appender;
/// Light/dark mode.
pub mod color;
/// Debug configuration.
pub mod config;
/// The widget callback facade.
mod context;
/// Cursor shapes.
mod cursor;
/// Error types.
pub mod error;
/// Widget identifiers.
mod id;
/// Polled input.
pub mod input;
/// Host contract.
pub mod platform;
/// Canvases and compositing.
pub mod render;
/// Per-widget state.
mod state;
/// Test helpers.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// The widget arena.
mod tree;
/// Widget trait.
mod widget;
/// Z layering and hit testing.
pub mod zorder;

pub use app::App;
pub use appender::ChildAppender;
pub use color::ColorMode;
pub use config::DebugConfig;
pub use context::Context;
pub use cursor::CursorShape;
pub use error::{Error, Result};
pub use id::{TypedId, WidgetId};
pub use platform::{Headless, Platform};
pub use render::Canvas;
pub use state::{ChildSnapshot, WidgetName, WidgetState};
pub use tree::Tree;
pub use widget::{InputOutcome, OVERLAY_Z_DELTA, Widget};

/// Commonly used imports for widget implementations.
pub mod prelude {
    pub use crate::{
        App, Canvas, ChildAppender, ColorMode, Context, CursorShape, DebugConfig, Error,
        InputOutcome, OVERLAY_Z_DELTA, Result, TypedId, Widget, WidgetId,
        geom::{Expanse, Point, Rect},
        input::{Key, PointerButton},
        render::Color,
    };
}
