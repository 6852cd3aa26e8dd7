use std::{error::Error as StdError, result::Result as StdResult};

use thiserror::Error;

use crate::id::WidgetId;

/// Result type for grove operations.
pub type Result<T> = StdResult<T, Error>;

/// Boxed error raised by user widget code.
pub type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

/// Core error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("build: {0}")]
    /// A widget's build pass failed.
    Build(String),
    #[error("tick: {0}")]
    /// A widget's tick failed.
    Tick(String),
    #[error("tree: {0}")]
    /// Structural violation while registering children.
    Tree(String),
    #[error("widget not found: {0:?}")]
    /// The identifier does not name a live widget.
    NotFound(WidgetId),
    #[error("expected widget type {0}")]
    /// A typed lookup found a widget of a different type.
    TypeMismatch(&'static str),
    #[error("config: {0}")]
    /// Malformed debug configuration.
    Config(String),
    #[error("widget: {0}")]
    /// Failure raised by user widget code.
    Widget(#[source] BoxedError),
}

impl Error {
    /// Wrap an arbitrary error raised by widget code.
    pub fn widget(e: impl Into<BoxedError>) -> Self {
        Self::Widget(e.into())
    }
}
