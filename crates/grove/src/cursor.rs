/// Pointer cursor shapes a widget can request from the host.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// The platform's default arrow.
    #[default]
    Default,
    /// Text insertion beam.
    Text,
    /// Pointing hand, used over clickable widgets.
    Pointer,
    /// Crosshair.
    Crosshair,
    /// Open hand, for draggable content.
    Grab,
    /// Closed hand, while dragging.
    Grabbing,
    /// Horizontal resize arrows.
    ResizeHorizontal,
    /// Vertical resize arrows.
    ResizeVertical,
    /// Operation not permitted.
    NotAllowed,
}
