#![forbid(unsafe_code)]

//! Observable sheet state and the events a sheet reports.

/// Externally visible state of a sheet.
///
/// ```text
/// Idle -> Presenting -> Presented(h) -> Dragging(offset) -+-> SnappingBack -> Presented
///                           ^                             +-> Resizing(h')  -> Presented
///                           |                             +-> Dismissing    -> Dismissed
///                           +------------- Resizing <---- (content height change)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetState {
    /// Built but not yet handed to a presenter.
    Idle,
    /// Sliding in.
    Presenting,
    /// At rest, showing `height` points of sheet.
    Presented { height: f64 },
    /// Following a drag, `offset` points below the resting position.
    Dragging { offset: f64 },
    /// Returning to rest after a released or cancelled drag.
    SnappingBack,
    /// Animating between two resting heights.
    Resizing { from: f64, to: f64 },
    /// Waiting on the dismissal handler, or sliding out.
    Dismissing,
    /// Fully removed.
    Dismissed,
}

impl SheetState {
    /// Whether a transition owns the sheet (new drags are ignored).
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            Self::Presenting | Self::SnappingBack | Self::Resizing { .. } | Self::Dismissing
        )
    }

    /// Whether the sheet is on its way out or gone.
    pub fn is_dismissing_or_dismissed(&self) -> bool {
        matches!(self, Self::Dismissing | Self::Dismissed)
    }
}

/// Why a content-height change was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Outside the configured content-height bounds.
    OutOfBounds,
    /// The sheet is dismissing or dismissed.
    Dismissing,
    /// Already the current height.
    Unchanged,
}

/// Result of a content-height change request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// Accepted and resizing now.
    Applied { height: f64 },
    /// Accepted; will apply when the current transition or drag ends.
    Queued { height: f64 },
    /// Rejected; the sheet keeps its current content height.
    Ignored { requested: f64, reason: IgnoreReason },
}

/// Something that happened to a sheet, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetEvent {
    PresentationCompleted,
    /// The sheet asked its dismissal handler to dismiss.
    DismissalRequested { animated: bool },
    /// An interactive dismissal was refused or cancelled; the sheet returns.
    DismissalCancelled,
    DismissalStarted { animated: bool },
    DismissalCompleted,
    SnappedBack,
    Resized { height: f64 },
    ResizeIgnored { requested: f64, reason: IgnoreReason },
}
