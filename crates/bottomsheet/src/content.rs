#![forbid(unsafe_code)]

//! What gets presented, and by whom.

use bottomsheet_core::{Insets, Observable};

use crate::scroll::ScrollView;

/// Content hosted inside a sheet.
///
/// The content owns its preferred height. Setting a new value on the
/// returned observable asks the sheet to resize; the sheet decides whether
/// the request is accepted (see
/// [`SheetConfig::content_height_bounds`](crate::config::SheetConfig)).
pub trait PresentedContent {
    /// Handle to the preferred content height, in points.
    fn preferred_height(&self) -> Observable<f64>;

    /// Scroll surface whose offset is reconciled with sheet drags.
    ///
    /// Content that scrolls returns `Some`; the sheet then lets the scroll
    /// view consume downward drags until it reaches its top.
    fn scroll_view(&self) -> Option<ScrollView> {
        None
    }
}

/// The screen a sheet is presented from.
///
/// Presenting context is optional: a sheet presented without one lays out
/// against the bare container.
pub trait PresentingContext {
    /// Safe-area insets of the container the sheet is laid out in.
    fn safe_area_insets(&self) -> Insets {
        Insets::ZERO
    }
}
