#![forbid(unsafe_code)]

//! Scroll surfaces and drag/scroll reconciliation.
//!
//! A single finger drag over scrollable sheet content must move exactly one
//! thing at a time: the content or the sheet. [`ScrollReconciler`] splits each
//! vertical pan delta between them.
//!
//! # Rules
//!
//! | Drag | Scroll offset | Sheet offset | Moves |
//! |------|---------------|--------------|-------|
//! | down | > 0           | any          | content only (toward its top) |
//! | down | == 0          | any          | sheet, 1:1 |
//! | up   | any           | > 0          | sheet back to rest first, remainder scrolls content |
//! | up   | any           | == 0         | content only |
//!
//! A downward delta that reaches the scroll top is not carried over to the
//! sheet within the same event; the next delta moves the sheet.
//!
//! # Failure Modes
//!
//! - Content shorter than its viewport never scrolls (`max_offset == 0`), so
//!   every drag moves the sheet.
//! - Metrics changes clamp the offset immediately; a shrinking content never
//!   leaves the scroll view past its end.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use bottomsheet_core::Observable;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollMetrics {
    content_height: f64,
    viewport_height: f64,
}

impl ScrollMetrics {
    fn max_offset(self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

/// Cloneable handle to a vertical scroll surface.
///
/// The offset is an [`Observable`] so the host's rendering code and the
/// sheet can both react to it.
#[derive(Clone)]
pub struct ScrollView {
    offset: Observable<f64>,
    metrics: Rc<Cell<ScrollMetrics>>,
}

impl fmt::Debug for ScrollView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metrics = self.metrics.get();
        f.debug_struct("ScrollView")
            .field("offset", &self.offset())
            .field("content_height", &metrics.content_height)
            .field("viewport_height", &metrics.viewport_height)
            .finish()
    }
}

impl ScrollView {
    /// A scroll view with the given content height and no viewport yet.
    ///
    /// The sheet assigns the viewport height during layout.
    pub fn new(content_height: f64) -> Self {
        Self {
            offset: Observable::new(0.0),
            metrics: Rc::new(Cell::new(ScrollMetrics {
                content_height: content_height.max(0.0),
                viewport_height: 0.0,
            })),
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset.get()
    }

    /// Observable handle to the offset.
    pub fn offset_observable(&self) -> Observable<f64> {
        self.offset.clone()
    }

    pub fn content_height(&self) -> f64 {
        self.metrics.get().content_height
    }

    pub fn viewport_height(&self) -> f64 {
        self.metrics.get().viewport_height
    }

    pub fn max_offset(&self) -> f64 {
        self.metrics.get().max_offset()
    }

    pub fn is_scrollable(&self) -> bool {
        self.max_offset() > 0.0
    }

    /// Whether the content is scrolled all the way up. Any positive offset,
    /// however small, is not.
    pub fn is_at_top(&self) -> bool {
        self.offset() <= 0.0
    }

    pub fn set_content_height(&self, height: f64) {
        let mut metrics = self.metrics.get();
        metrics.content_height = height.max(0.0);
        self.metrics.set(metrics);
        self.reclamp();
    }

    pub fn set_viewport_height(&self, height: f64) {
        let mut metrics = self.metrics.get();
        metrics.viewport_height = height.max(0.0);
        self.metrics.set(metrics);
        self.reclamp();
    }

    /// Set the offset, clamped to `[0, max_offset]`.
    pub fn set_offset(&self, offset: f64) {
        let clamped = if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, self.max_offset())
        };
        self.offset.set(clamped);
    }

    /// Move the offset by `delta` (positive scrolls content up).
    ///
    /// Returns the delta actually applied after clamping.
    pub fn scroll_by(&self, delta: f64) -> f64 {
        let before = self.offset();
        self.set_offset(before + delta);
        self.offset() - before
    }

    fn reclamp(&self) {
        self.set_offset(self.offset());
    }
}

/// Which surface consumed the most recent pan delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanOwner {
    Sheet,
    Scroll,
}

/// How one vertical pan delta was distributed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSplit {
    /// Delta to apply to the sheet offset (positive moves the sheet down).
    pub sheet_delta: f64,
    /// Delta already applied to the scroll offset.
    pub scroll_delta: f64,
    pub owner: PanOwner,
}

/// Per-gesture reconciliation state.
#[derive(Debug, Clone, Default)]
pub struct ScrollReconciler {
    owner: Option<PanOwner>,
    handoffs: u32,
}

impl ScrollReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new gesture.
    pub fn begin(&mut self) {
        self.owner = None;
        self.handoffs = 0;
    }

    /// Finish the gesture, returning who owned its last movement.
    pub fn end(&mut self) -> Option<PanOwner> {
        self.owner.take()
    }

    pub fn owner(&self) -> Option<PanOwner> {
        self.owner
    }

    /// How many times ownership switched during the current gesture.
    pub fn handoffs(&self) -> u32 {
        self.handoffs
    }

    /// Split a vertical pan delta `dy` (positive is downward).
    ///
    /// The scroll part is applied to `scroll` directly; the sheet part is
    /// returned for the caller to apply and clamp.
    pub fn split(&mut self, dy: f64, sheet_offset: f64, scroll: Option<&ScrollView>) -> PanSplit {
        let split = match scroll {
            None => PanSplit {
                sheet_delta: dy,
                scroll_delta: 0.0,
                owner: PanOwner::Sheet,
            },
            Some(scroll) if dy > 0.0 => {
                if scroll.is_at_top() {
                    PanSplit {
                        sheet_delta: dy,
                        scroll_delta: 0.0,
                        owner: PanOwner::Sheet,
                    }
                } else {
                    let applied = scroll.scroll_by(-dy);
                    PanSplit {
                        sheet_delta: 0.0,
                        scroll_delta: applied,
                        owner: PanOwner::Scroll,
                    }
                }
            }
            Some(scroll) if dy < 0.0 => {
                let sheet_delta = dy.max(-sheet_offset.max(0.0));
                let remainder = dy - sheet_delta;
                let applied = if remainder < 0.0 {
                    scroll.scroll_by(-remainder)
                } else {
                    0.0
                };
                let owner = if sheet_delta == 0.0 && applied != 0.0 {
                    PanOwner::Scroll
                } else {
                    PanOwner::Sheet
                };
                PanSplit {
                    sheet_delta,
                    scroll_delta: applied,
                    owner,
                }
            }
            Some(_) => PanSplit {
                sheet_delta: 0.0,
                scroll_delta: 0.0,
                owner: self.owner.unwrap_or(PanOwner::Sheet),
            },
        };

        if let Some(prev) = self.owner
            && prev != split.owner
        {
            self.handoffs += 1;
            tracing::trace!(from = ?prev, to = ?split.owner, "pan ownership handoff");
        }
        self.owner = Some(split.owner);
        split
    }
}
