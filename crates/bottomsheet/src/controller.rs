#![forbid(unsafe_code)]

//! The bottom-sheet presentation controller.
//!
//! Owns the sheet's geometry (resting height, drag offset), the backdrop
//! dimming, and the presentation state machine. It is driven by a
//! [`Presenter`](crate::presenter::Presenter), which feeds it gestures,
//! content-height changes and frame deltas, and reacts to the
//! [`SheetEvent`]s it emits.
//!
//! # Geometry
//!
//! ```text
//! container top  ─┬───────────────────────────  (top_inset + safe top keep clear)
//!                 │
//! frame.y ────────┼── grabber ──────────────────  frame.y = bottom - height + offset
//!                 │   content viewport
//!                 │   (safe bottom)
//! container bottom┴───────────────────────────
//! ```
//!
//! - `height = min(grabber + content + safe_bottom, container - top_inset - safe_top)`
//! - `offset ∈ [0, height]`: 0 rests fully shown, `height` is fully hidden.
//!
//! # Invariants
//!
//! 1. Only one transition runs at a time. Drags that begin during a transition
//!    are ignored; content-height changes are queued (last wins) and applied
//!    once the sheet is back at rest.
//! 2. The reported content size changes only through an accepted resize;
//!    out-of-bounds requests leave it untouched.
//! 3. A logical dismissal asks the dismissal handler at most once.
//! 4. Dismissing an already dismissing or dismissed sheet is a no-op.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Dismissal handler dropped | Treated as refusal; sheet snaps back |
//! | `can_be_dismissed() == false` | Snap back (or apply queued resize) |
//! | Initial content height out of bounds | Start at `bounds.min`, logged |
//! | Zero-height container | Sheet height 0, all drags clamp to 0 |

use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bottomsheet_core::{Animation, Insets, PanEvent, PanPhase, Rect, Rgba, Size};

use crate::config::{DismissTriggers, SheetConfig};
use crate::content::{PresentedContent, PresentingContext};
use crate::dismissal::DismissalHandler;
use crate::interaction::{Release, ReleaseDecision, decide_release, percent_complete};
use crate::scroll::{PanOwner, ScrollReconciler};
use crate::state::{IgnoreReason, ResizeOutcome, SheetEvent, SheetState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Presenting,
    Presented,
    Dragging,
    SnappingBack,
    Resizing,
    /// Asked the dismissal handler; nothing is moving yet.
    AwaitingDismissal,
    Dismissing,
    Dismissed,
}

#[derive(Debug, Clone, Copy, Default)]
struct DragTracking {
    last_translation: f64,
}

/// Lays out and animates one presented sheet.
pub struct PresentationController {
    presented: Rc<dyn PresentedContent>,
    presenting: Option<Rc<dyn PresentingContext>>,
    dismissal_handler: Weak<dyn DismissalHandler>,
    config: SheetConfig,
    container: Rect,
    safe_area: Insets,
    phase: Phase,
    content_height: f64,
    height: f64,
    offset: f64,
    offset_anim: Option<Animation>,
    height_anim: Option<Animation>,
    pending_height: Option<f64>,
    drag: DragTracking,
    reconciler: ScrollReconciler,
    events: Vec<SheetEvent>,
}

impl fmt::Debug for PresentationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationController")
            .field("phase", &self.phase)
            .field("content_height", &self.content_height)
            .field("height", &self.height)
            .field("offset", &self.offset)
            .field("pending_height", &self.pending_height)
            .field("has_presenting", &self.presenting.is_some())
            .finish_non_exhaustive()
    }
}

impl PresentationController {
    /// Build a controller for `presented`, reporting dismissal requests to
    /// `dismissal_handler`.
    ///
    /// `presenting` may be `None`; the sheet then lays out against the bare
    /// container with no safe-area insets.
    pub fn new(
        presented: Rc<dyn PresentedContent>,
        presenting: Option<Rc<dyn PresentingContext>>,
        dismissal_handler: Weak<dyn DismissalHandler>,
    ) -> Self {
        Self {
            presented,
            presenting,
            dismissal_handler,
            config: SheetConfig::default(),
            container: Rect::default(),
            safe_area: Insets::ZERO,
            phase: Phase::Idle,
            content_height: 0.0,
            height: 0.0,
            offset: 0.0,
            offset_anim: None,
            height_anim: None,
            pending_height: None,
            drag: DragTracking::default(),
            reconciler: ScrollReconciler::new(),
            events: Vec::new(),
        }
    }

    /// Replace the configuration. Validated when the sheet is presented.
    pub fn with_config(mut self, config: SheetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn presented(&self) -> &Rc<dyn PresentedContent> {
        &self.presented
    }

    pub fn has_presenting_context(&self) -> bool {
        self.presenting.is_some()
    }

    /// Non-owning handle to the dismissal authority.
    pub fn dismissal_handler(&self) -> Weak<dyn DismissalHandler> {
        Weak::clone(&self.dismissal_handler)
    }

    // --- Queries ---

    pub fn state(&self) -> SheetState {
        match self.phase {
            Phase::Idle => SheetState::Idle,
            Phase::Presenting => SheetState::Presenting,
            Phase::Presented => SheetState::Presented {
                height: self.height,
            },
            Phase::Dragging => SheetState::Dragging {
                offset: self.offset,
            },
            Phase::SnappingBack => SheetState::SnappingBack,
            Phase::Resizing => {
                let (from, to) = self
                    .height_anim
                    .as_ref()
                    .map_or((self.height, self.height), |a| (a.from(), a.to()));
                SheetState::Resizing { from, to }
            }
            Phase::AwaitingDismissal | Phase::Dismissing => SheetState::Dismissing,
            Phase::Dismissed => SheetState::Dismissed,
        }
    }

    /// Size the content asked for and the sheet accepted.
    pub fn content_size(&self) -> Size {
        Size::new(self.container.width, self.content_height)
    }

    /// Current (possibly animating) sheet height.
    pub fn sheet_height(&self) -> f64 {
        self.height
    }

    /// Current displacement below the resting position.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// A content height waiting for the current transition to end.
    pub fn pending_height(&self) -> Option<f64> {
        self.pending_height
    }

    /// Frame of the whole sheet (grabber + content) in container coordinates.
    pub fn frame_of_presented_view(&self) -> Rect {
        if self.phase == Phase::Idle {
            return Rect::new(self.container.x, self.container.bottom(), self.container.width, 0.0);
        }
        Rect::new(
            self.container.x,
            self.container.bottom() - self.height + self.offset,
            self.container.width,
            self.height,
        )
    }

    /// Frame of the content viewport below the grabber.
    pub fn content_frame(&self) -> Rect {
        let frame = self.frame_of_presented_view();
        frame.inset_by(Insets::vertical(
            self.config.grabber_height,
            self.safe_area.bottom,
        ))
    }

    /// Fraction of the sheet currently hidden below the container edge.
    pub fn percent_dismissed(&self) -> f64 {
        match self.phase {
            Phase::Idle | Phase::Dismissed => 1.0,
            _ => percent_complete(self.offset, self.height),
        }
    }

    pub fn backdrop_opacity(&self) -> f64 {
        self.config.backdrop.opacity.clamp(0.0, 1.0) * (1.0 - self.percent_dismissed())
    }

    pub fn backdrop_color(&self) -> Rgba {
        self.config.backdrop.color.with_opacity(self.backdrop_opacity())
    }

    pub fn is_animating(&self) -> bool {
        self.offset_anim.is_some() || self.height_anim.is_some()
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<SheetEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Presentation ---

    /// Start sliding the sheet in over `container`.
    ///
    /// Called once by the presenter. A second call is ignored.
    pub fn presentation_transition_will_begin(&mut self, container: Rect, animated: bool) {
        if self.phase != Phase::Idle {
            tracing::warn!(phase = ?self.phase, "presentation already started");
            return;
        }
        self.container = container;
        self.safe_area = self
            .presenting
            .as_ref()
            .map_or(Insets::ZERO, |p| p.safe_area_insets());

        let preferred = self.presented.preferred_height().get();
        let bounds = self.config.content_height_bounds;
        self.content_height = match self.pending_height.take() {
            Some(queued) => queued,
            None if bounds.contains(preferred) => preferred,
            None => {
                tracing::warn!(
                    preferred,
                    min = bounds.min,
                    max = bounds.max,
                    "initial content height out of bounds; using minimum"
                );
                bounds.min
            }
        };
        self.height = self.resting_height();
        self.offset = self.height;

        tracing::debug!(
            content_height = self.content_height,
            height = self.height,
            animated,
            "presentation begins"
        );
        self.set_phase(Phase::Presenting);
        let duration = self.duration(animated, self.config.timings.present);
        self.offset_anim = Some(self.animation(self.offset, 0.0, duration));
        self.sync_scroll_viewport();
        self.finish_if_settled();
    }

    // --- Content height ---

    /// The presented content's preferred height changed.
    pub fn request_content_height(&mut self, height: f64) -> ResizeOutcome {
        // The content may have been swapped for one with the same height.
        if !matches!(self.phase, Phase::Idle | Phase::Dismissed) {
            self.sync_scroll_viewport();
        }
        let outcome = self.resolve_content_height(height);
        match outcome {
            ResizeOutcome::Ignored { requested, reason } => {
                tracing::debug!(requested, ?reason, phase = ?self.phase, "content height ignored");
                self.events.push(SheetEvent::ResizeIgnored { requested, reason });
            }
            ResizeOutcome::Queued { height } => {
                tracing::debug!(height, phase = ?self.phase, "content height queued");
            }
            ResizeOutcome::Applied { height } => {
                tracing::debug!(height, "content height applied");
            }
        }
        outcome
    }

    fn resolve_content_height(&mut self, height: f64) -> ResizeOutcome {
        let ignored = |reason| ResizeOutcome::Ignored {
            requested: height,
            reason,
        };
        if matches!(
            self.phase,
            Phase::AwaitingDismissal | Phase::Dismissing | Phase::Dismissed
        ) {
            return ignored(IgnoreReason::Dismissing);
        }
        if !self.config.content_height_bounds.contains(height) {
            return ignored(IgnoreReason::OutOfBounds);
        }
        match self.phase {
            Phase::Presented => {
                if height == self.content_height {
                    return ignored(IgnoreReason::Unchanged);
                }
                self.start_resize(height);
                ResizeOutcome::Applied { height }
            }
            _ => {
                self.pending_height = Some(height);
                ResizeOutcome::Queued { height }
            }
        }
    }

    fn start_resize(&mut self, content_height: f64) {
        self.content_height = content_height;
        let from = self.height;
        let to = self.resting_height();
        self.set_phase(Phase::Resizing);
        let duration = self.config.timings.resize;
        self.height_anim = Some(self.animation(from, to, duration));
        if self.offset > 0.0 {
            let snap = self.config.timings.snap_back;
            self.offset_anim = Some(self.animation(self.offset, 0.0, snap));
        }
        self.finish_if_settled();
    }

    fn apply_pending(&mut self) {
        if self.phase != Phase::Presented {
            return;
        }
        if let Some(height) = self.pending_height.take() {
            if height == self.content_height {
                return;
            }
            tracing::debug!(height, "applying queued content height");
            self.start_resize(height);
        }
    }

    // --- Gestures ---

    /// Feed a pan gesture update.
    pub fn handle_pan(&mut self, event: &PanEvent) {
        let _span = tracing::debug_span!(
            "sheet_pan",
            phase = ?event.phase,
            translation = event.translation.y,
            velocity = event.velocity.y
        )
        .entered();

        match event.phase {
            PanPhase::Began => {
                if self.phase != Phase::Presented {
                    tracing::trace!(phase = ?self.phase, "drag ignored during transition");
                    return;
                }
                let start = event.translation.y;
                self.drag = DragTracking {
                    last_translation: if start.is_finite() { start } else { 0.0 },
                };
                self.reconciler.begin();
                self.sync_scroll_viewport();
                self.set_phase(Phase::Dragging);
            }
            PanPhase::Changed => {
                if self.phase == Phase::Dragging {
                    self.track(event.translation.y);
                }
            }
            PanPhase::Ended | PanPhase::Cancelled => {
                if self.phase != Phase::Dragging {
                    return;
                }
                let cancelled = event.phase == PanPhase::Cancelled;
                if !cancelled {
                    self.track(event.translation.y);
                }
                self.release(event.velocity.y, cancelled);
            }
        }
    }

    fn track(&mut self, translation: f64) {
        if !translation.is_finite() {
            tracing::warn!(translation, "non-finite pan translation dropped");
            return;
        }
        let dy = translation - self.drag.last_translation;
        self.drag.last_translation = translation;
        if dy == 0.0 {
            return;
        }
        let scroll = self.presented.scroll_view();
        let split = self.reconciler.split(dy, self.offset, scroll.as_ref());
        self.offset = (self.offset + split.sheet_delta).clamp(0.0, self.height.max(0.0));
        tracing::trace!(
            dy,
            sheet_delta = split.sheet_delta,
            scroll_delta = split.scroll_delta,
            offset = self.offset,
            "drag tracked"
        );
    }

    fn release(&mut self, velocity: f64, cancelled: bool) {
        let owner = self.reconciler.end();
        // A flick that the scroll view absorbed carries no sheet velocity.
        let velocity = if owner == Some(PanOwner::Sheet) {
            velocity
        } else {
            0.0
        };
        let release = Release {
            offset: self.offset,
            height: self.height,
            velocity,
            cancelled,
        };
        let handler = self.dismissal_handler.upgrade();
        let decision = decide_release(&release, &self.config, self.pending_height, || {
            handler.as_ref().is_some_and(|h| h.can_be_dismissed())
        });
        tracing::debug!(?decision, offset = self.offset, velocity, "drag released");

        match decision {
            ReleaseDecision::Dismiss => {
                self.request_dismissal(true);
            }
            ReleaseDecision::Refused { then_resize } => {
                tracing::warn!(
                    handler_alive = handler.is_some(),
                    "interactive dismissal refused"
                );
                self.events.push(SheetEvent::DismissalCancelled);
                self.return_to_rest(then_resize);
            }
            ReleaseDecision::Resize { height } => {
                self.return_to_rest(Some(height));
            }
            ReleaseDecision::SnapBack => {
                self.return_to_rest(None);
            }
        }
    }

    /// Animate back to the resting position, resizing on the way if asked.
    fn return_to_rest(&mut self, resize_to: Option<f64>) {
        if let Some(height) = resize_to {
            self.pending_height = None;
            if height != self.content_height {
                self.start_resize(height);
                return;
            }
        }
        if self.offset <= 0.0 {
            self.offset = 0.0;
            self.set_phase(Phase::Presented);
            self.apply_pending();
            return;
        }
        self.set_phase(Phase::SnappingBack);
        let duration = self.config.timings.snap_back;
        self.offset_anim = Some(self.animation(self.offset, 0.0, duration));
        self.finish_if_settled();
    }

    /// A tap landed on the dimmed area outside the sheet.
    ///
    /// Returns `true` when a dismissal was requested.
    pub fn handle_backdrop_tap(&mut self) -> bool {
        if self.phase != Phase::Presented {
            return false;
        }
        if !self
            .config
            .dismiss_triggers
            .contains(DismissTriggers::BACKDROP_TAP)
        {
            return false;
        }
        let authorized = self
            .dismissal_handler
            .upgrade()
            .is_some_and(|h| h.can_be_dismissed());
        if !authorized {
            tracing::debug!("backdrop tap dismissal refused");
            return false;
        }
        self.request_dismissal(true)
    }

    // --- Dismissal ---

    /// Ask the dismissal handler to dismiss (through the presenter).
    ///
    /// Returns `false` when a dismissal is already underway.
    pub fn request_dismissal(&mut self, animated: bool) -> bool {
        if matches!(
            self.phase,
            Phase::Idle | Phase::AwaitingDismissal | Phase::Dismissing | Phase::Dismissed
        ) {
            tracing::trace!(phase = ?self.phase, "dismissal request ignored");
            return false;
        }
        self.offset_anim = None;
        self.set_phase(Phase::AwaitingDismissal);
        self.events.push(SheetEvent::DismissalRequested { animated });
        true
    }

    /// The handler did not start a dismissal; bring the sheet back.
    pub fn cancel_dismissal_request(&mut self) {
        if self.phase != Phase::AwaitingDismissal {
            return;
        }
        tracing::warn!("dismissal handler did not dismiss; snapping back");
        self.events.push(SheetEvent::DismissalCancelled);
        let pending = self.pending_height.take();
        self.return_to_rest(pending);
    }

    /// Slide the sheet out. Called by the presenter on `dismiss`.
    ///
    /// Returns `false` if the sheet is already dismissing or dismissed.
    pub fn dismissal_transition_will_begin(&mut self, animated: bool) -> bool {
        match self.phase {
            Phase::Dismissing | Phase::Dismissed => {
                tracing::trace!(phase = ?self.phase, "dismissal already underway");
                return false;
            }
            Phase::Idle => {
                self.set_phase(Phase::Dismissed);
                self.events.push(SheetEvent::DismissalCompleted);
                return true;
            }
            _ => {}
        }
        self.pending_height = None;
        self.reconciler.end();
        if let Some(mut anim) = self.height_anim.take() {
            anim.finish();
            self.height = anim.value();
        }
        self.set_phase(Phase::Dismissing);
        self.events.push(SheetEvent::DismissalStarted { animated });
        let duration = self.duration(animated, self.config.timings.dismiss);
        self.offset_anim = Some(self.animation(self.offset, self.height, duration));
        self.finish_if_settled();
        true
    }

    // --- Layout ---

    /// The container was resized (rotation, window resize).
    pub fn container_did_change(&mut self, container: Rect) {
        self.container = container;
        if self.phase == Phase::Idle {
            return;
        }
        let resting = self.resting_height();
        if let Some(anim) = self.height_anim.as_mut() {
            *anim = Animation::new(
                self.height,
                resting,
                anim.duration(),
                self.config.timings.easing,
            );
        } else {
            self.height = resting;
        }
        self.offset = self.offset.clamp(0.0, self.height.max(0.0));
        if let Some(anim) = self.offset_anim.as_mut() {
            let target = match self.phase {
                Phase::Dismissing => self.height,
                _ => anim.to(),
            };
            *anim = Animation::new(
                self.offset,
                target,
                anim.duration(),
                self.config.timings.easing,
            );
        }
        tracing::debug!(
            width = container.width,
            height = container.height,
            sheet_height = self.height,
            "container changed"
        );
        self.sync_scroll_viewport();
    }

    /// Advance running animations by `dt`.
    ///
    /// Returns `true` while something is still animating.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.is_animating() {
            return false;
        }
        if let Some(anim) = self.offset_anim.as_mut() {
            anim.advance(dt);
            self.offset = anim.value();
        }
        if let Some(anim) = self.height_anim.as_mut() {
            anim.advance(dt);
            self.height = anim.value();
            self.sync_scroll_viewport();
        }
        self.finish_if_settled();
        self.is_animating()
    }

    fn finish_if_settled(&mut self) {
        let settled = self.offset_anim.as_ref().is_none_or(Animation::is_finished)
            && self.height_anim.as_ref().is_none_or(Animation::is_finished);
        if !settled {
            return;
        }
        if let Some(anim) = self.offset_anim.take() {
            self.offset = anim.value();
        }
        if let Some(anim) = self.height_anim.take() {
            self.height = anim.value();
            self.sync_scroll_viewport();
        }
        match self.phase {
            Phase::Presenting => {
                self.set_phase(Phase::Presented);
                self.events.push(SheetEvent::PresentationCompleted);
                self.apply_pending();
            }
            Phase::SnappingBack => {
                self.set_phase(Phase::Presented);
                self.events.push(SheetEvent::SnappedBack);
                self.apply_pending();
            }
            Phase::Resizing => {
                self.set_phase(Phase::Presented);
                self.events.push(SheetEvent::Resized {
                    height: self.content_height,
                });
                self.apply_pending();
            }
            Phase::Dismissing => {
                self.set_phase(Phase::Dismissed);
                self.events.push(SheetEvent::DismissalCompleted);
            }
            _ => {}
        }
    }

    // --- Helpers ---

    fn max_sheet_height(&self) -> f64 {
        (self.container.height - self.safe_area.top - self.config.top_inset).max(0.0)
    }

    fn resting_height(&self) -> f64 {
        let wanted = self.config.grabber_height + self.content_height + self.safe_area.bottom;
        wanted.min(self.max_sheet_height()).max(0.0)
    }

    fn sync_scroll_viewport(&self) {
        if let Some(scroll) = self.presented.scroll_view() {
            let viewport =
                (self.height - self.config.grabber_height - self.safe_area.bottom).max(0.0);
            scroll.set_viewport_height(viewport);
        }
    }

    fn duration(&self, animated: bool, duration: Duration) -> Duration {
        if animated { duration } else { Duration::ZERO }
    }

    fn animation(&self, from: f64, to: f64, duration: Duration) -> Animation {
        Animation::new(from, to, duration, self.config.timings.easing)
    }

    fn set_phase(&mut self, next: Phase) {
        if self.phase != next {
            tracing::debug!(from = ?self.phase, to = ?next, "sheet phase");
            self.phase = next;
        }
    }
}
