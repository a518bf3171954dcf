#![forbid(unsafe_code)]

//! The presenting side of the transition system.
//!
//! [`Presenter`] owns at most one active sheet. It asks the host's
//! [`TransitioningDelegate`] for a [`PresentationController`], feeds it
//! gestures, content-height changes and frame deltas, and turns the
//! controller's [`SheetEvent`]s into deferred work on the [`MainQueue`]:
//!
//! - `DismissalRequested` posts a call to the dismissal handler, followed by a
//!   check that snaps the sheet back if the handler did not start a dismissal.
//! - `PresentationCompleted` and `DismissalCompleted` post the completions
//!   passed to [`Presenter::present`] and [`Presenter::dismiss`].
//!
//! Deferred work runs after the presenter has released its internal borrow,
//! so handlers and completions may call back into the presenter freely.
//!
//! # Re-entrancy
//!
//! [`DismissalHandler::can_be_dismissed`](crate::dismissal::DismissalHandler::can_be_dismissed)
//! is the one host callback made while the presenter is borrowed. It must
//! answer without calling the presenter.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `present` while a sheet is active | `PresentError::AlreadyPresenting` |
//! | Factory dropped before `present` | `PresentError::FactoryReleased` |
//! | Invalid controller config | `PresentError::InvalidConfig` |
//! | `dismiss` with nothing presented | Completion still runs; returns `false` |
//! | Dismissal handler dropped | Logged; sheet snaps back |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use bottomsheet_core::{
    Gesture, MainQueue, PanEvent, PanPhase, PanRecognizer, Point, PointerEvent, Rect, Rgba, Size,
    Subscription,
};
use web_time::Instant;

use crate::config::ConfigError;
use crate::content::{PresentedContent, PresentingContext};
use crate::controller::PresentationController;
use crate::dismissal::DismissalHandler;
use crate::factory::TransitioningDelegate;
use crate::state::{SheetEvent, SheetState};

/// Work to run once a presentation or dismissal finishes.
pub type Completion = Box<dyn FnOnce()>;

/// Why a sheet could not be presented.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentError {
    /// Another sheet is already presented from this presenter.
    AlreadyPresenting,
    /// The transitioning delegate's factory no longer exists.
    FactoryReleased,
    /// The controller's configuration failed validation.
    InvalidConfig(ConfigError),
}

impl fmt::Display for PresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyPresenting => write!(f, "a sheet is already presented"),
            Self::FactoryReleased => write!(f, "presentation controller factory was released"),
            Self::InvalidConfig(e) => write!(f, "invalid sheet configuration: {e}"),
        }
    }
}

impl std::error::Error for PresentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for PresentError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

struct ActivePresentation {
    controller: PresentationController,
    _height_subscription: Subscription,
    on_presented: Option<Completion>,
    on_dismissed: Vec<Completion>,
}

enum Deferred {
    AskHandler {
        handler: Weak<dyn DismissalHandler>,
        animated: bool,
    },
    Run(Completion),
}

struct PresenterInner {
    container: Rect,
    active: Option<ActivePresentation>,
    recognizer: PanRecognizer,
    /// Whether the pan being recognized started on the sheet.
    pan_captured: bool,
    last_tick: Option<Instant>,
    events: Vec<SheetEvent>,
}

impl PresenterInner {
    fn collect(&mut self) -> Vec<Deferred> {
        let mut deferred = Vec::new();
        let Some(active) = self.active.as_mut() else {
            return deferred;
        };
        let events = active.controller.drain_events();
        let mut finished = false;
        for event in &events {
            match *event {
                SheetEvent::PresentationCompleted => {
                    if let Some(done) = active.on_presented.take() {
                        deferred.push(Deferred::Run(done));
                    }
                }
                SheetEvent::DismissalRequested { animated } => {
                    deferred.push(Deferred::AskHandler {
                        handler: active.controller.dismissal_handler(),
                        animated,
                    });
                }
                SheetEvent::DismissalCompleted => finished = true,
                _ => {}
            }
        }
        self.events.extend(events);
        if finished && let Some(active) = self.active.take() {
            tracing::debug!("sheet removed");
            self.pan_captured = false;
            deferred.extend(active.on_dismissed.into_iter().map(Deferred::Run));
        }
        deferred
    }
}

/// Presents bottom sheets over a container.
///
/// Cloning yields another handle to the same presenter.
#[derive(Clone)]
pub struct Presenter {
    inner: Rc<RefCell<PresenterInner>>,
    queue: MainQueue,
}

struct WeakPresenter {
    inner: Weak<RefCell<PresenterInner>>,
    queue: MainQueue,
}

impl WeakPresenter {
    fn upgrade(&self) -> Option<Presenter> {
        self.inner.upgrade().map(|inner| Presenter {
            inner,
            queue: self.queue.clone(),
        })
    }
}

impl fmt::Debug for Presenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Presenter");
        match self.inner.try_borrow() {
            Ok(inner) => s
                .field("container", &inner.container)
                .field(
                    "state",
                    &inner.active.as_ref().map(|a| a.controller.state()),
                )
                .field("events", &inner.events.len()),
            Err(_) => s.field("inner", &"<borrowed>"),
        };
        s.field("queue", &self.queue).finish()
    }
}

impl Presenter {
    /// A presenter over a container of `size`, with its own main queue.
    pub fn new(size: Size) -> Self {
        Self::with_queue(size, MainQueue::new())
    }

    /// A presenter that defers work onto a shared `queue`.
    pub fn with_queue(size: Size, queue: MainQueue) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PresenterInner {
                container: Rect::from_size(size),
                active: None,
                recognizer: PanRecognizer::new(),
                pan_captured: false,
                last_tick: None,
                events: Vec::new(),
            })),
            queue,
        }
    }

    pub fn queue(&self) -> &MainQueue {
        &self.queue
    }

    fn downgrade(&self) -> WeakPresenter {
        WeakPresenter {
            inner: Rc::downgrade(&self.inner),
            queue: self.queue.clone(),
        }
    }

    // --- Presentation ---

    /// Present `presented` as a bottom sheet.
    ///
    /// The controller comes from `delegate`. The presenter does not retain
    /// the delegate; the host keeps it for as long as the sheet is up.
    pub fn present(
        &self,
        presented: Rc<dyn PresentedContent>,
        presenting: Option<Rc<dyn PresentingContext>>,
        delegate: &TransitioningDelegate,
        animated: bool,
        completion: Option<Completion>,
    ) -> Result<(), PresentError> {
        let _span = tracing::debug_span!("sheet_present", animated).entered();
        if self.is_presenting() {
            return Err(PresentError::AlreadyPresenting);
        }
        let mut controller = delegate
            .presentation_controller(Rc::clone(&presented), presenting)
            .ok_or(PresentError::FactoryReleased)?;
        controller.config().validate()?;
        let subscription = self.observe_content_height(&presented);

        {
            let mut inner = self.inner.borrow_mut();
            // The factory is host code and may have presented something itself.
            if inner.active.is_some() {
                return Err(PresentError::AlreadyPresenting);
            }
            controller.presentation_transition_will_begin(inner.container, animated);
            inner.active = Some(ActivePresentation {
                controller,
                _height_subscription: subscription,
                on_presented: completion,
                on_dismissed: Vec::new(),
            });
            inner.last_tick = None;
        }
        self.flush();
        Ok(())
    }

    /// Dismiss the active sheet.
    ///
    /// Returns `true` if this call started the dismissal transition. Calling
    /// it again while dismissing (or after removal) is a no-op; `completion`
    /// still runs once the sheet is gone.
    pub fn dismiss(&self, animated: bool, completion: Option<Completion>) -> bool {
        let _span = tracing::debug_span!("sheet_dismiss", animated).entered();
        let started = {
            let mut inner = self.inner.borrow_mut();
            match inner.active.as_mut() {
                Some(active) => {
                    if let Some(done) = completion {
                        active.on_dismissed.push(done);
                    }
                    active.controller.dismissal_transition_will_begin(animated)
                }
                None => {
                    tracing::debug!("dismiss with nothing presented");
                    if let Some(done) = completion {
                        self.queue.post(done);
                    }
                    false
                }
            }
        };
        self.flush();
        started
    }

    fn observe_content_height(&self, presented: &Rc<dyn PresentedContent>) -> Subscription {
        let presenter = self.downgrade();
        presented.preferred_height().subscribe(move |&height| {
            if let Some(presenter) = presenter.upgrade() {
                presenter.preferred_height_did_change(height);
            }
        })
    }

    fn preferred_height_did_change(&self, height: f64) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            // Changed from inside a presenter call; retry once it returns.
            let presenter = self.downgrade();
            self.queue.post(move || {
                if let Some(presenter) = presenter.upgrade() {
                    presenter.preferred_height_did_change(height);
                }
            });
            return;
        };
        if let Some(active) = inner.active.as_mut() {
            active.controller.request_content_height(height);
        }
        drop(inner);
        self.flush();
    }

    fn cancel_unanswered_dismissal(&self) {
        if let Some(active) = self.inner.borrow_mut().active.as_mut() {
            active.controller.cancel_dismissal_request();
        }
        self.flush();
    }

    // --- Input ---

    /// Feed a recognized pan gesture to the active sheet.
    pub fn handle_pan(&self, event: PanEvent) {
        if let Some(active) = self.inner.borrow_mut().active.as_mut() {
            active.controller.handle_pan(&event);
        }
        self.flush();
    }

    /// Feed a raw pointer event; pans that start on the sheet drag it, taps
    /// outside it hit the backdrop.
    pub fn handle_pointer(&self, event: PointerEvent) {
        let gesture = self.inner.borrow_mut().recognizer.handle(event);
        match gesture {
            Some(Gesture::Pan(pan)) => {
                let forward = {
                    let mut inner = self.inner.borrow_mut();
                    if pan.phase == PanPhase::Began {
                        let frame = inner
                            .active
                            .as_ref()
                            .map(|a| a.controller.frame_of_presented_view());
                        inner.pan_captured = frame.is_some_and(|f| f.contains(pan.start));
                    }
                    let captured = inner.pan_captured;
                    if matches!(pan.phase, PanPhase::Ended | PanPhase::Cancelled) {
                        inner.pan_captured = false;
                    }
                    captured
                };
                if forward {
                    self.handle_pan(pan);
                }
            }
            Some(Gesture::Tap(point)) => {
                self.handle_tap(point);
            }
            None => {}
        }
    }

    /// A tap at `point`: outside the sheet it counts as a backdrop tap.
    pub fn handle_tap(&self, point: Point) -> bool {
        let on_sheet = self
            .frame_of_presented_view()
            .is_some_and(|f| f.contains(point));
        if on_sheet {
            return false;
        }
        self.tap_backdrop()
    }

    /// Tap on the backdrop. Returns `true` if dismissal was requested.
    pub fn tap_backdrop(&self) -> bool {
        let requested = self
            .inner
            .borrow_mut()
            .active
            .as_mut()
            .is_some_and(|a| a.controller.handle_backdrop_tap());
        self.flush();
        requested
    }

    // --- Time and layout ---

    /// Advance animations by `dt`. Returns `true` while something animates.
    pub fn advance(&self, dt: Duration) -> bool {
        let animating = self
            .inner
            .borrow_mut()
            .active
            .as_mut()
            .is_some_and(|a| a.controller.advance(dt));
        self.flush();
        animating
    }

    /// Advance animations to the frame timestamp `now`.
    pub fn tick(&self, now: Instant) -> bool {
        let dt = {
            let mut inner = self.inner.borrow_mut();
            let dt = inner
                .last_tick
                .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
            inner.last_tick = Some(now);
            dt
        };
        self.advance(dt)
    }

    /// Resize the container the sheet is laid out in.
    pub fn set_container_size(&self, size: Size) {
        {
            let mut inner = self.inner.borrow_mut();
            let container = Rect::from_size(size);
            inner.container = container;
            if let Some(active) = inner.active.as_mut() {
                active.controller.container_did_change(container);
            }
        }
        self.flush();
    }

    // --- Queries ---

    pub fn container_size(&self) -> Size {
        self.inner.borrow().container.size()
    }

    pub fn is_presenting(&self) -> bool {
        self.inner.borrow().active.is_some()
    }

    pub fn state(&self) -> Option<SheetState> {
        self.with_controller(PresentationController::state)
    }

    pub fn frame_of_presented_view(&self) -> Option<Rect> {
        self.with_controller(PresentationController::frame_of_presented_view)
    }

    pub fn content_size(&self) -> Option<Size> {
        self.with_controller(PresentationController::content_size)
    }

    pub fn backdrop_color(&self) -> Option<Rgba> {
        self.with_controller(PresentationController::backdrop_color)
    }

    /// Run `f` against the active controller.
    pub fn with_controller<R>(&self, f: impl FnOnce(&PresentationController) -> R) -> Option<R> {
        self.inner.borrow().active.as_ref().map(|a| f(&a.controller))
    }

    /// Take every event reported since the last call.
    pub fn take_events(&self) -> Vec<SheetEvent> {
        std::mem::take(&mut self.inner.borrow_mut().events)
    }

    // --- Deferred work ---

    fn flush(&self) {
        let deferred = self.inner.borrow_mut().collect();
        for work in deferred {
            match work {
                Deferred::Run(done) => self.queue.post(done),
                Deferred::AskHandler { handler, animated } => {
                    let presenter = self.downgrade();
                    self.queue.post(move || {
                        match handler.upgrade() {
                            Some(handler) => handler.perform_dismissal(animated),
                            None => tracing::warn!("dismissal handler released"),
                        }
                        let Some(presenter) = presenter.upgrade() else {
                            return;
                        };
                        // Runs after anything the handler posted itself.
                        let check = presenter.downgrade();
                        presenter.queue.post(move || {
                            if let Some(presenter) = check.upgrade() {
                                presenter.cancel_unanswered_dismissal();
                            }
                        });
                    });
                }
            }
        }
        if !self.queue.is_draining() {
            self.queue.run_pending();
        }
    }
}
