#![forbid(unsafe_code)]

//! Pointer samples to pan gestures.
//!
//! Hosts feed raw [`PointerEvent`]s into a [`PanRecognizer`], which emits
//! [`Gesture`]s: taps, or pan events carrying a cumulative translation and a
//! velocity estimate, the way platform pan recognizers report them.
//!
//! # State Machine
//!
//! ```text
//! Idle --down--> Possible --move >= slop--> Tracking --up--> Idle (Ended)
//!                   |                          |
//!                   +--up--> Idle (Tap)        +--cancel--> Idle (Cancelled)
//! ```
//!
//! # Invariants
//!
//! - Every `Began` is followed by exactly one `Ended` or `Cancelled`.
//! - `translation` is measured from the point where the pan began (after the
//!   slop was crossed), so the first event always reports zero translation.
//!   `start` keeps the pointer-down position for hit testing.
//! - Velocity is the average over samples inside the tracking window; a window
//!   with no elapsed time reports zero velocity.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

use crate::geometry::Point;

/// Distance a pointer must travel before a pan begins.
pub const DEFAULT_TOUCH_SLOP: f64 = 10.0;

/// Samples older than this (relative to the newest) are ignored for velocity.
pub const DEFAULT_VELOCITY_WINDOW: Duration = Duration::from_millis(100);

/// Phase of a pan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// One pan gesture update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanEvent {
    pub phase: PanPhase,
    /// Current pointer position in container coordinates.
    pub location: Point,
    /// Where the pointer went down, before the slop was crossed. Hit-test
    /// this, not `location`, to decide who owns the pan.
    pub start: Point,
    /// Cumulative displacement since `Began`; positive y is downward.
    pub translation: Point,
    /// Points per second; positive y is downward.
    pub velocity: Point,
}

impl PanEvent {
    pub fn new(phase: PanPhase, translation: Point, velocity: Point) -> Self {
        Self {
            phase,
            location: Point::ZERO,
            start: Point::ZERO,
            translation,
            velocity,
        }
    }

    /// A purely vertical pan update.
    pub fn vertical(phase: PanPhase, translation_y: f64, velocity_y: f64) -> Self {
        Self::new(
            phase,
            Point::new(0.0, translation_y),
            Point::new(0.0, velocity_y),
        )
    }

    pub fn at(mut self, location: Point) -> Self {
        self.location = location;
        self
    }

    pub fn started_at(mut self, start: Point) -> Self {
        self.start = start;
        self
    }
}

/// Raw pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: Point, at: Instant },
    Move { position: Point, at: Instant },
    Up { position: Point, at: Instant },
    Cancel,
}

/// Output of the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Pan(PanEvent),
    /// Pointer went down and up without crossing the slop.
    Tap(Point),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RecognizerState {
    Idle,
    Possible { origin: Point },
    Tracking { down: Point, origin: Point },
}

/// Converts pointer samples into pan gestures.
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    slop: f64,
    window: Duration,
    state: RecognizerState,
    samples: VecDeque<(Instant, Point)>,
}

impl Default for PanRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PanRecognizer {
    pub fn new() -> Self {
        Self {
            slop: DEFAULT_TOUCH_SLOP,
            window: DEFAULT_VELOCITY_WINDOW,
            state: RecognizerState::Idle,
            samples: VecDeque::new(),
        }
    }

    /// Set the touch slop (negative values are treated as zero).
    pub fn slop(mut self, slop: f64) -> Self {
        self.slop = slop.max(0.0);
        self
    }

    /// Set the velocity estimation window.
    pub fn velocity_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Whether a pan is currently being tracked.
    pub fn is_tracking(&self) -> bool {
        matches!(self.state, RecognizerState::Tracking { .. })
    }

    /// Feed one pointer event.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Gesture> {
        match (self.state, event) {
            (_, PointerEvent::Down { position, at }) => {
                // A stray down while tracking restarts recognition; the host
                // lost the matching up.
                let cancelled = self.is_tracking();
                self.samples.clear();
                self.record(at, position);
                self.state = RecognizerState::Possible { origin: position };
                if cancelled {
                    tracing::trace!("pan restarted by pointer down");
                    return Some(Gesture::Pan(PanEvent::new(
                        PanPhase::Cancelled,
                        Point::ZERO,
                        Point::ZERO,
                    )));
                }
                None
            }
            (RecognizerState::Possible { origin }, PointerEvent::Move { position, at }) => {
                self.record(at, position);
                let delta = position - origin;
                if delta.x.hypot(delta.y) < self.slop {
                    return None;
                }
                self.state = RecognizerState::Tracking {
                    down: origin,
                    origin: position,
                };
                self.samples.clear();
                self.record(at, position);
                Some(Gesture::Pan(
                    PanEvent::new(PanPhase::Began, Point::ZERO, Point::ZERO)
                        .at(position)
                        .started_at(origin),
                ))
            }
            (RecognizerState::Tracking { down, origin }, PointerEvent::Move { position, at }) => {
                self.record(at, position);
                Some(Gesture::Pan(
                    PanEvent::new(PanPhase::Changed, position - origin, self.velocity())
                        .at(position)
                        .started_at(down),
                ))
            }
            (RecognizerState::Tracking { down, origin }, PointerEvent::Up { position, at }) => {
                self.record(at, position);
                let velocity = self.velocity();
                self.reset();
                Some(Gesture::Pan(
                    PanEvent::new(PanPhase::Ended, position - origin, velocity)
                        .at(position)
                        .started_at(down),
                ))
            }
            (RecognizerState::Possible { .. }, PointerEvent::Up { position, .. }) => {
                self.reset();
                Some(Gesture::Tap(position))
            }
            (RecognizerState::Tracking { .. }, PointerEvent::Cancel) => {
                self.reset();
                Some(Gesture::Pan(PanEvent::new(
                    PanPhase::Cancelled,
                    Point::ZERO,
                    Point::ZERO,
                )))
            }
            (_, PointerEvent::Cancel) => {
                self.reset();
                None
            }
            (RecognizerState::Idle, PointerEvent::Move { .. } | PointerEvent::Up { .. }) => None,
        }
    }

    fn reset(&mut self) {
        self.state = RecognizerState::Idle;
        self.samples.clear();
    }

    fn record(&mut self, at: Instant, position: Point) {
        self.samples.push_back((at, position));
        while let Some(&(oldest, _)) = self.samples.front() {
            if at.saturating_duration_since(oldest) > self.window && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn velocity(&self) -> Point {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return Point::ZERO;
        };
        let dt = t1.saturating_duration_since(t0).as_secs_f64();
        if dt <= f64::EPSILON {
            return Point::ZERO;
        }
        let d = p1 - p0;
        Point::new(d.x / dt, d.y / dt)
    }
}
