#![forbid(unsafe_code)]

//! Scripted gestures.
//!
//! [`PanScript`] emits already-recognized pan events, for driving the
//! presenter directly. [`PointerScript`] emits timestamped raw pointer
//! samples, for exercising recognition end to end.

use std::time::Duration;

use bottomsheet::Presenter;
use bottomsheet_core::{PanEvent, PanPhase, Point, PointerEvent};
use web_time::Instant;

/// A vertical pan: began, evenly spaced changes, then ended or cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct PanScript {
    waypoints: Vec<f64>,
    steps: usize,
    release_velocity: f64,
    cancelled: bool,
}

impl PanScript {
    /// Drag `distance` points (positive is downward).
    pub fn drag(distance: f64) -> Self {
        Self {
            waypoints: vec![distance],
            steps: 4,
            release_velocity: 0.0,
            cancelled: false,
        }
    }

    /// Continue from the last waypoint to `translation`.
    pub fn then_to(mut self, translation: f64) -> Self {
        self.waypoints.push(translation);
        self
    }

    /// Changed events per waypoint (at least one).
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = steps.max(1);
        self
    }

    /// Velocity reported by the final event.
    pub fn release_velocity(mut self, velocity: f64) -> Self {
        self.release_velocity = velocity;
        self
    }

    /// End with `Cancelled` instead of `Ended`.
    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn events(&self) -> Vec<PanEvent> {
        let mut events = vec![PanEvent::vertical(PanPhase::Began, 0.0, 0.0)];
        let mut from = 0.0;
        for &to in &self.waypoints {
            for i in 1..=self.steps {
                let t = i as f64 / self.steps as f64;
                events.push(PanEvent::vertical(
                    PanPhase::Changed,
                    from + (to - from) * t,
                    0.0,
                ));
            }
            from = to;
        }
        let phase = if self.cancelled {
            PanPhase::Cancelled
        } else {
            PanPhase::Ended
        };
        events.push(PanEvent::vertical(phase, from, self.release_velocity));
        events
    }

    /// Feed every event to `presenter`.
    pub fn play(&self, presenter: &Presenter) {
        for event in self.events() {
            presenter.handle_pan(event);
        }
    }
}

/// Timestamped pointer samples starting at a fixed instant.
#[derive(Debug, Clone)]
pub struct PointerScript {
    start: Instant,
    elapsed: Duration,
    events: Vec<PointerEvent>,
}

impl PointerScript {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            elapsed: Duration::ZERO,
            events: Vec::new(),
        }
    }

    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    pub fn down(mut self, position: Point) -> Self {
        let at = self.now();
        self.events.push(PointerEvent::Down { position, at });
        self
    }

    /// Move to `position` after `after` has passed.
    pub fn move_to(mut self, position: Point, after: Duration) -> Self {
        self.elapsed += after;
        let at = self.now();
        self.events.push(PointerEvent::Move { position, at });
        self
    }

    /// Move in `steps` equal increments from `from` to `to` over `over`.
    pub fn sweep(mut self, from: Point, to: Point, over: Duration, steps: u32) -> Self {
        let steps = steps.max(1);
        let step_time = over / steps;
        for i in 1..=steps {
            let t = f64::from(i) / f64::from(steps);
            let position = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            self = self.move_to(position, step_time);
        }
        self
    }

    pub fn up(mut self, position: Point) -> Self {
        let at = self.now();
        self.events.push(PointerEvent::Up { position, at });
        self
    }

    pub fn cancel(mut self) -> Self {
        self.events.push(PointerEvent::Cancel);
        self
    }

    pub fn events(&self) -> &[PointerEvent] {
        &self.events
    }

    /// Feed every sample to `presenter`.
    pub fn play(&self, presenter: &Presenter) {
        for &event in &self.events {
            presenter.handle_pointer(event);
        }
    }
}
