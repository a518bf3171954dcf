#![forbid(unsafe_code)]

//! Elapsed-driven scalar animations.
//!
//! An [`Animation`] interpolates a single `f64` (sheet offset, sheet height,
//! backdrop opacity) from `from` to `to` over `duration`. It is advanced by
//! the host with the frame delta rather than sampling a clock, so animation
//! behavior is deterministic under test.
//!
//! # Invariants
//!
//! - `value()` is exactly `from` before any advance and exactly `to` once
//!   finished; easing overshoot is never exposed.
//! - A zero-length animation is finished on construction.

use std::time::Duration;

/// Easing curve applied to linear progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Easing {
    Linear,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
    EaseOutCubic,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// A running interpolation between two values.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    from: f64,
    to: f64,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Animation {
    pub fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    /// An animation that is already at `to`.
    pub fn immediate(to: f64) -> Self {
        Self::new(to, to, Duration::ZERO, Easing::Linear)
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Current interpolated value.
    pub fn value(&self) -> f64 {
        if self.is_finished() {
            return self.to;
        }
        let eased = self.easing.apply(self.progress());
        self.from + (self.to - self.from) * eased
    }

    /// Advance by `dt`. Returns `true` when this call finished the animation.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.is_finished() {
            return false;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    /// Jump to the end.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}
