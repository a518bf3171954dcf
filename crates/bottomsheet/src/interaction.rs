#![forbid(unsafe_code)]

//! Interactive dismissal: what a released drag means.
//!
//! While the finger is down the sheet offset follows the drag; the fraction of
//! the sheet that has been dragged off-screen is the interactive dismissal's
//! percent complete. On release, [`decide_release`] picks the outcome.
//!
//! # Decision Rule
//!
//! ```text
//! wants_dismiss = SWIPE_DOWN enabled
//!                 && sheet moved during the gesture (offset > 0)
//!                 && (velocity >= dismiss_velocity || offset >= height * dismiss_fraction)
//!
//! wants_dismiss && authorized      -> Dismiss
//! wants_dismiss && !authorized     -> Refused (snap back, or resize if one is queued)
//! pending resize                   -> Resize(h')
//! otherwise                        -> SnapBack
//! ```
//!
//! A release with upward velocity never dismisses, however far the sheet was
//! dragged: the gesture reversed before completion.

use crate::config::{DismissTriggers, SheetConfig};

/// Fraction of the sheet hidden by `offset`, in `[0, 1]`.
pub fn percent_complete(offset: f64, height: f64) -> f64 {
    if height <= 0.0 {
        return 0.0;
    }
    (offset / height).clamp(0.0, 1.0)
}

/// Inputs to a release decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    /// Sheet offset below rest at release.
    pub offset: f64,
    /// Resting sheet height.
    pub height: f64,
    /// Downward velocity at release (points/s).
    pub velocity: f64,
    /// Whether the gesture was cancelled by the system rather than released.
    pub cancelled: bool,
}

/// What a released drag resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseDecision {
    SnapBack,
    Resize { height: f64 },
    Dismiss,
    /// Past the thresholds, but the dismissal handler refused.
    Refused { then_resize: Option<f64> },
}

/// Whether the release crosses the dismissal thresholds.
pub fn wants_dismiss(release: &Release, config: &SheetConfig) -> bool {
    if release.cancelled || !config.dismiss_triggers.contains(DismissTriggers::SWIPE_DOWN) {
        return false;
    }
    if release.offset <= 0.0 || release.velocity < 0.0 {
        return false;
    }
    release.velocity >= config.dismiss_velocity
        || percent_complete(release.offset, release.height) >= config.dismiss_fraction
}

/// Resolve a release. `authorized` is the dismissal handler's verdict and is
/// only consulted when the thresholds are crossed.
pub fn decide_release(
    release: &Release,
    config: &SheetConfig,
    pending_height: Option<f64>,
    authorized: impl FnOnce() -> bool,
) -> ReleaseDecision {
    if wants_dismiss(release, config) {
        if authorized() {
            return ReleaseDecision::Dismiss;
        }
        return ReleaseDecision::Refused {
            then_resize: pending_height,
        };
    }
    match pending_height {
        Some(height) => ReleaseDecision::Resize { height },
        None => ReleaseDecision::SnapBack,
    }
}
