#![forbid(unsafe_code)]

//! Dismissal authority.
//!
//! The presentation controller never removes a sheet on its own. When a drag
//! or a backdrop tap asks for dismissal, the controller consults the
//! [`DismissalHandler`] it was built with, and the handler (normally the
//! screen that presented the sheet) performs the dismissal, typically by
//! calling [`Presenter::dismiss`](crate::presenter::Presenter::dismiss) and
//! releasing its transitioning delegate.
//!
//! # Ownership
//!
//! ```text
//! presenting screen --owns--> TransitioningDelegate --weak--> factory (== screen)
//!        ^                                                         |
//!        |                                                    builds
//!        +------------------weak------------------ PresentationController
//! ```
//!
//! Both back-edges are `Weak`, so no cycle keeps the screen alive; the
//! delegate is dropped when the screen clears its `Option` during dismissal.
//!
//! # Contract
//!
//! - `perform_dismissal` may complete asynchronously; callers never assume the
//!   sheet is gone when it returns.
//! - The controller invokes it at most once per logical dismissal. Hosts must
//!   still tolerate repeated calls after removal (they become no-ops).

/// Capability that authorizes and performs dismissal of a presented sheet.
pub trait DismissalHandler {
    /// Whether an interactive dismissal may proceed right now.
    ///
    /// Returning `false` makes drags and backdrop taps snap the sheet back.
    fn can_be_dismissed(&self) -> bool {
        true
    }

    /// Tear down the presented sheet.
    fn perform_dismissal(&self, animated: bool);
}
