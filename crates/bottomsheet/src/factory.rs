#![forbid(unsafe_code)]

//! Who builds the presentation controller.
//!
//! The host installs a [`TransitioningDelegate`] for a presentation. When the
//! presenter needs a controller it asks the delegate, which forwards to the
//! host's [`PresentationControllerFactory`].
//!
//! # Ownership
//!
//! The delegate refers to its factory weakly, and the host usually *is* the
//! factory, so holding the delegate never keeps the host alive. The host in
//! turn owns the delegate for the lifetime of the presentation and drops it
//! when it performs the dismissal.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::content::{PresentedContent, PresentingContext};
use crate::controller::PresentationController;

/// Builds a presentation controller on request.
pub trait PresentationControllerFactory {
    fn make_presentation_controller(
        &self,
        presented: Rc<dyn PresentedContent>,
        presenting: Option<Rc<dyn PresentingContext>>,
    ) -> PresentationController;
}

/// Adapter the presenter queries for a presentation controller.
pub struct TransitioningDelegate {
    factory: Weak<dyn PresentationControllerFactory>,
}

impl fmt::Debug for TransitioningDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitioningDelegate")
            .field("factory_alive", &self.has_factory())
            .finish()
    }
}

impl TransitioningDelegate {
    pub fn new(factory: Weak<dyn PresentationControllerFactory>) -> Self {
        Self { factory }
    }

    /// Whether the factory is still alive.
    pub fn has_factory(&self) -> bool {
        self.factory.strong_count() > 0
    }

    /// Ask the factory for a controller. `None` once the factory is gone.
    pub fn presentation_controller(
        &self,
        presented: Rc<dyn PresentedContent>,
        presenting: Option<Rc<dyn PresentingContext>>,
    ) -> Option<PresentationController> {
        let Some(factory) = self.factory.upgrade() else {
            tracing::warn!("presentation controller factory released");
            return None;
        };
        Some(factory.make_presentation_controller(presented, presenting))
    }
}
