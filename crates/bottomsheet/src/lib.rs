#![forbid(unsafe_code)]

//! Bottom-sheet modal presentation.
//!
//! A sheet slides up from the bottom edge of a container, sizes itself to its
//! content's preferred height, dims what is behind it, and can be dragged
//! down to dismiss. Dismissal is never decided by the sheet alone: it asks a
//! [`DismissalHandler`], normally the screen that presented it.
//!
//! # Pieces
//!
//! - [`Presenter`]: owns the active sheet, routes input and deferred work
//! - [`TransitioningDelegate`] + [`PresentationControllerFactory`]: how the
//!   host supplies a controller for a presentation
//! - [`PresentationController`]: geometry, state machine, backdrop
//! - [`PresentedContent`]: the content contract (preferred height, scroll view)
//! - [`SheetNavigationStack`]: several screens inside one sheet
//! - [`SheetConfig`]: bounds, thresholds, timings
//!
//! # Example
//!
//! ```
//! use std::rc::{Rc, Weak};
//! use bottomsheet::{
//!     DismissalHandler, PresentationController, PresentationControllerFactory,
//!     PresentedContent, PresentingContext, Presenter, TransitioningDelegate,
//! };
//! use bottomsheet_core::{Observable, Size};
//!
//! struct Note(Observable<f64>);
//! impl PresentedContent for Note {
//!     fn preferred_height(&self) -> Observable<f64> {
//!         self.0.clone()
//!     }
//! }
//!
//! struct Screen {
//!     me: Weak<Screen>,
//!     presenter: Presenter,
//! }
//! impl DismissalHandler for Screen {
//!     fn perform_dismissal(&self, animated: bool) {
//!         self.presenter.dismiss(animated, None);
//!     }
//! }
//! impl PresentationControllerFactory for Screen {
//!     fn make_presentation_controller(
//!         &self,
//!         presented: Rc<dyn PresentedContent>,
//!         presenting: Option<Rc<dyn PresentingContext>>,
//!     ) -> PresentationController {
//!         let handler = self.me.clone() as Weak<dyn DismissalHandler>;
//!         PresentationController::new(presented, presenting, handler)
//!     }
//! }
//!
//! let screen = Rc::new_cyclic(|me| Screen {
//!     me: me.clone(),
//!     presenter: Presenter::new(Size::new(390.0, 844.0)),
//! });
//! let delegate = TransitioningDelegate::new(
//!     Rc::downgrade(&screen) as Weak<dyn PresentationControllerFactory>,
//! );
//! let height = Observable::new(300.0);
//! screen
//!     .presenter
//!     .present(Rc::new(Note(height.clone())), None, &delegate, false, None)
//!     .expect("present");
//! height.set(480.0);
//! assert_eq!(screen.presenter.content_size().map(|s| s.height), Some(480.0));
//! ```
//!
//! With animations enabled, drive time with [`Presenter::advance`] or
//! [`Presenter::tick`].

pub mod config;
pub mod content;
pub mod controller;
pub mod dismissal;
pub mod factory;
pub mod interaction;
pub mod navigation;
pub mod presenter;
pub mod scroll;
pub mod state;

pub use config::{
    BackdropConfig, ConfigError, DismissTriggers, HeightBounds, SheetConfig, TransitionTimings,
};
pub use content::{PresentedContent, PresentingContext};
pub use controller::PresentationController;
pub use dismissal::DismissalHandler;
pub use factory::{PresentationControllerFactory, TransitioningDelegate};
pub use interaction::{Release, ReleaseDecision};
pub use navigation::{ScreenId, SheetNavigationStack};
pub use presenter::{Completion, PresentError, Presenter};
pub use scroll::{PanOwner, ScrollReconciler, ScrollView};
pub use state::{IgnoreReason, ResizeOutcome, SheetEvent, SheetState};
