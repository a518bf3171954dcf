#![forbid(unsafe_code)]

//! Reference host screens.
//!
//! [`RootScreen`] plays the presenting screen: it builds the presentation
//! controller, owns the transitioning delegate for the lifetime of the
//! sheet, and performs dismissal when asked. [`ResizeScreen`] is the content
//! inside the sheet; its controls request new heights without checking them,
//! so the sheet's bounds are what decide.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bottomsheet::{
    DismissalHandler, PresentError, PresentationController, PresentationControllerFactory,
    PresentedContent, PresentingContext, Presenter, ScrollView, SheetConfig,
    SheetNavigationStack, TransitioningDelegate,
};
use bottomsheet_core::{Insets, Observable, Size};

/// Step applied by [`ResizeScreen::grow`] and [`ResizeScreen::shrink`].
pub const HEIGHT_STEP: f64 = 100.0;

/// Sheet content whose preferred height is driven by buttons.
pub struct ResizeScreen {
    height: Observable<f64>,
    scroll: Option<ScrollView>,
}

impl fmt::Debug for ResizeScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeScreen")
            .field("height", &self.height.get())
            .field("scroll", &self.scroll)
            .finish()
    }
}

impl ResizeScreen {
    pub fn new(height: f64) -> Rc<Self> {
        Rc::new(Self {
            height: Observable::new(height),
            scroll: None,
        })
    }

    /// Content with a scroll view of `scroll_content` points.
    pub fn scrolling(height: f64, scroll_content: f64) -> Rc<Self> {
        Rc::new(Self {
            height: Observable::new(height),
            scroll: Some(ScrollView::new(scroll_content)),
        })
    }

    /// The most recently requested height.
    pub fn requested_height(&self) -> f64 {
        self.height.get()
    }

    pub fn scroll(&self) -> Option<&ScrollView> {
        self.scroll.as_ref()
    }

    /// Request a new content height.
    pub fn update_content_height(&self, height: f64) {
        tracing::debug!(height, "content height requested");
        self.height.set(height);
    }

    /// "x2"
    pub fn double(&self) {
        self.update_content_height(self.requested_height() * 2.0);
    }

    /// "/2"
    pub fn halve(&self) {
        self.update_content_height(self.requested_height() / 2.0);
    }

    /// "+100"
    pub fn grow(&self) {
        self.update_content_height(self.requested_height() + HEIGHT_STEP);
    }

    /// "-100"
    pub fn shrink(&self) {
        self.update_content_height(self.requested_height() - HEIGHT_STEP);
    }
}

impl PresentedContent for ResizeScreen {
    fn preferred_height(&self) -> Observable<f64> {
        self.height.clone()
    }

    fn scroll_view(&self) -> Option<ScrollView> {
        self.scroll.clone()
    }
}

/// Safe-area source handed to the controller as the presenting context.
#[derive(Debug, Default)]
pub struct ScreenContext {
    insets: Cell<Insets>,
}

impl PresentingContext for ScreenContext {
    fn safe_area_insets(&self) -> Insets {
        self.insets.get()
    }
}

/// How [`RootScreen`] answers `perform_dismissal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DismissMode {
    /// Dismiss inside the callback.
    #[default]
    Immediate,
    /// Dismiss from a task posted to the main queue.
    Deferred,
    /// Do nothing; the sheet is expected to snap back.
    Ignore,
}

/// The presenting screen: factory, dismissal handler and delegate owner.
pub struct RootScreen {
    me: Weak<RootScreen>,
    presenter: Presenter,
    context: Rc<ScreenContext>,
    config: RefCell<SheetConfig>,
    delegate: RefCell<Option<Rc<TransitioningDelegate>>>,
    sheet: RefCell<Option<Rc<SheetNavigationStack>>>,
    allow_dismissal: Cell<bool>,
    dismiss_mode: Cell<DismissMode>,
    dismissal_calls: Cell<u32>,
    delegate_releases: Cell<u32>,
}

impl fmt::Debug for RootScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootScreen")
            .field("presenter", &self.presenter)
            .field("has_delegate", &self.has_delegate())
            .field("dismiss_mode", &self.dismiss_mode.get())
            .field("dismissal_calls", &self.dismissal_calls.get())
            .finish_non_exhaustive()
    }
}

impl RootScreen {
    pub fn new(size: Size) -> Rc<Self> {
        Self::with_config(size, SheetConfig::default())
    }

    pub fn with_config(size: Size, config: SheetConfig) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            presenter: Presenter::new(size),
            context: Rc::new(ScreenContext::default()),
            config: RefCell::new(config),
            delegate: RefCell::new(None),
            sheet: RefCell::new(None),
            allow_dismissal: Cell::new(true),
            dismiss_mode: Cell::new(DismissMode::default()),
            dismissal_calls: Cell::new(0),
            delegate_releases: Cell::new(0),
        })
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Config used for the next presented sheet.
    pub fn set_config(&self, config: SheetConfig) {
        *self.config.borrow_mut() = config;
    }

    pub fn set_safe_area(&self, insets: Insets) {
        self.context.insets.set(insets);
    }

    pub fn set_allow_dismissal(&self, allow: bool) {
        self.allow_dismissal.set(allow);
    }

    pub fn set_dismiss_mode(&self, mode: DismissMode) {
        self.dismiss_mode.set(mode);
    }

    /// How many times `perform_dismissal` was called.
    pub fn dismissal_calls(&self) -> u32 {
        self.dismissal_calls.get()
    }

    /// How many times the transitioning delegate was released.
    pub fn delegate_releases(&self) -> u32 {
        self.delegate_releases.get()
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.borrow().is_some()
    }

    /// Weak handle to the current delegate, for checking it was freed.
    pub fn delegate_handle(&self) -> Option<Weak<TransitioningDelegate>> {
        self.delegate.borrow().as_ref().map(Rc::downgrade)
    }

    pub fn sheet(&self) -> Option<Rc<SheetNavigationStack>> {
        self.sheet.borrow().clone()
    }

    /// "Show sheet": present a [`ResizeScreen`] of `height` in a navigation stack.
    pub fn show_sheet(
        &self,
        height: f64,
        animated: bool,
    ) -> Result<Rc<ResizeScreen>, PresentError> {
        let screen = ResizeScreen::new(height);
        self.present_screen(screen.clone(), animated)?;
        Ok(screen)
    }

    /// Present arbitrary content wrapped in a navigation stack.
    pub fn present_screen(
        &self,
        screen: Rc<dyn PresentedContent>,
        animated: bool,
    ) -> Result<Rc<SheetNavigationStack>, PresentError> {
        if self.presenter.is_presenting() {
            return Err(PresentError::AlreadyPresenting);
        }
        let stack = Rc::new(SheetNavigationStack::new(screen));
        let factory = self.me.clone() as Weak<dyn PresentationControllerFactory>;
        let delegate = Rc::new(TransitioningDelegate::new(factory));
        *self.delegate.borrow_mut() = Some(Rc::clone(&delegate));

        let presenting = Rc::clone(&self.context) as Rc<dyn PresentingContext>;
        let presented = Rc::clone(&stack) as Rc<dyn PresentedContent>;
        if let Err(e) = self
            .presenter
            .present(presented, Some(presenting), &delegate, animated, None)
        {
            tracing::warn!(error = %e, "present failed");
            self.release_delegate();
            return Err(e);
        }
        *self.sheet.borrow_mut() = Some(Rc::clone(&stack));
        Ok(stack)
    }

    /// "Show next": push another resize screen inside the sheet.
    pub fn show_next(&self, height: f64) -> Option<Rc<ResizeScreen>> {
        let stack = self.sheet()?;
        let screen = ResizeScreen::new(height);
        stack.push(screen.clone());
        Some(screen)
    }

    /// "Show root": pop back to the first screen inside the sheet.
    pub fn show_root(&self) -> usize {
        self.sheet().map_or(0, |stack| stack.pop_to_root())
    }

    fn finish_dismissal(&self, animated: bool) {
        self.presenter.dismiss(animated, None);
        self.sheet.borrow_mut().take();
        self.release_delegate();
    }

    fn release_delegate(&self) {
        if self.delegate.borrow_mut().take().is_some() {
            self.delegate_releases.set(self.delegate_releases.get() + 1);
        }
    }
}

impl DismissalHandler for RootScreen {
    fn can_be_dismissed(&self) -> bool {
        self.allow_dismissal.get()
    }

    fn perform_dismissal(&self, animated: bool) {
        self.dismissal_calls.set(self.dismissal_calls.get() + 1);
        let mode = self.dismiss_mode.get();
        tracing::debug!(animated, ?mode, "perform dismissal");
        match mode {
            DismissMode::Immediate => self.finish_dismissal(animated),
            DismissMode::Deferred => {
                let me = self.me.clone();
                self.presenter.queue().post(move || {
                    if let Some(screen) = me.upgrade() {
                        screen.finish_dismissal(animated);
                    }
                });
            }
            DismissMode::Ignore => {}
        }
    }
}

impl PresentationControllerFactory for RootScreen {
    fn make_presentation_controller(
        &self,
        presented: Rc<dyn PresentedContent>,
        presenting: Option<Rc<dyn PresentingContext>>,
    ) -> PresentationController {
        let handler = self.me.clone() as Weak<dyn DismissalHandler>;
        PresentationController::new(presented, presenting, handler)
            .with_config(self.config.borrow().clone())
    }
}
