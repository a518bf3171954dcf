#![forbid(unsafe_code)]

//! A stack of screens hosted inside one sheet.
//!
//! [`SheetNavigationStack`] is itself [`PresentedContent`]: its preferred
//! height and scroll view are always those of the top screen, so pushing a
//! taller screen resizes the sheet through the normal content-height path.
//!
//! # Invariants
//!
//! - The root screen is never popped.
//! - Exactly one child height subscription is live: the top screen's.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bottomsheet_core::{Observable, Subscription};

use crate::content::PresentedContent;
use crate::scroll::ScrollView;

/// Identifies a screen pushed onto a [`SheetNavigationStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(u64);

impl ScreenId {
    pub fn get(self) -> u64 {
        self.0
    }
}

struct Entry {
    id: ScreenId,
    screen: Rc<dyn PresentedContent>,
}

struct StackInner {
    entries: Vec<Entry>,
    next_id: u64,
    top_subscription: Option<Subscription>,
}

/// Navigation container presented as a single sheet.
pub struct SheetNavigationStack {
    inner: RefCell<StackInner>,
    height: Observable<f64>,
}

impl fmt::Debug for SheetNavigationStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetNavigationStack")
            .field("depth", &self.depth())
            .field("height", &self.height.get())
            .finish()
    }
}

impl SheetNavigationStack {
    pub fn new(root: Rc<dyn PresentedContent>) -> Self {
        let height = Observable::new(root.preferred_height().get());
        let stack = Self {
            inner: RefCell::new(StackInner {
                entries: vec![Entry {
                    id: ScreenId(0),
                    screen: root,
                }],
                next_id: 1,
                top_subscription: None,
            }),
            height,
        };
        stack.follow_top();
        stack
    }

    /// Number of screens, root included.
    pub fn depth(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn root_id(&self) -> ScreenId {
        ScreenId(0)
    }

    pub fn top_id(&self) -> ScreenId {
        self.inner
            .borrow()
            .entries
            .last()
            .map_or(ScreenId(0), |e| e.id)
    }

    pub fn top(&self) -> Rc<dyn PresentedContent> {
        let inner = self.inner.borrow();
        // entries is never empty: the root cannot be popped.
        Rc::clone(&inner.entries[inner.entries.len() - 1].screen)
    }

    /// Ids from root to top.
    pub fn ids(&self) -> Vec<ScreenId> {
        self.inner.borrow().entries.iter().map(|e| e.id).collect()
    }

    /// Push `screen` on top and follow its height.
    pub fn push(&self, screen: Rc<dyn PresentedContent>) -> ScreenId {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = ScreenId(inner.next_id);
            inner.next_id += 1;
            inner.entries.push(Entry { id, screen });
            id
        };
        tracing::debug!(id = id.0, depth = self.depth(), "sheet screen pushed");
        self.follow_top();
        id
    }

    /// Pop the top screen. `None` when only the root is left.
    pub fn pop(&self) -> Option<Rc<dyn PresentedContent>> {
        let popped = {
            let mut inner = self.inner.borrow_mut();
            if inner.entries.len() <= 1 {
                return None;
            }
            inner.entries.pop()
        };
        tracing::debug!(depth = self.depth(), "sheet screen popped");
        self.follow_top();
        popped.map(|e| e.screen)
    }

    /// Pop everything above the root. Returns how many screens were removed.
    pub fn pop_to_root(&self) -> usize {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let removed = inner.entries.len().saturating_sub(1);
            inner.entries.truncate(1);
            removed
        };
        if removed > 0 {
            tracing::debug!(removed, "sheet stack popped to root");
            self.follow_top();
        }
        removed
    }

    fn follow_top(&self) {
        let top = self.top();
        let child = top.preferred_height();
        let forward = self.height.clone();
        let subscription = child.subscribe(move |h| forward.set(*h));
        // Drop the old subscription before publishing the new height so a
        // popped screen can no longer drive the sheet.
        self.inner.borrow_mut().top_subscription = Some(subscription);
        let height = child.get();
        if self.height.get() == height {
            // Same height, different screen: the sheet still has to lay out
            // the new top's scroll view.
            self.height.notify();
        } else {
            self.height.set(height);
        }
    }
}

impl PresentedContent for SheetNavigationStack {
    fn preferred_height(&self) -> Observable<f64> {
        self.height.clone()
    }

    fn scroll_view(&self) -> Option<ScrollView> {
        self.top().scroll_view()
    }
}
