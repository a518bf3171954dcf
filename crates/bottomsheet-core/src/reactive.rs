#![forbid(unsafe_code)]

//! Single-threaded reactive values.
//!
//! [`Observable`] is a shared, version-tracked value. Presented content
//! publishes its preferred height through one; the presentation controller
//! subscribes and resizes the sheet when it changes.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per `set` that changes the value and
//!    once per `notify`.
//! 2. Setting a value equal to the current one is a no-op (no version bump,
//!    no notifications). `notify` republishes it explicitly.
//! 3. Subscribers are notified in registration order, after the internal
//!    borrow is released, so callbacks may read or even `set` the observable.
//! 4. Dropping a [`Subscription`] removes its callback before the next
//!    notification.
//!
//! # Failure Modes
//!
//! - A callback that panics propagates to the caller of `set`.
//! - Handles are `Rc`-based: an `Observable` cannot cross threads.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared, observable value.
///
/// Cloning yields another handle to the same value.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value` at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Current value (cloned).
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of effective mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
        }
        self.publish();
    }

    /// Notify subscribers of the current value even though it did not change.
    ///
    /// Used when what the value describes changed underneath it, e.g. a new
    /// screen with the same height.
    pub fn notify(&self) {
        self.publish();
    }

    fn publish(&self) {
        let callbacks: Vec<Rc<Callback<T>>> = {
            let mut inner = self.inner.borrow_mut();
            inner.version += 1;
            inner.subscribers.retain(|cb| cb.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        let snapshot = self.get();
        for callback in callbacks {
            callback(&snapshot);
        }
    }

    /// Modify the value in place through a closure.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Register a change callback. The callback lives as long as the
    /// returned [`Subscription`].
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|cb| cb.strong_count() > 0)
            .count()
    }
}

/// RAII guard for an [`Observable::subscribe`] callback.
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
