#![forbid(unsafe_code)]

//! Single-threaded main queue.
//!
//! Deferred work (asking a dismissal handler to dismiss, running completion
//! continuations) is posted here instead of being called while a component
//! holds a mutable borrow of its own state. The owner drains the queue once it
//! has released that borrow.
//!
//! # Invariants
//!
//! 1. Tasks run in FIFO order, one at a time, on the draining thread.
//! 2. Tasks posted while draining run in the same drain, after everything
//!    that was already queued.
//! 3. The queue is `Rc`-based and therefore `!Send`; posting from another
//!    thread does not compile.
//! 4. A nested `run_pending` (a task that drains) continues the same FIFO.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// Upper bound on tasks run by one drain; a task that keeps re-posting itself
/// is a livelock, not progress.
const MAX_TASKS_PER_DRAIN: usize = 10_000;

#[derive(Default)]
struct QueueInner {
    tasks: RefCell<VecDeque<Task>>,
    draining: Cell<bool>,
}

/// Cloneable handle to a FIFO task queue.
#[derive(Clone, Default)]
pub struct MainQueue {
    inner: Rc<QueueInner>,
}

impl fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainQueue")
            .field("pending", &self.pending())
            .field("draining", &self.inner.draining.get())
            .finish()
    }
}

impl MainQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run on the next drain.
    pub fn post(&self, task: impl FnOnce() + 'static) {
        self.inner.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.inner.tasks.borrow().len()
    }

    /// Whether a drain is in progress further up the stack.
    pub fn is_draining(&self) -> bool {
        self.inner.draining.get()
    }

    /// Run queued tasks until the queue is empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let outer = !self.inner.draining.replace(true);
        let mut ran = 0;
        loop {
            let next = self.inner.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
            if ran >= MAX_TASKS_PER_DRAIN {
                tracing::warn!(
                    pending = self.pending(),
                    "main queue drain budget exhausted; deferring remaining tasks"
                );
                break;
            }
        }
        if outer {
            self.inner.draining.set(false);
        }
        ran
    }
}
