//! Cooperative deferral primitives.
//!
//! Host notifications are delivered while the workspace is mutably borrowed, so work that needs
//! the workspace is parked here and picked up at the next [`EditorAdapter::tick`].
//!
//! [`EditorAdapter::tick`]: crate::EditorAdapter::tick

use std::cell::{Cell, RefCell};

/// A single-slot pending task. Scheduling again replaces the parked task.
#[derive(Debug)]
pub struct PendingSlot<T> {
    slot: RefCell<Option<T>>,
}

impl<T> Default for PendingSlot<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }
}

impl<T> PendingSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `task`. Returns `true` if it replaced a task that had not run yet.
    pub fn schedule(&self, task: T) -> bool {
        self.slot.borrow_mut().replace(task).is_some()
    }

    /// Take the parked task, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.slot.borrow_mut().take()
    }

    /// Drop the parked task. Returns `true` if there was one.
    pub fn cancel(&self) -> bool {
        self.take().is_some()
    }

    /// Returns `true` if a task is parked.
    pub fn is_pending(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

/// Coalesces any number of triggers into one firing per tick.
#[derive(Debug, Default)]
pub struct Debounce {
    armed: Cell<bool>,
}

impl Debounce {
    /// Create a disarmed debounce.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the debounce. Returns `true` if it was not armed yet.
    pub fn trigger(&self) -> bool {
        !self.armed.replace(true)
    }

    /// Disarm, returning whether it was armed.
    pub fn take(&self) -> bool {
        self.armed.replace(false)
    }

    /// Returns `true` while armed.
    pub fn is_armed(&self) -> bool {
        self.armed.get()
    }
}
