//! Change notifications
//!
//! Buffers and views expose a subscription mechanism: callers register a callback and receive a
//! [`SubscriptionId`] that can later be passed to
//! [`Workspace::unsubscribe`](crate::Workspace::unsubscribe).
//!
//! Callbacks run synchronously, while the workspace is still mutably borrowed by the operation
//! that triggered them. A callback therefore cannot reach back into the workspace; it should
//! record what it needs and act later.
//!
//! # Example
//!
//! ```rust
//! use editor_core::{StateChangeType, Workspace};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut workspace = Workspace::new();
//! let opened = workspace.open_buffer(None, "Hello").unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let seen_clone = Rc::clone(&seen);
//! workspace
//!     .on_model_event(opened.buffer_id, move |change| {
//!         seen_clone.borrow_mut().push(change.change_type);
//!     })
//!     .unwrap();
//!
//! workspace.insert_text(opened.view_id, ", World").unwrap();
//! assert_eq!(*seen.borrow(), vec![StateChangeType::DocumentModified]);
//! ```

use crate::Selection;
use crate::delta::TextDelta;
use std::sync::Arc;

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Document content modified (buffer-level)
    DocumentModified,
    /// A view started or stopped displaying the buffer (buffer-level)
    AttachedChanged,
    /// Cursor or selection moved (view-level)
    CursorMoved,
    /// View gained input focus (view-level)
    FocusGained,
    /// View lost input focus (view-level)
    FocusLost,
}

/// State change record
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
    /// Structured text delta for document changes (if available).
    pub text_delta: Option<Arc<TextDelta>>,
    /// The view's primary selection after the change (view-level changes only).
    pub selection: Option<Selection>,
}

impl StateChange {
    /// Create a new state change record.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            text_delta: None,
            selection: None,
        }
    }

    /// Attach a structured text delta to this change record.
    pub fn with_text_delta(mut self, delta: Arc<TextDelta>) -> Self {
        self.text_delta = Some(delta);
        self
    }

    /// Attach the view's primary selection to this change record.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange)>;

/// Handle returned by the `on_*_event` subscription methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// An ordered list of subscribed callbacks.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(SubscriptionId, StateChangeCallback)>,
}

impl Listeners {
    pub(crate) fn push(&mut self, id: SubscriptionId, callback: StateChangeCallback) {
        self.entries.push((id, callback));
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self, change: &StateChange) {
        for (_, cb) in &mut self.entries {
            cb(change);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
