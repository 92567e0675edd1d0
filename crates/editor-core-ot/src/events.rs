//! Outgoing events.
//!
//! The external synchronization layer listens for a closed set of events. Each kind has a fixed
//! external name (`change`, `cursorActivity`, `blur`, `focus`) so string-keyed layers can map
//! onto [`EventKind`] through [`FromStr`].

use crate::operation::TextOperation;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Kinds of outgoing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A local edit was translated.
    Change,
    /// The local selection moved (debounced).
    CursorActivity,
    /// The editor lost focus with an empty selection.
    Blur,
    /// The editor gained focus.
    Focus,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Change,
        EventKind::CursorActivity,
        EventKind::Blur,
        EventKind::Focus,
    ];

    /// The external name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Change => "change",
            EventKind::CursorActivity => "cursorActivity",
            EventKind::Blur => "blur",
            EventKind::Focus => "focus",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown event name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event name: {0:?}")]
pub struct UnknownEvent(pub String);

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

/// An outgoing event with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    /// A local edit, as an operation and the operation undoing it.
    Change {
        /// The edit.
        operation: TextOperation,
        /// The inverse of the edit.
        inverse: TextOperation,
    },
    /// The local selection moved.
    CursorActivity,
    /// The editor lost focus.
    Blur,
    /// The editor gained focus.
    Focus,
}

impl AdapterEvent {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            AdapterEvent::Change { .. } => EventKind::Change,
            AdapterEvent::CursorActivity => EventKind::CursorActivity,
            AdapterEvent::Blur => EventKind::Blur,
            AdapterEvent::Focus => EventKind::Focus,
        }
    }
}

/// Callback invoked for an event.
pub type EventCallback = Rc<dyn Fn(&AdapterEvent)>;

/// Registry holding at most one callback per [`EventKind`].
#[derive(Default)]
pub struct EventDispatcher {
    callbacks: RefCell<HashMap<EventKind, EventCallback>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.callbacks.borrow().keys().copied().collect();
        kinds.sort_by_key(|k| k.name());
        f.debug_struct("EventDispatcher")
            .field("registered", &kinds)
            .finish()
    }
}

impl EventDispatcher {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `kind`, replacing any previous one.
    pub fn register(&self, kind: EventKind, callback: EventCallback) {
        self.callbacks.borrow_mut().insert(kind, callback);
    }

    /// Remove the callback for `kind`.
    pub fn unregister(&self, kind: EventKind) -> bool {
        self.callbacks.borrow_mut().remove(&kind).is_some()
    }

    /// Remove every callback.
    pub fn clear(&self) {
        self.callbacks.borrow_mut().clear();
    }

    /// Returns `true` if a callback is registered for `kind`.
    pub fn has(&self, kind: EventKind) -> bool {
        self.callbacks.borrow().contains_key(&kind)
    }

    /// Invoke the callback registered for the event's kind. Returns `false` if there is none.
    pub fn dispatch(&self, event: &AdapterEvent) -> bool {
        // Release the borrow before running user code so it may register callbacks itself.
        let callback = self.callbacks.borrow().get(&event.kind()).cloned();
        match callback {
            Some(callback) => {
                callback(event);
                true
            }
            None => false,
        }
    }
}
