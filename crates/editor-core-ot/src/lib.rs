#![warn(missing_docs)]
//! Editor Core OT - Collaboration Binding
//!
//! # Overview
//!
//! `editor-core-ot` connects a model of an [`editor_core::Workspace`] to an operational-transform
//! collaboration engine. It does not transport or transform operations itself; it only maps
//! between editor deltas and retain/insert/delete operations, in both directions, and renders
//! the cursors of remote participants.
//!
//! # Data Flow
//!
//! ```text
//! local edit ──► ChangeTranslator ──► (operation, inverse) ──► EventDispatcher ──► sync layer
//!
//! sync layer ──► OperationApplier ──► one batched host edit (suppressed, not echoed)
//!
//! remote cursor ──► PresenceDecorator ──► caret / range decorations in the bound view
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_core::Workspace;
//! use editor_core_ot::{EditorAdapter, RemoteCursor, TextOperation};
//!
//! let mut workspace = Workspace::new();
//! let opened = workspace.open_buffer(None, "").unwrap();
//! let mut adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
//!
//! adapter
//!     .apply_operation(&mut workspace, &TextOperation::new().insert("shared text"))
//!     .unwrap();
//! adapter
//!     .apply_operation(&mut workspace, &TextOperation::new().retain(6).delete(5).insert("doc"))
//!     .unwrap();
//! assert_eq!(workspace.buffer_text(opened.buffer_id).unwrap(), "shared doc");
//!
//! let handle = adapter
//!     .set_other_cursor(&mut workspace, RemoteCursor::new(0, 6), "#e91e63", "peer-1", "Ada")
//!     .unwrap();
//! assert_eq!(adapter.participant_count(), 1);
//! handle.clear(&mut adapter, &mut workspace);
//! assert_eq!(adapter.participant_count(), 0);
//! ```
//!
//! # Module Description
//!
//! - [`operation`] - Step sequences and their JSON form
//! - [`translator`] - Host deltas to operations
//! - [`applier`] - Operations to batched host edits
//! - [`attachment`] - Which view displays the model
//! - [`presence`] - Remote participant decorations
//! - [`events`] - Outgoing events
//! - [`adapter`] - The facade tying it together
//!
//! # Threading
//!
//! Everything is single-threaded. Deferred work (rebinding after an attachment change and
//! debounced cursor activity) runs when the host calls [`EditorAdapter::tick`].

pub mod adapter;
pub mod applier;
pub mod attachment;
pub mod cursor;
pub mod error;
pub mod events;
pub mod operation;
pub mod options;
pub mod presence;
pub mod scheduler;
pub mod suppression;
pub mod translator;

pub use adapter::EditorAdapter;
pub use applier::{ApplyOutcome, OperationApplier};
pub use attachment::{AttachmentState, EditorBinding};
pub use cursor::{Cursor, RemoteCursor};
pub use error::{AdapterError, OperationError, PresenceError};
pub use events::{AdapterEvent, EventCallback, EventDispatcher, EventKind, UnknownEvent};
pub use operation::{Step, TextOperation};
pub use options::AdapterOptions;
pub use presence::{ClientId, ParticipantHandle, PresenceDecorator, RemoteParticipant};
pub use scheduler::{Debounce, PendingSlot};
pub use suppression::{Suppression, SuppressionGuard};
pub use translator::ChangeTranslator;
