#![warn(missing_docs)]
//! Editor Core - Headless Editor Kernel
//!
//! # Overview
//!
//! `editor-core` is a headless editor kernel focused on document state, views and change
//! notifications. It does not render anything; a host UI (or a collaboration binding such as
//! `editor-core-ot`) drives it through a small, synchronous API.
//!
//! # Core Features
//!
//! - **Rope-backed buffers**: O(log n) edits and offset ↔ line/column conversion
//! - **Batched range edits**: pre-batch-relative ranges, one undo step and one notification per batch
//! - **Views**: selections, focus and decorations, rebindable to another buffer
//! - **Change Notifications**: disposable subscriptions on buffers and views
//! - **Undo/redo**: per-buffer history with overridable handlers
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workspace (buffers, views, subscriptions)  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  TextModel (batched edits, undo history)    │  ← Document state
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← Line Access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_core::{EditOperation, Position, Workspace};
//!
//! let mut workspace = Workspace::new();
//! let opened = workspace.open_buffer(None, "fn main() {}\n").unwrap();
//!
//! workspace
//!     .apply_edits(
//!         opened.buffer_id,
//!         vec![EditOperation::insert(Position::new(1, 0), "// done\n")],
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     workspace.buffer_text(opened.buffer_id).unwrap(),
//!     "fn main() {}\n// done\n"
//! );
//! ```
//!
//! # Module Description
//!
//! - [`line_index`] - Rope based line index
//! - [`model`] - Text model, batched edits and undo history
//! - [`delta`] - Structured change deltas
//! - [`decorations`] - View decorations
//! - [`state`] - Change notifications and subscriptions
//! - [`workspace`] - Buffers, views and their wiring
//!
//! # Unicode Support
//!
//! All offsets are Unicode scalar values (`char`), never bytes.

pub mod decorations;
pub mod delta;
pub mod line_index;
pub mod model;
mod selection;
pub mod state;
pub mod workspace;

pub use decorations::{Decoration, DecorationId, DecorationKind, DecorationRange};
pub use delta::{ContentChange, TextDelta};
pub use line_index::LineIndex;
pub use model::{EditOperation, EditRange, TextModel, TextModelOptions};
pub use selection::{Position, Selection, SelectionDirection};
pub use state::{StateChange, StateChangeCallback, StateChangeType, SubscriptionId};
pub use workspace::{BufferId, HistoryHandler, OpenBufferResult, ViewId, Workspace, WorkspaceError};
