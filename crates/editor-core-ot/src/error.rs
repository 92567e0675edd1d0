//! Errors reported by the adapter, its operations and presence updates.

use editor_core::{BufferId, WorkspaceError};
use thiserror::Error;

#[derive(Debug, Error)]
/// Fatal errors reported by [`EditorAdapter`](crate::EditorAdapter).
pub enum AdapterError {
    #[error("model {} is not open in the workspace", .0.get())]
    /// The model handed to the constructor does not exist.
    ModelNotFound(BufferId),

    #[error("the adapter has been detached")]
    /// The adapter was detached and can no longer touch the editor.
    Detached,

    #[error("host editor error: {0}")]
    /// The host workspace rejected a call.
    Host(#[from] WorkspaceError),

    #[error("operation expects a buffer of {expected} characters, found {actual}")]
    /// A remote operation does not match the current buffer length.
    BaseLengthMismatch {
        /// Base length of the operation.
        expected: usize,
        /// Length of the buffer.
        actual: usize,
    },

    #[error("invalid operation: {0}")]
    /// An operation could not be applied or inverted.
    Operation(#[from] OperationError),

    #[error("invalid adapter options: {0}")]
    /// Adapter options could not be parsed.
    InvalidOptions(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by [`TextOperation`](crate::TextOperation) itself.
pub enum OperationError {
    #[error("operation expects a buffer of {expected} characters, found {actual}")]
    /// The document length differs from the operation's base length.
    BaseLengthMismatch {
        /// Base length of the operation.
        expected: usize,
        /// Length of the document.
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Rejections from [`EditorAdapter::set_other_cursor`](crate::EditorAdapter::set_other_cursor).
///
/// These are not fatal: the participant collection is left untouched and the caller may retry
/// with corrected input.
pub enum PresenceError {
    #[error("cursor offsets must be non-negative (position {position}, selection end {selection_end})")]
    /// One of the cursor offsets is negative.
    NegativeOffset {
        /// Reported caret offset.
        position: i64,
        /// Reported anchor offset.
        selection_end: i64,
    },

    #[error("invalid color {0:?}, expected #rgb or #rrggbb")]
    /// The colour is not a 3 or 6 digit hex string.
    InvalidColor(String),

    #[error("the adapter has been detached")]
    /// The adapter was detached.
    Detached,

    #[error("host editor error: {0}")]
    /// The host rejected a decoration update.
    Host(#[from] WorkspaceError),
}
