//! Linear cursor representations.

use serde::{Deserialize, Serialize};

/// A caret plus selection anchor, as character offsets into the buffer.
///
/// The two offsets are unordered: `selection_end` may be smaller than `position`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    /// Caret offset.
    pub position: usize,
    /// Anchor offset.
    pub selection_end: usize,
}

impl Cursor {
    /// Create a cursor.
    pub fn new(position: usize, selection_end: usize) -> Self {
        Self {
            position,
            selection_end,
        }
    }

    /// A cursor without selection.
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.position == self.selection_end
    }

    /// The selected range as `(start, end)`.
    pub fn range(&self) -> (usize, usize) {
        (
            self.position.min(self.selection_end),
            self.position.max(self.selection_end),
        )
    }
}

/// A cursor as received from a remote participant, before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCursor {
    /// Caret offset.
    pub position: i64,
    /// Anchor offset.
    pub selection_end: i64,
}

impl RemoteCursor {
    /// Create a remote cursor.
    pub fn new(position: i64, selection_end: i64) -> Self {
        Self {
            position,
            selection_end,
        }
    }
}

impl From<Cursor> for RemoteCursor {
    fn from(cursor: Cursor) -> Self {
        Self {
            position: i64::try_from(cursor.position).unwrap_or(i64::MAX),
            selection_end: i64::try_from(cursor.selection_end).unwrap_or(i64::MAX),
        }
    }
}
