//! Structured text change deltas.
//!
//! Every batched edit produces one [`TextDelta`]. Incremental consumers (collaboration bindings,
//! incremental parsing, indexing) can observe structured edits without diffing old/new text.
//!
//! Offsets are expressed in **character offsets** (Unicode scalar values).

/// A single content change.
///
/// Semantics:
/// - `range_offset` is a character offset into the document **before the batch** the change
///   belongs to.
/// - `range_length` characters starting at `range_offset` were replaced by `text`.
/// - Changes inside a [`TextDelta`] are listed in application order, which is descending by
///   `range_offset`; a change never touches text that an earlier change in the same delta moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    /// Start character offset of the replaced range.
    pub range_offset: usize,
    /// Length (in `char`s) of the replaced range.
    pub range_length: usize,
    /// Inserted text (may be empty).
    pub text: String,
}

impl ContentChange {
    /// Create a new content change.
    pub fn new(range_offset: usize, range_length: usize, text: impl Into<String>) -> Self {
        Self {
            range_offset,
            range_length,
            text: text.into(),
        }
    }

    /// Length of `text` in characters.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Exclusive end character offset of the replaced range.
    pub fn range_end(&self) -> usize {
        self.range_offset.saturating_add(self.range_length)
    }
}

/// A structured description of a document text change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Character count before applying `changes`.
    pub before_char_count: usize,
    /// Character count after applying `changes`.
    pub after_char_count: usize,
    /// Ordered list of changes that transforms the "before" document into the "after" document.
    pub changes: Vec<ContentChange>,
    /// Whether this delta was produced by undo/redo.
    pub is_undoing: bool,
}

impl TextDelta {
    /// Returns `true` if this delta contains no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Map a character offset through a delta.
///
/// Offsets inside a replaced range are anchored at the end of the inserted text. An offset sitting
/// exactly at a pure insertion point stays before the insertion unless `move_at_insert` is set.
pub(crate) fn map_offset(mut offset: usize, delta: &TextDelta, move_at_insert: &[bool]) -> usize {
    for (idx, change) in delta.changes.iter().enumerate() {
        let start = change.range_offset;
        let end = change.range_end();
        let inserted_len = change.text_len();

        if offset < start {
            continue;
        }

        if offset == start && change.range_length == 0 {
            if move_at_insert.get(idx).copied().unwrap_or(false) {
                offset = offset.saturating_add(inserted_len);
            }
            continue;
        }

        if offset < end {
            offset = start.saturating_add(inserted_len);
            continue;
        }

        offset = offset
            .saturating_add(inserted_len)
            .saturating_sub(change.range_length);
    }

    offset
}
