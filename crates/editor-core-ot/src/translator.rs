//! Editor deltas to operations.
//!
//! Every content change reported by the host becomes one `(operation, inverse)` pair. Changes of
//! a batch are translated in the order the host reports them, and each pair is expressed against
//! the buffer as it stands after the previous changes of the same batch.

use crate::operation::TextOperation;
use editor_core::{ContentChange, TextDelta};
use ropey::Rope;

/// Translates host deltas into operations, keeping a snapshot of the buffer.
#[derive(Debug, Clone, Default)]
pub struct ChangeTranslator {
    snapshot: Rope,
}

impl ChangeTranslator {
    /// Create a translator for a buffer currently holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            snapshot: Rope::from_str(text),
        }
    }

    /// Create a translator from an existing rope (cheap clone).
    pub fn from_rope(rope: Rope) -> Self {
        Self { snapshot: rope }
    }

    /// The cached buffer content.
    pub fn snapshot(&self) -> &Rope {
        &self.snapshot
    }

    /// Replace the cached buffer content after a mutation the translator did not observe.
    pub fn resync(&mut self, rope: Rope) {
        self.snapshot = rope;
    }

    /// Translate a whole notification.
    ///
    /// `None` means the host reported a change without a delta list; the result is then a single
    /// full-buffer retain pair.
    pub fn translate(&mut self, delta: Option<&TextDelta>) -> Vec<(TextOperation, TextOperation)> {
        let Some(delta) = delta else {
            return vec![self.heartbeat()];
        };

        let base_len = self.snapshot.len_chars();
        let mut offset: isize = 0;
        let mut pairs = Vec::with_capacity(delta.changes.len());
        for change in &delta.changes {
            let (operation, inverse) = self.translate_change(change, base_len, offset);
            offset += operation.target_len() as isize - operation.base_len() as isize;
            self.replay(change);
            pairs.push((operation, inverse));
        }
        pairs
    }

    /// The full-buffer retain pair.
    pub fn heartbeat(&self) -> (TextOperation, TextOperation) {
        let len = self.snapshot.len_chars();
        (
            TextOperation::new().retain(len),
            TextOperation::new().retain(len),
        )
    }

    fn translate_change(
        &self,
        change: &ContentChange,
        base_len: usize,
        offset: isize,
    ) -> (TextOperation, TextOperation) {
        let start = change.range_offset;
        let removed = change.range_length;
        let inserted = change.text_len();
        let current_len = base_len.saturating_add_signed(offset);
        let rest = current_len.saturating_sub(start + removed);

        if inserted == 0 && removed > 0 {
            let replaced = self.slice(start, removed);
            let operation = TextOperation::new().retain(start).delete(removed).retain(rest);
            let inverse = TextOperation::new()
                .retain(start)
                .insert(replaced)
                .retain(rest);
            (operation, inverse)
        } else if inserted > 0 && removed > 0 {
            let replaced = self.slice(start, removed);
            let operation = TextOperation::new()
                .retain(start)
                .delete(removed)
                .insert(change.text.as_str())
                .retain(rest);
            let inverse = TextOperation::new()
                .retain(start)
                .delete(inserted)
                .insert(replaced)
                .retain(rest);
            (operation, inverse)
        } else {
            let rest = current_len.saturating_sub(start);
            let operation = TextOperation::new()
                .retain(start)
                .insert(change.text.as_str())
                .retain(rest);
            let inverse = TextOperation::new()
                .retain(start)
                .delete(inserted)
                .retain(rest);
            (operation, inverse)
        }
    }

    fn slice(&self, start: usize, len: usize) -> String {
        let total = self.snapshot.len_chars();
        let start = start.min(total);
        let end = start.saturating_add(len).min(total);
        self.snapshot.slice(start..end).to_string()
    }

    fn replay(&mut self, change: &ContentChange) {
        let total = self.snapshot.len_chars();
        let start = change.range_offset.min(total);
        let end = change.range_end().min(total);
        self.snapshot.remove(start..end);
        if !change.text.is_empty() {
            self.snapshot.insert(start, &change.text);
        }
    }
}
