//! Rope-backed text storage.
//!
//! All offsets are `char` indices. Lines are split on `\n`; a trailing newline opens an empty
//! last line.

use ropey::Rope;

/// Buffer text with offset ↔ line/column conversion.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    /// Build an index over `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Borrow the underlying rope. Cloning it is cheap.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of `char`s.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// `(line, column)` of `offset`, clamped to the end of the text.
    pub fn offset_to_line_column(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.char_count());
        let line = self.rope.char_to_line(offset);
        (line, offset - self.rope.line_to_char(line))
    }

    /// Offset of `(line, column)`.
    ///
    /// Columns past the end of a line land on its end (before the newline); lines past the end of
    /// the text land on the end of the text.
    pub fn line_column_to_offset(&self, line: usize, column: usize) -> usize {
        if line >= self.line_count() {
            return self.char_count();
        }
        let start = self.rope.line_to_char(line);
        let end = if line + 1 < self.line_count() {
            self.rope.line_to_char(line + 1) - 1
        } else {
            self.char_count()
        };
        start + column.min(end - start)
    }

    /// Insert `text` at `offset` (clamped).
    pub fn insert(&mut self, offset: usize, text: &str) {
        let offset = offset.min(self.char_count());
        self.rope.insert(offset, text);
    }

    /// Remove `len` chars starting at `offset`. The range is clamped to the text.
    pub fn delete(&mut self, offset: usize, len: usize) {
        let total = self.char_count();
        let start = offset.min(total);
        let end = start.saturating_add(len).min(total);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// The text of `[start, end)`, clamped to the document.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let total = self.char_count();
        let start = start.min(total);
        let end = end.min(total).max(start);
        self.rope.slice(start..end).to_string()
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_one_line() {
        let index = LineIndex::default();
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.char_count(), 0);
        assert_eq!(index.offset_to_line_column(5), (0, 0));
    }

    #[test]
    fn test_offset_line_column_conversion() {
        let index = LineIndex::from_text("ab\ncde\n");

        assert_eq!(index.offset_to_line_column(2), (0, 2));
        assert_eq!(index.offset_to_line_column(3), (1, 0));
        assert_eq!(index.offset_to_line_column(7), (2, 0));
        assert_eq!(index.line_column_to_offset(1, 2), 5);
        assert_eq!(index.line_column_to_offset(0, 9), 2);
        assert_eq!(index.line_column_to_offset(2, 4), 7);
        assert_eq!(index.line_column_to_offset(8, 0), 7);
    }

    #[test]
    fn test_offsets_are_chars() {
        let index = LineIndex::from_text("héllo\n日本");
        assert_eq!(index.char_count(), 8);
        assert_eq!(index.offset_to_line_column(7), (1, 1));
        assert_eq!(index.slice(4, 7), "o\n日");
    }

    #[test]
    fn test_edits_clamp() {
        let mut index = LineIndex::from_text("0123");
        index.insert(99, "45");
        index.delete(1, 2);
        assert_eq!(index.text(), "0345");
        index.delete(3, 100);
        assert_eq!(index.text(), "034");
    }
}
