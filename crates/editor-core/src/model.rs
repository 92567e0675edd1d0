//! Text model (buffer) with batched range edits and undo history.
//!
//! A [`TextModel`] is the document half of the buffer/view split: it owns the text, the
//! model-level options and the undo history. Views (see [`crate::Workspace`]) own selections and
//! decorations.
//!
//! # Batched edits
//!
//! [`TextModel::apply_edits`] takes a list of [`EditOperation`]s whose ranges are all expressed
//! against the content **before** the batch. Ranges must not overlap. The batch is applied from
//! the highest start offset down (later-listed edits first on ties), recorded as a single undo
//! step, and described by a single [`TextDelta`].

use crate::LineIndex;
use crate::delta::{ContentChange, TextDelta};
use crate::selection::Position;

/// Model-level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextModelOptions {
    /// Strip trailing spaces/tabs from every inserted line that is followed by a newline.
    pub trim_auto_whitespace: bool,
}

impl Default for TextModelOptions {
    fn default() -> Self {
        Self {
            trim_auto_whitespace: true,
        }
    }
}

/// A range of logical positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditRange {
    /// Range start (inclusive).
    pub start: Position,
    /// Range end (exclusive).
    pub end: Position,
}

impl EditRange {
    /// Create a new range.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `position`.
    pub fn empty(position: Position) -> Self {
        Self::new(position, position)
    }
}

/// One range replacement inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    /// Replaced range (pre-batch coordinates).
    pub range: EditRange,
    /// Replacement text.
    pub text: String,
    /// Move carets/decorations sitting exactly at an insertion point past the inserted text.
    pub force_move_markers: bool,
}

impl EditOperation {
    /// Insert `text` at `position`.
    pub fn insert(position: Position, text: impl Into<String>) -> Self {
        Self {
            range: EditRange::empty(position),
            text: text.into(),
            force_move_markers: false,
        }
    }

    /// Delete the text inside `range`.
    pub fn delete(range: EditRange) -> Self {
        Self {
            range,
            text: String::new(),
            force_move_markers: false,
        }
    }

    /// Replace the text inside `range` with `text`.
    pub fn replace(range: EditRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
            force_move_markers: false,
        }
    }

    /// Set the `force_move_markers` flag.
    pub fn with_force_move_markers(mut self, force: bool) -> Self {
        self.force_move_markers = force;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OffsetEdit {
    start: usize,
    end: usize,
    text: String,
    force_move_markers: bool,
}

#[derive(Debug, Clone)]
struct HistoryStep {
    /// Edits (in post-batch coordinates) that restore the pre-batch content.
    inverse: Vec<OffsetEdit>,
}

#[derive(Debug, Default)]
struct History {
    undo_stack: Vec<HistoryStep>,
    redo_stack: Vec<HistoryStep>,
}

/// The result of applying a batch.
#[derive(Debug, Clone)]
pub(crate) struct AppliedBatch {
    pub(crate) delta: TextDelta,
    /// `force_move_markers` per entry of `delta.changes`.
    pub(crate) move_markers: Vec<bool>,
}

/// A text buffer with options and undo history.
#[derive(Debug)]
pub struct TextModel {
    index: LineIndex,
    options: TextModelOptions,
    version: u64,
    history: History,
}

impl TextModel {
    /// Create a model holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            index: LineIndex::from_text(text),
            options: TextModelOptions::default(),
            version: 0,
            history: History::default(),
        }
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.index.text()
    }

    /// Text of the character range `start..end` (clamped).
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.index.slice(start, end)
    }

    /// Document length in characters.
    pub fn char_count(&self) -> usize {
        self.index.char_count()
    }

    /// Number of logical lines.
    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    /// Borrow the line index.
    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Convert a character offset to a logical position (clamped).
    pub fn position_at(&self, offset: usize) -> Position {
        let (line, column) = self.index.offset_to_line_column(offset);
        Position::new(line, column)
    }

    /// Convert a logical position to a character offset (clamped).
    pub fn offset_at(&self, position: Position) -> usize {
        self.index.line_column_to_offset(position.line, position.column)
    }

    /// Current options.
    pub fn options(&self) -> TextModelOptions {
        self.options
    }

    /// Replace the options, returning the previous ones.
    pub fn set_options(&mut self, options: TextModelOptions) -> TextModelOptions {
        std::mem::replace(&mut self.options, options)
    }

    /// Model version (incremented after each applied batch).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        !self.history.undo_stack.is_empty()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        !self.history.redo_stack.is_empty()
    }

    /// Apply a batch of edits as one undo step.
    ///
    /// Returns `None` when the batch changes nothing (empty, or only empty replacements).
    pub(crate) fn apply_edits(&mut self, edits: Vec<EditOperation>) -> Option<AppliedBatch> {
        let trim = self.options.trim_auto_whitespace;
        let offset_edits: Vec<OffsetEdit> = edits
            .into_iter()
            .map(|edit| {
                let a = self.offset_at(edit.range.start);
                let b = self.offset_at(edit.range.end);
                let text = if trim {
                    trim_inserted_whitespace(&edit.text)
                } else {
                    edit.text
                };
                OffsetEdit {
                    start: a.min(b),
                    end: a.max(b),
                    text,
                    force_move_markers: edit.force_move_markers,
                }
            })
            .collect();

        let (batch, inverse) = self.apply_offset_edits(offset_edits, false)?;
        self.history.redo_stack.clear();
        self.history.undo_stack.push(HistoryStep { inverse });
        Some(batch)
    }

    pub(crate) fn undo(&mut self) -> Option<AppliedBatch> {
        let step = self.history.undo_stack.pop()?;
        let (batch, inverse) = self.apply_offset_edits(step.inverse, true)?;
        self.history.redo_stack.push(HistoryStep { inverse });
        Some(batch)
    }

    pub(crate) fn redo(&mut self) -> Option<AppliedBatch> {
        let step = self.history.redo_stack.pop()?;
        let (batch, inverse) = self.apply_offset_edits(step.inverse, true)?;
        self.history.undo_stack.push(HistoryStep { inverse });
        Some(batch)
    }

    fn apply_offset_edits(
        &mut self,
        edits: Vec<OffsetEdit>,
        is_undoing: bool,
    ) -> Option<(AppliedBatch, Vec<OffsetEdit>)> {
        let mut ordered: Vec<(usize, OffsetEdit)> = edits
            .into_iter()
            .filter(|e| e.start != e.end || !e.text.is_empty())
            .enumerate()
            .collect();
        if ordered.is_empty() {
            return None;
        }
        ordered.sort_by(|(ia, a), (ib, b)| a.start.cmp(&b.start).then_with(|| ia.cmp(ib)));

        let before_char_count = self.index.char_count();
        let mut changes = Vec::with_capacity(ordered.len());
        let mut move_markers = Vec::with_capacity(ordered.len());
        let mut replaced_texts = Vec::with_capacity(ordered.len());

        for (_, edit) in ordered.into_iter().rev() {
            let replaced = self.index.slice(edit.start, edit.end);
            let range_length = replaced.chars().count();
            self.index.delete(edit.start, range_length);
            self.index.insert(edit.start, &edit.text);

            changes.push(ContentChange::new(edit.start, range_length, edit.text));
            move_markers.push(edit.force_move_markers);
            replaced_texts.push(replaced);
        }

        // Inverse edits, in post-batch coordinates (walk ascending to accumulate the shift).
        let mut inverse = Vec::with_capacity(changes.len());
        let mut shift: isize = 0;
        for (change, replaced) in changes.iter().zip(replaced_texts).rev() {
            let start = (change.range_offset as isize + shift).max(0) as usize;
            let inserted_len = change.text_len();
            inverse.push(OffsetEdit {
                start,
                end: start + inserted_len,
                text: replaced,
                force_move_markers: false,
            });
            shift += inserted_len as isize - change.range_length as isize;
        }

        self.version = self.version.saturating_add(1);
        let delta = TextDelta {
            before_char_count,
            after_char_count: self.index.char_count(),
            changes,
            is_undoing,
        };
        Some((
            AppliedBatch {
                delta,
                move_markers,
            },
            inverse,
        ))
    }
}

fn trim_inserted_whitespace(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }

    let segments: Vec<&str> = text.split('\n').collect();
    let last = segments.len() - 1;
    let mut out = String::with_capacity(text.len());
    for (i, segment) in segments.iter().enumerate() {
        if i == last {
            out.push_str(segment);
            break;
        }
        match segment.strip_suffix('\r') {
            Some(body) => {
                out.push_str(body.trim_end_matches([' ', '\t']));
                out.push('\r');
            }
            None => out.push_str(segment.trim_end_matches([' ', '\t'])),
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(model: &TextModel, offset: usize) -> Position {
        model.position_at(offset)
    }

    #[test]
    fn test_batch_ranges_are_pre_batch_relative() {
        let mut model = TextModel::new("hello world");
        let edits = vec![
            EditOperation::insert(at(&model, 0), "> "),
            EditOperation::delete(EditRange::new(at(&model, 5), at(&model, 11))),
        ];
        let batch = model.apply_edits(edits).unwrap();

        assert_eq!(model.text(), "> hello");
        assert_eq!(batch.delta.before_char_count, 11);
        assert_eq!(batch.delta.after_char_count, 7);
        // Descending application order.
        assert_eq!(
            batch.delta.changes,
            vec![ContentChange::new(5, 6, ""), ContentChange::new(0, 0, "> ")]
        );
    }

    #[test]
    fn test_insert_and_delete_at_same_offset() {
        let mut model = TextModel::new("abcdef");
        let p2 = at(&model, 2);
        let p4 = at(&model, 4);
        model
            .apply_edits(vec![
                EditOperation::insert(p2, "XY"),
                EditOperation::delete(EditRange::new(p2, p4)),
            ])
            .unwrap();
        assert_eq!(model.text(), "abXYef");
    }

    #[test]
    fn test_trim_auto_whitespace() {
        let mut model = TextModel::new("");
        model
            .apply_edits(vec![EditOperation::insert(Position::new(0, 0), "a  \r\nb \t\nc  ")])
            .unwrap();
        assert_eq!(model.text(), "a\r\nb\nc  ");

        let mut model = TextModel::new("");
        model.set_options(TextModelOptions {
            trim_auto_whitespace: false,
        });
        model
            .apply_edits(vec![EditOperation::insert(Position::new(0, 0), "a  \nb")])
            .unwrap();
        assert_eq!(model.text(), "a  \nb");
    }

    #[test]
    fn test_undo_redo_batch() {
        let mut model = TextModel::new("one two three");
        let edits = vec![
            EditOperation::replace(EditRange::new(at(&model, 0), at(&model, 3)), "1"),
            EditOperation::replace(EditRange::new(at(&model, 8), at(&model, 13)), "3"),
        ];
        model.apply_edits(edits).unwrap();
        assert_eq!(model.text(), "1 two 3");

        let undo = model.undo().unwrap();
        assert!(undo.delta.is_undoing);
        assert_eq!(model.text(), "one two three");
        assert!(model.can_redo());

        model.redo().unwrap();
        assert_eq!(model.text(), "1 two 3");
        assert!(model.can_undo());
        assert!(!model.can_redo());
    }

    #[test]
    fn test_empty_batch_is_none() {
        let mut model = TextModel::new("abc");
        assert!(model.apply_edits(Vec::new()).is_none());
        assert!(
            model
                .apply_edits(vec![EditOperation::insert(Position::new(0, 1), "")])
                .is_none()
        );
        assert_eq!(model.version(), 0);
        assert!(!model.can_undo());
    }
}
