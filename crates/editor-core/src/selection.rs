//! Logical positions and selections.

use std::cmp::Ordering;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Selection range
///
/// `start` is the anchor and `end` is the active end (where the caret is drawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Selection start position (anchor)
    pub start: Position,
    /// Selection end position (caret)
    pub end: Position,
    /// Selection direction
    pub direction: SelectionDirection,
}

/// Selection direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    /// Forward selection (from start to end)
    Forward,
    /// Backward selection (from end to start)
    Backward,
}

impl Selection {
    /// Create a selection from an anchor and a caret position.
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            direction: selection_direction(start, end),
        }
    }

    /// Create an empty selection (caret only).
    pub fn caret(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Returns `true` if the selection covers no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Return `(min, max)` of the two ends.
    pub fn min_max(&self) -> (Position, Position) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::caret(Position::default())
    }
}

pub(crate) fn selection_direction(start: Position, end: Position) -> SelectionDirection {
    if start <= end {
        SelectionDirection::Forward
    } else {
        SelectionDirection::Backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_selection_min_max() {
        let sel = Selection::new(Position::new(2, 1), Position::new(0, 4));
        assert_eq!(sel.direction, SelectionDirection::Backward);
        assert_eq!(sel.min_max(), (Position::new(0, 4), Position::new(2, 1)));
        assert!(!sel.is_empty());
        assert!(Selection::caret(Position::new(1, 1)).is_empty());
    }
}
