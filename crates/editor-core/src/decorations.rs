//! First-class decorations data model.
//!
//! Decorations represent UI-facing annotations anchored to document character offsets, without
//! modifying the document text. Common examples:
//!
//! - remote participant carets and selection highlights
//! - match highlights / bracket highlights
//!
//! Decorations are view-local: each view owns its own set, addressed by [`DecorationId`].
//! Their ranges follow text edits applied to the underlying buffer.

/// Opaque identifier for a decoration inside a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationId(pub(crate) u64);

impl DecorationId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A half-open character-offset range (`start..end`) in the document.
///
/// For point-anchored decorations, use `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecorationRange {
    /// Range start offset (inclusive), in Unicode scalar values (`char`) from the start of the document.
    pub start: usize,
    /// Range end offset (exclusive), in Unicode scalar values (`char`) from the start of the document.
    pub end: usize,
}

impl DecorationRange {
    /// Create a new decoration range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns `true` for point-anchored ranges.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A coarse decoration kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecorationKind {
    /// A caret drawn at `range.start`.
    Caret,
    /// A highlighted range.
    Highlight,
    /// A custom, integration-defined kind.
    Custom(u32),
}

/// A single decoration item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Anchor range in character offsets.
    pub range: DecorationRange,
    /// A coarse decoration kind.
    pub kind: DecorationKind,
    /// Optional color (host-defined syntax, usually `#rrggbb`).
    pub color: Option<String>,
    /// Optional inline label to render next to the anchor.
    pub label: Option<String>,
    /// Optional tooltip payload (plain text; markup is host-defined).
    pub tooltip: Option<String>,
    /// Hidden decorations keep their id and range but are not rendered.
    pub hidden: bool,
}

impl Decoration {
    /// Create a visible decoration with no color, label or tooltip.
    pub fn new(kind: DecorationKind, range: DecorationRange) -> Self {
        Self {
            range,
            kind,
            color: None,
            label: None,
            tooltip: None,
            hidden: false,
        }
    }
}
