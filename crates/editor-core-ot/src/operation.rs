//! Retain / insert / delete step sequences.
//!
//! A [`TextOperation`] describes how to turn a buffer of `base_len` characters into a buffer of
//! `target_len` characters by walking it from the start:
//!
//! - `Retain(n)`: keep the next `n` characters
//! - `Insert(s)`: insert `s` at the current position
//! - `Delete(n)`: drop the next `n` characters
//!
//! Lengths are counted in Unicode scalar values (`char`).
//!
//! # Wire format
//!
//! Operations serialize to the compact JSON array form: a positive integer is a retain, a string
//! is an insert and a negative integer is a delete.
//!
//! ```rust
//! use editor_core_ot::TextOperation;
//!
//! let op = TextOperation::new().retain(3).insert("abc").delete(2);
//! assert_eq!(serde_json::to_string(&op).unwrap(), r#"[3,"abc",-2]"#);
//! ```

use crate::error::OperationError;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single step of a [`TextOperation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep `n` characters.
    Retain(usize),
    /// Insert text.
    Insert(String),
    /// Remove `n` characters.
    Delete(usize),
}

impl Step {
    /// Returns `true` for [`Step::Retain`].
    pub fn is_retain(&self) -> bool {
        matches!(self, Step::Retain(_))
    }

    /// Returns `true` for [`Step::Insert`].
    pub fn is_insert(&self) -> bool {
        matches!(self, Step::Insert(_))
    }

    /// Returns `true` for [`Step::Delete`].
    pub fn is_delete(&self) -> bool {
        matches!(self, Step::Delete(_))
    }

    /// Characters this step consumes from the input buffer.
    pub fn base_len(&self) -> usize {
        match self {
            Step::Retain(n) | Step::Delete(n) => *n,
            Step::Insert(_) => 0,
        }
    }

    /// Characters this step produces in the output buffer.
    pub fn target_len(&self) -> usize {
        match self {
            Step::Retain(n) => *n,
            Step::Insert(s) => s.chars().count(),
            Step::Delete(_) => 0,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Step::Retain(n) | Step::Delete(n) => *n == 0,
            Step::Insert(s) => s.is_empty(),
        }
    }
}

/// An ordered list of [`Step`]s.
///
/// The builder methods drop zero-length steps and merge a step into the previous one when both
/// have the same kind. Steps are never reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextOperation {
    steps: Vec<Step>,
    base_len: usize,
    target_len: usize,
}

impl TextOperation {
    /// Create an empty operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an operation from a list of steps (normalized the same way as the builder).
    pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        let mut op = Self::new();
        for step in steps {
            op.push(step);
        }
        op
    }

    /// Append a retain step.
    pub fn retain(mut self, n: usize) -> Self {
        self.push(Step::Retain(n));
        self
    }

    /// Append an insert step.
    pub fn insert(mut self, text: impl Into<String>) -> Self {
        self.push(Step::Insert(text.into()));
        self
    }

    /// Append a delete step.
    pub fn delete(mut self, n: usize) -> Self {
        self.push(Step::Delete(n));
        self
    }

    /// Append a step in place.
    pub fn push(&mut self, step: Step) {
        if step.is_empty() {
            return;
        }
        self.base_len += step.base_len();
        self.target_len += step.target_len();

        match (self.steps.last_mut(), step) {
            (Some(Step::Retain(n)), Step::Retain(m)) => *n += m,
            (Some(Step::Delete(n)), Step::Delete(m)) => *n += m,
            (Some(Step::Insert(s)), Step::Insert(t)) => s.push_str(&t),
            (_, step) => self.steps.push(step),
        }
    }

    /// The steps of this operation.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Length of the buffer this operation applies to.
    pub fn base_len(&self) -> usize {
        self.base_len
    }

    /// Length of the buffer this operation produces.
    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Returns `true` if the operation changes nothing.
    pub fn is_noop(&self) -> bool {
        match self.steps.as_slice() {
            [] => true,
            [step] => step.is_retain(),
            _ => false,
        }
    }

    /// Returns the inserted text if the operation is a single insert step.
    pub fn as_lone_insert(&self) -> Option<&str> {
        match self.steps.as_slice() {
            [Step::Insert(text)] => Some(text),
            _ => None,
        }
    }

    /// Apply the operation to `doc`.
    pub fn apply(&self, doc: &str) -> Result<String, OperationError> {
        let doc_len = doc.chars().count();
        if doc_len != self.base_len {
            return Err(OperationError::BaseLengthMismatch {
                expected: self.base_len,
                actual: doc_len,
            });
        }

        let mut chars = doc.chars();
        let mut out = String::with_capacity(doc.len());
        for step in &self.steps {
            match step {
                Step::Retain(n) => out.extend(chars.by_ref().take(*n)),
                Step::Insert(text) => out.push_str(text),
                Step::Delete(n) => {
                    chars.by_ref().take(*n).for_each(drop);
                }
            }
        }
        Ok(out)
    }

    /// Compute the operation that undoes `self`, given the buffer `self` applies to.
    pub fn invert(&self, doc: &str) -> TextOperation {
        let mut chars = doc.chars();
        let mut inverse = TextOperation::new();
        for step in &self.steps {
            match step {
                Step::Retain(n) => {
                    chars.by_ref().take(*n).for_each(drop);
                    inverse.push(Step::Retain(*n));
                }
                Step::Insert(text) => inverse.push(Step::Delete(text.chars().count())),
                Step::Delete(n) => {
                    let removed: String = chars.by_ref().take(*n).collect();
                    inverse.push(Step::Insert(removed));
                }
            }
        }
        inverse
    }
}

impl fmt::Display for TextOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.steps {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            match step {
                Step::Retain(n) => write!(f, "retain {n}")?,
                Step::Insert(s) => write!(f, "insert {s:?}")?,
                Step::Delete(n) => write!(f, "delete {n}")?,
            }
        }
        Ok(())
    }
}

impl Serialize for TextOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.steps.len()))?;
        for step in &self.steps {
            match step {
                Step::Retain(n) => seq.serialize_element(&(*n as i64))?,
                Step::Insert(s) => seq.serialize_element(s)?,
                Step::Delete(n) => seq.serialize_element(&-(*n as i64))?,
            }
        }
        seq.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireStep {
    Count(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for TextOperation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OperationVisitor;

        impl<'de> Visitor<'de> for OperationVisitor {
            type Value = TextOperation;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of integers and strings")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut op = TextOperation::new();
                while let Some(step) = seq.next_element::<WireStep>()? {
                    match step {
                        WireStep::Count(0) => {
                            return Err(de::Error::custom("zero-length step"));
                        }
                        WireStep::Count(n) if n > 0 => op.push(Step::Retain(n as usize)),
                        WireStep::Count(n) => op.push(Step::Delete(n.unsigned_abs() as usize)),
                        WireStep::Text(s) => op.push(Step::Insert(s)),
                    }
                }
                Ok(op)
            }
        }

        deserializer.deserialize_seq(OperationVisitor)
    }
}
