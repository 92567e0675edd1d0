//! Remote operations to host edits.
//!
//! An operation is turned into range edits against the buffer as it is before the batch and
//! submitted in a single [`Workspace::apply_edits`] call, so the host records one undo step and
//! sends one notification. That notification is swallowed by the suppression guard held for
//! the duration of the batch.

use crate::error::AdapterError;
use crate::operation::{Step, TextOperation};
use crate::suppression::Suppression;
use crate::translator::ChangeTranslator;
use editor_core::{BufferId, EditOperation, EditRange, TextModel, Workspace};
use std::cell::RefCell;
use tracing::{debug, trace};

/// What [`OperationApplier::apply`] did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The operation changes nothing.
    Noop,
    /// Cold start: the buffer already held the snapshot text.
    SnapshotMatched,
    /// Cold start: the buffer was replaced with the snapshot text.
    SnapshotLoaded,
    /// Cold start: the operation was not a lone insert, so the buffer was cleared.
    Cleared,
    /// Incremental application.
    Applied {
        /// Number of range edits submitted.
        edits: usize,
    },
}

impl ApplyOutcome {
    /// Returns `true` if the whole buffer was reloaded from a snapshot.
    pub fn is_snapshot_load(&self) -> bool {
        matches!(self, ApplyOutcome::SnapshotLoaded)
    }
}

/// Applies operations to one buffer.
pub struct OperationApplier<'a> {
    workspace: &'a mut Workspace,
    model: BufferId,
    suppression: &'a Suppression,
    translator: &'a RefCell<ChangeTranslator>,
    validate_base_length: bool,
}

impl<'a> OperationApplier<'a> {
    /// Create an applier for `model`.
    pub fn new(
        workspace: &'a mut Workspace,
        model: BufferId,
        suppression: &'a Suppression,
        translator: &'a RefCell<ChangeTranslator>,
    ) -> Self {
        Self {
            workspace,
            model,
            suppression,
            translator,
            validate_base_length: true,
        }
    }

    /// Enable or disable the base length check for incremental operations.
    pub fn validate_base_length(mut self, enabled: bool) -> Self {
        self.validate_base_length = enabled;
        self
    }

    /// Apply `operation`.
    ///
    /// With `cold_start` the operation is taken as a full-document snapshot. Whitespace trimming
    /// is disabled for the duration of the call and restored afterwards, also when applying
    /// fails.
    pub fn apply(
        &mut self,
        operation: &TextOperation,
        cold_start: bool,
    ) -> Result<ApplyOutcome, AdapterError> {
        if !cold_start && operation.is_noop() {
            trace!(model = self.model.get(), "skipping no-op operation");
            return Ok(ApplyOutcome::Noop);
        }

        let previous = self.workspace.set_trim_auto_whitespace(self.model, false)?;
        let result = if cold_start {
            self.apply_snapshot(operation)
        } else {
            self.apply_incremental(operation)
        };
        let restored = self.workspace.set_trim_auto_whitespace(self.model, previous);

        let outcome = result?;
        restored?;
        Ok(outcome)
    }

    fn apply_snapshot(&mut self, operation: &TextOperation) -> Result<ApplyOutcome, AdapterError> {
        let model = self.workspace.model(self.model)?;
        let len = model.char_count();
        let whole = EditRange::new(model.position_at(0), model.position_at(len));

        match operation.as_lone_insert() {
            Some(text) if model.text() == text => {
                debug!(model = self.model.get(), "cold start: buffer already up to date");
                Ok(ApplyOutcome::SnapshotMatched)
            }
            Some(text) => {
                debug!(
                    model = self.model.get(),
                    chars = operation.target_len(),
                    "cold start: loading snapshot"
                );
                self.commit(vec![EditOperation::replace(whole, text)])?;
                Ok(ApplyOutcome::SnapshotLoaded)
            }
            None => {
                debug!(
                    model = self.model.get(),
                    steps = operation.steps().len(),
                    "cold start: operation is not a snapshot, clearing buffer"
                );
                if len > 0 {
                    self.commit(vec![EditOperation::delete(whole)])?;
                }
                Ok(ApplyOutcome::Cleared)
            }
        }
    }

    fn apply_incremental(
        &mut self,
        operation: &TextOperation,
    ) -> Result<ApplyOutcome, AdapterError> {
        let model = self.workspace.model(self.model)?;
        let actual = model.char_count();
        if self.validate_base_length && operation.base_len() != actual {
            return Err(AdapterError::BaseLengthMismatch {
                expected: operation.base_len(),
                actual,
            });
        }

        let edits = range_edits(model, operation);
        let count = edits.len();
        trace!(model = self.model.get(), edits = count, "applying remote operation");
        self.commit(edits)?;
        Ok(ApplyOutcome::Applied { edits: count })
    }

    fn commit(&mut self, edits: Vec<EditOperation>) -> Result<(), AdapterError> {
        let _guard = self.suppression.acquire();
        self.workspace.apply_edits(self.model, edits)?;
        let rope = self.workspace.model(self.model)?.line_index().rope().clone();
        self.translator.borrow_mut().resync(rope);
        Ok(())
    }
}

/// Convert an operation into range edits expressed against `model` before the batch.
///
/// Inserts are zero-width edits that push carets and decorations sitting at the insertion point
/// past the new text.
pub fn range_edits(model: &TextModel, operation: &TextOperation) -> Vec<EditOperation> {
    let mut index = 0;
    let mut edits = Vec::new();
    for step in operation.steps() {
        match step {
            Step::Retain(n) => index += n,
            Step::Insert(text) => {
                edits.push(
                    EditOperation::insert(model.position_at(index), text.as_str())
                        .with_force_move_markers(true),
                );
            }
            Step::Delete(n) => {
                let range = EditRange::new(model.position_at(index), model.position_at(index + n));
                edits.push(EditOperation::delete(range));
                index += n;
            }
        }
    }
    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_core::Position;
    use pretty_assertions::assert_eq;

    struct Fixture {
        workspace: Workspace,
        model: BufferId,
        suppression: Suppression,
        translator: RefCell<ChangeTranslator>,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let mut workspace = Workspace::new();
            let model = workspace.open_model(None, text).unwrap();
            Self {
                workspace,
                model,
                suppression: Suppression::new(),
                translator: RefCell::new(ChangeTranslator::new(text)),
            }
        }

        fn apply(&mut self, op: &TextOperation, cold: bool) -> Result<ApplyOutcome, AdapterError> {
            OperationApplier::new(
                &mut self.workspace,
                self.model,
                &self.suppression,
                &self.translator,
            )
            .apply(op, cold)
        }

        fn text(&self) -> String {
            self.workspace.buffer_text(self.model).unwrap()
        }
    }

    #[test]
    fn test_range_edits_walk_the_buffer() {
        let model = TextModel::new("ab\ncd");
        let op = TextOperation::new()
            .retain(1)
            .delete(1)
            .insert("X")
            .retain(2)
            .insert("Y")
            .retain(1);
        let edits = range_edits(&model, &op);
        assert_eq!(
            edits,
            vec![
                EditOperation::delete(EditRange::new(Position::new(0, 1), Position::new(0, 2))),
                EditOperation::insert(Position::new(0, 2), "X").with_force_move_markers(true),
                EditOperation::insert(Position::new(1, 1), "Y").with_force_move_markers(true),
            ]
        );
    }

    #[test]
    fn test_incremental_batch() {
        let mut fx = Fixture::new("hello world");
        let op = TextOperation::new()
            .retain(5)
            .insert(",")
            .retain(1)
            .delete(5)
            .insert("there");
        assert_eq!(fx.apply(&op, false).unwrap(), ApplyOutcome::Applied { edits: 3 });
        assert_eq!(fx.text(), "hello, there");
        assert_eq!(fx.translator.borrow().snapshot().to_string(), "hello, there");
        assert!(fx.workspace.model(fx.model).unwrap().can_undo());
    }

    #[test]
    fn test_noop_is_skipped() {
        let mut fx = Fixture::new("abc");
        let version = fx.workspace.model(fx.model).unwrap().version();
        assert_eq!(
            fx.apply(&TextOperation::new().retain(3), false).unwrap(),
            ApplyOutcome::Noop
        );
        assert_eq!(fx.workspace.model(fx.model).unwrap().version(), version);
    }

    #[test]
    fn test_cold_start_shapes() {
        let mut fx = Fixture::new("placeholder");
        let snapshot = TextOperation::new().insert("hello");
        assert_eq!(fx.apply(&snapshot, true).unwrap(), ApplyOutcome::SnapshotLoaded);
        assert_eq!(fx.text(), "hello");
        assert_eq!(fx.apply(&snapshot, true).unwrap(), ApplyOutcome::SnapshotMatched);

        let mut fx = Fixture::new("placeholder");
        let not_snapshot = TextOperation::new().retain(11).insert("hello");
        assert_eq!(fx.apply(&not_snapshot, true).unwrap(), ApplyOutcome::Cleared);
        assert_eq!(fx.text(), "");
    }

    #[test]
    fn test_trim_option_restored_on_success_and_failure() {
        let mut fx = Fixture::new("x\n");
        assert!(fx.workspace.trim_auto_whitespace(fx.model).unwrap());

        let op = TextOperation::new().retain(2).insert("a   \nb");
        fx.apply(&op, false).unwrap();
        assert_eq!(fx.text(), "x\na   \nb");
        assert!(fx.workspace.trim_auto_whitespace(fx.model).unwrap());

        let bad = TextOperation::new().retain(100).insert("z");
        assert!(matches!(
            fx.apply(&bad, false),
            Err(AdapterError::BaseLengthMismatch {
                expected: 100,
                actual: 8
            })
        ));
        assert!(fx.workspace.trim_auto_whitespace(fx.model).unwrap());
        assert!(!fx.suppression.is_active());
        assert_eq!(fx.text(), "x\na   \nb");
    }

    #[test]
    fn test_notifications_observe_suppression() {
        let mut fx = Fixture::new("abc");
        let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
        let probe = fx.suppression.clone();
        let log = seen.clone();
        fx.workspace
            .on_model_event(fx.model, move |_| log.borrow_mut().push(probe.is_active()))
            .unwrap();

        fx.apply(&TextOperation::new().retain(3).insert("d"), false)
            .unwrap();
        assert_eq!(*seen.borrow(), vec![true]);
        assert!(!fx.suppression.is_active());
    }
}
