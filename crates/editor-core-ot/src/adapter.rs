//! The editor adapter.
//!
//! [`EditorAdapter`] binds one model of a [`Workspace`] to a collaboration engine:
//!
//! - local edits are translated into `(operation, inverse)` pairs and dispatched as
//!   [`AdapterEvent::Change`]
//! - remote operations are applied with [`EditorAdapter::apply_operation`] without echoing
//! - remote cursors are rendered with [`EditorAdapter::set_other_cursor`]
//!
//! Host notifications arrive while the workspace is mutably borrowed, so everything reachable
//! from a host callback lives in a shared state behind an `Rc` and is only captured weakly.
//! Work that needs the workspace is deferred to [`EditorAdapter::tick`].

use crate::applier::{ApplyOutcome, OperationApplier};
use crate::attachment::{AttachmentManager, AttachmentState, EditorBinding};
use crate::cursor::{Cursor, RemoteCursor};
use crate::error::{AdapterError, PresenceError};
use crate::events::{AdapterEvent, EventCallback, EventDispatcher, EventKind};
use crate::operation::TextOperation;
use crate::options::AdapterOptions;
use crate::presence::{ClientId, ParticipantHandle, PresenceDecorator, RemoteParticipant};
use crate::scheduler::{Debounce, PendingSlot};
use crate::suppression::Suppression;
use crate::translator::ChangeTranslator;
use editor_core::{
    BufferId, Selection, StateChange, StateChangeType, SubscriptionId, TextDelta, ViewId,
    Workspace,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// State reachable from host callbacks.
#[derive(Debug)]
pub(crate) struct Shared {
    model: BufferId,
    suppression: Suppression,
    translator: RefCell<ChangeTranslator>,
    events: EventDispatcher,
    cursor_activity: Debounce,
    /// Model version at which the latest attachment change was reported.
    pending_rebind: PendingSlot<u64>,
    last_selection: Cell<Option<Selection>>,
}

impl Shared {
    pub(crate) fn model(&self) -> BufferId {
        self.model
    }

    pub(crate) fn last_selection(&self) -> Option<Selection> {
        self.last_selection.get()
    }

    pub(crate) fn set_last_selection(&self, selection: Selection) {
        self.last_selection.set(Some(selection));
    }

    fn on_model_event(&self, change: &StateChange) {
        match change.change_type {
            StateChangeType::DocumentModified => {
                self.on_content_change(change.text_delta.as_deref());
            }
            StateChangeType::AttachedChanged => {
                if self.pending_rebind.schedule(change.new_version) {
                    trace!(model = self.model.get(), "replaced pending rebind");
                }
            }
            _ => {}
        }
    }

    fn on_content_change(&self, delta: Option<&TextDelta>) {
        if self.suppression.is_active() {
            trace!(model = self.model.get(), "ignoring self-inflicted change");
            return;
        }

        let pairs = self.translator.borrow_mut().translate(delta);
        for (operation, inverse) in pairs {
            trace!(model = self.model.get(), %operation, "local change");
            self.events.dispatch(&AdapterEvent::Change { operation, inverse });
        }
    }

    pub(crate) fn on_view_event(&self, change: &StateChange) {
        if let Some(selection) = change.selection {
            self.last_selection.set(Some(selection));
        }

        match change.change_type {
            StateChangeType::CursorMoved => {
                self.cursor_activity.trigger();
            }
            StateChangeType::FocusGained => {
                self.events.dispatch(&AdapterEvent::Focus);
            }
            StateChangeType::FocusLost => {
                if change.selection.is_none_or(|s| s.is_empty()) {
                    self.events.dispatch(&AdapterEvent::Blur);
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct HistoryOverrides {
    undo: bool,
    redo: bool,
}

/// Binds one model of a [`Workspace`] to a collaboration engine.
///
/// The adapter does not own the workspace; every call that touches the editor takes it
/// explicitly. Dropping the adapter without calling [`detach`](Self::detach) leaves its host
/// subscriptions in place, but they become inert.
///
/// # Example
///
/// ```rust
/// use editor_core::Workspace;
/// use editor_core_ot::{AdapterEvent, EditorAdapter, EventKind, TextOperation};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let mut workspace = Workspace::new();
/// let opened = workspace.open_buffer(None, "").unwrap();
/// let mut adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
///
/// let sent = Rc::new(RefCell::new(Vec::new()));
/// let outbox = sent.clone();
/// adapter.on(EventKind::Change, move |event| {
///     if let AdapterEvent::Change { operation, .. } = event {
///         outbox.borrow_mut().push(operation.clone());
///     }
/// });
///
/// // The first remote operation is the document snapshot.
/// adapter
///     .apply_operation(&mut workspace, &TextOperation::new().insert("hello"))
///     .unwrap();
/// assert!(sent.borrow().is_empty());
///
/// workspace.set_selection_offsets(opened.view_id, 5, 5).unwrap();
/// workspace.insert_text(opened.view_id, "!").unwrap();
/// assert_eq!(
///     sent.borrow().as_slice(),
///     &[TextOperation::new().retain(5).insert("!")]
/// );
/// ```
#[derive(Debug)]
pub struct EditorAdapter {
    shared: Rc<Shared>,
    attachment: AttachmentManager,
    presence: PresenceDecorator,
    options: AdapterOptions,
    model_subscription: Option<SubscriptionId>,
    history: HistoryOverrides,
    cold_start_pending: bool,
    detached: bool,
}

impl EditorAdapter {
    /// Create an adapter for `model` with default options.
    pub fn new(workspace: &mut Workspace, model: BufferId) -> Result<Self, AdapterError> {
        Self::with_options(workspace, model, AdapterOptions::default())
    }

    /// Create an adapter for `model`.
    ///
    /// Fails with [`AdapterError::ModelNotFound`] if the model is not open. If a view already
    /// displays the model, the adapter binds to it immediately.
    pub fn with_options(
        workspace: &mut Workspace,
        model: BufferId,
        options: AdapterOptions,
    ) -> Result<Self, AdapterError> {
        let rope = workspace
            .model(model)
            .map_err(|_| AdapterError::ModelNotFound(model))?
            .line_index()
            .rope()
            .clone();

        let shared = Rc::new(Shared {
            model,
            suppression: Suppression::new(),
            translator: RefCell::new(ChangeTranslator::from_rope(rope)),
            events: EventDispatcher::new(),
            cursor_activity: Debounce::new(),
            pending_rebind: PendingSlot::new(),
            last_selection: Cell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        let model_subscription = workspace.on_model_event(model, move |change| {
            if let Some(shared) = weak.upgrade() {
                shared.on_model_event(change);
            }
        })?;

        let mut adapter = Self {
            shared,
            attachment: AttachmentManager::default(),
            presence: PresenceDecorator::new(options.show_participant_names),
            options,
            model_subscription: Some(model_subscription),
            history: HistoryOverrides::default(),
            cold_start_pending: options.cold_start,
            detached: false,
        };

        if let Some(view) = workspace.view_for_buffer(model)
            && let Err(err) = adapter.attachment.bind(workspace, view, &adapter.shared)
        {
            workspace.unsubscribe(model_subscription);
            return Err(err.into());
        }

        debug!(
            model = model.get(),
            view = ?adapter.bound_view(),
            "adapter created"
        );
        Ok(adapter)
    }

    /// The model this adapter is bound to.
    pub fn model(&self) -> BufferId {
        self.shared.model
    }

    /// Options in effect.
    pub fn options(&self) -> AdapterOptions {
        self.options
    }

    /// The view currently bound, if any.
    pub fn bound_view(&self) -> Option<ViewId> {
        self.attachment.bound_view()
    }

    /// The current binding, if any.
    pub fn binding(&self) -> Option<&EditorBinding> {
        self.attachment.binding()
    }

    /// Attachment state of the model.
    pub fn attachment_state(&self) -> AttachmentState {
        self.attachment.state()
    }

    /// Returns `true` if a rebind is waiting for the next [`tick`](Self::tick).
    pub fn has_pending_rebind(&self) -> bool {
        self.shared.pending_rebind.is_pending()
    }

    /// Number of remote participants.
    pub fn participant_count(&self) -> usize {
        self.presence.len()
    }

    /// Look up a remote participant.
    pub fn participant(&self, client_id: &ClientId) -> Option<&RemoteParticipant> {
        self.presence.participant(client_id)
    }

    /// Returns `true` once [`detach`](Self::detach) has been called.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Returns `true` while a remote operation is being applied.
    pub fn is_suppressed(&self) -> bool {
        self.shared.suppression.is_active()
    }

    /// Run deferred work: rebind if the attachment changed, then flush cursor activity.
    pub fn tick(&mut self, workspace: &mut Workspace) -> Result<(), AdapterError> {
        if self.detached {
            return Ok(());
        }
        if self.shared.pending_rebind.take().is_some() {
            self.rebind(workspace)?;
        }
        if self.shared.cursor_activity.take() {
            self.shared.events.dispatch(&AdapterEvent::CursorActivity);
        }
        Ok(())
    }

    fn rebind(&mut self, workspace: &mut Workspace) -> Result<(), AdapterError> {
        let candidate = workspace.view_for_buffer(self.shared.model);
        if !self.attachment.needs_rebind(candidate) {
            return Ok(());
        }

        if let Some(previous) = self.attachment.unbind(workspace, &self.shared) {
            self.presence.release_all(workspace, previous);
        }
        if let Some(view) = candidate {
            self.attachment.bind(workspace, view, &self.shared)?;
            self.presence.render_all(workspace, view)?;
        }
        Ok(())
    }

    /// The bound view, provided it still displays the model.
    fn render_target(&self, workspace: &Workspace) -> Option<ViewId> {
        self.attachment
            .bound_view()
            .filter(|view| workspace.buffer_id_for_view(*view) == Ok(Some(self.shared.model)))
    }

    fn ensure_attached(&self) -> Result<(), AdapterError> {
        if self.detached {
            Err(AdapterError::Detached)
        } else {
            Ok(())
        }
    }

    /// The local cursor.
    ///
    /// Reads the bound view, or falls back to the cursor cached when the last view was unbound.
    pub fn get_cursor(&self, workspace: &Workspace) -> Option<Cursor> {
        self.render_target(workspace)
            .and_then(|view| workspace.selection_offsets(view).ok())
            .map(|(anchor, head)| Cursor::new(head, anchor))
            .or_else(|| self.attachment.fallback_cursor(workspace, &self.shared))
    }

    /// Move the local cursor. Without a bound view only the cached cursor is updated.
    pub fn set_cursor(
        &mut self,
        workspace: &mut Workspace,
        cursor: Cursor,
    ) -> Result<(), AdapterError> {
        self.ensure_attached()?;
        match self.render_target(workspace) {
            Some(view) => {
                workspace.set_selection_offsets(view, cursor.selection_end, cursor.position)?
            }
            None => {
                // Supersedes whatever the outgoing view reported last.
                self.shared.last_selection.set(None);
                self.attachment.set_cached_cursor(cursor);
            }
        }
        Ok(())
    }

    /// Show a remote participant's cursor.
    ///
    /// Invalid offsets or colours are rejected without touching the participant collection.
    pub fn set_other_cursor(
        &mut self,
        workspace: &mut Workspace,
        cursor: RemoteCursor,
        color: &str,
        client_id: impl Into<ClientId>,
        name: &str,
    ) -> Result<ParticipantHandle, PresenceError> {
        if self.detached {
            return Err(PresenceError::Detached);
        }
        let view = self.render_target(workspace);
        self.presence
            .upsert(workspace, view, client_id.into(), cursor, color, name)
    }

    /// Remove the participant `handle` refers to. Returns `false` if it is already gone.
    pub fn clear_participant(
        &mut self,
        workspace: &mut Workspace,
        handle: &ParticipantHandle,
    ) -> bool {
        let view = self.attachment.bound_view();
        self.presence.clear(workspace, view, handle)
    }

    /// Register callbacks, replacing those already registered for the same kinds.
    pub fn register_callbacks<I>(&self, callbacks: I)
    where
        I: IntoIterator<Item = (EventKind, EventCallback)>,
    {
        for (kind, callback) in callbacks {
            self.shared.events.register(kind, callback);
        }
    }

    /// Register one callback, replacing the one already registered for `kind`.
    pub fn on<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(&AdapterEvent) + 'static,
    {
        self.shared.events.register(kind, Rc::new(callback));
    }

    /// Replace the model's undo with `handler`.
    pub fn register_undo<F>(
        &mut self,
        workspace: &mut Workspace,
        handler: F,
    ) -> Result<(), AdapterError>
    where
        F: FnMut(&mut Workspace) + 'static,
    {
        self.ensure_attached()?;
        workspace.set_undo_handler(self.shared.model, Some(Box::new(handler)))?;
        self.history.undo = true;
        Ok(())
    }

    /// Replace the model's redo with `handler`.
    pub fn register_redo<F>(
        &mut self,
        workspace: &mut Workspace,
        handler: F,
    ) -> Result<(), AdapterError>
    where
        F: FnMut(&mut Workspace) + 'static,
    {
        self.ensure_attached()?;
        workspace.set_redo_handler(self.shared.model, Some(Box::new(handler)))?;
        self.history.redo = true;
        Ok(())
    }

    /// Apply a remote operation.
    ///
    /// The first operation after construction is treated as a document snapshot (see
    /// [`AdapterOptions::cold_start`]). No [`AdapterEvent::Change`] is emitted for the edits
    /// made here.
    pub fn apply_operation(
        &mut self,
        workspace: &mut Workspace,
        operation: &TextOperation,
    ) -> Result<(), AdapterError> {
        self.ensure_attached()?;

        let cold_start = self.cold_start_pending;
        let outcome = OperationApplier::new(
            workspace,
            self.shared.model,
            &self.shared.suppression,
            &self.shared.translator,
        )
        .validate_base_length(self.options.validate_base_length)
        .apply(operation, cold_start)?;

        if cold_start {
            self.cold_start_pending = false;
        }
        if outcome.is_snapshot_load() {
            self.set_cursor(workspace, Cursor::caret(0))?;
        }
        if outcome != ApplyOutcome::Noop {
            trace!(model = self.shared.model.get(), ?outcome, "applied remote operation");
        }
        Ok(())
    }

    /// The operation undoing `operation` on the current buffer.
    pub fn invert_operation(
        &self,
        operation: &TextOperation,
    ) -> Result<TextOperation, AdapterError> {
        let translator = self.shared.translator.borrow();
        let snapshot = translator.snapshot();
        if operation.base_len() != snapshot.len_chars() {
            return Err(AdapterError::BaseLengthMismatch {
                expected: operation.base_len(),
                actual: snapshot.len_chars(),
            });
        }
        Ok(operation.invert(&snapshot.to_string()))
    }

    /// Release everything the adapter holds in the workspace.
    ///
    /// Unsubscribes all listeners, removes every participant and its decorations and uninstalls
    /// the undo/redo handlers registered through this adapter. Calling it again does nothing.
    pub fn detach(&mut self, workspace: &mut Workspace) {
        if self.detached {
            return;
        }
        self.detached = true;

        let model = self.shared.model;
        self.shared.pending_rebind.cancel();
        self.shared.cursor_activity.take();

        if let Some(id) = self.model_subscription.take() {
            workspace.unsubscribe(id);
        }
        let view = self.attachment.unbind(workspace, &self.shared);
        self.presence.destroy_all(workspace, view);

        if std::mem::take(&mut self.history.undo)
            && let Err(err) = workspace.set_undo_handler(model, None)
        {
            warn!(model = model.get(), error = %err, "could not remove undo handler");
        }
        if std::mem::take(&mut self.history.redo)
            && let Err(err) = workspace.set_redo_handler(model, None)
        {
            warn!(model = model.get(), error = %err, "could not remove redo handler");
        }

        self.shared.events.clear();
        debug!(model = model.get(), "adapter detached");
    }
}

impl ParticipantHandle {
    /// Remove the participant and its decorations. Safe to call any number of times.
    pub fn clear(&self, adapter: &mut EditorAdapter, workspace: &mut Workspace) -> bool {
        adapter.clear_participant(workspace, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recorder(adapter: &EditorAdapter) -> Rc<RefCell<Vec<AdapterEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = events.clone();
            adapter.on(kind, move |event| log.borrow_mut().push(event.clone()));
        }
        events
    }

    #[test]
    fn test_construction_requires_open_model() {
        let mut workspace = Workspace::new();
        let model = workspace.open_model(None, "").unwrap();
        workspace.close_buffer(model).unwrap();
        assert!(matches!(
            EditorAdapter::new(&mut workspace, model),
            Err(AdapterError::ModelNotFound(id)) if id == model
        ));
    }

    #[test]
    fn test_binds_existing_view_synchronously() {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, "abc").unwrap();
        let adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
        assert_eq!(adapter.bound_view(), Some(opened.view_id));
        assert_eq!(adapter.binding().unwrap().subscriptions().len(), 3);
    }

    #[test]
    fn test_local_edit_is_dispatched() {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, "ac").unwrap();
        let adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
        let events = recorder(&adapter);

        workspace.set_selection_offsets(opened.view_id, 1, 1).unwrap();
        workspace.insert_text(opened.view_id, "b").unwrap();

        assert_eq!(
            events.borrow().as_slice(),
            &[AdapterEvent::Change {
                operation: TextOperation::new().retain(1).insert("b").retain(1),
                inverse: TextOperation::new().retain(1).delete(1).retain(1),
            }]
        );
    }

    #[test]
    fn test_cursor_activity_is_debounced_until_tick() {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, "abcdef").unwrap();
        let mut adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
        let events = recorder(&adapter);

        for offset in 1..5 {
            workspace
                .set_selection_offsets(opened.view_id, offset, offset)
                .unwrap();
        }
        assert!(events.borrow().is_empty());

        adapter.tick(&mut workspace).unwrap();
        adapter.tick(&mut workspace).unwrap();
        assert_eq!(events.borrow().as_slice(), &[AdapterEvent::CursorActivity]);
    }

    #[test]
    fn test_blur_only_with_empty_selection() {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, "abcdef").unwrap();
        let mut adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
        let events = recorder(&adapter);

        workspace.focus(opened.view_id).unwrap();
        workspace.set_selection_offsets(opened.view_id, 1, 4).unwrap();
        workspace.blur(opened.view_id).unwrap();
        workspace.focus(opened.view_id).unwrap();
        workspace.set_selection_offsets(opened.view_id, 2, 2).unwrap();
        workspace.blur(opened.view_id).unwrap();
        adapter.tick(&mut workspace).unwrap();

        assert_eq!(
            events.borrow().as_slice(),
            &[
                AdapterEvent::Focus,
                AdapterEvent::Focus,
                AdapterEvent::Blur,
                AdapterEvent::CursorActivity,
            ]
        );
    }

    #[test]
    fn test_invert_operation_uses_current_text() {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, "hello").unwrap();
        let adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();

        let op = TextOperation::new().retain(1).delete(3).retain(1);
        assert_eq!(
            adapter.invert_operation(&op).unwrap(),
            TextOperation::new().retain(1).insert("ell").retain(1)
        );
        assert!(matches!(
            adapter.invert_operation(&TextOperation::new().retain(2)),
            Err(AdapterError::BaseLengthMismatch {
                expected: 2,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_detach_is_idempotent_and_fences_operations() {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, "abc").unwrap();
        let mut adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
        let events = recorder(&adapter);
        assert_eq!(workspace.subscription_count(), 4);

        adapter.detach(&mut workspace);
        adapter.detach(&mut workspace);
        assert!(adapter.is_detached());
        assert_eq!(workspace.subscription_count(), 0);

        workspace.insert_text(opened.view_id, "x").unwrap();
        assert!(events.borrow().is_empty());
        assert!(matches!(
            adapter.apply_operation(&mut workspace, &TextOperation::new().insert("y")),
            Err(AdapterError::Detached)
        ));
        assert!(matches!(
            adapter.set_cursor(&mut workspace, Cursor::caret(0)),
            Err(AdapterError::Detached)
        ));
        assert_eq!(
            adapter.set_other_cursor(&mut workspace, RemoteCursor::new(0, 0), "#fff", 1u64, "a"),
            Err(PresenceError::Detached)
        );
    }

    #[test]
    fn test_dropped_adapter_is_inert() {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, "abc").unwrap();
        let adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();
        let events = recorder(&adapter);
        drop(adapter);

        workspace.insert_text(opened.view_id, "x").unwrap();
        workspace.focus(opened.view_id).unwrap();
        assert!(events.borrow().is_empty());
    }
}
