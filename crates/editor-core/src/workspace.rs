//! Workspace and multi-buffer / multi-view model.
//!
//! `editor-core` is intentionally UI-agnostic, but a collaborative editor needs a kernel-level
//! model for:
//!
//! - managing multiple open buffers (text + options + undo)
//! - managing views that display a buffer (selections, focus, decorations)
//! - rebinding a view to another buffer, or leaving a buffer displayed by no view at all
//!
//! Text edits are applied to a buffer; the resulting [`TextDelta`] is broadcast to the buffer's
//! subscribers, and every view displaying the buffer has its selection and decorations shifted.

use crate::decorations::{Decoration, DecorationId, DecorationRange};
use crate::delta::{TextDelta, map_offset};
use crate::model::{AppliedBatch, EditOperation, EditRange, TextModel, TextModelOptions};
use crate::selection::Selection;
use crate::state::{Listeners, StateChange, StateChangeType, SubscriptionId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Opaque identifier for an open buffer in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(u64);

impl BufferId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Opaque identifier for a view in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

impl ViewId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Result of opening a buffer together with an initial view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenBufferResult {
    /// The created buffer id.
    pub buffer_id: BufferId,
    /// The initial view id displaying that buffer.
    pub view_id: ViewId,
}

/// Replacement for the built-in undo or redo of a buffer.
pub type HistoryHandler = Box<dyn FnMut(&mut Workspace)>;

/// Workspace-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// A buffer with this uri already exists.
    UriAlreadyOpen(String),
    /// A buffer id was not found.
    BufferNotFound(BufferId),
    /// A view id was not found.
    ViewNotFound(ViewId),
    /// A view displays no buffer.
    ViewDetached(ViewId),
    /// A decoration id was not found in the view.
    DecorationNotFound {
        /// Target view id.
        view: ViewId,
        /// Missing decoration id.
        decoration: DecorationId,
    },
}

impl std::fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceError::UriAlreadyOpen(uri) => write!(f, "Buffer already open: {}", uri),
            WorkspaceError::BufferNotFound(id) => write!(f, "Buffer not found: {}", id.get()),
            WorkspaceError::ViewNotFound(id) => write!(f, "View not found: {}", id.get()),
            WorkspaceError::ViewDetached(id) => {
                write!(f, "View {} does not display a buffer", id.get())
            }
            WorkspaceError::DecorationNotFound { view, decoration } => write!(
                f,
                "Decoration {} not found in view {}",
                decoration.get(),
                view.get()
            ),
        }
    }
}

impl std::error::Error for WorkspaceError {}

struct BufferEntry {
    uri: Option<String>,
    model: TextModel,
    listeners: Listeners,
    undo_handler: Option<HistoryHandler>,
    redo_handler: Option<HistoryHandler>,
    handler_generation: u64,
}

struct ViewEntry {
    buffer: Option<BufferId>,
    /// Primary selection as `(anchor, head)` character offsets.
    selection: (usize, usize),
    version: u64,
    listeners: Listeners,
    decorations: BTreeMap<DecorationId, Decoration>,
}

impl ViewEntry {
    fn detach(&mut self) {
        self.buffer = None;
        self.selection = (0, 0);
        self.decorations.clear();
    }

    fn notify(&mut self, change_type: StateChangeType, model: Option<&TextModel>) {
        let old_version = self.version;
        self.version = self.version.saturating_add(1);
        let (anchor, head) = self.selection;
        let selection = match model {
            Some(model) => Selection::new(model.position_at(anchor), model.position_at(head)),
            None => Selection::default(),
        };
        let change =
            StateChange::new(change_type, old_version, self.version).with_selection(selection);
        self.listeners.notify(&change);
    }
}

#[derive(Debug, Clone, Copy)]
enum SubscriptionOwner {
    Buffer(BufferId),
    View(ViewId),
}

#[derive(Debug, Clone, Copy)]
enum HistoryDirection {
    Undo,
    Redo,
}

/// A collection of open buffers and the views displaying them.
#[derive(Default)]
pub struct Workspace {
    next_buffer_id: u64,
    buffers: BTreeMap<BufferId, BufferEntry>,
    uri_to_buffer: HashMap<String, BufferId>,

    next_view_id: u64,
    views: BTreeMap<ViewId, ViewEntry>,
    active_view: Option<ViewId>,
    focused_view: Option<ViewId>,

    next_subscription_id: u64,
    subscriptions: HashMap<SubscriptionId, SubscriptionOwner>,
    next_decoration_id: u64,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("buffer_count", &self.buffers.len())
            .field("view_count", &self.views.len())
            .field("subscription_count", &self.subscriptions.len())
            .field("active_view", &self.active_view)
            .field("focused_view", &self.focused_view)
            .finish()
    }
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of open buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Returns `true` if there are no open buffers.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Returns the number of open views.
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Returns the number of live subscriptions (buffer and view level).
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Return the active view id (if any).
    pub fn active_view_id(&self) -> Option<ViewId> {
        self.active_view
    }

    /// Return the focused view id (if any).
    pub fn focused_view_id(&self) -> Option<ViewId> {
        self.focused_view
    }

    /// Open a new buffer that is not displayed by any view.
    pub fn open_model(
        &mut self,
        uri: Option<String>,
        text: &str,
    ) -> Result<BufferId, WorkspaceError> {
        if let Some(uri) = uri.as_ref()
            && self.uri_to_buffer.contains_key(uri)
        {
            return Err(WorkspaceError::UriAlreadyOpen(uri.clone()));
        }

        let buffer_id = BufferId(self.next_buffer_id);
        self.next_buffer_id = self.next_buffer_id.saturating_add(1);

        self.buffers.insert(
            buffer_id,
            BufferEntry {
                uri: uri.clone(),
                model: TextModel::new(text),
                listeners: Listeners::default(),
                undo_handler: None,
                redo_handler: None,
                handler_generation: 0,
            },
        );

        if let Some(uri) = uri {
            self.uri_to_buffer.insert(uri, buffer_id);
        }

        Ok(buffer_id)
    }

    /// Open a new buffer in the workspace, creating an initial view that displays it.
    pub fn open_buffer(
        &mut self,
        uri: Option<String>,
        text: &str,
    ) -> Result<OpenBufferResult, WorkspaceError> {
        let buffer_id = self.open_model(uri, text)?;
        let view_id = self.create_view(Some(buffer_id))?;

        if self.active_view.is_none() {
            self.active_view = Some(view_id);
        }

        Ok(OpenBufferResult { buffer_id, view_id })
    }

    /// Close a buffer. Views displaying it are left without a buffer.
    pub fn close_buffer(&mut self, id: BufferId) -> Result<(), WorkspaceError> {
        let Some(entry) = self.buffers.remove(&id) else {
            return Err(WorkspaceError::BufferNotFound(id));
        };

        if let Some(uri) = entry.uri.as_ref() {
            self.uri_to_buffer.remove(uri);
        }

        self.subscriptions
            .retain(|_, owner| !matches!(owner, SubscriptionOwner::Buffer(b) if *b == id));

        for view in self.views.values_mut() {
            if view.buffer == Some(id) {
                view.detach();
            }
        }

        Ok(())
    }

    /// Create a new view, optionally displaying `buffer`.
    pub fn create_view(&mut self, buffer: Option<BufferId>) -> Result<ViewId, WorkspaceError> {
        if let Some(buffer) = buffer
            && !self.buffers.contains_key(&buffer)
        {
            return Err(WorkspaceError::BufferNotFound(buffer));
        }

        let view_id = ViewId(self.next_view_id);
        self.next_view_id = self.next_view_id.saturating_add(1);

        self.views.insert(
            view_id,
            ViewEntry {
                buffer: None,
                selection: (0, 0),
                version: 0,
                listeners: Listeners::default(),
                decorations: BTreeMap::new(),
            },
        );

        if buffer.is_some() {
            self.set_view_model(view_id, buffer)?;
        }

        Ok(view_id)
    }

    /// Close a view. The buffer it displayed stays open.
    pub fn close_view(&mut self, id: ViewId) -> Result<(), WorkspaceError> {
        let Some(view) = self.views.remove(&id) else {
            return Err(WorkspaceError::ViewNotFound(id));
        };

        self.subscriptions
            .retain(|_, owner| !matches!(owner, SubscriptionOwner::View(v) if *v == id));

        if self.active_view == Some(id) {
            self.active_view = self.views.keys().next().copied();
        }
        if self.focused_view == Some(id) {
            self.focused_view = None;
        }

        if let Some(buffer) = view.buffer {
            self.notify_buffer(buffer, StateChangeType::AttachedChanged, None);
        }

        Ok(())
    }

    /// Make `view` display `buffer` (or nothing).
    ///
    /// Both the previous and the new buffer receive an
    /// [`StateChangeType::AttachedChanged`] notification. The new buffer is notified **before**
    /// the view is linked to it: subscribers that want to find the view must wait until the call
    /// has returned.
    pub fn set_view_model(
        &mut self,
        view: ViewId,
        buffer: Option<BufferId>,
    ) -> Result<(), WorkspaceError> {
        let Some(current) = self.views.get(&view).map(|v| v.buffer) else {
            return Err(WorkspaceError::ViewNotFound(view));
        };
        if let Some(buffer) = buffer
            && !self.buffers.contains_key(&buffer)
        {
            return Err(WorkspaceError::BufferNotFound(buffer));
        }
        if current == buffer {
            return Ok(());
        }

        if let Some(entry) = self.views.get_mut(&view) {
            entry.detach();
        }
        if let Some(previous) = current {
            self.notify_buffer(previous, StateChangeType::AttachedChanged, None);
        }

        if let Some(next) = buffer {
            self.notify_buffer(next, StateChangeType::AttachedChanged, None);
            if let Some(entry) = self.views.get_mut(&view) {
                entry.buffer = Some(next);
            }
        }

        Ok(())
    }

    /// Look up a buffer by uri.
    pub fn buffer_id_for_uri(&self, uri: &str) -> Option<BufferId> {
        self.uri_to_buffer.get(uri).copied()
    }

    /// Get the buffer displayed by a view.
    pub fn buffer_id_for_view(&self, id: ViewId) -> Result<Option<BufferId>, WorkspaceError> {
        self.views
            .get(&id)
            .map(|v| v.buffer)
            .ok_or(WorkspaceError::ViewNotFound(id))
    }

    /// All views currently displaying `buffer`, in creation order.
    pub fn views_for_buffer(&self, buffer: BufferId) -> Vec<ViewId> {
        self.views
            .iter()
            .filter_map(|(id, v)| (v.buffer == Some(buffer)).then_some(*id))
            .collect()
    }

    /// The view that best represents `buffer`: focused view, then active view, then the first one.
    pub fn view_for_buffer(&self, buffer: BufferId) -> Option<ViewId> {
        let shows = |id: &ViewId| {
            self.views
                .get(id)
                .is_some_and(|v| v.buffer == Some(buffer))
        };
        self.focused_view
            .filter(shows)
            .or_else(|| self.active_view.filter(shows))
            .or_else(|| self.views_for_buffer(buffer).first().copied())
    }

    /// Borrow a buffer's text model.
    pub fn model(&self, id: BufferId) -> Result<&TextModel, WorkspaceError> {
        self.buffers
            .get(&id)
            .map(|e| &e.model)
            .ok_or(WorkspaceError::BufferNotFound(id))
    }

    /// Get the full text of a buffer.
    pub fn buffer_text(&self, id: BufferId) -> Result<String, WorkspaceError> {
        self.model(id).map(TextModel::text)
    }

    /// Read the `trim_auto_whitespace` option of a buffer.
    pub fn trim_auto_whitespace(&self, id: BufferId) -> Result<bool, WorkspaceError> {
        self.model(id).map(|m| m.options().trim_auto_whitespace)
    }

    /// Set the `trim_auto_whitespace` option of a buffer, returning the previous value.
    pub fn set_trim_auto_whitespace(
        &mut self,
        id: BufferId,
        enabled: bool,
    ) -> Result<bool, WorkspaceError> {
        let entry = self
            .buffers
            .get_mut(&id)
            .ok_or(WorkspaceError::BufferNotFound(id))?;
        let previous = entry.model.set_options(TextModelOptions {
            trim_auto_whitespace: enabled,
        });
        Ok(previous.trim_auto_whitespace)
    }

    /// Apply a batch of edits to a buffer.
    ///
    /// All ranges are expressed against the content before the batch. The batch is one undo
    /// step and produces one [`StateChangeType::DocumentModified`] notification. Returns the
    /// broadcast delta, or `None` if nothing changed.
    pub fn apply_edits(
        &mut self,
        buffer: BufferId,
        edits: Vec<EditOperation>,
    ) -> Result<Option<Arc<TextDelta>>, WorkspaceError> {
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(WorkspaceError::BufferNotFound(buffer))?;
        Ok(entry
            .model
            .apply_edits(edits)
            .map(|batch| self.commit_batch(buffer, batch)))
    }

    /// Type `text` into a view, replacing its selection.
    pub fn insert_text(&mut self, view: ViewId, text: &str) -> Result<(), WorkspaceError> {
        let buffer = self.require_buffer(view)?;
        let selection = self.selection(view)?;
        let (start, end) = selection.min_max();
        let edit = EditOperation::replace(EditRange::new(start, end), text)
            .with_force_move_markers(true);
        self.apply_edits(buffer, vec![edit])?;
        Ok(())
    }

    /// Announce a content change without a structured delta.
    pub fn touch_buffer(&mut self, buffer: BufferId) -> Result<(), WorkspaceError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(WorkspaceError::BufferNotFound(buffer));
        }
        self.notify_buffer(buffer, StateChangeType::DocumentModified, None);
        Ok(())
    }

    /// Get the primary selection of a view.
    pub fn selection(&self, view: ViewId) -> Result<Selection, WorkspaceError> {
        let (anchor, head) = self.selection_offsets(view)?;
        match self.buffer_id_for_view(view)? {
            Some(buffer) => {
                let model = self.model(buffer)?;
                Ok(Selection::new(model.position_at(anchor), model.position_at(head)))
            }
            None => Ok(Selection::default()),
        }
    }

    /// Get the primary selection of a view as `(anchor, head)` character offsets.
    pub fn selection_offsets(&self, view: ViewId) -> Result<(usize, usize), WorkspaceError> {
        self.views
            .get(&view)
            .map(|v| v.selection)
            .ok_or(WorkspaceError::ViewNotFound(view))
    }

    /// Set the primary selection of a view from `(anchor, head)` character offsets (clamped).
    pub fn set_selection_offsets(
        &mut self,
        view: ViewId,
        anchor: usize,
        head: usize,
    ) -> Result<(), WorkspaceError> {
        let buffer = self.require_buffer(view)?;
        let model = &self
            .buffers
            .get(&buffer)
            .ok_or(WorkspaceError::BufferNotFound(buffer))?
            .model;
        let len = model.char_count();
        let selection = (anchor.min(len), head.min(len));

        let entry = self
            .views
            .get_mut(&view)
            .ok_or(WorkspaceError::ViewNotFound(view))?;
        if entry.selection != selection {
            entry.selection = selection;
            entry.notify(StateChangeType::CursorMoved, Some(model));
        }
        Ok(())
    }

    /// Give input focus to a view (the previously focused view loses it).
    pub fn focus(&mut self, view: ViewId) -> Result<(), WorkspaceError> {
        if !self.views.contains_key(&view) {
            return Err(WorkspaceError::ViewNotFound(view));
        }
        if self.focused_view == Some(view) {
            return Ok(());
        }
        if let Some(previous) = self.focused_view {
            self.blur(previous)?;
        }
        self.focused_view = Some(view);
        self.active_view = Some(view);
        let Some(entry) = self.views.get_mut(&view) else {
            return Ok(());
        };
        let model = entry
            .buffer
            .and_then(|b| self.buffers.get(&b))
            .map(|b| &b.model);
        entry.notify(StateChangeType::FocusGained, model);
        Ok(())
    }

    /// Remove input focus from a view. No-op if the view is not focused.
    pub fn blur(&mut self, view: ViewId) -> Result<(), WorkspaceError> {
        let entry = self
            .views
            .get_mut(&view)
            .ok_or(WorkspaceError::ViewNotFound(view))?;
        if self.focused_view == Some(view) {
            self.focused_view = None;
            let model = entry
                .buffer
                .and_then(|b| self.buffers.get(&b))
                .map(|b| &b.model);
            entry.notify(StateChangeType::FocusLost, model);
        }
        Ok(())
    }

    /// Add a decoration to a view.
    pub fn add_decoration(
        &mut self,
        view: ViewId,
        decoration: Decoration,
    ) -> Result<DecorationId, WorkspaceError> {
        let decoration = self.clamp_decoration(view, decoration)?;
        let id = DecorationId(self.next_decoration_id);
        self.next_decoration_id = self.next_decoration_id.saturating_add(1);
        let entry = self
            .views
            .get_mut(&view)
            .ok_or(WorkspaceError::ViewNotFound(view))?;
        entry.decorations.insert(id, decoration);
        Ok(id)
    }

    /// Replace an existing decoration in place (keeping its id).
    pub fn update_decoration(
        &mut self,
        view: ViewId,
        id: DecorationId,
        decoration: Decoration,
    ) -> Result<(), WorkspaceError> {
        let decoration = self.clamp_decoration(view, decoration)?;
        let entry = self
            .views
            .get_mut(&view)
            .ok_or(WorkspaceError::ViewNotFound(view))?;
        let slot = entry
            .decorations
            .get_mut(&id)
            .ok_or(WorkspaceError::DecorationNotFound {
                view,
                decoration: id,
            })?;
        *slot = decoration;
        Ok(())
    }

    /// Remove a decoration. Returns `false` if the view or decoration no longer exists.
    pub fn remove_decoration(&mut self, view: ViewId, id: DecorationId) -> bool {
        self.views
            .get_mut(&view)
            .is_some_and(|entry| entry.decorations.remove(&id).is_some())
    }

    /// Look up a decoration.
    pub fn decoration(&self, view: ViewId, id: DecorationId) -> Option<&Decoration> {
        self.views.get(&view)?.decorations.get(&id)
    }

    /// All decorations of a view, in id order.
    pub fn decorations(&self, view: ViewId) -> Vec<(DecorationId, &Decoration)> {
        self.views
            .get(&view)
            .map(|entry| entry.decorations.iter().map(|(id, d)| (*id, d)).collect())
            .unwrap_or_default()
    }

    /// Subscribe to buffer-level changes.
    pub fn on_model_event<F>(
        &mut self,
        id: BufferId,
        callback: F,
    ) -> Result<SubscriptionId, WorkspaceError>
    where
        F: FnMut(&StateChange) + 'static,
    {
        let sid = self.next_subscription();
        let entry = self
            .buffers
            .get_mut(&id)
            .ok_or(WorkspaceError::BufferNotFound(id))?;
        entry.listeners.push(sid, Box::new(callback));
        self.subscriptions.insert(sid, SubscriptionOwner::Buffer(id));
        Ok(sid)
    }

    /// Subscribe to view-level changes.
    pub fn on_view_event<F>(
        &mut self,
        id: ViewId,
        callback: F,
    ) -> Result<SubscriptionId, WorkspaceError>
    where
        F: FnMut(&StateChange) + 'static,
    {
        let sid = self.next_subscription();
        let entry = self
            .views
            .get_mut(&id)
            .ok_or(WorkspaceError::ViewNotFound(id))?;
        entry.listeners.push(sid, Box::new(callback));
        self.subscriptions.insert(sid, SubscriptionOwner::View(id));
        Ok(sid)
    }

    /// Remove a subscription. Safe to call repeatedly or after its owner was closed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(owner) = self.subscriptions.remove(&id) else {
            return false;
        };
        match owner {
            SubscriptionOwner::Buffer(b) => self
                .buffers
                .get_mut(&b)
                .is_some_and(|e| e.listeners.remove(id)),
            SubscriptionOwner::View(v) => self
                .views
                .get_mut(&v)
                .is_some_and(|e| e.listeners.remove(id)),
        }
    }

    /// Number of subscribers of a view.
    pub fn view_listener_count(&self, id: ViewId) -> usize {
        self.views.get(&id).map_or(0, |v| v.listeners.len())
    }

    /// Install (or remove) a replacement for the built-in undo of a buffer.
    pub fn set_undo_handler(
        &mut self,
        buffer: BufferId,
        handler: Option<HistoryHandler>,
    ) -> Result<(), WorkspaceError> {
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(WorkspaceError::BufferNotFound(buffer))?;
        entry.undo_handler = handler;
        entry.handler_generation = entry.handler_generation.wrapping_add(1);
        Ok(())
    }

    /// Install (or remove) a replacement for the built-in redo of a buffer.
    pub fn set_redo_handler(
        &mut self,
        buffer: BufferId,
        handler: Option<HistoryHandler>,
    ) -> Result<(), WorkspaceError> {
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(WorkspaceError::BufferNotFound(buffer))?;
        entry.redo_handler = handler;
        entry.handler_generation = entry.handler_generation.wrapping_add(1);
        Ok(())
    }

    /// Undo the last change of a buffer (or run the installed undo handler).
    ///
    /// Returns `false` if the built-in history had nothing to undo.
    pub fn undo(&mut self, buffer: BufferId) -> Result<bool, WorkspaceError> {
        self.run_history(buffer, HistoryDirection::Undo)
    }

    /// Redo the last undone change of a buffer (or run the installed redo handler).
    pub fn redo(&mut self, buffer: BufferId) -> Result<bool, WorkspaceError> {
        self.run_history(buffer, HistoryDirection::Redo)
    }

    fn run_history(
        &mut self,
        buffer: BufferId,
        direction: HistoryDirection,
    ) -> Result<bool, WorkspaceError> {
        let entry = self
            .buffers
            .get_mut(&buffer)
            .ok_or(WorkspaceError::BufferNotFound(buffer))?;
        let generation = entry.handler_generation;
        let handler = match direction {
            HistoryDirection::Undo => entry.undo_handler.take(),
            HistoryDirection::Redo => entry.redo_handler.take(),
        };

        if let Some(mut handler) = handler {
            handler(self);
            // Put the handler back unless it was replaced while running.
            if let Some(entry) = self.buffers.get_mut(&buffer)
                && entry.handler_generation == generation
            {
                match direction {
                    HistoryDirection::Undo => entry.undo_handler = Some(handler),
                    HistoryDirection::Redo => entry.redo_handler = Some(handler),
                }
            }
            return Ok(true);
        }

        let batch = match direction {
            HistoryDirection::Undo => entry.model.undo(),
            HistoryDirection::Redo => entry.model.redo(),
        };
        match batch {
            Some(batch) => {
                self.commit_batch(buffer, batch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn next_subscription(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id = self.next_subscription_id.saturating_add(1);
        id
    }

    fn require_buffer(&self, view: ViewId) -> Result<BufferId, WorkspaceError> {
        self.buffer_id_for_view(view)?
            .ok_or(WorkspaceError::ViewDetached(view))
    }

    fn clamp_decoration(
        &self,
        view: ViewId,
        mut decoration: Decoration,
    ) -> Result<Decoration, WorkspaceError> {
        let buffer = self.require_buffer(view)?;
        let len = self.model(buffer)?.char_count();
        let start = decoration.range.start.min(len);
        let end = decoration.range.end.min(len).max(start);
        decoration.range = DecorationRange::new(start, end);
        Ok(decoration)
    }

    fn notify_buffer(
        &mut self,
        buffer: BufferId,
        change_type: StateChangeType,
        delta: Option<Arc<TextDelta>>,
    ) {
        let Some(entry) = self.buffers.get_mut(&buffer) else {
            return;
        };
        let version = entry.model.version();
        let mut change = StateChange::new(change_type, version.saturating_sub(1), version);
        if let Some(delta) = delta {
            change = change.with_text_delta(delta);
        }
        entry.listeners.notify(&change);
    }

    fn commit_batch(&mut self, buffer: BufferId, batch: AppliedBatch) -> Arc<TextDelta> {
        let AppliedBatch {
            delta,
            move_markers,
        } = batch;
        let delta = Arc::new(delta);

        let mut moved_views = Vec::new();
        for (id, view) in self.views.iter_mut() {
            if view.buffer != Some(buffer) {
                continue;
            }

            let (anchor, head) = view.selection;
            let mapped = (
                map_offset(anchor, &delta, &move_markers),
                map_offset(head, &delta, &move_markers),
            );
            if mapped != view.selection {
                view.selection = mapped;
                moved_views.push(*id);
            }

            for decoration in view.decorations.values_mut() {
                let start = map_offset(decoration.range.start, &delta, &move_markers);
                let end = map_offset(decoration.range.end, &delta, &move_markers);
                decoration.range = DecorationRange::new(start, end.max(start));
            }
        }

        self.notify_buffer(buffer, StateChangeType::DocumentModified, Some(delta.clone()));

        let model = self.buffers.get(&buffer).map(|b| &b.model);
        for id in moved_views {
            if let Some(view) = self.views.get_mut(&id) {
                view.notify(StateChangeType::CursorMoved, model);
            }
        }

        delta
    }
}
