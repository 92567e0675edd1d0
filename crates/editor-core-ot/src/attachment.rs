//! Tracking the view that displays the shared model.
//!
//! A model is either unattached or attached to exactly one view. The host reports attachment
//! changes before the new view can be looked up, so the adapter parks a rebind request and
//! resolves the current view at the next tick. Moving to another view always tears down the
//! previous binding first.

use crate::adapter::Shared;
use crate::cursor::Cursor;
use editor_core::{StateChangeType, SubscriptionId, ViewId, Workspace, WorkspaceError};
use std::rc::Rc;
use tracing::debug;

const VIEW_EVENTS: [StateChangeType; 3] = [
    StateChangeType::CursorMoved,
    StateChangeType::FocusGained,
    StateChangeType::FocusLost,
];

/// Attachment state of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentState {
    /// No view displays the model.
    Unattached,
    /// The model is displayed by this view.
    Attached(ViewId),
}

/// The live association between the model and the view displaying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorBinding {
    view: ViewId,
    subscriptions: Vec<SubscriptionId>,
}

impl EditorBinding {
    /// The bound view.
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// View subscriptions owned by this binding.
    pub fn subscriptions(&self) -> &[SubscriptionId] {
        &self.subscriptions
    }
}

/// Owns the binding and the cursor cached while no view is bound.
#[derive(Debug, Default)]
pub(crate) struct AttachmentManager {
    binding: Option<EditorBinding>,
    cached_cursor: Option<Cursor>,
}

impl AttachmentManager {
    pub(crate) fn state(&self) -> AttachmentState {
        match &self.binding {
            Some(binding) => AttachmentState::Attached(binding.view),
            None => AttachmentState::Unattached,
        }
    }

    pub(crate) fn binding(&self) -> Option<&EditorBinding> {
        self.binding.as_ref()
    }

    pub(crate) fn bound_view(&self) -> Option<ViewId> {
        self.binding.as_ref().map(|b| b.view)
    }

    pub(crate) fn set_cached_cursor(&mut self, cursor: Cursor) {
        self.cached_cursor = Some(cursor);
    }

    /// The cursor to report when the bound view cannot be read.
    ///
    /// While a teardown is pending the bound view may already show another model; the last
    /// selection it reported stands in until the next tick.
    pub(crate) fn fallback_cursor(
        &self,
        workspace: &Workspace,
        shared: &Shared,
    ) -> Option<Cursor> {
        self.bound_view()
            .and_then(|view| last_cursor(workspace, view, shared))
            .or(self.cached_cursor)
    }

    /// Returns `true` if `candidate` differs from the bound view.
    pub(crate) fn needs_rebind(&self, candidate: Option<ViewId>) -> bool {
        self.bound_view() != candidate
    }

    /// Subscribe to `view` and record the binding.
    ///
    /// Must only be called while unattached.
    pub(crate) fn bind(
        &mut self,
        workspace: &mut Workspace,
        view: ViewId,
        shared: &Rc<Shared>,
    ) -> Result<(), WorkspaceError> {
        debug_assert!(self.binding.is_none());

        let mut subscriptions = Vec::with_capacity(VIEW_EVENTS.len());
        for kind in VIEW_EVENTS {
            let weak = Rc::downgrade(shared);
            let subscribed = workspace.on_view_event(view, move |change| {
                if change.change_type == kind
                    && let Some(shared) = weak.upgrade()
                {
                    shared.on_view_event(change);
                }
            });
            match subscribed {
                Ok(id) => subscriptions.push(id),
                Err(err) => {
                    for id in subscriptions {
                        workspace.unsubscribe(id);
                    }
                    return Err(err);
                }
            }
        }

        if let Ok(selection) = workspace.selection(view) {
            shared.set_last_selection(selection);
        }
        debug!(model = shared.model().get(), view = view.get(), "bound view");
        self.binding = Some(EditorBinding {
            view,
            subscriptions,
        });
        Ok(())
    }

    /// Drop the binding, unsubscribing its listeners and caching the cursor.
    ///
    /// Returns the view that was bound.
    pub(crate) fn unbind(&mut self, workspace: &mut Workspace, shared: &Shared) -> Option<ViewId> {
        let binding = self.binding.take()?;
        for id in binding.subscriptions {
            workspace.unsubscribe(id);
        }

        if let Some(cursor) = last_cursor(workspace, binding.view, shared) {
            self.cached_cursor = Some(cursor);
        }
        debug!(
            model = shared.model().get(),
            view = binding.view.get(),
            cursor = ?self.cached_cursor,
            "unbound view"
        );
        Some(binding.view)
    }
}

/// The view's cursor if it still shows the model, otherwise the last selection it reported.
fn last_cursor(workspace: &Workspace, view: ViewId, shared: &Shared) -> Option<Cursor> {
    let model = shared.model();
    if workspace.buffer_id_for_view(view) == Ok(Some(model)) {
        let (anchor, head) = workspace.selection_offsets(view).ok()?;
        return Some(Cursor::new(head, anchor));
    }

    let selection = shared.last_selection()?;
    let text = workspace.model(model).ok()?;
    Some(Cursor::new(
        text.offset_at(selection.end),
        text.offset_at(selection.start),
    ))
}
