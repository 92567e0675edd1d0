//! Remote participant carets and selections.
//!
//! Every remote participant owns at most two decorations in the bound view: a caret and a range
//! highlight. Exactly one of them is visible at a time. Decorations are created the first time
//! they are needed and then updated in place, so repositioning a participant never recreates
//! them.

use crate::cursor::{Cursor, RemoteCursor};
use crate::error::PresenceError;
use editor_core::{
    Decoration, DecorationId, DecorationKind, DecorationRange, ViewId, Workspace, WorkspaceError,
};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, trace};

static COLOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex")
});

/// Identifier of a remote participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Create a client id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ClientId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Check that `color` is a `#rgb` or `#rrggbb` hex colour.
pub fn validate_color(color: &str) -> Result<(), PresenceError> {
    if COLOR_PATTERN.is_match(color) {
        Ok(())
    } else {
        Err(PresenceError::InvalidColor(color.to_string()))
    }
}

/// Check that both offsets of a remote cursor are non-negative.
pub fn validate_cursor(cursor: RemoteCursor) -> Result<Cursor, PresenceError> {
    match (
        usize::try_from(cursor.position),
        usize::try_from(cursor.selection_end),
    ) {
        (Ok(position), Ok(selection_end)) => Ok(Cursor::new(position, selection_end)),
        _ => Err(PresenceError::NegativeOffset {
            position: cursor.position,
            selection_end: cursor.selection_end,
        }),
    }
}

/// A remote participant and the decorations rendering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParticipant {
    client_id: ClientId,
    color: String,
    name: String,
    cursor: Cursor,
    caret: Option<DecorationId>,
    range: Option<DecorationId>,
    generation: u64,
}

impl RemoteParticipant {
    /// The participant's id.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// The participant's colour.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// The participant's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last reported cursor.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Caret decoration in the bound view, if created.
    pub fn caret_decoration(&self) -> Option<DecorationId> {
        self.caret
    }

    /// Range decoration in the bound view, if created.
    pub fn range_decoration(&self) -> Option<DecorationId> {
        self.range
    }

    fn release(&mut self, workspace: &mut Workspace, view: ViewId) {
        for id in [self.caret.take(), self.range.take()].into_iter().flatten() {
            workspace.remove_decoration(view, id);
        }
    }

    fn render(
        &mut self,
        workspace: &mut Workspace,
        view: ViewId,
        show_names: bool,
    ) -> Result<(), WorkspaceError> {
        let (start, end) = self.cursor.range();
        let as_caret = self.cursor.is_empty();

        let caret = self.decoration(DecorationKind::Caret, start, start, !as_caret, show_names);
        self.caret = upsert_decoration(workspace, view, self.caret, caret)?;

        let range = self.decoration(DecorationKind::Highlight, start, end, as_caret, show_names);
        self.range = upsert_decoration(workspace, view, self.range, range)?;

        trace!(
            client = %self.client_id,
            start,
            end,
            caret = as_caret,
            "presence rendered"
        );
        Ok(())
    }

    fn decoration(
        &self,
        kind: DecorationKind,
        start: usize,
        end: usize,
        hidden: bool,
        show_names: bool,
    ) -> Decoration {
        Decoration {
            color: Some(self.color.clone()),
            label: show_names.then(|| self.name.clone()),
            tooltip: Some(self.name.clone()),
            hidden,
            ..Decoration::new(kind, DecorationRange::new(start, end))
        }
    }
}

/// Update a decoration in place, creating it only when it has to be shown.
fn upsert_decoration(
    workspace: &mut Workspace,
    view: ViewId,
    id: Option<DecorationId>,
    decoration: Decoration,
) -> Result<Option<DecorationId>, WorkspaceError> {
    let visible = !decoration.hidden;
    match id {
        Some(id) => match workspace.update_decoration(view, id, decoration.clone()) {
            Ok(()) => Ok(Some(id)),
            Err(WorkspaceError::DecorationNotFound { .. }) if visible => {
                workspace.add_decoration(view, decoration).map(Some)
            }
            Err(WorkspaceError::DecorationNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        },
        None if visible => workspace.add_decoration(view, decoration).map(Some),
        None => Ok(None),
    }
}

/// Disposer returned by [`EditorAdapter::set_other_cursor`](crate::EditorAdapter::set_other_cursor).
///
/// Clearing is idempotent and only ever affects the participant record the handle was issued
/// for: once that participant has been cleared and re-created, an old handle does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantHandle {
    client_id: ClientId,
    generation: u64,
}

impl ParticipantHandle {
    /// The participant this handle refers to.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }
}

/// The collection of remote participants.
#[derive(Debug, Default)]
pub struct PresenceDecorator {
    participants: HashMap<ClientId, RemoteParticipant>,
    next_generation: u64,
    show_names: bool,
}

impl PresenceDecorator {
    /// Create an empty collection.
    pub fn new(show_names: bool) -> Self {
        Self {
            show_names,
            ..Self::default()
        }
    }

    /// Number of live participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Returns `true` if there are no participants.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Look up a participant.
    pub fn participant(&self, client_id: &ClientId) -> Option<&RemoteParticipant> {
        self.participants.get(client_id)
    }

    /// Iterate over all participants (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &RemoteParticipant> {
        self.participants.values()
    }

    /// Validate and record a participant's cursor, rendering it into `view` when given.
    ///
    /// Validation failures leave the collection untouched.
    pub fn upsert(
        &mut self,
        workspace: &mut Workspace,
        view: Option<ViewId>,
        client_id: ClientId,
        cursor: RemoteCursor,
        color: &str,
        name: &str,
    ) -> Result<ParticipantHandle, PresenceError> {
        let cursor = validate_cursor(cursor).inspect_err(|err| {
            debug!(client = %client_id, error = %err, "rejected remote cursor");
        })?;
        validate_color(color).inspect_err(|err| {
            debug!(client = %client_id, error = %err, "rejected remote cursor");
        })?;

        let next_generation = &mut self.next_generation;
        let participant = self
            .participants
            .entry(client_id.clone())
            .or_insert_with(|| {
                *next_generation += 1;
                debug!(client = %client_id, "remote participant joined");
                RemoteParticipant {
                    client_id: client_id.clone(),
                    color: String::new(),
                    name: String::new(),
                    cursor,
                    caret: None,
                    range: None,
                    generation: *next_generation,
                }
            });
        participant.color = color.to_string();
        participant.name = name.to_string();
        participant.cursor = cursor;

        if let Some(view) = view {
            participant.render(workspace, view, self.show_names)?;
        }

        Ok(ParticipantHandle {
            client_id,
            generation: participant.generation,
        })
    }

    /// Remove the participant `handle` was issued for. Returns `false` if it is already gone.
    pub fn clear(
        &mut self,
        workspace: &mut Workspace,
        view: Option<ViewId>,
        handle: &ParticipantHandle,
    ) -> bool {
        let current = self
            .participants
            .get(&handle.client_id)
            .is_some_and(|p| p.generation == handle.generation);
        if !current {
            return false;
        }
        let Some(mut participant) = self.participants.remove(&handle.client_id) else {
            return false;
        };
        if let Some(view) = view {
            participant.release(workspace, view);
        }
        debug!(client = %handle.client_id, "remote participant cleared");
        true
    }

    /// Remove every participant's decorations from `view`, keeping the records.
    pub fn release_all(&mut self, workspace: &mut Workspace, view: ViewId) {
        for participant in self.participants.values_mut() {
            participant.release(workspace, view);
        }
    }

    /// Render every participant into `view`.
    pub fn render_all(
        &mut self,
        workspace: &mut Workspace,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        for participant in self.participants.values_mut() {
            participant.render(workspace, view, self.show_names)?;
        }
        Ok(())
    }

    /// Drop every participant, releasing their decorations from `view` when given.
    pub fn destroy_all(&mut self, workspace: &mut Workspace, view: Option<ViewId>) {
        if let Some(view) = view {
            self.release_all(workspace, view);
        }
        self.participants.clear();
    }
}
