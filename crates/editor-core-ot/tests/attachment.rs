use editor_core::Workspace;
use editor_core_ot::{AdapterEvent, AttachmentState, Cursor, EditorAdapter, EventKind, RemoteCursor};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_binding_waits_for_tick() {
    let mut ws = Workspace::new();
    let buffer = ws.open_model(None, "hello").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, buffer).unwrap();
    assert_eq!(adapter.attachment_state(), AttachmentState::Unattached);

    let view = ws.create_view(Some(buffer)).unwrap();
    assert!(adapter.has_pending_rebind());
    assert_eq!(adapter.bound_view(), None);

    adapter.tick(&mut ws).unwrap();
    assert!(!adapter.has_pending_rebind());
    assert_eq!(adapter.attachment_state(), AttachmentState::Attached(view));
    assert_eq!(ws.view_listener_count(view), 3);
}

#[test]
fn test_cursor_is_cached_without_view() {
    let mut ws = Workspace::new();
    let buffer = ws.open_model(None, "hello").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, buffer).unwrap();

    assert_eq!(adapter.get_cursor(&ws), None);
    adapter.set_cursor(&mut ws, Cursor::new(4, 1)).unwrap();
    assert_eq!(adapter.get_cursor(&ws), Some(Cursor::new(4, 1)));
}

#[test]
fn test_unbinding_caches_the_last_cursor() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "hello world").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    ws.set_selection_offsets(opened.view_id, 2, 5).unwrap();

    ws.set_view_model(opened.view_id, None).unwrap();
    adapter.tick(&mut ws).unwrap();

    assert_eq!(adapter.attachment_state(), AttachmentState::Unattached);
    assert_eq!(ws.view_listener_count(opened.view_id), 0);
    assert_eq!(adapter.get_cursor(&ws), Some(Cursor::new(5, 2)));
}

#[test]
fn test_model_moves_to_another_view() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "hello world").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    adapter
        .set_other_cursor(&mut ws, RemoteCursor::new(1, 1), "#f0f", "c", "C")
        .unwrap();

    let other = ws.create_view(None).unwrap();
    ws.set_view_model(opened.view_id, None).unwrap();
    ws.set_view_model(other, Some(opened.buffer_id)).unwrap();
    assert!(adapter.has_pending_rebind());

    adapter.tick(&mut ws).unwrap();
    assert_eq!(adapter.bound_view(), Some(other));
    assert_eq!(ws.view_listener_count(opened.view_id), 0);
    assert_eq!(ws.view_listener_count(other), 3);
    assert!(ws.decorations(opened.view_id).is_empty());
    assert_eq!(ws.decorations(other).len(), 1);
    assert_eq!(adapter.participant_count(), 1);
}

#[test]
fn test_events_follow_the_binding() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "hello").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    let focused = Rc::new(Cell::new(0));
    let counter = focused.clone();
    adapter.on(EventKind::Focus, move |event| {
        assert_eq!(event, &AdapterEvent::Focus);
        counter.set(counter.get() + 1);
    });

    let other = ws.create_view(None).unwrap();
    ws.set_view_model(opened.view_id, None).unwrap();
    ws.set_view_model(other, Some(opened.buffer_id)).unwrap();
    adapter.tick(&mut ws).unwrap();

    ws.focus(opened.view_id).unwrap();
    assert_eq!(focused.get(), 0);
    ws.focus(other).unwrap();
    assert_eq!(focused.get(), 1);
}

#[test]
fn test_second_view_keeps_current_binding() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "hello").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    let before = adapter.binding().cloned();

    ws.create_view(Some(opened.buffer_id)).unwrap();
    adapter.tick(&mut ws).unwrap();

    assert_eq!(adapter.binding().cloned(), before);
    assert_eq!(ws.subscription_count(), 4);
}

#[test]
fn test_detach_cancels_pending_rebind() {
    let mut ws = Workspace::new();
    let buffer = ws.open_model(None, "hello").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, buffer).unwrap();

    let view = ws.create_view(Some(buffer)).unwrap();
    assert!(adapter.has_pending_rebind());
    adapter.detach(&mut ws);
    assert!(!adapter.has_pending_rebind());

    adapter.tick(&mut ws).unwrap();
    assert_eq!(adapter.attachment_state(), AttachmentState::Unattached);
    assert_eq!(ws.view_listener_count(view), 0);
    assert_eq!(ws.subscription_count(), 0);
}

#[test]
fn test_untouched_view_leaves_a_cursor_behind() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "hello").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    assert_eq!(adapter.get_cursor(&ws), Some(Cursor::caret(0)));

    ws.set_view_model(opened.view_id, None).unwrap();
    assert!(adapter.has_pending_rebind());
    assert_eq!(adapter.get_cursor(&ws), Some(Cursor::caret(0)));

    adapter.tick(&mut ws).unwrap();
    assert_eq!(adapter.attachment_state(), AttachmentState::Unattached);
    assert_eq!(adapter.get_cursor(&ws), Some(Cursor::caret(0)));
}

#[test]
fn test_cursor_reported_before_teardown_survives_tick() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "hello world").unwrap();
    let mut adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    ws.set_selection_offsets(opened.view_id, 6, 11).unwrap();

    ws.set_view_model(opened.view_id, None).unwrap();
    assert_eq!(adapter.get_cursor(&ws), Some(Cursor::new(11, 6)));

    adapter.set_cursor(&mut ws, Cursor::caret(3)).unwrap();
    adapter.tick(&mut ws).unwrap();
    assert_eq!(adapter.get_cursor(&ws), Some(Cursor::caret(3)));
}
