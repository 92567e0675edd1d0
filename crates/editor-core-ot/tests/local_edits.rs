use editor_core::{EditOperation, EditRange, Position, Workspace};
use editor_core_ot::{AdapterEvent, EditorAdapter, EventKind, TextOperation};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Changes = Rc<RefCell<Vec<(TextOperation, TextOperation)>>>;

fn record_changes(adapter: &EditorAdapter) -> Changes {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let log = changes.clone();
    adapter.on(EventKind::Change, move |event| {
        if let AdapterEvent::Change { operation, inverse } = event {
            log.borrow_mut().push((operation.clone(), inverse.clone()));
        }
    });
    changes
}

#[test]
fn test_typing_produces_operation_and_inverse() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "hello world").unwrap();
    let adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    let changes = record_changes(&adapter);

    ws.set_selection_offsets(opened.view_id, 6, 11).unwrap();
    ws.insert_text(opened.view_id, "there").unwrap();
    ws.set_selection_offsets(opened.view_id, 0, 6).unwrap();
    ws.insert_text(opened.view_id, "").unwrap();

    assert_eq!(
        *changes.borrow(),
        vec![
            (
                TextOperation::new().retain(6).delete(5).insert("there"),
                TextOperation::new().retain(6).delete(5).insert("world"),
            ),
            (
                TextOperation::new().delete(6).retain(5),
                TextOperation::new().insert("hello ").retain(5),
            ),
        ]
    );
    assert_eq!(ws.buffer_text(opened.buffer_id).unwrap(), "there");
}

#[test]
fn test_second_change_of_a_batch_sees_the_first() {
    let mut ws = Workspace::new();
    let buffer = ws.open_model(None, "0123456789").unwrap();
    let adapter = EditorAdapter::new(&mut ws, buffer).unwrap();
    let changes = record_changes(&adapter);

    ws.apply_edits(
        buffer,
        vec![
            EditOperation::delete(EditRange::new(Position::new(0, 2), Position::new(0, 5))),
            EditOperation::insert(Position::new(0, 8), "XXX"),
        ],
    )
    .unwrap();

    let changes = changes.borrow();
    assert_eq!(changes.len(), 2);
    assert_eq!(
        changes[0].0,
        TextOperation::new().retain(8).insert("XXX").retain(2)
    );
    assert_eq!(
        changes[1].0,
        TextOperation::new().retain(2).delete(3).retain(8)
    );
    assert_eq!(changes[1].0.base_len(), changes[0].0.target_len());

    let mut text = "0123456789".to_string();
    for (operation, _) in changes.iter() {
        text = operation.apply(&text).unwrap();
    }
    assert_eq!(text, ws.buffer_text(buffer).unwrap());
}

#[test]
fn test_notification_without_delta_is_a_heartbeat() {
    let mut ws = Workspace::new();
    let buffer = ws.open_model(None, "abcd").unwrap();
    let adapter = EditorAdapter::new(&mut ws, buffer).unwrap();
    let changes = record_changes(&adapter);

    ws.touch_buffer(buffer).unwrap();

    let changes = changes.borrow();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].0, TextOperation::new().retain(4));
    assert!(changes[0].0.is_noop());
    assert_eq!(changes[0].1, TextOperation::new().retain(4));
}

#[test]
fn test_builtin_undo_is_translated_like_any_edit() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "abc").unwrap();
    let adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    let changes = record_changes(&adapter);

    ws.set_selection_offsets(opened.view_id, 3, 3).unwrap();
    ws.insert_text(opened.view_id, "d").unwrap();
    ws.undo(opened.buffer_id).unwrap();

    let changes = changes.borrow();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].0, changes[0].1);
    assert_eq!(ws.buffer_text(opened.buffer_id).unwrap(), "abc");
}

#[test]
fn test_unicode_offsets_are_characters() {
    let mut ws = Workspace::new();
    let opened = ws.open_buffer(None, "👋 héllo").unwrap();
    let adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
    let changes = record_changes(&adapter);

    ws.set_selection_offsets(opened.view_id, 2, 7).unwrap();
    ws.insert_text(opened.view_id, "wörld").unwrap();

    assert_eq!(
        changes.borrow()[0],
        (
            TextOperation::new().retain(2).delete(5).insert("wörld"),
            TextOperation::new().retain(2).delete(5).insert("héllo"),
        )
    );
}
