use editor_core::{OpenBufferResult, StateChangeType, Workspace};
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    let mut ws = Workspace::new();

    let OpenBufferResult {
        buffer_id,
        view_id: left,
    } = ws
        .open_buffer(Some("file:///demo.txt".to_string()), "0123456789\n")
        .unwrap();

    // Simulate a split pane: a second view into the same buffer.
    let right = ws.create_view(Some(buffer_id)).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    ws.on_model_event(buffer_id, move |change| {
        if change.change_type == StateChangeType::DocumentModified
            && let Some(delta) = &change.text_delta
        {
            sink.borrow_mut().extend(delta.changes.clone());
        }
    })
    .unwrap();

    ws.set_selection_offsets(left, 1, 1).unwrap();
    ws.set_selection_offsets(right, 5, 5).unwrap();

    ws.insert_text(left, "X").unwrap();

    println!(
        "buffer text after edit:\n{}",
        ws.buffer_text(buffer_id).unwrap()
    );
    println!("left selection: {:?}", ws.selection_offsets(left).unwrap());
    println!("right selection: {:?}", ws.selection_offsets(right).unwrap());
    for change in log.borrow().iter() {
        println!(
            "change at {} (removed {}): {:?}",
            change.range_offset, change.range_length, change.text
        );
    }
}
