//! Two peers sharing a document
//!
//! Each peer owns its own workspace and adapter. Local edits are forwarded to the other peer as
//! operations; remote cursors are shown as decorations.

use editor_core::{ViewId, Workspace};
use editor_core_ot::{AdapterEvent, Cursor, EditorAdapter, EventKind, RemoteCursor, TextOperation};
use std::cell::RefCell;
use std::rc::Rc;

struct Peer {
    name: &'static str,
    workspace: Workspace,
    view: ViewId,
    adapter: EditorAdapter,
    outbox: Rc<RefCell<Vec<TextOperation>>>,
}

impl Peer {
    fn new(name: &'static str, placeholder: &str) -> Self {
        let mut workspace = Workspace::new();
        let opened = workspace.open_buffer(None, placeholder).unwrap();
        let adapter = EditorAdapter::new(&mut workspace, opened.buffer_id).unwrap();

        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = outbox.clone();
        adapter.on(EventKind::Change, move |event| {
            if let AdapterEvent::Change { operation, .. } = event {
                sink.borrow_mut().push(operation.clone());
            }
        });
        adapter.on(EventKind::CursorActivity, move |_| {
            println!("  [{name}] cursor moved");
        });

        Self {
            name,
            workspace,
            view: opened.view_id,
            adapter,
            outbox,
        }
    }

    fn text(&self) -> String {
        self.workspace.buffer_text(self.adapter.model()).unwrap()
    }

    fn type_at(&mut self, offset: usize, text: &str) {
        self.workspace
            .set_selection_offsets(self.view, offset, offset)
            .unwrap();
        self.workspace.insert_text(self.view, text).unwrap();
        self.adapter.tick(&mut self.workspace).unwrap();
    }

    fn receive(&mut self, operation: &TextOperation) {
        self.adapter
            .apply_operation(&mut self.workspace, operation)
            .unwrap();
    }
}

fn flush(from: &mut Peer, to: &mut Peer) {
    let pending: Vec<TextOperation> = from.outbox.borrow_mut().drain(..).collect();
    for operation in pending {
        println!("  {} -> {}: {operation}", from.name, to.name);
        to.receive(&operation);
    }
}

fn main() {
    let mut alice = Peer::new("alice", "");
    let mut bob = Peer::new("bob", "loading...");

    // The server hands both peers the current document as their first operation.
    let snapshot = TextOperation::new().insert("shared notes\n");
    alice.receive(&snapshot);
    bob.receive(&snapshot);
    println!("after snapshot: alice={:?} bob={:?}", alice.text(), bob.text());

    alice.type_at(13, "- buy milk\n");
    flush(&mut alice, &mut bob);

    bob.type_at(0, "# ");
    flush(&mut bob, &mut alice);

    println!("alice: {:?}", alice.text());
    println!("bob:   {:?}", bob.text());
    assert_eq!(alice.text(), bob.text());

    // Show bob's caret in alice's editor.
    let Cursor {
        position,
        selection_end,
    } = bob.adapter.get_cursor(&bob.workspace).unwrap();
    let handle = alice
        .adapter
        .set_other_cursor(
            &mut alice.workspace,
            RemoteCursor::new(position as i64, selection_end as i64),
            "#e06c75",
            "bob",
            "Bob",
        )
        .unwrap();
    println!(
        "alice shows {} decoration(s) for bob",
        alice.workspace.decorations(alice.view).len()
    );

    handle.clear(&mut alice.adapter, &mut alice.workspace);
    alice.adapter.detach(&mut alice.workspace);
    bob.adapter.detach(&mut bob.workspace);
}
