use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use editor_core::{EditOperation, EditRange, Workspace};
use editor_core_ot::{AdapterOptions, EditorAdapter, EventKind, TextOperation};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (editor-core-ot benchmark line)\n"
        ));
    }
    out.pop();
    out
}

fn incremental() -> AdapterOptions {
    AdapterOptions {
        cold_start: false,
        ..AdapterOptions::default()
    }
}

fn bench_cold_start(c: &mut Criterion) {
    let text = large_text(50_000);
    let snapshot = TextOperation::new().insert(text.as_str());
    c.bench_function("cold_start/50k_lines", |b| {
        b.iter_batched(
            || {
                let mut ws = Workspace::new();
                let opened = ws.open_buffer(None, "placeholder").unwrap();
                let adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
                (ws, adapter)
            },
            |(mut ws, mut adapter)| {
                adapter.apply_operation(&mut ws, black_box(&snapshot)).unwrap();
                black_box(ws.model(adapter.model()).unwrap().char_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_local_typing(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("local_typing/100_inserts", |b| {
        b.iter_batched(
            || {
                let mut ws = Workspace::new();
                let opened = ws.open_buffer(None, &text).unwrap();
                let adapter = EditorAdapter::new(&mut ws, opened.buffer_id).unwrap();
                adapter.on(EventKind::Change, |event| {
                    black_box(event);
                });
                let middle = ws.model(opened.buffer_id).unwrap().char_count() / 2;
                ws.set_selection_offsets(opened.view_id, middle, middle)
                    .unwrap();
                (ws, opened.view_id, adapter)
            },
            |(mut ws, view, _adapter)| {
                for _ in 0..100 {
                    ws.insert_text(view, "x").unwrap();
                }
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_remote_scattered_edits(c: &mut Criterion) {
    let text = large_text(50_000);
    let len = text.chars().count();
    let mut op = TextOperation::new();
    let stride = len / 100;
    for _ in 0..100 {
        op = op.retain(stride - 1).delete(1).insert("yz");
    }
    op = op.retain(len - stride * 100);

    c.bench_function("remote_apply/100_scattered_edits", |b| {
        b.iter_batched(
            || {
                let mut ws = Workspace::new();
                let opened = ws.open_buffer(None, &text).unwrap();
                let adapter =
                    EditorAdapter::with_options(&mut ws, opened.buffer_id, incremental()).unwrap();
                (ws, adapter)
            },
            |(mut ws, mut adapter)| {
                adapter.apply_operation(&mut ws, black_box(&op)).unwrap();
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_multi_change_batch(c: &mut Criterion) {
    let text = large_text(10_000);
    c.bench_function("translate/batch_of_50_changes", |b| {
        b.iter_batched(
            || {
                let mut ws = Workspace::new();
                let buffer = ws.open_model(None, &text).unwrap();
                let adapter = EditorAdapter::new(&mut ws, buffer).unwrap();
                let model = ws.model(buffer).unwrap();
                let edits: Vec<EditOperation> = (0..50)
                    .map(|i| {
                        let start = model.position_at(i * 1_000);
                        let end = model.position_at(i * 1_000 + 3);
                        EditOperation::replace(EditRange::new(start, end), "abc\n")
                    })
                    .collect();
                (ws, buffer, adapter, edits)
            },
            |(mut ws, buffer, _adapter, edits)| {
                black_box(ws.apply_edits(buffer, edits).unwrap());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_cold_start,
    bench_local_typing,
    bench_remote_scattered_edits,
    bench_multi_change_batch
);
criterion_main!(benches);
