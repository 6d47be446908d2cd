//! End-to-end editing scenarios driven through the public API.

use kurbo::{Point, Size};
use pagesmith_core::columns::{self, ColumnLayout};
use pagesmith_core::grid::GridLayout;
use pagesmith_core::tree;
use pagesmith_core::{
    BlockKind, DragOutcome, DragSource, DropTarget, Editor, EditorConfig, FileStorage, GridCell,
    MAX_UNDO_HISTORY, NodeId, NodePatch, ResizeHandle, Storage,
};
use serde_json::json;
use std::collections::HashSet;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}

fn assert_unique_ids(editor: &Editor) {
    let ids = tree::collect_ids(editor.components());
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate ids on page");
}

fn cell_of(editor: &Editor, grid_id: &NodeId, cell_id: &NodeId) -> GridCell {
    let grid = editor.node(grid_id).unwrap();
    let layout = GridLayout::from_node(grid, 20.0);
    layout
        .cells(grid)
        .into_iter()
        .find(|(id, _)| id == cell_id)
        .map(|(_, cell)| cell)
        .unwrap()
}

#[test]
fn test_heading_duplicate_move_and_undo_to_empty() {
    init_logging();
    let mut editor = Editor::default();
    assert!(editor.components().is_empty());

    let first = editor.add_block(BlockKind::Heading);
    assert_eq!(editor.components().len(), 1);

    let second = editor.duplicate_node(&first).unwrap();
    assert_eq!(editor.components().len(), 2);
    assert_ne!(first, second);
    assert_eq!(editor.components()[0].props, editor.components()[1].props);

    assert!(editor.move_up(&second));
    assert_eq!(editor.components()[0].id, second);
    assert_eq!(editor.components()[1].id, first);

    for _ in 0..3 {
        assert!(editor.undo());
    }
    assert!(editor.components().is_empty());
    assert!(!editor.undo());
}

#[test]
fn test_grid_fill_and_independent_resize() {
    init_logging();
    let mut editor = Editor::default();
    let grid_id = editor.add_block(BlockKind::Grid);
    assert!(editor.set_grid_dimensions(&grid_id, 3, 2));
    assert!(editor.fill_grid(&grid_id));

    let grid = editor.node(&grid_id).unwrap().clone();
    assert_eq!(grid.children.len(), 6);
    let before: Vec<(NodeId, GridCell)> = GridLayout::from_node(&grid, 20.0).cells(&grid);
    for (i, (_, cell)) in before.iter().enumerate() {
        assert_eq!(*cell, GridCell::row_major(i, 3));
    }

    let target = before[0].0.clone();
    assert!(editor.begin_grid_resize(
        &grid_id,
        &target,
        ResizeHandle::Right,
        Point::new(100.0, 50.0),
        Size::new(340.0, 220.0),
    ));
    editor.grid_resize_move(Point::new(205.0, 52.0));
    let committed = editor.end_grid_resize().unwrap();
    assert_eq!(committed, GridCell::at(1, 1).with_span(2, 1));

    assert_eq!(cell_of(&editor, &grid_id, &target), committed);
    for (id, cell) in &before[1..] {
        assert_eq!(cell_of(&editor, &grid_id, id), *cell, "cell {} moved", id);
    }
}

#[test]
fn test_grid_clamp_on_oversized_request() {
    let mut editor = Editor::default();
    let grid_id = editor.add_block(BlockKind::Grid);
    assert!(editor.fill_grid(&grid_id));
    let columns = GridLayout::from_node(editor.node(&grid_id).unwrap(), 20.0).columns;
    let cell_id = editor.node(&grid_id).unwrap().children[1].id.clone();

    let request = GridCell::at(2, 1).with_span(columns + 5, 1);
    assert!(editor.place_grid_cell(&grid_id, &cell_id, request));
    let placed = cell_of(&editor, &grid_id, &cell_id);
    assert_eq!(placed.column_start + placed.column_span - 1, columns);
}

#[test]
fn test_column_resize_conserves_budget() {
    let mut editor = Editor::default();
    let column_id = editor.add_block(BlockKind::Column);
    assert!(editor.apply_column_template(&column_id, "3-col-2-1-1"));
    let before = ColumnLayout::from_node(editor.node(&column_id).unwrap()).total();

    for (index, dx) in [(0, -73.0), (1, 38.0), (0, 240.0), (1, -500.0)] {
        assert!(editor.begin_column_resize(&column_id, index, Point::new(400.0, 0.0)));
        editor.column_resize_move(Point::new(400.0 + dx, 10.0));
        editor.end_column_resize().unwrap();

        let node = editor.node(&column_id).unwrap();
        let layout = ColumnLayout::from_node(node);
        assert!((layout.total() - before).abs() < 1e-9);
        assert!(layout.sizes.iter().all(|w| *w >= 0.5));
        assert_eq!(columns::size_tokens(node).len(), node.children.len());
    }
}

#[test]
fn test_history_bounded_through_editor() {
    let mut editor = Editor::default();
    let id = editor.add_block(BlockKind::Text);
    for i in 0..80 {
        editor.update_node(&id, &NodePatch::prop("text", json!(format!("v{}", i))));
    }
    assert_eq!(editor.history().len(), MAX_UNDO_HISTORY);

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, MAX_UNDO_HISTORY - 1);
    assert_eq!(editor.node(&id).unwrap().prop_str("text"), Some("v30"));
}

#[test]
fn test_uniqueness_across_mixed_session() {
    let mut editor = Editor::for_page("home", EditorConfig::default());
    let roots: Vec<NodeId> = editor.components().iter().map(|n| n.id.clone()).collect();
    for id in &roots {
        editor.duplicate_node(id);
    }

    let section = editor
        .components()
        .iter()
        .find(|n| n.kind == BlockKind::Section)
        .map(|n| n.id.clone())
        .unwrap();
    editor.begin_drag(DragSource::Palette(BlockKind::Slider), Point::ZERO);
    editor.drag_move(Point::new(0.0, 20.0));
    editor.drag_hover(Some(DropTarget::SiblingGap { parent: section.clone(), index: 0 }));
    assert!(matches!(editor.end_drag(), Some(DragOutcome::Dropped(_))));

    let grid_id = editor.add_block(BlockKind::Grid);
    editor.apply_grid_template(&grid_id, "4x4");
    editor.duplicate_node(&grid_id);
    editor.duplicate_node(&section);
    assert_unique_ids(&editor);
}

#[test]
fn test_debounced_typing_then_undo() {
    let mut editor = Editor::default();
    let id = editor.add_block(BlockKind::Heading);
    let start = Instant::now();
    for (i, word) in ["S", "Sa", "Sal", "Sale"].iter().enumerate() {
        let at = start + Duration::from_millis(80 * i as u64);
        editor.edit_props_at(&id, NodePatch::prop("text", json!(word)).with_content(*word), at);
        editor.tick(at);
    }
    assert!(editor.tick(start + Duration::from_secs(1)));
    assert_eq!(editor.node(&id).unwrap().content.as_deref(), Some("Sale"));

    // one undo reverts the whole burst
    assert!(editor.undo());
    assert_eq!(editor.node(&id).unwrap().prop_str("text"), Some("Heading Text"));
}

#[test]
fn test_file_round_trip() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

    let mut editor = Editor::for_page("checkout", EditorConfig::default());
    editor.add_block(BlockKind::ContactForm);
    block_on(editor.save(&storage)).unwrap();
    assert!(block_on(storage.exists("checkout")).unwrap());

    let reopened = block_on(Editor::load(&storage, "checkout", EditorConfig::default())).unwrap();
    assert_eq!(reopened.components(), editor.components());
    assert_eq!(reopened.document().title, editor.document().title);
}
