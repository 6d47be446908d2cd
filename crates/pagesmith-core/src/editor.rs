//! The editing session: one document, its history and every live gesture.
//!
//! All tree changes go through [`crate::tree`]; each discrete user action
//! records exactly one history entry, and actions that change nothing
//! record none. Pending property edits are flushed before any other
//! action so the history stays in event order.

use crate::blocks;
use crate::columns::{self, ColumnResize};
use crate::config::EditorConfig;
use crate::debounce::{EditDebouncer, PendingEdit};
use crate::dnd::{DragOutcome, DragPhase, DragSession, DragSource, DropTarget};
use crate::document::{Document, ImportError};
use crate::grid::{self, GridCell, GridResize, ResizeHandle};
use crate::history::History;
use crate::node::{BlockKind, Node, NodeId, NodeRef};
use crate::pages;
use crate::selection::{BlockState, SelectionState};
use crate::storage::{Storage, StorageError, StorageResult};
use crate::tree::{self, NodePatch};
use crate::upload::{UploadResult, UploadedFile};
use kurbo::{Point, Size};
use std::sync::Arc;
use std::time::Instant;

/// Severity of a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the host to show, e.g. as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Runtime editing state for one page.
#[derive(Debug)]
pub struct Editor {
    document: Document,
    history: History,
    selection: SelectionState,
    debouncer: EditDebouncer,
    drag: Option<DragSession>,
    grid_resize: Option<GridResize>,
    column_resize: Option<ColumnResize>,
    config: EditorConfig,
    notices: Vec<Notice>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::default(), EditorConfig::default())
    }
}

impl Editor {
    /// Start editing `document`; its current tree is the first history entry.
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let history = History::with_limit(document.components.clone(), config.history_limit);
        Self {
            document,
            history,
            selection: SelectionState::new(),
            debouncer: EditDebouncer::new(config.edit_debounce()),
            drag: None,
            grid_resize: None,
            column_resize: None,
            config,
            notices: Vec::new(),
        }
    }

    /// A fresh editor for `page_id` holding that page's starter content.
    pub fn for_page(page_id: &str, config: EditorConfig) -> Self {
        let document = Document::new(page_id).with_components(pages::default_components(page_id));
        Self::new(document, config)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Root blocks in render order.
    pub fn components(&self) -> &[NodeRef] {
        &self.document.components
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || !self.debouncer.is_idle()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && self.debouncer.is_idle()
    }

    /// Find a block anywhere on the page.
    pub fn node(&self, id: &NodeId) -> Option<&NodeRef> {
        tree::find(&self.document.components, id)
    }

    /// Messages queued since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.document.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.document.description = description.into();
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Select a block. Unknown ids are ignored.
    pub fn select(&mut self, id: &NodeId) -> bool {
        if !tree::contains(&self.document.components, id) {
            return false;
        }
        self.selection.select(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn hover(&mut self, id: Option<NodeId>) {
        self.selection.hover(id);
    }

    pub fn block_state(&self, id: &NodeId) -> BlockState {
        self.selection.state_of(id)
    }

    /// Install `next` as the current tree and record it, unless nothing
    /// changed.
    fn commit(&mut self, next: Vec<NodeRef>) -> bool {
        if tree::is_unchanged(&self.document.components, &next) {
            return false;
        }
        self.history.commit(next.clone());
        self.document.components = next;
        if self.selection.retain_existing(&self.document.components) {
            log::debug!("selection cleared: block no longer on page");
        }
        true
    }

    /// Run `f` on block `id` and commit the result if it differs.
    /// With `kind` set, blocks of any other kind are left alone.
    fn edit_node(&mut self, id: &NodeId, kind: Option<BlockKind>, f: impl FnOnce(&Node) -> Node) -> bool {
        let Some(node) = tree::find(&self.document.components, id) else {
            return false;
        };
        if kind.is_some_and(|k| node.kind != k) {
            return false;
        }
        let updated = f(node.as_ref());
        if updated == **node {
            return false;
        }
        let next = tree::update_with(&self.document.components, id, move |_| updated);
        self.commit(next)
    }

    fn apply_edit(&mut self, edit: PendingEdit) -> bool {
        log::debug!("applying {} coalesced edit(s) to {}", edit.edits, edit.node_id);
        self.edit_node(&edit.node_id, None, |node| edit.patch.apply(node))
    }

    /// Apply the pending property edit now, if there is one.
    pub fn flush_pending(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(edit) => self.apply_edit(edit),
            None => false,
        }
    }

    /// Append a default block of `kind` to the end of the page.
    pub fn add_block(&mut self, kind: BlockKind) -> NodeId {
        self.insert_block(kind, usize::MAX)
    }

    /// Insert a default block of `kind` at root `index` (clamped).
    pub fn insert_block(&mut self, kind: BlockKind, index: usize) -> NodeId {
        let node = blocks::default_node(kind);
        let id = node.id.clone();
        self.flush_pending();
        let next = tree::insert(&self.document.components, node, index);
        self.commit(next);
        id
    }

    /// Insert a ready-made subtree at root `index`. Subtrees reusing an id
    /// already on the page are refused.
    pub fn insert_node(&mut self, node: Node, index: usize) -> Option<NodeId> {
        let id = node.id.clone();
        self.flush_pending();
        let next = tree::insert(&self.document.components, node, index);
        self.commit(next).then_some(id)
    }

    /// Apply `patch` to a block immediately, as one history entry.
    pub fn update_node(&mut self, id: &NodeId, patch: &NodePatch) -> bool {
        self.flush_pending();
        self.edit_node(id, None, |node| patch.apply(node))
    }

    /// Queue a property-panel edit made at `now`.
    ///
    /// Edits to the same block within the debounce window collapse into
    /// one history entry; an edit to another block flushes the previous one.
    pub fn edit_props_at(&mut self, id: &NodeId, patch: NodePatch, now: Instant) {
        if let Some(evicted) = self.debouncer.push(id.clone(), patch, now) {
            self.apply_edit(evicted);
        }
    }

    /// Advance the clock; applies the pending edit once its window elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(edit) => self.apply_edit(edit),
            None => false,
        }
    }

    /// The pending, not yet applied, property edit.
    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.debouncer.pending()
    }

    /// Remove a block and everything inside it.
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        self.flush_pending();
        let next = tree::delete(&self.document.components, id);
        self.commit(next)
    }

    /// Delete the selected block, if any.
    pub fn delete_selected(&mut self) -> bool {
        match self.selection.selected().cloned() {
            Some(id) => self.delete_node(&id),
            None => false,
        }
    }

    /// Deep-copy a block right after itself. Returns the copy's id.
    pub fn duplicate_node(&mut self, id: &NodeId) -> Option<NodeId> {
        self.flush_pending();
        let (next, copy) = tree::duplicate(&self.document.components, id);
        self.commit(next);
        copy
    }

    /// Move root block `from` to position `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.flush_pending();
        let next = tree::reorder(&self.document.components, from, to);
        self.commit(next)
    }

    pub fn move_up(&mut self, id: &NodeId) -> bool {
        self.flush_pending();
        let next = tree::move_up(&self.document.components, id);
        self.commit(next)
    }

    pub fn move_down(&mut self, id: &NodeId) -> bool {
        self.flush_pending();
        let next = tree::move_down(&self.document.components, id);
        self.commit(next)
    }

    /// Step back one history entry.
    pub fn undo(&mut self) -> bool {
        self.flush_pending();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.document.components = snapshot.clone();
        self.selection.retain_existing(&self.document.components);
        true
    }

    /// Step forward one history entry.
    pub fn redo(&mut self) -> bool {
        self.flush_pending();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.document.components = snapshot.clone();
        self.selection.retain_existing(&self.document.components);
        true
    }

    /// Pointer-down on a palette item or a block's drag handle.
    pub fn begin_drag(&mut self, source: DragSource, at: Point) {
        self.flush_pending();
        self.drag = Some(DragSession::new(source, at, self.config.drag_activation_distance));
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn drag_move(&mut self, at: Point) -> Option<DragPhase> {
        self.drag.as_mut().map(|session| session.move_to(at))
    }

    pub fn drag_hover(&mut self, target: Option<DropTarget>) {
        if let Some(session) = self.drag.as_mut() {
            session.hover(target);
        }
    }

    /// Pointer-up: resolve the drop and commit it.
    pub fn end_drag(&mut self) -> Option<DragOutcome> {
        let session = self.drag.take()?;
        let outcome = session.release(&self.document.components);
        match &outcome {
            DragOutcome::Dropped(action) => {
                let next = action.clone().apply(&self.document.components);
                if self.commit(next) {
                    log::debug!("drop committed: {:?}", action.created());
                }
            }
            DragOutcome::Cancelled(reason) => log::debug!("drag cancelled: {:?}", reason),
        }
        Some(outcome)
    }

    /// Abandon the gesture (e.g. Escape).
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    fn gap(&self) -> f64 {
        self.config.grid_default_gap_px
    }

    /// Start dragging a resize handle of `cell_id` inside `grid_id`.
    pub fn begin_grid_resize(
        &mut self,
        grid_id: &NodeId,
        cell_id: &NodeId,
        handle: ResizeHandle,
        at: Point,
        container: Size,
    ) -> bool {
        self.flush_pending();
        let Some(grid) = tree::find(&self.document.components, grid_id) else {
            return false;
        };
        self.grid_resize = GridResize::begin(grid, cell_id, handle, at, container, &self.config);
        self.grid_resize.is_some()
    }

    /// Preview placement for a pointer move; the tree is not touched.
    pub fn grid_resize_move(&mut self, at: Point) -> Option<GridCell> {
        self.grid_resize.as_mut().map(|resize| resize.update(at))
    }

    pub fn grid_resize(&self) -> Option<&GridResize> {
        self.grid_resize.as_ref()
    }

    /// Pointer-up: commit the last previewed placement.
    pub fn end_grid_resize(&mut self) -> Option<GridCell> {
        let result = self.grid_resize.take()?.finish();
        let gap = self.gap();
        self.edit_node(&result.grid_id, Some(BlockKind::Grid), |grid| {
            grid::place_cell(grid, &result.cell_id, result.cell, gap)
        });
        Some(result.cell)
    }

    /// Set a cell's placement directly, clamped to the grid.
    pub fn place_grid_cell(&mut self, grid_id: &NodeId, cell_id: &NodeId, cell: GridCell) -> bool {
        self.flush_pending();
        let gap = self.gap();
        self.edit_node(grid_id, Some(BlockKind::Grid), |grid| {
            grid::place_cell(grid, cell_id, cell, gap)
        })
    }

    /// Put a default cell on every free track.
    pub fn fill_grid(&mut self, grid_id: &NodeId) -> bool {
        self.flush_pending();
        let gap = self.gap();
        self.edit_node(grid_id, Some(BlockKind::Grid), |grid| grid::fill_cells(grid, gap))
    }

    pub fn add_grid_cell(&mut self, grid_id: &NodeId) -> Option<NodeId> {
        self.flush_pending();
        let gap = self.gap();
        let mut added = None;
        self.edit_node(grid_id, Some(BlockKind::Grid), |grid| {
            let (grid, id) = grid::add_cell(grid, gap);
            added = Some(id);
            grid
        });
        added
    }

    pub fn remove_grid_cell(&mut self, grid_id: &NodeId, cell_id: &NodeId) -> bool {
        self.flush_pending();
        self.edit_node(grid_id, Some(BlockKind::Grid), |grid| grid::remove_cell(grid, cell_id))
    }

    pub fn set_grid_dimensions(&mut self, grid_id: &NodeId, columns: u32, rows: u32) -> bool {
        self.flush_pending();
        let gap = self.gap();
        self.edit_node(grid_id, Some(BlockKind::Grid), |grid| {
            grid::set_dimensions(grid, columns, rows, gap)
        })
    }

    /// Apply a named grid preset such as `"3x2"`.
    pub fn apply_grid_template(&mut self, grid_id: &NodeId, name: &str) -> bool {
        let Some(preset) = grid::template(name) else {
            log::warn!("unknown grid template {}", name);
            return false;
        };
        self.flush_pending();
        let gap = self.gap();
        self.edit_node(grid_id, Some(BlockKind::Grid), |grid| {
            grid::apply_template(grid, preset, gap)
        })
    }

    /// Start dragging the boundary right of column `index`.
    pub fn begin_column_resize(&mut self, column_id: &NodeId, index: usize, at: Point) -> bool {
        self.flush_pending();
        let Some(node) = tree::find(&self.document.components, column_id) else {
            return false;
        };
        self.column_resize = ColumnResize::begin(node, index, at, &self.config);
        self.column_resize.is_some()
    }

    /// Preview widths for a pointer move; the tree is not touched.
    pub fn column_resize_move(&mut self, at: Point) -> Option<Vec<String>> {
        let resize = self.column_resize.as_mut()?;
        resize.update(at);
        Some(resize.preview())
    }

    pub fn column_resize(&self) -> Option<&ColumnResize> {
        self.column_resize.as_ref()
    }

    /// Pointer-up: commit the full size list.
    pub fn end_column_resize(&mut self) -> Option<Vec<String>> {
        let result = self.column_resize.take()?.finish();
        self.edit_node(&result.column_id, Some(BlockKind::Column), |node| {
            columns::set_sizes(node, &result.sizes)
        });
        Some(result.sizes)
    }

    pub fn set_column_count(&mut self, column_id: &NodeId, count: u32) -> bool {
        self.flush_pending();
        let max = self.config.max_columns;
        self.edit_node(column_id, Some(BlockKind::Column), |node| {
            columns::set_column_count(node, count, max)
        })
    }

    pub fn remove_column(&mut self, column_id: &NodeId, child_id: &NodeId) -> bool {
        self.flush_pending();
        self.edit_node(column_id, Some(BlockKind::Column), |node| {
            columns::remove_column(node, child_id)
        })
    }

    /// Apply a named column preset such as `"3-col-1-2-1"`.
    pub fn apply_column_template(&mut self, column_id: &NodeId, name: &str) -> bool {
        let Some(preset) = columns::template(name) else {
            log::warn!("unknown column template {}", name);
            return false;
        };
        self.flush_pending();
        let max = self.config.max_columns;
        self.edit_node(column_id, Some(BlockKind::Column), |node| {
            columns::apply_template(node, preset, max)
        })
    }

    /// The page as pretty JSON for a file download.
    pub fn export_json(&mut self) -> Result<String, serde_json::Error> {
        self.flush_pending();
        let json = self.document.export()?;
        log::info!("exported page {}", self.document.export_file_name());
        Ok(json)
    }

    pub fn export_file_name(&self) -> String {
        self.document.export_file_name()
    }

    /// Replace the page with an exported file.
    ///
    /// On failure the page is untouched and an error notice is queued. On
    /// success undo history starts over from the imported tree.
    pub fn import_json(&mut self, json: &str) -> Result<(), ImportError> {
        self.flush_pending();
        let imported = match Document::import(json) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("import rejected: {}", e);
                self.notify(Notice::error(e.to_string()));
                return Err(e);
            }
        };
        let repeated = imported.duplicate_ids().len();
        if repeated > 0 {
            log::warn!("imported page repeats {} block id(s); renaming repeats", repeated);
        }
        self.document.title = imported.title;
        self.document.description = imported.description;
        self.document.components = normalize_layouts(&imported.components);
        self.history.reset(self.document.components.clone());
        self.selection = SelectionState::new();
        self.drag = None;
        self.grid_resize = None;
        self.column_resize = None;
        log::info!("imported {} blocks", self.document.node_count());
        self.notify(Notice::info("Page imported successfully"));
        Ok(())
    }

    /// A block as pretty JSON, for the clipboard.
    pub fn copy_node(&mut self, id: &NodeId) -> Option<String> {
        let node = self.node(id)?;
        match serde_json::to_string_pretty(node.as_ref()) {
            Ok(json) => {
                self.notify(Notice::info("Component copied to clipboard"));
                Some(json)
            }
            Err(e) => {
                log::warn!("copy failed: {}", e);
                None
            }
        }
    }

    /// Store an upload's URL in `props[key]` of block `id`. A failed upload
    /// leaves the block as it was.
    pub fn apply_upload(&mut self, id: &NodeId, key: &str, result: UploadResult<UploadedFile>) -> bool {
        match result {
            Ok(file) => self.update_node(id, &NodePatch::prop(key, file.url.into())),
            Err(e) => {
                log::warn!("upload for {} failed: {}", id, e);
                self.notify(Notice::error(format!("Failed to upload image: {}", e)));
                false
            }
        }
    }

    /// Save the page under its page id.
    pub async fn save(&mut self, storage: &dyn Storage) -> StorageResult<()> {
        self.flush_pending();
        let id = self.document.page_id.clone();
        match storage.save(&id, &self.document).await {
            Ok(()) => {
                log::info!("saved page {}", id);
                self.notify(Notice::info("Page saved successfully"));
                Ok(())
            }
            Err(e) => {
                log::warn!("saving page {} failed: {}", id, e);
                self.notify(Notice::error(format!("Failed to save page: {}", e)));
                Err(e)
            }
        }
    }

    /// Open `page_id` from storage. A page that was never saved starts from
    /// its starter content.
    pub async fn load(storage: &dyn Storage, page_id: &str, config: EditorConfig) -> StorageResult<Self> {
        match storage.load(page_id).await {
            Ok(mut document) => {
                log::info!("loaded page {}", page_id);
                document.page_id = page_id.to_string();
                document.components = normalize_layouts(&document.components);
                Ok(Self::new(document, config))
            }
            Err(StorageError::NotFound(_)) => {
                log::info!("page {} not saved yet, using defaults", page_id);
                Ok(Self::for_page(page_id, config))
            }
            Err(e) => Err(e),
        }
    }
}

/// Repair a loaded tree: repeated ids get fresh ones and every column
/// block gets one size per child.
fn normalize_layouts(nodes: &[NodeRef]) -> Vec<NodeRef> {
    tree::unique_ids(&repair_columns(nodes))
}

fn repair_columns(nodes: &[NodeRef]) -> Vec<NodeRef> {
    nodes
        .iter()
        .map(|node| {
            let mut fixed = if node.kind == BlockKind::Column {
                columns::normalize(node)
            } else {
                Node::clone(node)
            };
            fixed.children = repair_columns(&fixed.children);
            if fixed == **node { Arc::clone(node) } else { Arc::new(fixed) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::CancelReason;
    use crate::node::{COLUMN_SIZES_KEY, props};
    use crate::storage::{MemoryStorage, block_on};
    use crate::upload::UploadError;
    use serde_json::json;
    use std::time::Duration;

    fn editor() -> Editor {
        Editor::default()
    }

    #[test]
    fn test_add_and_undo() {
        let mut editor = editor();
        let id = editor.add_block(BlockKind::Heading);
        assert_eq!(editor.components().len(), 1);
        assert_eq!(editor.components()[0].id, id);
        assert!(editor.undo());
        assert!(editor.components().is_empty());
        assert!(editor.redo());
        assert_eq!(editor.components()[0].id, id);
    }

    #[test]
    fn test_noop_does_not_commit() {
        let mut editor = editor();
        let id = editor.add_block(BlockKind::Text);
        let entries = editor.history().len();
        assert!(!editor.move_up(&id));
        assert!(!editor.delete_node(&NodeId::new("ghost")));
        assert!(!editor.update_node(&id, &NodePatch::new()));
        assert_eq!(editor.history().len(), entries);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut editor = editor();
        let section = editor.add_block(BlockKind::Column);
        let slot = editor.node(&section).unwrap().children[0].id.clone();
        assert!(editor.select(&slot));
        editor.hover(Some(slot.clone()));
        assert_eq!(editor.block_state(&slot), BlockState::Selected);

        assert!(editor.delete_node(&section));
        assert!(editor.selection().selected().is_none());
        assert!(editor.selection().hovered().is_none());
    }

    #[test]
    fn test_debounced_edits_make_one_entry() {
        let mut editor = editor();
        let id = editor.add_block(BlockKind::Heading);
        let entries = editor.history().len();
        let start = Instant::now();

        for (i, text) in ["N", "Ne", "New"].iter().enumerate() {
            let at = start + Duration::from_millis(100 * i as u64);
            editor.edit_props_at(&id, NodePatch::prop("text", json!(text)), at);
        }
        assert!(!editor.tick(start + Duration::from_millis(450)));
        assert!(editor.tick(start + Duration::from_millis(500)));

        assert_eq!(editor.history().len(), entries + 1);
        assert_eq!(editor.node(&id).unwrap().prop_str("text"), Some("New"));
    }

    #[test]
    fn test_pending_edit_flushes_before_other_actions() {
        let mut editor = editor();
        let a = editor.add_block(BlockKind::Text);
        let b = editor.add_block(BlockKind::Text);
        let now = Instant::now();

        editor.edit_props_at(&a, NodePatch::prop("color", json!("red")), now);
        editor.edit_props_at(&b, NodePatch::prop("color", json!("blue")), now);
        // switching nodes applied the first edit
        assert_eq!(editor.node(&a).unwrap().prop_str("color"), Some("red"));
        assert!(editor.pending_edit().is_some());

        editor.move_down(&a);
        assert!(editor.pending_edit().is_none());
        assert_eq!(editor.node(&b).unwrap().prop_str("color"), Some("blue"));
    }

    #[test]
    fn test_edit_of_deleted_node_is_dropped() {
        let mut editor = editor();
        let id = editor.add_block(BlockKind::Text);
        editor.edit_props_at(&id, NodePatch::prop("text", json!("late")), Instant::now());
        // delete flushes the edit first, then removes the block
        assert!(editor.delete_node(&id));
        assert!(editor.components().is_empty());
        assert!(editor.undo());
        assert_eq!(editor.node(&id).unwrap().prop_str("text"), Some("late"));
    }

    #[test]
    fn test_palette_drop_commits_once() {
        let mut editor = editor();
        let entries = editor.history().len();
        editor.begin_drag(DragSource::Palette(BlockKind::Button), Point::new(10.0, 10.0));
        editor.drag_move(Point::new(10.0, 40.0));
        editor.drag_hover(Some(DropTarget::RootGap(0)));
        let outcome = editor.end_drag().unwrap();
        assert!(matches!(outcome, DragOutcome::Dropped(_)));
        assert_eq!(editor.components().len(), 1);
        assert_eq!(editor.history().len(), entries + 1);
        assert!(editor.drag().is_none());
    }

    #[test]
    fn test_cancelled_drag_leaves_tree() {
        let mut editor = editor();
        editor.add_block(BlockKind::Text);
        let before = editor.components().to_vec();
        editor.begin_drag(DragSource::Palette(BlockKind::Button), Point::ZERO);
        editor.drag_move(Point::new(2.0, 2.0));
        editor.drag_hover(Some(DropTarget::RootGap(0)));
        assert_eq!(
            editor.end_drag(),
            Some(DragOutcome::Cancelled(CancelReason::NotActivated))
        );
        assert!(tree::is_unchanged(&before, editor.components()));
    }

    #[test]
    fn test_grid_resize_commits_on_release_only() {
        let mut editor = editor();
        let grid_id = editor.add_block(BlockKind::Grid);
        assert!(editor.set_grid_dimensions(&grid_id, 3, 2));
        assert!(editor.fill_grid(&grid_id));
        let cell = editor.node(&grid_id).unwrap().children[0].id.clone();
        let entries = editor.history().len();

        assert!(editor.begin_grid_resize(
            &grid_id,
            &cell,
            ResizeHandle::Right,
            Point::ZERO,
            Size::new(340.0, 220.0),
        ));
        editor.grid_resize_move(Point::new(60.0, 0.0));
        editor.grid_resize_move(Point::new(110.0, 0.0));
        assert_eq!(editor.history().len(), entries);

        let committed = editor.end_grid_resize().unwrap();
        assert_eq!(committed.column_span, 2);
        assert_eq!(editor.history().len(), entries + 1);
    }

    #[test]
    fn test_layout_ops_check_kind() {
        let mut editor = editor();
        let text = editor.add_block(BlockKind::Text);
        assert!(!editor.fill_grid(&text));
        assert!(!editor.set_column_count(&text, 3));
        assert!(!editor.apply_grid_template(&text, "nope"));
    }

    #[test]
    fn test_column_resize_flow() {
        let mut editor = editor();
        let column = editor.add_block(BlockKind::Column);
        assert!(editor.set_column_count(&column, 3));
        assert!(editor.begin_column_resize(&column, 0, Point::new(200.0, 0.0)));
        let preview = editor.column_resize_move(Point::new(150.0, 0.0)).unwrap();
        assert_eq!(preview, vec!["0.5fr", "1.5fr", "1fr"]);
        assert_eq!(editor.end_column_resize().unwrap(), preview);
        let node = editor.node(&column).unwrap();
        assert_eq!(node.prop(COLUMN_SIZES_KEY), Some(&json!(["0.5fr", "1.5fr", "1fr"])));
    }

    #[test]
    fn test_last_column_cannot_be_resized() {
        let mut editor = editor();
        let column = editor.add_block(BlockKind::Column);
        assert!(!editor.begin_column_resize(&column, 1, Point::ZERO));
        assert!(editor.column_resize_move(Point::new(100.0, 0.0)).is_none());
        assert!(editor.end_column_resize().is_none());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_import_rejects_bad_json() {
        let mut editor = editor();
        let id = editor.add_block(BlockKind::Text);
        assert!(editor.import_json("{ nope").is_err());
        assert!(matches!(
            editor.import_json(r#"{"title":"x"}"#),
            Err(ImportError::MissingComponents)
        ));
        assert_eq!(editor.components()[0].id, id);
        let notices = editor.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
    }

    #[test]
    fn test_import_resets_history() {
        let mut editor = Editor::for_page("home", EditorConfig::default());
        editor.add_block(BlockKind::Text);
        let json = r#"{"components":[{"id":"c1","type":"column","props":{"columns":3}}]}"#;
        editor.import_json(json).unwrap();

        assert_eq!(editor.document().title, crate::document::IMPORTED_TITLE);
        assert_eq!(editor.document().page_id, "home");
        assert!(!editor.can_undo());
        // loaded column repaired to 3 slots
        let column = editor.node(&NodeId::new("c1")).unwrap();
        assert_eq!(column.children.len(), 3);
    }

    #[test]
    fn test_import_renames_repeated_ids() {
        let mut editor = editor();
        let json = r#"{"components":[
            {"id":"x","type":"text","props":{"text":"first"}},
            {"id":"x","type":"text","props":{"text":"second"}}
        ]}"#;
        editor.import_json(json).unwrap();
        assert!(editor.document().duplicate_ids().is_empty());
        assert_eq!(editor.components()[0].id, NodeId::new("x"));

        assert!(editor.delete_node(&NodeId::new("x")));
        assert_eq!(editor.components().len(), 1);
        assert_eq!(editor.components()[0].prop_str("text"), Some("second"));
        assert!(editor.node(&NodeId::new("x")).is_none());
    }

    #[test]
    fn test_load_renames_repeated_ids() {
        let storage = MemoryStorage::new();
        let text = Node::with_id(NodeId::new("x"), BlockKind::Text);
        let doc = Document::new("about")
            .with_components(vec![Arc::new(text.clone()), Arc::new(text)]);
        block_on(storage.save("about", &doc)).unwrap();

        let editor = block_on(Editor::load(&storage, "about", EditorConfig::default())).unwrap();
        assert_eq!(editor.components().len(), 2);
        assert!(editor.document().duplicate_ids().is_empty());
    }

    #[test]
    fn test_export_round_trip() {
        let mut editor = editor();
        editor.add_block(BlockKind::Slider);
        let json = editor.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["page_id"], "exported-page");
        assert_eq!(editor.export_file_name(), "page.json");

        let mut other = Editor::default();
        other.import_json(&json).unwrap();
        assert_eq!(other.components(), editor.components());
    }

    #[test]
    fn test_apply_upload() {
        let mut editor = editor();
        let image = editor.add_block(BlockKind::Image);
        let failed = editor.apply_upload(&image, "src", Err(UploadError::Backend("503".into())));
        assert!(!failed);
        assert_eq!(editor.node(&image).unwrap().prop_str("src"), Some(""));
        assert_eq!(editor.take_notices()[0].level, NoticeLevel::Error);

        let url = "https://cdn.example.com/a.png".to_string();
        assert!(editor.apply_upload(&image, "src", Ok(UploadedFile { url: url.clone() })));
        assert_eq!(editor.node(&image).unwrap().prop_str("src"), Some(url.as_str()));
    }

    #[test]
    fn test_copy_node() {
        let mut editor = editor();
        let id = editor.add_block(BlockKind::Button);
        let json = editor.copy_node(&id).unwrap();
        let node: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node.id, id);
        assert!(editor.copy_node(&NodeId::new("ghost")).is_none());
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut editor = Editor::new(Document::new("about"), EditorConfig::default());
        editor.set_title("About us");
        editor.add_block(BlockKind::Heading);
        block_on(editor.save(&storage)).unwrap();

        let loaded = block_on(Editor::load(&storage, "about", EditorConfig::default())).unwrap();
        assert_eq!(loaded.document(), editor.document());
        assert!(!loaded.can_undo());

        let fresh = block_on(Editor::load(&storage, "cart", EditorConfig::default())).unwrap();
        assert!(!fresh.components().is_empty());
    }

    #[test]
    fn test_normalize_layouts_shares_clean_nodes() {
        let text = Arc::new(Node::new(BlockKind::Text).with_props(props(json!({ "text": "x" }))));
        let out = normalize_layouts(std::slice::from_ref(&text));
        assert!(Arc::ptr_eq(&out[0], &text));
    }
}
