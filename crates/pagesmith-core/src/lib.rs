//! Pagesmith Core Library
//!
//! Document model and editing engine for the Pagesmith visual page builder:
//! an immutable block tree, bounded undo/redo, drag-and-drop insertion and
//! the grid and column layout engines. Rendering is left to the host.

pub mod blocks;
pub mod columns;
pub mod config;
pub mod debounce;
pub mod dnd;
pub mod document;
pub mod editor;
pub mod grid;
pub mod history;
pub mod node;
pub mod pages;
pub mod palette;
pub mod selection;
pub mod storage;
pub mod tree;
pub mod upload;

pub use columns::{ColumnLayout, ColumnResize};
pub use config::EditorConfig;
pub use debounce::{EditDebouncer, PendingEdit};
pub use dnd::{CancelReason, DragOutcome, DragPhase, DragSession, DragSource, DropAction, DropTarget};
pub use document::{ContentState, Document, ImportError};
pub use editor::{Editor, Notice, NoticeLevel};
pub use grid::{GridCell, GridLayout, GridResize, ResizeHandle};
pub use history::{History, MAX_UNDO_HISTORY};
pub use node::{BlockKind, Node, NodeId, NodeRef, Props};
pub use palette::{Category, PaletteEntry};
pub use selection::{BlockState, SelectionState};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tree::NodePatch;
pub use upload::{DataUrlUploader, UploadError, UploadedFile, Uploader};
