//! Page document: the unit of persistence and of undo/redo snapshotting.

use crate::node::{NodeId, NodeRef};
use crate::tree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Title given to imported documents that do not carry one.
pub const IMPORTED_TITLE: &str = "Imported Page";
/// Title of a fresh document.
pub const UNTITLED: &str = "Untitled Page";
/// Page id written by export when the document has none.
pub const EXPORT_FALLBACK_ID: &str = "exported-page";

/// Errors raised while importing a document file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON file: {0}")]
    InvalidJson(String),
    #[error("File has no 'components' array")]
    MissingComponents,
}

/// Whether a loaded page has anything to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    /// No blocks yet; hosts show an explicit empty state.
    Empty,
    /// Number of root blocks.
    Populated(usize),
}

/// A page: root blocks plus metadata.
///
/// Serializes to `{page_id, title, description, components}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub page_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Root blocks in render order.
    #[serde(default)]
    pub components: Vec<NodeRef>,
}

fn default_title() -> String {
    UNTITLED.to_string()
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

/// Import payload: like [`Document`] but `components` must be present.
#[derive(Deserialize)]
struct ImportedDocument {
    #[serde(default)]
    page_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    components: Option<Vec<NodeRef>>,
}

impl Document {
    /// Create an empty document for a page.
    pub fn new(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            title: UNTITLED.to_string(),
            description: String::new(),
            components: Vec::new(),
        }
    }

    /// Builder: set the root blocks.
    pub fn with_components(mut self, components: Vec<NodeRef>) -> Self {
        self.components = components;
        self
    }

    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Report the explicit empty/populated state.
    pub fn content_state(&self) -> ContentState {
        if self.components.is_empty() {
            ContentState::Empty
        } else {
            ContentState::Populated(self.components.len())
        }
    }

    /// Total number of blocks at every depth.
    pub fn node_count(&self) -> usize {
        tree::count(&self.components)
    }

    /// Ids that occur more than once anywhere in the tree.
    pub fn duplicate_ids(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for id in tree::collect_ids(&self.components) {
            if !seen.insert(id.clone()) && !dupes.contains(&id) {
                dupes.push(id);
            }
        }
        dupes
    }

    /// Serialize the document to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document, tolerating a missing `components` key.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse an exported page file.
    ///
    /// Unlike [`Document::from_json`], a file without a `components` array is
    /// rejected so a stray JSON file never wipes the page.
    pub fn import(json: &str) -> Result<Self, ImportError> {
        let data: ImportedDocument =
            serde_json::from_str(json).map_err(|e| ImportError::InvalidJson(e.to_string()))?;
        let components = data.components.ok_or(ImportError::MissingComponents)?;
        Ok(Self {
            page_id: data.page_id.unwrap_or_default(),
            title: data.title.unwrap_or_else(|| IMPORTED_TITLE.to_string()),
            description: data.description.unwrap_or_default(),
            components,
        })
    }

    /// Serialize for a file download; an empty page id becomes
    /// [`EXPORT_FALLBACK_ID`].
    pub fn export(&self) -> Result<String, serde_json::Error> {
        if self.page_id.is_empty() {
            let mut named = self.clone();
            named.page_id = EXPORT_FALLBACK_ID.to_string();
            named.to_json()
        } else {
            self.to_json()
        }
    }

    /// File name for an exported download.
    pub fn export_file_name(&self) -> String {
        let stem = if self.page_id.is_empty() { "page" } else { &self.page_id };
        format!("{}.json", stem)
    }
}
