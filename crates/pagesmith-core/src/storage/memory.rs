//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::Document;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for tests and hosts that persist elsewhere.
#[derive(Default)]
pub struct MemoryStorage {
    pages: RwLock<HashMap<String, Document>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        // cheap: components are shared
        let document = document.clone();
        Box::pin(async move {
            let mut pages = self.pages.write().map_err(lock_error)?;
            pages.insert(id, document);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let id = id.to_string();
        Box::pin(async move {
            let pages = self.pages.read().map_err(lock_error)?;
            pages.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut pages = self.pages.write().map_err(lock_error)?;
            pages.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let pages = self.pages.read().map_err(lock_error)?;
            let mut ids: Vec<String> = pages.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let pages = self.pages.read().map_err(lock_error)?;
            Ok(pages.contains_key(&id))
        })
    }
}
