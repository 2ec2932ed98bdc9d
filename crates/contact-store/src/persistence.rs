//! Persistence backends for the contact book.

use crate::error::StoreError;
use crate::types::ContactBook;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Loads and saves the whole contact book.
///
/// Every store operation reads the full book and, when it mutates, writes the
/// full book back.
#[async_trait]
pub trait ContactPersistence: Send + Sync {
    /// Load the book. A backend with nothing saved yet returns an empty book.
    async fn load(&self) -> Result<ContactBook, StoreError>;

    /// Replace the saved book.
    async fn save(&self, book: &ContactBook) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn kind(&self) -> &'static str;
}

/// JSON document on local disk.
pub struct JsonFileStore {
    storage_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }
}

#[async_trait]
impl ContactPersistence for JsonFileStore {
    /// Returns an empty book if the file doesn't exist or is blank.
    async fn load(&self) -> Result<ContactBook, StoreError> {
        if !self.storage_path.exists() {
            debug!(
                "Contacts file not found at {:?}, using empty book",
                self.storage_path
            );
            return Ok(ContactBook::new());
        }

        let data = fs::read(&self.storage_path).await?;

        if data.iter().all(u8::is_ascii_whitespace) {
            warn!("Contacts file {:?} is empty, using empty book", self.storage_path);
            return Ok(ContactBook::new());
        }

        let book: ContactBook = serde_json::from_slice(&data)?;
        debug!(
            "Loaded {} contacts from {:?}",
            book.len(),
            self.storage_path
        );
        Ok(book)
    }

    async fn save(&self, book: &ContactBook) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(book)?;

        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write atomically using temp file + rename
        let temp_path = self.storage_path.with_extension("tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &self.storage_path).await?;

        debug!(
            "Saved {} contacts ({} bytes) to {:?}",
            book.len(),
            data.len(),
            self.storage_path
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "json-file"
    }
}

/// In-process book for tests or when persistence is disabled.
///
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    book: RwLock<ContactBook>,
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("Using in-memory contact storage (data will be lost on restart)");
        Self::default()
    }

    /// Start from an existing book.
    pub fn with_book(book: ContactBook) -> Self {
        Self {
            book: RwLock::new(book),
        }
    }
}

#[async_trait]
impl ContactPersistence for MemoryStore {
    async fn load(&self) -> Result<ContactBook, StoreError> {
        Ok(self.book.read().await.clone())
    }

    async fn save(&self, book: &ContactBook) -> Result<(), StoreError> {
        *self.book.write().await = book.clone();
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
