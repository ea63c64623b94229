//! Storage layer for persisted slots
//!
//! Key-value slots (durable files or in-memory session storage) plus
//! plain file helpers shared with export/import.

use crate::config::app::NAME;
use crate::config::storage::SLOT_EXTENSION;
use crate::error::{QuoteError, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Get the application data directory path
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(NAME))
        .ok_or_else(|| QuoteError::Config(
            "Could not determine data directory. HOME environment variable may not be set.".to_string()
        ))
}

// =============================================================================
// KeyValueStore - string slots that outlive (or not) the process
// =============================================================================

/// String-keyed storage slots
///
/// Values are opaque strings; callers decide the encoding. Reading an
/// absent slot is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot, `None` if it was never written or has been removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's contents
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Durable slots, one file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store slots under `dir` (created on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store slots in the platform data directory
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(data_dir()?))
    }

    /// Path of the file backing a slot
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SLOT_EXTENSION}"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        // Empty file is treated as non-existent
        Ok(read_text(&self.slot_path(key))?.filter(|content| !content.trim().is_empty()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        write_text(&self.slot_path(key), value)
    }
}

/// In-memory slots
///
/// Clones share the same map, so a handle kept by the caller observes
/// writes made through another. Contents vanish with the process, which
/// makes this the session storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every slot
    pub fn clear(&self) {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// Path-based functions
// =============================================================================

/// Create a directory if it doesn't exist, with proper error handling
fn create_dir_if_needed(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot create directory {:?}", path)
                }
                ErrorKind::NotFound => {
                    format!("Cannot create directory {:?}: parent path does not exist", path)
                }
                _ => {
                    format!("Failed to create directory {:?}: {}", path, e)
                }
            };
            Err(QuoteError::Storage(msg))
        }
    }
}

/// Read file contents, `None` if the file doesn't exist
pub fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => Err(QuoteError::Storage(format!(
                "Permission denied: cannot read {:?}",
                path
            ))),
            _ => Err(QuoteError::Storage(format!("Failed to read {:?}: {}", path, e))),
        },
    }
}

/// Write file contents, creating parent directories if they don't exist
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_if_needed(parent)?;
        }
    }

    match fs::write(path, content) {
        Ok(()) => Ok(()),
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot write to {:?}", path)
                }
                ErrorKind::NotFound => {
                    format!("Cannot write to {:?}: parent directory does not exist", path)
                }
                ErrorKind::ReadOnlyFilesystem => {
                    format!("Cannot write to {:?}: filesystem is read-only", path)
                }
                _ => {
                    format!("Failed to write to {:?}: {}", path, e)
                }
            };
            Err(QuoteError::Storage(msg))
        }
    }
}
