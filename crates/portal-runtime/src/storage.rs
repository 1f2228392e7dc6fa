#![forbid(unsafe_code)]

//! Local key-value persistence.
//!
//! The portal keeps two small strings across restarts: the in-progress form
//! snapshot and the chosen locale. Both go through the [`KeyValueStore`]
//! trait so the form logic never touches a concrete backend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  PersistenceBridge / LocaleSelector           │
//! └──────────────────────────────────────────────┘
//!                       │ get / set / remove
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │                KeyValueStore                  │
//! │  - MemoryStore: in-memory (tests, ephemeral)  │
//! │  - FileStore: JSON file, atomic write-rename  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returned, caller logs and continues |
//! | `StorageError::Corruption` | Unparseable store file | Reads fail; the next write starts a fresh file |
//! | Missing key | First run | `Ok(None)` |

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Encoding the store content failed.
    Serialization(String),
    /// Stored content is not in the expected format.
    Corruption(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_) | StorageError::Corruption(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Store Trait
// ─────────────────────────────────────────────────────────────────────────────

/// String key-value scratch space that survives restarts.
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map(|g| g.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store
// ─────────────────────────────────────────────────────────────────────────────

/// On-disk layout of a [`FileStore`].
#[derive(Serialize, Deserialize)]
struct StoreFile {
    format_version: u32,
    entries: BTreeMap<String, String>,
}

impl StoreFile {
    const FORMAT_VERSION: u32 = 1;

    fn new(entries: BTreeMap<String, String>) -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            entries,
        }
    }
}

/// JSON-file store.
///
/// # File Format
///
/// ```json
/// {
///   "format_version": 1,
///   "entries": {
///     "formData": "{\"fio\":\"A B\"}",
///     "lang": "uz"
///   }
/// }
/// ```
///
/// Every write rewrites the whole file through `{path}.tmp` followed by a
/// rename, so a crash mid-write leaves the previous content intact.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let file: StoreFile = serde_json::from_reader(reader)
            .map_err(|e| StorageError::Corruption(format!("failed to parse store file: {e}")))?;
        if file.format_version != StoreFile::FORMAT_VERSION {
            return Err(StorageError::Corruption(format!(
                "unsupported store format version {}",
                file.format_version
            )));
        }
        Ok(file.entries)
    }

    /// Load for a read-modify-write cycle; a corrupt file is replaced.
    fn load_for_update(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.load() {
            Err(StorageError::Corruption(reason)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "discarding unreadable store file"
                );
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let count = entries.len();
        let tmp_path = self.temp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut writer, &StoreFile::new(entries))
                .map_err(|e| StorageError::Serialization(format!("failed to encode store: {e}")))?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::trace!(path = %self.path.display(), entries = count, "store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "FileStore"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        let mut entries = self.load_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(entries)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        let mut entries = self.load_for_update()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(entries)
    }
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
