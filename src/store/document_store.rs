//! Document store
//!
//! File-backed JSON tree guarded by one process-wide RwLock.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::StoreError;

use super::{Document, KeyPath, Object};

type StoreResult<T> = std::result::Result<T, StoreError>;

/// The persistent document tree
///
/// ## Concurrency Model: whole-database RwLock
///
/// - **Writes** (set/delete): exclusive lock held across load → mutate → save
/// - **Reads** (get/snapshot): shared lock held across load → traverse
///
/// The lock is the unit of concurrency control, not the key: writers to
/// unrelated keys still serialize against each other. It is never held
/// across network I/O and never acquired twice by the same operation.
pub struct Store {
    /// The single file holding the whole tree
    path: PathBuf,

    /// Guards every access to `path`
    lock: RwLock<()>,
}

impl Store {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first successful write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Public operations (failures logged, reported as false / None)
    // =========================================================================

    /// Store `value` at `path`, creating intermediate objects as needed.
    ///
    /// Returns false if a segment on the way is a non-object, or if the
    /// file could not be read or written. The tree is unchanged on failure.
    pub fn set(&self, path: &KeyPath, value: Document) -> bool {
        match self.try_set(path, value) {
            Ok(()) => true,
            Err(StoreError::Conflict { segment }) => {
                tracing::debug!("set {} rejected: '{}' is not an object", path, segment);
                false
            }
            Err(e) => {
                tracing::warn!("set {} failed: {}", path, e);
                false
            }
        }
    }

    /// Look up the value at `path`.
    ///
    /// A stored `null` is reported as `None`, the same as a missing key.
    pub fn get(&self, path: &KeyPath) -> Option<Document> {
        match self.try_get(path) {
            Ok(Document::Null) => None,
            Ok(value) => Some(value),
            Err(StoreError::NotFound) => None,
            Err(e) => {
                tracing::warn!("get {} failed: {}", path, e);
                None
            }
        }
    }

    /// Remove the value at `path`.
    ///
    /// Returns true only if something was removed and the file rewritten.
    pub fn delete(&self, path: &KeyPath) -> bool {
        match self.try_delete(path) {
            Ok(()) => true,
            Err(StoreError::NotFound) => false,
            Err(e) => {
                tracing::warn!("delete {} failed: {}", path, e);
                false
            }
        }
    }

    // =========================================================================
    // Fallible operations
    // =========================================================================

    pub fn try_set(&self, path: &KeyPath, value: Document) -> StoreResult<()> {
        let _guard = self.lock.write();

        let mut root = self.load()?.unwrap_or_default();
        let (parents, last) = path.split_last();

        let mut current = &mut root;
        for segment in parents {
            let child = current
                .entry(segment.as_str())
                .or_insert_with(|| Document::Object(Object::new()));
            current = match child {
                Document::Object(map) => map,
                _ => {
                    // `root` is dropped unsaved, so any objects created above vanish
                    return Err(StoreError::Conflict {
                        segment: segment.clone(),
                    });
                }
            };
        }
        current.insert(last.to_string(), value);

        self.save(&root)?;
        tracing::debug!("set {}", path);
        Ok(())
    }

    pub fn try_get(&self, path: &KeyPath) -> StoreResult<Document> {
        let _guard = self.lock.read();

        let root = self.load()?.ok_or(StoreError::NotFound)?;
        let mut current = &Document::Object(root);
        for segment in path.segments() {
            current = current
                .as_object()
                .and_then(|map| map.get(segment))
                .ok_or(StoreError::NotFound)?;
        }
        Ok(current.clone())
    }

    pub fn try_delete(&self, path: &KeyPath) -> StoreResult<()> {
        let _guard = self.lock.write();

        let mut root = self.load()?.ok_or(StoreError::NotFound)?;
        let (parents, last) = path.split_last();

        let mut current = &mut root;
        for segment in parents {
            current = match current.get_mut(segment) {
                Some(Document::Object(map)) => map,
                _ => return Err(StoreError::NotFound),
            };
        }
        if current.shift_remove(last).is_none() {
            return Err(StoreError::NotFound);
        }

        self.save(&root)?;
        tracing::debug!("deleted {}", path);
        Ok(())
    }

    /// The whole tree, or an empty object if nothing has been stored yet
    pub fn snapshot(&self) -> StoreResult<Document> {
        let _guard = self.lock.read();
        Ok(Document::Object(self.load()?.unwrap_or_default()))
    }

    // =========================================================================
    // File access (caller holds the lock)
    // =========================================================================

    /// Read and parse the file. `None` if it does not exist or is blank.
    fn load(&self) -> StoreResult<Option<Object>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        match serde_json::from_slice::<Document>(&bytes) {
            Ok(Document::Object(root)) => Ok(Some(root)),
            Ok(other) => Err(StoreError::Corrupt(format!(
                "root is {} rather than an object",
                kind_of(&other)
            ))),
            Err(e) => Err(StoreError::Corrupt(e.to_string())),
        }
    }

    /// Rewrite the whole file: write a sibling temp file, then rename over.
    fn save(&self, root: &Object) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, root).map_err(io::Error::from)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn kind_of(value: &Document) -> &'static str {
    match value {
        Document::Null => "null",
        Document::Bool(_) => "a boolean",
        Document::Number(_) => "a number",
        Document::String(_) => "a string",
        Document::Array(_) => "an array",
        Document::Object(_) => "an object",
    }
}
