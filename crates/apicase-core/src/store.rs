//! Test case persistence
//!
//! The pipeline never touches storage directly; callers hand it a snapshot
//! loaded through a [`CaseStore`] and write results back after a run.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::model::TestCase;
use crate::schema::StoreDocument;

/// Callback invoked with the new collection after an external change.
pub type ChangeListener = Box<dyn FnMut(&[TestCase])>;

/// Load/save access to the test case collection.
pub trait CaseStore {
    /// Read the full collection. A store that was never written is empty.
    ///
    /// # Errors
    ///
    /// Returns error if the backing data cannot be read or parsed.
    fn load(&self) -> Result<Vec<TestCase>, StoreError>;

    /// Replace the full collection.
    ///
    /// # Errors
    ///
    /// Returns error if the backing data cannot be written.
    fn save(&mut self, cases: &[TestCase]) -> Result<(), StoreError>;

    /// Register a listener for changes made by someone else.
    fn on_external_change(&mut self, listener: ChangeListener);
}

/// JSON document on disk: `{"testCases": [...]}`.
///
/// External writers are detected by modification time in
/// [`JsonFileStore::poll_external_change`].
pub struct JsonFileStore {
    path: PathBuf,
    last_seen: Option<SystemTime>,
    listeners: Vec<ChangeListener>,
}

impl JsonFileStore {
    /// Open a store at `path`. The file need not exist yet.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_seen = modified(&path);
        Self {
            path,
            last_seen,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether another writer changed the file since we last saw it.
    ///
    /// On change, reloads and notifies every listener. Returns whether a
    /// change was seen.
    ///
    /// # Errors
    ///
    /// Returns error if the changed file cannot be read.
    pub fn poll_external_change(&mut self) -> Result<bool, StoreError> {
        let current = modified(&self.path);
        if current == self.last_seen {
            return Ok(false);
        }
        self.last_seen = current;
        let cases = self.load()?;
        for listener in &mut self.listeners {
            listener(&cases);
        }
        Ok(true)
    }
}

impl CaseStore for JsonFileStore {
    fn load(&self) -> Result<Vec<TestCase>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(self.path.clone(), e.to_string())),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: StoreDocument =
            serde_json::from_str(&content).map_err(|e| StoreError::Parse(e.to_string()))?;
        Ok(doc.test_cases)
    }

    fn save(&mut self, cases: &[TestCase]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(parent.to_path_buf(), e.to_string()))?;
        }
        let doc = StoreDocument {
            test_cases: cases.to_vec(),
        };
        let json =
            serde_json::to_string_pretty(&doc).map_err(|e| StoreError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| StoreError::Io(self.path.clone(), e.to_string()))?;
        self.last_seen = modified(&self.path);
        Ok(())
    }

    fn on_external_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}

/// In-memory store, mainly for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    cases: Vec<TestCase>,
    listeners: Vec<ChangeListener>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self {
            cases,
            listeners: Vec::new(),
        }
    }

    /// Simulate another writer replacing the collection.
    pub fn replace_externally(&mut self, cases: Vec<TestCase>) {
        self.cases = cases;
        for listener in &mut self.listeners {
            listener(&self.cases);
        }
    }
}

impl CaseStore for MemoryStore {
    fn load(&self) -> Result<Vec<TestCase>, StoreError> {
        Ok(self.cases.clone())
    }

    fn save(&mut self, cases: &[TestCase]) -> Result<(), StoreError> {
        self.cases = cases.to_vec();
        Ok(())
    }

    fn on_external_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot access {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
}
