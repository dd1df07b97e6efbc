//! File-backed preference store.
//!
//! Keeps every preference in memory and rewrites a single JSON object on each
//! change. Writes go to a sibling `.tmp` file that is then renamed over the
//! real one, so a crash mid-write never leaves a truncated store behind.
//!
//! ```json
//! {"GameState":"{...}","HighScore":980,"SelectedCategoryType":0,"SelectedGridType":16}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use concentration_core::{MemoryStore, PreferenceStore, StoredValue};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: MemoryStore,
}

impl FileStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => parse(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), keys = data.entries().len(), "store opened");
        Ok(Self { path, data })
    }

    /// Like [`FileStore::open`], but an unreadable file starts an empty store.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "store unreadable, starting empty");
                Self {
                    path,
                    data: MemoryStore::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current contents to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self.data.entries())?;
        write_atomic(&self.path, &json)
    }

    // PreferenceStore cannot fail; keep the in-memory value and log.
    fn persist(&self) {
        if let Err(err) = self.flush() {
            warn!(error = %err, "failed to write store, keeping value in memory");
        }
    }
}

impl PreferenceStore for FileStore {
    fn has_key(&self, key: &str) -> bool {
        self.data.has_key(key)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.data.get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.data.set_int(key, value);
        self.persist();
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.data.get_string(key)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.data.set_string(key, value);
        self.persist();
    }

    fn delete_key(&mut self, key: &str) {
        if self.data.has_key(key) {
            self.data.delete_key(key);
            self.persist();
        }
    }
}

fn parse(raw: &str) -> Result<MemoryStore, StoreError> {
    if raw.trim().is_empty() {
        return Ok(MemoryStore::new());
    }
    let entries: BTreeMap<String, StoredValue> = serde_json::from_str(raw)?;
    Ok(MemoryStore::from_entries(entries))
}

fn write_atomic(path: &Path, data: &str) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)
}
