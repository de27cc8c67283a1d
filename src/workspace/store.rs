//! Persistence for committed document text.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::Result;

/// One file to overwrite as part of a commit.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub path: PathBuf,
    /// Text currently on record, used to roll back.
    pub previous: Arc<str>,
    pub text: Arc<str>,
}

/// Where committed text lands. `write_all` must be all-or-nothing.
pub trait DocumentStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<String>;

    fn write_all(&self, writes: &[PendingWrite]) -> Result<()>;
}

/// Writes through sibling temp files, renamed into place only once every file
/// has been staged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemStore;

impl DocumentStore for FileSystemStore {
    fn read(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_all(&self, writes: &[PendingWrite]) -> Result<()> {
        let mut staged = Vec::with_capacity(writes.len());
        for write in writes {
            let dir = write
                .path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut tmp = NamedTempFile::new_in(dir)?;
            tmp.write_all(write.text.as_bytes())?;
            // temp files start at 0600; carry over the original mode
            match fs::metadata(&write.path) {
                Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
            tmp.as_file().sync_all()?;
            staged.push((tmp, write));
        }

        let mut persisted: Vec<&PendingWrite> = Vec::with_capacity(staged.len());
        for (tmp, write) in staged {
            if let Err(err) = tmp.persist(&write.path) {
                warn!(path = %write.path.display(), "rename failed, rolling back {} file(s)", persisted.len());
                for done in persisted {
                    if let Err(restore) = fs::write(&done.path, done.previous.as_bytes()) {
                        warn!(path = %done.path.display(), "rollback failed: {restore}");
                    }
                }
                return Err(err.error.into());
            }
            debug!(path = %write.path.display(), "persisted");
            persisted.push(write);
        }
        Ok(())
    }
}

/// In-memory store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.lock().insert(path.into(), text.into());
    }

    /// Make every subsequent `write_all` fail without touching anything.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        self.files.lock().clone()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<String> {
        self.files.lock().get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, path.display().to_string()).into()
        })
    }

    fn write_all(&self, writes: &[PendingWrite]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("memory store configured to fail").into());
        }
        let mut files = self.files.lock();
        for write in writes {
            files.insert(write.path.clone(), write.text.to_string());
        }
        Ok(())
    }
}
