use super::FileStore;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct StoredFile {
    data: Vec<u8>,
    modified: DateTime<Utc>,
}

/// In-memory [`FileStore`]. Writes are stamped with `Utc::now()` unless a
/// modification time is set explicitly.
#[derive(Clone, Default)]
pub struct MockFileStore {
    files: Arc<Mutex<BTreeMap<PathBuf, StoredFile>>>,
    undeletable: Arc<Mutex<Vec<PathBuf>>>,
    fail_writes: Arc<Mutex<bool>>,
}

fn not_found(path: &Path) -> crate::Error {
    std::io::Error::new(ErrorKind::NotFound, format!("{} not found", path.display())).into()
}

impl MockFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, data: &[u8], modified: DateTime<Utc>) -> Self {
        self.files.lock().unwrap().insert(
            path.into(),
            StoredFile {
                data: data.to_vec(),
                modified,
            },
        );
        self
    }

    /// Make `delete` fail for this path.
    pub fn with_undeletable(self, path: impl Into<PathBuf>) -> Self {
        self.undeletable.lock().unwrap().push(path.into());
        self
    }

    pub fn with_write_failure(self, should_fail: bool) -> Self {
        *self.fail_writes.lock().unwrap() = should_fail;
        self
    }

    pub fn set_modified(&self, path: &Path, modified: DateTime<Utc>) {
        if let Some(file) = self.files.lock().unwrap().get_mut(path) {
            file.modified = modified;
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(std::io::Error::new(ErrorKind::PermissionDenied, "Mock write failure").into());
        }
        self.files.lock().unwrap().insert(
            path.to_path_buf(),
            StoredFile {
                data: data.to_vec(),
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|file| file.data.clone())
            .ok_or_else(|| not_found(path))
    }

    async fn read_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        let listed: Vec<PathBuf> = files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .cloned()
            .collect();
        if listed.is_empty() && !files.keys().any(|path| path.starts_with(dir)) {
            return Err(not_found(dir));
        }
        Ok(listed)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        if self.undeletable.lock().unwrap().iter().any(|p| p == path) {
            return Err(std::io::Error::new(ErrorKind::PermissionDenied, "Mock delete failure").into());
        }
        self.files
            .lock()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn modified(&self, path: &Path) -> Result<DateTime<Utc>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|file| file.modified)
            .ok_or_else(|| not_found(path))
    }
}
