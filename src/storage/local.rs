use super::FileStore;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

/// [`FileStore`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path).await?)
    }

    async fn read_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await?;
        Ok(())
    }

    async fn modified(&self, path: &Path) -> Result<DateTime<Utc>> {
        let modified = fs::metadata(path).await?.modified()?;
        Ok(DateTime::<Utc>::from(modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");

        LocalFileStore::new().write(&path, b"hello").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_read_dir_lists_only_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"1").unwrap();
        std::fs::write(dir.path().join("a.png"), b"2").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = LocalFileStore::new().read_dir(dir.path()).await.unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("a.png"), dir.path().join("b.png")]
        );
    }

    #[tokio::test]
    async fn test_delete_and_missing_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.png");
        let store = LocalFileStore::new();
        store.write(&path, b"x").await.unwrap();

        let modified = store.modified(&path).await.unwrap();
        assert!(modified <= Utc::now());

        store.delete(&path).await.unwrap();
        assert!(!path.exists());
        assert!(store.delete(&path).await.is_err());
        assert!(store.read_dir(&dir.path().join("missing")).await.is_err());
    }

    #[test]
    fn test_round_trip_blocking() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("poem.md");
        let store = LocalFileStore::new();

        let content = tokio_test::block_on(async {
            store.write(&path, "静夜思".as_bytes()).await.unwrap();
            store.read(&path).await.unwrap()
        });

        assert_eq!(String::from_utf8(content).unwrap(), "静夜思");
    }
}
