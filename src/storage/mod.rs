//! Filesystem access for generated articles and images
//!
//! Services persist through the [`FileStore`] trait so tests can swap the
//! local disk for an in-memory store with controllable modification times.

pub mod local;
pub mod mock;

pub use local::LocalFileStore;
pub use mock::MockFileStore;

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `data` to `path`, creating parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;
    /// Regular files directly inside `dir`.
    async fn read_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;
    async fn delete(&self, path: &Path) -> Result<()>;
    async fn modified(&self, path: &Path) -> Result<DateTime<Utc>>;
}
