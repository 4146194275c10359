//! Fetching generated image bytes from the URL the upstream returns.

pub mod http;
pub mod mock;

pub use http::HttpDownloader;
pub use mock::MockDownloader;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch the bytes behind `url`. Failures are reported as `Error::Download`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
