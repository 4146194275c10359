use super::Downloader;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockDownloader {
    bytes: Arc<Mutex<Vec<u8>>>,
    should_fail: Arc<Mutex<bool>>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(self, bytes: Vec<u8>) -> Self {
        *self.bytes.lock().unwrap() = bytes;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.urls.lock().unwrap().push(url.to_string());
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Download(format!("Mock download failure: {}", url)));
        }
        Ok(self.bytes.lock().unwrap().clone())
    }
}
