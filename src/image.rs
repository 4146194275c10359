//! Poem image generation, download and retention.

use crate::ai::{ChatService, CompletionRequest, ImageGenerationService};
use crate::article::safe_file_stem;
use crate::download::Downloader;
use crate::models::{GeneratedImage, ImageGenerationRequest, ImageParams, Style};
use crate::storage::FileStore;
use crate::{prompts, Error, Result};
use chrono::{DateTime, Duration, Local, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "png";

/// Chat access used to look up poem text when a request arrives without it.
struct ContentLookup {
    chat: Arc<dyn ChatService>,
    model: String,
}

pub struct ImageService {
    images: Arc<dyn ImageGenerationService>,
    downloader: Arc<dyn Downloader>,
    files: Arc<dyn FileStore>,
    output_dir: PathBuf,
    params: ImageParams,
    lookup: Option<ContentLookup>,
}

impl ImageService {
    pub fn new(
        images: Arc<dyn ImageGenerationService>,
        downloader: Arc<dyn Downloader>,
        files: Arc<dyn FileStore>,
        output_dir: PathBuf,
        params: ImageParams,
    ) -> Self {
        Self {
            images,
            downloader,
            files,
            output_dir,
            params,
            lookup: None,
        }
    }

    /// Fill in blank poem content through the chat API before composing.
    pub fn with_content_lookup(mut self, chat: Arc<dyn ChatService>, model: String) -> Self {
        self.lookup = Some(ContentLookup { chat, model });
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn create_image_request(
        &self,
        poem_name: &str,
        poem_content: &str,
        style_tag: &str,
    ) -> Result<ImageGenerationRequest> {
        let style: Style = style_tag.parse()?;
        let poem_name = poem_name.trim();

        let poem_content = if poem_content.trim().is_empty() {
            self.lookup_content(poem_name).await.unwrap_or_default()
        } else {
            poem_content.trim().to_string()
        };

        let derived_prompt = prompts::image_prompt_for(poem_name, &poem_content, style);
        debug!("Derived image prompt for 《{}》: {}", poem_name, derived_prompt);

        Ok(ImageGenerationRequest {
            poem_name: poem_name.to_string(),
            poem_content,
            style,
            derived_prompt,
            save_local: true,
        })
    }

    async fn lookup_content(&self, poem_name: &str) -> Option<String> {
        let lookup = self.lookup.as_ref()?;
        let request = CompletionRequest::new(lookup.model.clone(), prompts::poem_lookup(poem_name), 0.1);

        match lookup.chat.complete_text(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                info!("Looked up text for 《{}》", poem_name);
                Some(text.trim().to_string())
            }
            Ok(_) => {
                warn!("Empty text lookup for 《{}》, composing from the name", poem_name);
                None
            }
            Err(e) => {
                warn!(
                    "Text lookup for 《{}》 failed ({}), composing from the name",
                    poem_name, e
                );
                None
            }
        }
    }

    pub async fn generate_image(&self, request: &ImageGenerationRequest) -> Result<GeneratedImage> {
        info!(
            "Generating {} image for 《{}》",
            request.style, request.poem_name
        );

        let source_url = self
            .images
            .generate_image(&request.derived_prompt, &self.params)
            .await
            .map_err(|e| {
                error!("Image generation failed for 《{}》: {}", request.poem_name, e);
                e
            })?;
        info!("Image generated for 《{}》", request.poem_name);

        let local_path = if request.save_local {
            Some(self.download(&source_url, &request.poem_name).await?)
        } else {
            None
        };

        Ok(GeneratedImage {
            source_url,
            local_path,
            poem_name: request.poem_name.clone(),
            prompt: request.derived_prompt.clone(),
            style: request.style,
            model: self.params.model.clone(),
            created_at: Local::now(),
        })
    }

    async fn download(&self, url: &str, poem_name: &str) -> Result<PathBuf> {
        let bytes = self.downloader.fetch(url).await?;
        let path = self
            .output_dir
            .join(image_file_name(poem_name, Local::now(), image_extension(&bytes)));

        self.files.write(&path, &bytes).await.map_err(|e| {
            error!("Failed to write image to {}: {}", path.display(), e);
            Error::Download(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!("Saved image ({} bytes) to {}", bytes.len(), path.display());
        Ok(path)
    }

    pub async fn cleanup_old_images(&self, days: u32) -> usize {
        self.cleanup_old_images_at(days, Utc::now()).await
    }

    /// Delete image files in the output directory last modified strictly
    /// before `now - days`. Other files are left alone. Per-file failures are
    /// logged and skipped.
    pub async fn cleanup_old_images_at(&self, days: u32, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(i64::from(days));

        let files = match self.files.read_dir(&self.output_dir).await {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    "Cannot list {} for cleanup: {}",
                    self.output_dir.display(),
                    e
                );
                return 0;
            }
        };

        let mut deleted = 0;
        for path in files.into_iter().filter(|path| is_image_file(path)) {
            let modified = match self.files.modified(&path).await {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            if modified >= cutoff {
                continue;
            }

            match self.files.delete(&path).await {
                Ok(()) => {
                    debug!("Deleted old image {}", path.display());
                    deleted += 1;
                }
                Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
            }
        }

        info!(
            "Cleanup removed {} file(s) older than {} day(s)",
            deleted, days
        );
        deleted
    }
}

fn image_extension(bytes: &[u8]) -> &'static str {
    ::image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Whether the extension is one `image_extension` could have produced.
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ::image::ImageFormat::from_extension(ext))
        .is_some()
}

/// `{poem}_{timestamp}_{short uuid}.{ext}`, unique per call.
fn image_file_name(poem_name: &str, at: DateTime<Local>, extension: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}.{}",
        safe_file_stem(poem_name),
        at.format("%Y%m%d_%H%M%S"),
        &id[..8],
        extension
    )
}
