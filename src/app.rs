//! Application wiring for the CLI.
//!
//! Every service receives its collaborators through its constructor; this
//! module is the one place that decides which concrete adapters are used.

use crate::ai::{
    ChatService, ImageGenerationService, UnavailableClient, ZhipuChatClient, ZhipuHttpClient,
    ZhipuImageClient,
};
use crate::article::{ArticleService, ArticleSettings};
use crate::config::Config;
use crate::download::{Downloader, HttpDownloader};
use crate::image::ImageService;
use crate::models::{GeneratedImage, PoemArticle, PromptOptimization};
use crate::optimize::{OptimizerSettings, PromptOptimizer};
use crate::storage::{FileStore, LocalFileStore};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Where a generated article should end up.
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleOutput {
    Stdout,
    File(PathBuf),
    Directory(PathBuf),
}

/// Injectable capability bundle used to construct [`App`].
pub struct AppServices {
    pub chat: Arc<dyn ChatService>,
    pub image_gen: Arc<dyn ImageGenerationService>,
    pub downloader: Arc<dyn Downloader>,
    pub files: Arc<dyn FileStore>,
}

pub struct App {
    pub articles: ArticleService,
    pub images: ImageService,
    pub optimizer: PromptOptimizer,
    files: Arc<dyn FileStore>,
}

impl App {
    /// Build an app from concrete capabilities; tests inject mocks here.
    pub fn with_services(services: AppServices, config: &Config) -> Self {
        let articles = ArticleService::new(
            services.chat.clone(),
            services.files.clone(),
            ArticleSettings {
                model: config.chat_model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                top_p: config.top_p,
                web_search: config.article_web_search,
            },
        );

        let images = ImageService::new(
            services.image_gen,
            services.downloader,
            services.files.clone(),
            config.image_output_dir.clone(),
            config.image_params(),
        )
        .with_content_lookup(services.chat.clone(), config.chat_model.clone());

        let optimizer = PromptOptimizer::new(
            services.chat,
            OptimizerSettings {
                model: config.optimize_model.clone(),
                temperature: config.temperature,
                ..OptimizerSettings::default()
            },
        );

        Self {
            articles,
            images,
            optimizer,
            files: services.files,
        }
    }

    /// Build an app talking to the real API and local disk.
    ///
    /// Without an API key the upstream capabilities fail with a configuration
    /// error on use; prompt composition and cleanup still work.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;

        let (chat, image_gen): (Arc<dyn ChatService>, Arc<dyn ImageGenerationService>) =
            match config.require_api_key() {
                Ok(api_key) => {
                    // One connection pool shared by chat, image and download traffic.
                    let http = ZhipuHttpClient::new_with_client(
                        api_key.to_string(),
                        config.api_base_url.clone(),
                        client.clone(),
                    );
                    info!(
                        "Using {} (chat: {}, image: {}, optimize: {})",
                        config.api_base_url, config.chat_model, config.image_model, config.optimize_model
                    );
                    (
                        Arc::new(ZhipuChatClient::new(http.clone())),
                        Arc::new(ZhipuImageClient::new(http)),
                    )
                }
                Err(e) => {
                    warn!("{}; upstream commands will fail", e);
                    let unavailable = UnavailableClient::new("ZHIPU_API_KEY not set");
                    (Arc::new(unavailable.clone()), Arc::new(unavailable))
                }
            };

        let services = AppServices {
            chat,
            image_gen,
            downloader: Arc::new(HttpDownloader::new_with_client(client)),
            files: Arc::new(LocalFileStore::new()),
        };
        Ok(Self::with_services(services, config))
    }

    /// Generate an article and persist it according to `output`.
    pub async fn write_article(
        &self,
        poem_name: &str,
        output: &ArticleOutput,
    ) -> Result<(PoemArticle, Option<PathBuf>)> {
        let article = self.articles.generate_article(poem_name).await?;
        let saved = match output {
            ArticleOutput::Stdout => None,
            ArticleOutput::File(path) => Some(self.articles.save_article(&article, path).await?),
            ArticleOutput::Directory(dir) => {
                let path = ArticleService::default_path(dir, &article);
                Some(self.articles.save_article(&article, &path).await?)
            }
        };
        Ok((article, saved))
    }

    /// Compose the request for a poem and generate its image.
    pub async fn create_poem_image(
        &self,
        poem_name: &str,
        poem_content: &str,
        style: &str,
        save_local: bool,
    ) -> Result<GeneratedImage> {
        let mut request = self
            .images
            .create_image_request(poem_name, poem_content, style)
            .await?;
        request.save_local = save_local;
        self.images.generate_image(&request).await
    }

    /// Persist an optimization as a small human-readable report.
    pub async fn save_optimization(
        &self,
        optimization: &PromptOptimization,
        path: &Path,
    ) -> Result<()> {
        let report = format_optimization(optimization);
        self.files.write(path, report.as_bytes()).await?;
        info!("Saved optimized prompt to {}", path.display());
        Ok(())
    }
}

pub fn format_optimization(optimization: &PromptOptimization) -> String {
    format!(
        "原始提示词:\n{}\n\n优化后提示词:\n{}\n\n绘画风格: {} ({})\n",
        optimization.original_prompt,
        optimization.optimized_prompt,
        optimization.style.display_name(),
        optimization.style
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockChatClient, MockImageGenerationClient};
    use crate::download::MockDownloader;
    use crate::models::Style;
    use crate::storage::MockFileStore;
    use crate::Error;
    use std::collections::HashMap;

    fn test_config() -> Config {
        let vars: HashMap<&str, &str> = [("OUTPUT_DIR", "out"), ("CHAT_MODEL", "chat-test")]
            .into_iter()
            .collect();
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    fn build_test_app(chat: MockChatClient, files: MockFileStore) -> App {
        App::with_services(
            AppServices {
                chat: Arc::new(chat),
                image_gen: Arc::new(MockImageGenerationClient::new()),
                downloader: Arc::new(MockDownloader::new().with_bytes(vec![7, 7, 7])),
                files: Arc::new(files),
            },
            &test_config(),
        )
    }

    #[tokio::test]
    async fn test_write_article_to_directory() {
        let files = MockFileStore::new();
        let chat = MockChatClient::new().with_response("文章正文");
        let probe = chat.clone();
        let app = build_test_app(chat, files.clone());

        let (article, saved) = app
            .write_article("静夜思", &ArticleOutput::Directory(PathBuf::from("out")))
            .await
            .unwrap();

        let saved = saved.unwrap();
        assert_eq!(saved, PathBuf::from("out/静夜思_article.md"));
        assert_eq!(files.read(&saved).await.unwrap(), article.content.as_bytes());
        assert_eq!(probe.requests()[0].model, "chat-test");
    }

    #[tokio::test]
    async fn test_write_article_stdout_saves_nothing() {
        let files = MockFileStore::new();
        let app = build_test_app(MockChatClient::new(), files.clone());

        let (_, saved) = app
            .write_article("静夜思", &ArticleOutput::Stdout)
            .await
            .unwrap();

        assert!(saved.is_none());
        assert!(files.paths().is_empty());
    }

    #[tokio::test]
    async fn test_create_poem_image_saves_under_image_dir() {
        let files = MockFileStore::new();
        let app = build_test_app(MockChatClient::new(), files.clone());

        let image = app
            .create_poem_image("静夜思", "床前明月光", "ink-wash", true)
            .await
            .unwrap();

        let path = image.local_path.unwrap();
        assert!(path.starts_with("out/images"));
        assert_eq!(files.read(&path).await.unwrap(), vec![7, 7, 7]);
        assert_eq!(image.style, Style::InkWash);
    }

    #[tokio::test]
    async fn test_create_poem_image_invalid_style() {
        let app = build_test_app(MockChatClient::new(), MockFileStore::new());
        let err = app
            .create_poem_image("静夜思", "", "glitch", true)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(matches!(err, Error::InvalidStyle(_)));
    }

    #[tokio::test]
    async fn test_save_optimization_report() {
        let files = MockFileStore::new();
        let app = build_test_app(MockChatClient::new().with_response("优化结果"), files.clone());

        let optimization = app.optimizer.optimize_prompt("山水", "ink-wash").await.unwrap();
        app.save_optimization(&optimization, Path::new("out/opt.txt"))
            .await
            .unwrap();

        let report = String::from_utf8(files.read(Path::new("out/opt.txt")).await.unwrap()).unwrap();
        assert!(report.contains("山水"));
        assert!(report.contains("优化结果"));
        assert!(report.contains("水墨画"));
    }

    #[tokio::test]
    async fn test_from_config_without_key_keeps_local_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_lookup(|key| match key {
            "OUTPUT_DIR" => Some(dir.path().to_string_lossy().to_string()),
            _ => None,
        })
        .unwrap();
        let app = App::from_config(&config).unwrap();

        let request = app
            .images
            .create_image_request("静夜思", "床前明月光", "ink-wash")
            .await
            .unwrap();
        assert!(request.derived_prompt.contains("床前明月光"));
        assert_eq!(app.images.cleanup_old_images(30).await, 0);

        let err = app
            .write_article("静夜思", &ArticleOutput::Stdout)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_image_dir_override_reaches_image_service() {
        let config = test_config().with_image_output_dir(Some(PathBuf::from("gallery")));
        let app = App::with_services(
            AppServices {
                chat: Arc::new(MockChatClient::new()),
                image_gen: Arc::new(MockImageGenerationClient::new()),
                downloader: Arc::new(MockDownloader::new()),
                files: Arc::new(MockFileStore::new()),
            },
            &config,
        );
        assert_eq!(app.images.output_dir(), Path::new("gallery"));
    }
}
