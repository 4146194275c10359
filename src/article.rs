//! Article generation for a single poem.

use crate::ai::{ChatService, CompletionRequest};
use crate::models::PoemArticle;
use crate::storage::FileStore;
use crate::{prompts, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Sampling parameters for article requests.
#[derive(Debug, Clone)]
pub struct ArticleSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub web_search: bool,
}

impl Default for ArticleSettings {
    fn default() -> Self {
        Self {
            model: "glm-4-plus".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            top_p: 0.9,
            web_search: true,
        }
    }
}

pub struct ArticleService {
    chat: Arc<dyn ChatService>,
    files: Arc<dyn FileStore>,
    settings: ArticleSettings,
}

impl ArticleService {
    pub fn new(
        chat: Arc<dyn ChatService>,
        files: Arc<dyn FileStore>,
        settings: ArticleSettings,
    ) -> Self {
        Self {
            chat,
            files,
            settings,
        }
    }

    fn build_request(&self, poem_name: &str) -> CompletionRequest {
        let request = CompletionRequest::new(
            self.settings.model.clone(),
            prompts::article_user(poem_name),
            self.settings.temperature,
        )
        .with_system(prompts::article_system())
        .with_max_tokens(self.settings.max_tokens)
        .with_top_p(self.settings.top_p);

        if self.settings.web_search {
            request.with_web_search(prompts::article_search_query(poem_name))
        } else {
            request
        }
    }

    pub async fn generate_article(&self, poem_name: &str) -> Result<PoemArticle> {
        let poem_name = poem_name.trim();
        if poem_name.is_empty() {
            return Err(Error::Generic("Poem name must not be empty".to_string()));
        }

        info!("Generating article for 《{}》", poem_name);

        let content = self
            .chat
            .complete_text(&self.build_request(poem_name))
            .await
            .map_err(|e| {
                error!("Article generation failed for 《{}》: {}", poem_name, e);
                e
            })?;

        let content = content.trim();
        if content.is_empty() {
            return Err(Error::upstream("Empty article content"));
        }

        info!(
            "Generated article for 《{}》 ({} chars)",
            poem_name,
            content.chars().count()
        );
        Ok(PoemArticle::new(poem_name.to_string(), content.to_string()))
    }

    /// Write the article body to `path`, creating parent directories.
    pub async fn save_article(&self, article: &PoemArticle, path: &Path) -> Result<PathBuf> {
        self.files
            .write(path, article.content.as_bytes())
            .await
            .map_err(|e| {
                error!("Failed to save article to {}: {}", path.display(), e);
                e
            })?;
        info!("Saved article 《{}》 to {}", article.poem_name, path.display());
        Ok(path.to_path_buf())
    }

    /// File named after the poem inside `dir`.
    pub fn default_path(dir: &Path, article: &PoemArticle) -> PathBuf {
        dir.join(format!("{}_article.md", safe_file_stem(&article.poem_name)))
    }
}

/// Reduce a poem name to characters safe for file names.
pub(crate) fn safe_file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    if stem.is_empty() {
        "poem".to_string()
    } else {
        stem
    }
}
