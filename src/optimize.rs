//! Painting prompt optimization through the chat API.

use crate::ai::{ChatService, CompletionRequest};
use crate::models::{BatchOutcome, PromptOptimization, Style};
use crate::{prompts, Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct OptimizerSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            model: "GLM-4.5-Flash".to_string(),
            temperature: 0.6,
            max_tokens: 2000,
        }
    }
}

pub struct PromptOptimizer {
    chat: Arc<dyn ChatService>,
    settings: OptimizerSettings,
}

impl PromptOptimizer {
    pub fn new(chat: Arc<dyn ChatService>, settings: OptimizerSettings) -> Self {
        Self { chat, settings }
    }

    pub async fn optimize_prompt(&self, prompt: &str, style_tag: &str) -> Result<PromptOptimization> {
        let style: Style = style_tag.parse()?;
        self.optimize_with_style(prompt, style).await
    }

    async fn optimize_with_style(&self, prompt: &str, style: Style) -> Result<PromptOptimization> {
        let original = prompt.trim();
        if original.is_empty() {
            return Err(Error::Generic("Prompt must not be empty".to_string()));
        }

        info!(
            "Optimizing prompt ({} chars) for style {}",
            original.chars().count(),
            style
        );

        let request = CompletionRequest::new(
            self.settings.model.clone(),
            prompts::optimize_user(original, style),
            self.settings.temperature,
        )
        .with_system(prompts::optimize_system(style))
        .with_max_tokens(self.settings.max_tokens);

        let optimized = self.chat.complete_text(&request).await?;
        let optimized = optimized.trim();
        if optimized.is_empty() {
            return Err(Error::upstream("Empty optimized prompt"));
        }

        Ok(PromptOptimization {
            original_prompt: original.to_string(),
            style,
            optimized_prompt: optimized.to_string(),
        })
    }

    /// Build the base prompt from a poem and optimize it.
    pub async fn optimize_poem_prompt(
        &self,
        poem_name: &str,
        poem_content: &str,
        style_tag: &str,
    ) -> Result<PromptOptimization> {
        let style: Style = style_tag.parse()?;
        let base = prompts::poem_base_prompt(poem_name, poem_content);
        self.optimize_with_style(&base, style).await
    }

    /// Optimize each prompt independently. The result has one entry per
    /// input, in input order; failures become `BatchOutcome::Failed`.
    pub async fn batch_optimize(
        &self,
        inputs: &[String],
        style_tag: &str,
    ) -> Result<Vec<(String, BatchOutcome)>> {
        let style: Style = style_tag.parse()?;

        let mut results = Vec::with_capacity(inputs.len());
        for prompt in inputs {
            let outcome = to_outcome(self.optimize_with_style(prompt, style).await);
            results.push((prompt.clone(), outcome));
        }

        let failed = results.iter().filter(|(_, outcome)| !outcome.is_ok()).count();
        info!(
            "Batch optimization finished: {} ok, {} failed",
            results.len() - failed,
            failed
        );
        Ok(results)
    }

    /// Optimize one poem's content across several styles.
    pub async fn style_variants(
        &self,
        poem_content: &str,
        styles: &[Style],
    ) -> Vec<(Style, BatchOutcome)> {
        let base = format!("根据诗词内容创作：{}", poem_content.trim());
        let mut results = Vec::with_capacity(styles.len());
        for &style in styles {
            let outcome = to_outcome(self.optimize_with_style(&base, style).await);
            results.push((style, outcome));
        }
        results
    }
}

fn to_outcome(result: Result<PromptOptimization>) -> BatchOutcome {
    match result {
        Ok(optimization) => BatchOutcome::Optimized(optimization),
        Err(e) => {
            warn!("Prompt optimization failed: {}", e);
            BatchOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
