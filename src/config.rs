//! Environment configuration
//!
//! Reads API credentials, model names, generation parameters and output
//! locations from the process environment (optionally seeded from `.env`).

use crate::models::{ImageParams, SUPPORTED_IMAGE_QUALITIES, SUPPORTED_IMAGE_SIZES};
use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub chat_model: String,
    pub image_model: String,
    pub optimize_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub image_size: String,
    pub image_quality: String,
    pub output_dir: PathBuf,
    pub image_output_dir: PathBuf,
    pub article_web_search: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let output_dir = PathBuf::from(string_or("OUTPUT_DIR", "output"));
        let image_output_dir = get("IMAGE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| output_dir.join("images"));

        let image_size = string_or("IMAGE_SIZE", SUPPORTED_IMAGE_SIZES[0]);
        if !SUPPORTED_IMAGE_SIZES.contains(&image_size.as_str()) {
            return Err(Error::Config(format!(
                "IMAGE_SIZE '{}' is not one of {}",
                image_size,
                SUPPORTED_IMAGE_SIZES.join(", ")
            )));
        }

        let image_quality = string_or("IMAGE_QUALITY", SUPPORTED_IMAGE_QUALITIES[0]);
        if !SUPPORTED_IMAGE_QUALITIES.contains(&image_quality.as_str()) {
            return Err(Error::Config(format!(
                "IMAGE_QUALITY '{}' is not one of {}",
                image_quality,
                SUPPORTED_IMAGE_QUALITIES.join(", ")
            )));
        }

        Ok(Self {
            api_key: get("ZHIPU_API_KEY"),
            api_base_url: string_or("API_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_timeout: Duration::from_secs(parse_or(get("API_TIMEOUT"), "API_TIMEOUT", 300)?),
            chat_model: string_or("CHAT_MODEL", "glm-4-plus"),
            image_model: string_or("IMAGE_MODEL", "cogView-4-250304"),
            optimize_model: string_or("PROMPT_OPTIMIZATION_MODEL", "GLM-4.5-Flash"),
            temperature: parse_or(get("TEMPERATURE"), "TEMPERATURE", 0.7)?,
            max_tokens: parse_or(get("MAX_TOKENS"), "MAX_TOKENS", 4000)?,
            top_p: parse_or(get("TOP_P"), "TOP_P", 0.9)?,
            image_size,
            image_quality,
            output_dir,
            image_output_dir,
            article_web_search: parse_bool_or(get("ARTICLE_WEB_SEARCH"), "ARTICLE_WEB_SEARCH", true)?,
        })
    }

    /// The API key, or a config error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Config("ZHIPU_API_KEY not set".to_string()))
    }

    /// Replace the image directory, e.g. from a `--output-dir` flag.
    pub fn with_image_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.image_output_dir = dir;
        }
        self
    }

    pub fn image_params(&self) -> ImageParams {
        ImageParams {
            model: self.image_model.clone(),
            size: self.image_size.clone(),
            quality: self.image_quality.clone(),
        }
    }

    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            Some(key) if key.chars().count() > 8 => {
                let head: String = key.chars().take(4).collect();
                format!("{}****", head)
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn check_dotenv<T>(loaded: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, raw))),
        None => Ok(default),
    }
}

fn parse_bool_or(value: Option<String>, key: &str, default: bool) -> Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(Error::Config(format!("{} has invalid value '{}'", key, v))),
    }
}
