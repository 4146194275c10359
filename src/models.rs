//! Data models and structures
//!
//! Defines the poem articles, image requests and prompt optimization results
//! exchanged between the services, plus the supported painting styles.

use crate::{Error, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Painting style understood by the prompt templates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    InkWash,
    FineBrush,
    OilPainting,
    Watercolor,
    Sketch,
    Printmaking,
    Impressionist,
    Realism,
    Abstract,
    Modern,
}

impl Style {
    pub const ALL: [Style; 10] = [
        Style::InkWash,
        Style::FineBrush,
        Style::OilPainting,
        Style::Watercolor,
        Style::Sketch,
        Style::Printmaking,
        Style::Impressionist,
        Style::Realism,
        Style::Abstract,
        Style::Modern,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Style::InkWash => "ink-wash",
            Style::FineBrush => "fine-brush",
            Style::OilPainting => "oil-painting",
            Style::Watercolor => "watercolor",
            Style::Sketch => "sketch",
            Style::Printmaking => "printmaking",
            Style::Impressionist => "impressionist",
            Style::Realism => "realism",
            Style::Abstract => "abstract",
            Style::Modern => "modern",
        }
    }

    /// Chinese name used inside the prompt text.
    pub fn display_name(self) -> &'static str {
        match self {
            Style::InkWash => "水墨画",
            Style::FineBrush => "工笔画",
            Style::OilPainting => "油画",
            Style::Watercolor => "水彩画",
            Style::Sketch => "素描",
            Style::Printmaking => "版画",
            Style::Impressionist => "印象派",
            Style::Realism => "写实主义",
            Style::Abstract => "抽象画",
            Style::Modern => "现代艺术",
        }
    }

    /// Rendering guidance appended to prompts for this style.
    pub fn description(self) -> &'static str {
        match self {
            Style::InkWash => "中国水墨画风格，黑白灰层次丰富，注重意境和留白",
            Style::FineBrush => "工笔重彩，线条细腻工整，设色典雅，细节精致",
            Style::OilPainting => "西方油画风格，色彩浓郁，笔触明显，光影厚重",
            Style::Watercolor => "水彩晕染，色彩透明轻盈，边缘柔和湿润",
            Style::Sketch => "铅笔素描风格，线条清晰，明暗对比强烈",
            Style::Printmaking => "木刻版画风格，刀痕分明，黑白块面对比鲜明",
            Style::Impressionist => "印象派风格，捕捉光色变化，笔触松动跳跃",
            Style::Realism => "写实主义风格，细节丰富，真实感强",
            Style::Abstract => "抽象表现，以色块与线条传达情绪",
            Style::Modern => "现代艺术风格，构图大胆，色彩鲜明",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        Style::ALL
            .into_iter()
            .find(|style| style.slug().eq_ignore_ascii_case(tag) || style.display_name() == tag)
            .ok_or_else(|| Error::InvalidStyle(tag.to_string()))
    }
}

/// Article generated for a single poem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemArticle {
    pub poem_name: String,
    pub content: String,
    pub generated_at: DateTime<Local>,
}

impl PoemArticle {
    pub fn new(poem_name: String, content: String) -> Self {
        Self {
            poem_name,
            content,
            generated_at: Local::now(),
        }
    }
}

/// Image request composed from a poem; consumed once by the image service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub poem_name: String,
    pub poem_content: String,
    pub style: Style,
    pub derived_prompt: String,
    pub save_local: bool,
}

/// Result of one image generation. `local_path` is only set once the
/// download has been written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub source_url: String,
    pub local_path: Option<PathBuf>,
    pub poem_name: String,
    pub prompt: String,
    pub style: Style,
    pub model: String,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptOptimization {
    pub original_prompt: String,
    pub style: Style,
    pub optimized_prompt: String,
}

/// Per-entry outcome of a batch optimization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchOutcome {
    Optimized(PromptOptimization),
    Failed { error: String },
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, BatchOutcome::Optimized(_))
    }

    pub fn optimized_prompt(&self) -> Option<&str> {
        match self {
            BatchOutcome::Optimized(optimization) => Some(&optimization.optimized_prompt),
            BatchOutcome::Failed { .. } => None,
        }
    }
}

/// Well-known poems offered as starting points by the `poems` command.
pub const POPULAR_POEMS: [&str; 12] = [
    "静夜思",
    "春晓",
    "登鹳雀楼",
    "相思",
    "江雪",
    "望庐山瀑布",
    "黄鹤楼送孟浩然之广陵",
    "枫桥夜泊",
    "清明",
    "水调歌头·明月几时有",
    "念奴娇·赤壁怀古",
    "将进酒",
];

pub const SUPPORTED_IMAGE_SIZES: [&str; 3] = ["1024x1024", "1024x1792", "1792x1024"];
pub const SUPPORTED_IMAGE_QUALITIES: [&str; 2] = ["standard", "hd"];

/// Parameters forwarded to the image-generation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub model: String,
    pub size: String,
    pub quality: String,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            model: "cogView-4-250304".to_string(),
            size: SUPPORTED_IMAGE_SIZES[0].to_string(),
            quality: SUPPORTED_IMAGE_QUALITIES[0].to_string(),
        }
    }
}
