//! Prompt templates and composition.
//!
//! Every prompt sent upstream is assembled here from the templates under
//! `data/prompts/`, so the services only decide *which* prompt to send.

use crate::models::Style;
use crate::Result;

pub const ARTICLE_SYSTEM: &str = include_str!("../data/prompts/article_system.txt");
pub const ARTICLE_USER: &str = include_str!("../data/prompts/article_user.txt");
pub const POEM_LOOKUP: &str = include_str!("../data/prompts/poem_lookup.txt");
pub const IMAGE_WITH_CONTENT: &str = include_str!("../data/prompts/image_with_content.txt");
pub const IMAGE_NAME_ONLY: &str = include_str!("../data/prompts/image_name_only.txt");
pub const OPTIMIZE_SYSTEM: &str = include_str!("../data/prompts/optimize_system.txt");
pub const OPTIMIZE_USER: &str = include_str!("../data/prompts/optimize_user.txt");
pub const POEM_BASE_PROMPT: &str = include_str!("../data/prompts/poem_base_prompt.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

pub fn article_system() -> String {
    ARTICLE_SYSTEM.trim().to_string()
}

pub fn article_user(poem_name: &str) -> String {
    render(ARTICLE_USER, &[("poem_name", poem_name)]).trim().to_string()
}

/// Query handed to the upstream `web_search` tool for article generation.
pub fn article_search_query(poem_name: &str) -> String {
    format!("{} 古诗词 背景 解析 文化", poem_name)
}

pub fn poem_lookup(poem_name: &str) -> String {
    render(POEM_LOOKUP, &[("poem_name", poem_name)]).trim().to_string()
}

/// Compose the image prompt for a poem from a raw style tag.
pub fn image_prompt(poem_name: &str, poem_content: &str, style_tag: &str) -> Result<String> {
    let style = style_tag.parse::<Style>()?;
    Ok(image_prompt_for(poem_name, poem_content, style))
}

/// Compose the image prompt for an already validated style. Blank content
/// selects the name-only template.
pub fn image_prompt_for(poem_name: &str, poem_content: &str, style: Style) -> String {
    let poem_content = poem_content.trim();
    let template = if poem_content.is_empty() {
        IMAGE_NAME_ONLY
    } else {
        IMAGE_WITH_CONTENT
    };

    // Content goes last so text inside the poem is never treated as a placeholder.
    render(
        template,
        &[
            ("style", style.display_name()),
            ("style_description", style.description()),
            ("poem_name", poem_name.trim()),
            ("poem_content", poem_content),
        ],
    )
    .trim()
    .to_string()
}

pub fn optimize_system(style: Style) -> String {
    render(OPTIMIZE_SYSTEM, &[("style", style.display_name())])
        .trim()
        .to_string()
}

pub fn optimize_user(prompt: &str, style: Style) -> String {
    render(
        OPTIMIZE_USER,
        &[
            ("style", style.display_name()),
            ("style_description", style.description()),
            ("prompt", prompt.trim()),
        ],
    )
    .trim()
    .to_string()
}

pub fn poem_base_prompt(poem_name: &str, poem_content: &str) -> String {
    render(
        POEM_BASE_PROMPT,
        &[
            ("poem_name", poem_name.trim()),
            ("poem_content", poem_content.trim()),
        ],
    )
    .trim()
    .to_string()
}
