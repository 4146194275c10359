//! Poem article and painting generator
//!
//! Given a classical poem's name, this crate asks a generative AI service for
//! an analytical article, composes style-specific painting prompts, generates
//! and downloads images, and optimizes painting prompts.

pub mod ai;
pub mod app;
pub mod article;
pub mod config;
pub mod download;
pub mod error;
pub mod image;
pub mod models;
pub mod optimize;
pub mod prompts;
pub mod storage;

pub use error::{Error, Result};
