pub mod chat;
pub mod client;
pub mod image;
pub mod types;

pub use chat::ZhipuChatClient;
pub use client::ZhipuHttpClient;
pub use image::ZhipuImageClient;
