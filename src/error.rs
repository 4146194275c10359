//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported style: {0}")]
    InvalidStyle(String),

    #[error("{}", upstream_message(.status, .message))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Download error: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

fn upstream_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Upstream API error (status {}): {}", status, message),
        None => format!("Upstream API error: {}", message),
    }
}

impl Error {
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// Process exit code reported by the CLI for this failure. Starts at 3
    /// because clap exits with 2 on usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidStyle(_) => 3,
            Error::Upstream { .. } => 4,
            Error::Download(_) => 5,
            Error::Io(_) => 6,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_includes_status() {
        let err = Error::Upstream {
            status: Some(429),
            message: "rate limited".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Upstream API error (status 429): rate limited"
        );
        assert_eq!(
            Error::upstream("empty").to_string(),
            "Upstream API error: empty"
        );
    }

    #[test]
    fn test_exit_codes_are_distinct_and_non_zero() {
        let codes = [
            Error::InvalidStyle("x".to_string()).exit_code(),
            Error::upstream("x").exit_code(),
            Error::Download("x".to_string()).exit_code(),
            Error::Io(std::io::Error::other("x")).exit_code(),
            Error::Generic("x".to_string()).exit_code(),
        ];
        assert_eq!(codes, [3, 4, 5, 6, 1]);
    }
}
