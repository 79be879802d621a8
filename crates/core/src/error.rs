use std::io;

use thiserror::Error;

/// Error type shared by the core services and the adapters.
#[derive(Debug, Error)]
pub enum HitboardError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{}", malformed_message(.index, .reason))]
    Malformed {
        index: Option<usize>,
        reason: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid keyword pattern: {0}")]
    Pattern(String),
    #[error("fetching {url}: {reason}")]
    Fetch { url: String, reason: String },
}

fn malformed_message(index: &Option<usize>, reason: &str) -> String {
    match index {
        Some(i) => format!("malformed record at index {}: {}", i, reason),
        None => format!("malformed results payload: {}", reason),
    }
}
