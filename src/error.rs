use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key found, set GEMINI_API_KEY or GOOGLE_API_KEY")]
    MissingApiKey,
    #[error("unknown API version '{0}', expected 'v1' or 'v1beta'")]
    UnknownApiVersion(String),
}

/// Failures talking to the hosted model.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contained no text{}", blocked_suffix(.0))]
    EmptyResponse(Option<String>),
    #[error("no active chat session")]
    NoSession,
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(#[from] image::ImageError),
}

fn blocked_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" (blocked: {reason})"),
        None => String::new(),
    }
}
