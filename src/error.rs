//! Error types for the music_page crate.

use thiserror::Error;

/// Errors that can occur while building the music page from Dropbox.
#[derive(Error, Debug)]
pub enum DropboxError {
    #[error("Authentication failed ({status}): {body}")]
    AuthenticationFailed { status: u16, body: String },

    #[error("Folder listing failed ({status}): {body}")]
    EnumerationFailed { status: u16, body: String },

    #[error("Shared link request failed ({status}): {body}")]
    LinkRequestFailed { status: u16, body: String },

    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid folder path: {0}")]
    InvalidFolderPath(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for DropboxError.
pub type Result<T> = std::result::Result<T, DropboxError>;
