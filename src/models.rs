//! Data models for Dropbox API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file entry from a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    /// Lowercased full path, used as the key for shared link calls.
    pub path_lower: String,
    pub size: u64,
    pub client_modified: DateTime<Utc>,
}

/// A folder entry from a folder listing.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
}

/// One entry of a `list_folder` page, discriminated by its `.tag`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum Metadata {
    File(FileEntry),
    Folder(FolderEntry),
    #[serde(other)]
    Other,
}

impl Metadata {
    /// Returns the file entry if this is a file.
    pub fn into_file(self) -> Option<FileEntry> {
        match self {
            Metadata::File(file) => Some(file),
            _ => None,
        }
    }
}

/// Arguments for `files/list_folder`.
#[derive(Debug, Serialize)]
pub struct ListFolderArg<'a> {
    pub path: &'a str,
    pub recursive: bool,
    pub include_non_downloadable_files: bool,
}

/// Arguments for `files/list_folder/continue`.
#[derive(Debug, Serialize)]
pub struct ListFolderContinueArg<'a> {
    pub cursor: &'a str,
}

/// Response from `files/list_folder` and `files/list_folder/continue`.
#[derive(Debug, Deserialize)]
pub struct ListFolderResponse {
    #[serde(default)]
    pub entries: Vec<Metadata>,
    pub has_more: bool,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Arguments for `sharing/list_shared_links`.
#[derive(Debug, Serialize)]
pub struct ListSharedLinksArg<'a> {
    pub path: &'a str,
    pub direct_only: bool,
}

/// A shared link as returned by the sharing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SharedLinkMetadata {
    pub url: String,
}

/// Response from `sharing/list_shared_links`.
#[derive(Debug, Deserialize)]
pub struct ListSharedLinksResponse {
    #[serde(default)]
    pub links: Vec<SharedLinkMetadata>,
}

/// Settings for a newly created shared link.
#[derive(Debug, Serialize)]
pub struct SharedLinkSettings {
    pub requested_visibility: &'static str,
}

/// Arguments for `sharing/create_shared_link_with_settings`.
#[derive(Debug, Serialize)]
pub struct CreateSharedLinkArg<'a> {
    pub path: &'a str,
    pub settings: SharedLinkSettings,
}

/// Dropbox API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error_summary: String,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// A linked audio file, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl std::fmt::Display for OutputRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.modified.format("%Y-%m-%d %H:%M"),
            format_size(self.size),
            self.name,
            self.url
        )
    }
}

/// Format bytes into human-readable size, trimming trailing zeros.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let (value, unit) = if bytes >= GB {
        (bytes as f64 / GB as f64, "GB")
    } else if bytes >= MB {
        (bytes as f64 / MB as f64, "MB")
    } else if bytes >= KB {
        (bytes as f64 / KB as f64, "KB")
    } else {
        return format!("{} B", bytes);
    };

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, unit)
}
