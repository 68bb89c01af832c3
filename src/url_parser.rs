//! Helpers for Dropbox URLs and folder paths.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DropboxError, Result};

/// Dropbox web UI folder URL, e.g. `https://www.dropbox.com/home/Public/Music`.
static HOME_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?dropbox\.com/home(/[^?#]*)?(?:[?#].*)?$")
        .expect("Invalid home URL regex")
});

/// Any URL scheme prefix.
static SCHEME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("Invalid scheme regex"));

/// The `dl` query parameter of a shared link.
static DL_PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^dl=[0-9]*$").expect("Invalid dl param regex"));

/// Rewrite a shared link into its canonical "preview in browser" form.
///
/// Any `dl` parameter is dropped and a single `dl=0` is appended; other
/// query parameters (such as `rlkey`) and the fragment are kept.
///
/// # Examples
///
/// ```
/// use music_page::url_parser::to_preview_url;
///
/// assert_eq!(to_preview_url("https://x/f?dl=1"), "https://x/f?dl=0");
/// assert_eq!(to_preview_url("https://x/f"), "https://x/f?dl=0");
/// ```
pub fn to_preview_url(shared_url: &str) -> String {
    let trimmed = shared_url.trim();
    let (without_fragment, fragment) = match trimmed.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (trimmed, None),
    };
    let (base, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let mut params: Vec<&str> = query
        .split('&')
        .filter(|p| !p.is_empty() && !DL_PARAM_REGEX.is_match(p))
        .collect();
    params.push("dl=0");

    let mut url = format!("{}?{}", base, params.join("&"));
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// Turn a user-supplied folder into the path form `list_folder` expects.
///
/// Supports the following inputs:
/// - `/Public/Music`, `Public/Music/` (both become `/Public/Music`)
/// - `""` or `/` for the root folder (sent as `""`)
/// - `https://www.dropbox.com/home/Public/Music`
pub fn normalize_folder_path(input: &str) -> Result<String> {
    let trimmed = input.trim();

    let raw_path = if let Some(captures) = HOME_URL_REGEX.captures(trimmed) {
        let encoded = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        percent_decode_str(encoded)
            .decode_utf8()
            .map_err(|_| DropboxError::InvalidFolderPath(input.to_string()))?
            .into_owned()
    } else if SCHEME_REGEX.is_match(trimmed) {
        return Err(DropboxError::InvalidFolderPath(input.to_string()));
    } else {
        trimmed.to_string()
    };

    let segments: Vec<&str> = raw_path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(DropboxError::InvalidFolderPath(input.to_string()));
    }

    if segments.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("/{}", segments.join("/")))
    }
}
