//! music_page - Publish a Dropbox folder of audio files as a static HTML page.
//!
//! This library provides functionality to:
//! - Exchange a Dropbox refresh token for an access token
//! - List a Dropbox folder recursively, page by page
//! - Reuse or create a public shared link for each audio file
//! - Render the linked files as an HTML listing
//!
//! # Example
//!
//! ```no_run
//! use music_page::{
//!     collect_records, http_client, render_page, sort_newest_first, Authenticator,
//!     Credentials, DropboxClient, LinkResolver,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = http_client()?;
//!     let credentials = Credentials::new(
//!         std::env::var("DROPBOX_APP_KEY").ok(),
//!         std::env::var("DROPBOX_APP_SECRET").ok(),
//!         std::env::var("DROPBOX_REFRESH_TOKEN").ok(),
//!     )?;
//!     let token = Authenticator::new(credentials, http.clone())
//!         .get_access_token()
//!         .await?;
//!     let client = DropboxClient::new(http, token);
//!
//!     let mut records =
//!         collect_records(&client, &LinkResolver::default(), "/Public/Music", None).await?;
//!     sort_newest_first(&mut records);
//!     println!("{}", render_page(&records, "Music", None, chrono::Utc::now()));
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod url_parser;

// Re-exports for convenience
pub use auth::{AccessToken, Authenticator, Credentials};
pub use client::{http_client, DropboxClient, ListingCursor};
pub use error::{DropboxError, Result};
pub use models::{FileEntry, OutputRecord};
pub use pipeline::{collect_records, is_audio_file, record_stream, sort_newest_first};
pub use render::{render_page, write_page};
pub use resolver::{LinkProvider, LinkResolver, LinkStrategy};
pub use url_parser::{normalize_folder_path, to_preview_url};
