//! Dropbox API client for folder listing and shared links.

use std::time::Duration;

use futures::{stream, Stream, TryStreamExt};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::auth::AccessToken;
use crate::error::{DropboxError, Result};
use crate::models::{
    ApiErrorResponse, CreateSharedLinkArg, FileEntry, ListFolderArg, ListFolderContinueArg,
    ListFolderResponse, ListSharedLinksArg, ListSharedLinksResponse, SharedLinkMetadata,
    SharedLinkSettings,
};

/// Base URL for Dropbox API v2 RPC endpoints.
const DROPBOX_API_BASE: &str = "https://api.dropboxapi.com/2";

/// Overall timeout applied to every request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

/// Build the HTTP client shared by the authenticator and the API client.
pub fn http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Where the next `list_folder` request resumes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingCursor {
    /// No page fetched yet; use `list_folder`.
    NotStarted,
    /// Continue from a provider-issued cursor; use `list_folder/continue`.
    Resuming(String),
}

/// One page of a folder listing, reduced to file entries.
#[derive(Debug)]
pub struct ListFolderPage {
    pub files: Vec<FileEntry>,
    /// `None` once the provider reports `has_more = false`.
    pub next: Option<ListingCursor>,
}

impl ListFolderPage {
    fn from_response(response: ListFolderResponse) -> Result<Self> {
        let next = if response.has_more {
            match response.cursor {
                Some(cursor) => Some(ListingCursor::Resuming(cursor)),
                None => {
                    return Err(DropboxError::EnumerationFailed {
                        status: 200,
                        body: "has_more set without a cursor".to_string(),
                    })
                }
            }
        } else {
            None
        };

        let files = response
            .entries
            .into_iter()
            .filter_map(|entry| entry.into_file())
            .collect();

        Ok(Self { files, next })
    }
}

/// Client for the Dropbox files and sharing endpoints.
pub struct DropboxClient {
    http: Client,
    token: AccessToken,
    api_base: String,
}

impl DropboxClient {
    /// Create a new DropboxClient.
    ///
    /// # Arguments
    /// * `http` - HTTP client, usually from [`http_client`]
    /// * `token` - Access token for the run
    pub fn new(http: Client, token: AccessToken) -> Self {
        Self::with_base_url(http, token, DROPBOX_API_BASE)
    }

    /// Create a client that talks to a different API base URL.
    pub fn with_base_url(http: Client, token: AccessToken, api_base: impl Into<String>) -> Self {
        Self {
            http,
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a single page of a recursive folder listing.
    #[instrument(skip(self))]
    pub async fn list_folder_page(
        &self,
        folder: &str,
        cursor: &ListingCursor,
    ) -> Result<ListFolderPage> {
        let result = match cursor {
            ListingCursor::NotStarted => {
                let arg = ListFolderArg {
                    path: folder,
                    recursive: true,
                    include_non_downloadable_files: false,
                };
                self.post_json("files/list_folder", &arg).await
            }
            ListingCursor::Resuming(cursor) => {
                let arg = ListFolderContinueArg { cursor };
                self.post_json("files/list_folder/continue", &arg).await
            }
        };

        let response: ListFolderResponse = result.map_err(|e| match e {
            DropboxError::ApiError { status, body } => {
                DropboxError::EnumerationFailed { status, body }
            }
            other => other,
        })?;

        let page = ListFolderPage::from_response(response)?;
        debug!(files = page.files.len(), has_more = page.next.is_some(), "Fetched listing page");
        Ok(page)
    }

    /// Stream the file entries of a folder, one page at a time.
    ///
    /// The stream ends after the first page with `has_more = false`. A failed
    /// page fetch yields the error and ends the stream.
    pub fn file_pages<'a>(
        &'a self,
        folder: &'a str,
    ) -> impl Stream<Item = Result<Vec<FileEntry>>> + 'a {
        stream::try_unfold(Some(ListingCursor::NotStarted), move |state| async move {
            let Some(cursor) = state else {
                return Ok(None);
            };
            let page = self.list_folder_page(folder, &cursor).await?;
            Ok::<_, DropboxError>(Some((page.files, page.next)))
        })
    }

    /// List every file under a folder, recursively.
    pub async fn list_files(&self, folder: &str) -> Result<Vec<FileEntry>> {
        let pages: Vec<Vec<FileEntry>> = self.file_pages(folder).try_collect().await?;
        Ok(pages.into_iter().flatten().collect())
    }

    /// List the shared links that point directly at `path`.
    #[instrument(skip(self))]
    pub async fn list_shared_links(&self, path: &str) -> Result<Vec<SharedLinkMetadata>> {
        let arg = ListSharedLinksArg {
            path,
            direct_only: true,
        };
        let response: ListSharedLinksResponse = self
            .post_json("sharing/list_shared_links", &arg)
            .await
            .map_err(link_failure)?;
        Ok(response.links)
    }

    /// Create a public shared link for `path`.
    #[instrument(skip(self))]
    pub async fn create_shared_link(&self, path: &str) -> Result<SharedLinkMetadata> {
        let arg = CreateSharedLinkArg {
            path,
            settings: SharedLinkSettings {
                requested_visibility: "public",
            },
        };
        self.post_json("sharing/create_shared_link_with_settings", &arg)
            .await
            .map_err(link_failure)
    }

    /// POST a JSON body to an RPC endpoint and decode the JSON reply.
    ///
    /// Non-success statuses come back as `ApiError`.
    async fn post_json<A, R>(&self, endpoint: &str, arg: &A) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.api_base, endpoint))
            .bearer_auth(self.token.secret())
            .json(arg)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    let body = match serde_json::from_str::<ApiErrorResponse>(&error_body) {
        Ok(api_error) => api_error.error_summary,
        Err(_) => error_body,
    };
    Err(DropboxError::ApiError {
        status: status.as_u16(),
        body,
    })
}

fn link_failure(err: DropboxError) -> DropboxError {
    match err {
        DropboxError::ApiError { status, body } => {
            DropboxError::LinkRequestFailed { status, body }
        }
        other => other,
    }
}
