//! Public link resolution: reuse an existing shared link, else create one.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::DropboxClient;
use crate::error::Result;
use crate::url_parser::to_preview_url;

/// The sharing calls the resolver needs from the provider.
#[async_trait]
pub trait LinkProvider: Send + Sync {
    /// URLs of the shared links pointing directly at `path`.
    async fn shared_links(&self, path: &str) -> Result<Vec<String>>;

    /// Create a public shared link for `path` and return its URL.
    async fn create_public_link(&self, path: &str) -> Result<String>;
}

#[async_trait]
impl LinkProvider for DropboxClient {
    async fn shared_links(&self, path: &str) -> Result<Vec<String>> {
        let links = self.list_shared_links(path).await?;
        Ok(links.into_iter().map(|l| l.url).collect())
    }

    async fn create_public_link(&self, path: &str) -> Result<String> {
        Ok(self.create_shared_link(path).await?.url)
    }
}

/// One step of the resolution chain.
///
/// `Ok(None)` means the step found nothing; `Err` means the step could not
/// tell. Both hand over to the next step.
#[async_trait]
pub trait LinkStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, provider: &dyn LinkProvider, path: &str) -> Result<Option<String>>;
}

/// Use the first existing shared link, if any.
pub struct ReuseExisting;

#[async_trait]
impl LinkStrategy for ReuseExisting {
    fn name(&self) -> &'static str {
        "reuse-existing"
    }

    async fn attempt(&self, provider: &dyn LinkProvider, path: &str) -> Result<Option<String>> {
        Ok(provider.shared_links(path).await?.into_iter().next())
    }
}

/// Create a new public shared link.
pub struct CreatePublic;

#[async_trait]
impl LinkStrategy for CreatePublic {
    fn name(&self) -> &'static str {
        "create-public"
    }

    async fn attempt(&self, provider: &dyn LinkProvider, path: &str) -> Result<Option<String>> {
        provider.create_public_link(path).await.map(Some)
    }
}

/// Runs an ordered list of strategies until one yields a URL.
pub struct LinkResolver {
    strategies: Vec<Box<dyn LinkStrategy>>,
}

impl Default for LinkResolver {
    /// Lookup before create, so repeated runs reuse the same link.
    fn default() -> Self {
        Self::with_strategies(vec![Box::new(ReuseExisting), Box::new(CreatePublic)])
    }
}

impl LinkResolver {
    pub fn with_strategies(strategies: Vec<Box<dyn LinkStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolve the canonical preview URL for `path`.
    ///
    /// Never fails: a path no strategy can link resolves to `None`.
    pub async fn resolve(&self, provider: &dyn LinkProvider, path: &str) -> Option<String> {
        for strategy in &self.strategies {
            match strategy.attempt(provider, path).await {
                Ok(Some(url)) if !url.trim().is_empty() => {
                    debug!(path, strategy = strategy.name(), "Resolved shared link");
                    return Some(to_preview_url(&url));
                }
                Ok(_) => {
                    debug!(path, strategy = strategy.name(), "No link from strategy");
                }
                Err(e) => {
                    warn!(path, strategy = strategy.name(), error = %e, "Link strategy failed");
                }
            }
        }
        None
    }
}
