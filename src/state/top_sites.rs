//! Top sites
//!
//! The most-visited list comes from a provider when one is available and
//! from a built-in list otherwise. Either way the published list is capped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Default number of sites shown
pub const DEFAULT_TOP_SITES_LIMIT: usize = 8;

/// A site on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub title: String,
    pub url: String,
}

impl Site {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Sites shown when no provider can supply any
pub fn fallback_sites() -> Vec<Site> {
    vec![
        Site::new("GitHub", "https://github.com"),
        Site::new("Stack Overflow", "https://stackoverflow.com"),
        Site::new("MDN Web Docs", "https://developer.mozilla.org"),
        Site::new("Dev.to", "https://dev.to"),
        Site::new("Reddit", "https://reddit.com"),
        Site::new("HackerNews", "https://news.ycombinator.com"),
    ]
}

/// Errors from a top sites provider
#[derive(Debug, thiserror::Error)]
pub enum TopSitesError {
    #[error("Top sites unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid site entry: {0}")]
    InvalidEntry(String),
}

/// Source of most-visited sites
#[async_trait]
pub trait TopSitesProvider: Send + Sync {
    async fn top_sites(&self) -> Result<Vec<Site>, TopSitesError>;
}

/// Provider returning a fixed list
#[derive(Debug, Clone, Default)]
pub struct StaticSites {
    sites: Vec<Site>,
}

impl StaticSites {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }
}

#[async_trait]
impl TopSitesProvider for StaticSites {
    async fn top_sites(&self) -> Result<Vec<Site>, TopSitesError> {
        if let Some(site) = self.sites.iter().find(|s| s.url.trim().is_empty()) {
            return Err(TopSitesError::InvalidEntry(format!(
                "{} has no url",
                site.title
            )));
        }
        Ok(self.sites.clone())
    }
}

/// Observable top sites list
pub struct TopSitesStore {
    provider: Option<Arc<dyn TopSitesProvider>>,
    limit: usize,
    sites: watch::Sender<Vec<Site>>,
}

impl TopSitesStore {
    /// An empty list until [`load`](Self::load) runs
    pub fn new(provider: Option<Arc<dyn TopSitesProvider>>, limit: usize) -> Self {
        let (sites, _) = watch::channel(Vec::new());
        Self {
            provider,
            limit,
            sites,
        }
    }

    pub fn get(&self) -> Vec<Site> {
        self.sites.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Site>> {
        self.sites.subscribe()
    }

    /// Fetch from the provider (or the fallback list) and publish
    pub async fn load(&self) -> Vec<Site> {
        let mut sites = match &self.provider {
            Some(provider) => match provider.top_sites().await {
                Ok(sites) => sites,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to fetch top sites");
                    fallback_sites()
                }
            },
            None => fallback_sites(),
        };
        sites.truncate(self.limit);

        tracing::debug!(count = sites.len(), "Loaded top sites");
        self.sites.send_replace(sites.clone());
        sites
    }
}
