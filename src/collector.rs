//! Runs every enabled source and merges their results.
//!
//! Sources are independent: a source that cannot be constructed (missing
//! credentials, rejected token) is logged and recorded as an empty list, and
//! the run moves on. Disabled sources get no entry at all.

use crate::config::{Credentials, Settings};
use crate::error::CollectError;
use crate::models::{CollectionResult, Record};
use crate::sources::{self, Source, reddit::RedditFetcher, youtube::YoutubeFetcher};
use crate::transport::Transport;
use tracing::{error, info, instrument};

/// Orchestrates the configured sources over one transport.
pub struct Collector<'a, T> {
    settings: &'a Settings,
    credentials: &'a Credentials,
    transport: &'a T,
}

impl<'a, T: Transport> Collector<'a, T> {
    /// Bind the run's settings and credentials to a transport.
    ///
    /// # Arguments
    ///
    /// * `settings` - Validated settings; decides which sources run
    /// * `credentials` - Resolved secrets, handed to each fetcher as needed
    /// * `transport` - Shared by every source for the whole run
    ///
    /// # Returns
    ///
    /// A collector ready for [`Collector::collect_all`]. Nothing is fetched yet.
    pub fn new(settings: &'a Settings, credentials: &'a Credentials, transport: &'a T) -> Self {
        Self {
            settings,
            credentials,
            transport,
        }
    }

    /// Fetch every enabled source, sequentially.
    #[instrument(level = "info", skip_all)]
    pub async fn collect_all(&self) -> CollectionResult {
        let max_items = self.settings.run.max_items_per_source;
        let mut results = CollectionResult::new();

        if let Some(cfg) = self.settings.sources.youtube.as_ref().filter(|c| c.enabled) {
            info!(source = "youtube", "Fetching YouTube");
            let fetcher = YoutubeFetcher::new(
                self.transport,
                cfg,
                self.credentials.youtube_api_key.as_deref(),
            );
            results.insert("youtube".to_string(), run_source("youtube", fetcher, max_items).await);
        }

        if let Some(cfg) = self.settings.sources.reddit.as_ref().filter(|c| c.enabled) {
            info!(source = "reddit", "Fetching Reddit");
            let fetcher =
                RedditFetcher::connect(self.transport, cfg, self.credentials.reddit.as_ref()).await;
            results.insert("reddit".to_string(), run_source("reddit", fetcher, max_items).await);
        }

        info!(
            sources = results.len(),
            total = results.values().map(Vec::len).sum::<usize>(),
            "Collection finished"
        );
        results
    }
}

/// Fetch from a constructed source, or record an empty result if construction failed.
async fn run_source<S>(name: &str, fetcher: Result<S, CollectError>, max_items: usize) -> Vec<Record>
where
    S: Source,
    S::Record: Into<Record>,
{
    match fetcher {
        Ok(fetcher) => sources::fetch(&fetcher, max_items)
            .await
            .into_iter()
            .map(Into::into)
            .collect(),
        Err(e) => {
            error!(source = name, stage = "connect", error = %e, "Source unavailable; recording no items");
            Vec::new()
        }
    }
}
