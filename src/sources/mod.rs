//! Content sources and the fetch pipeline they share.
//!
//! Every source follows the same pattern:
//!
//! 1. **Query**: one request per configured target (subreddit, search term),
//!    strictly in configured order
//! 2. **Extract**: each raw item becomes a canonical record or is dropped
//! 3. **Merge**: first occurrence of an identity key wins, then the list is
//!    sorted by ranking key (descending, stable) and truncated
//!
//! # Supported Sources
//!
//! | Source | Module | Targets | Ranking key |
//! |--------|--------|---------|-------------|
//! | Reddit | [`reddit`] | `subreddits` (hot listing) | `score` |
//! | YouTube | [`youtube`] | `search_terms` (search API) | `publishedAt` |
//!
//! A failed target (bad status, timeout, undecodable body) is logged and
//! skipped; it never aborts the rest of the fetch.

pub mod reddit;
pub mod youtube;

use crate::error::FetchError;
use crate::utils::now_iso;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde_json::Value;
use std::cmp::Reverse;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// A canonical record as seen by the merge step.
pub trait Candidate {
    type RankKey: Ord;

    /// Deduplication key, unique within a source.
    fn identity(&self) -> &str;

    /// Higher sorts first.
    fn rank_key(&self) -> Self::RankKey;
}

/// One provider, as driven by [`fetch`].
pub trait Source {
    type Record: Candidate;

    /// Name used as the key in the snapshot and in logs.
    fn name(&self) -> &'static str;

    fn enabled(&self) -> bool;

    /// Query targets, in the order they are fetched.
    fn targets(&self) -> &[String];

    /// Provider-side cap on items per request for a run keeping `max_items`.
    fn page_size(&self, max_items: usize) -> usize;

    /// Pause after each target.
    fn request_delay(&self) -> Duration;

    /// Issue the request for one target and return its raw items.
    async fn fetch_target(&self, target: &str, page_size: usize) -> Result<Vec<Value>, FetchError>;

    /// Turn one raw item into a record; `None` drops the item.
    fn extract(&self, raw: Value, fetched_at: &str) -> Option<Self::Record>;
}

/// Run the full query → extract → merge pipeline for one source.
///
/// Returns at most `max_items` records, unique by identity and ordered by
/// ranking key descending. A disabled source or one with no targets yields
/// an empty list without touching the network.
#[instrument(level = "info", skip_all, fields(source = source.name(), max_items = max_items))]
pub async fn fetch<S: Source>(source: &S, max_items: usize) -> Vec<S::Record> {
    if !source.enabled() {
        debug!("Source disabled; skipping");
        return Vec::new();
    }
    let targets = source.targets();
    if targets.is_empty() {
        warn!(stage = "fetch", "No query targets configured");
        return Vec::new();
    }

    let page_size = source.page_size(max_items);
    let delay = source.request_delay();

    let batches: Vec<Vec<S::Record>> = stream::iter(targets)
        .then(move |target| async move {
            let records = match source.fetch_target(target, page_size).await {
                Ok(items) => {
                    let received = items.len();
                    let records: Vec<S::Record> = items
                        .into_iter()
                        .filter_map(|raw| source.extract(raw, &now_iso()))
                        .collect();
                    info!(
                        stage = "fetch",
                        %target,
                        received,
                        extracted = records.len(),
                        "Fetched target"
                    );
                    records
                }
                Err(e) => {
                    warn!(stage = "fetch", %target, error = %e, "Target failed; skipping");
                    Vec::new()
                }
            };
            if !delay.is_zero() {
                sleep(delay).await;
            }
            records
        })
        .collect()
        .await;

    let merged = merge_ranked(batches.into_iter().flatten(), max_items);
    info!(stage = "merge", count = merged.len(), "Source fetch complete");
    merged
}

/// Deduplicate (first occurrence wins), sort by ranking key descending with
/// ties in arrival order, and keep the first `max_items`.
///
/// # Arguments
///
/// * `records` - Candidates in arrival order, across all targets
/// * `max_items` - Upper bound on the returned length; `0` yields an empty list
///
/// # Returns
///
/// At most `max_items` records with distinct identities, best first.
pub fn merge_ranked<R, I>(records: I, max_items: usize) -> Vec<R>
where
    R: Candidate,
    I: IntoIterator<Item = R>,
{
    let mut unique: Vec<R> = records
        .into_iter()
        .unique_by(|r| r.identity().to_owned())
        .collect();
    // sort_by_cached_key is stable
    unique.sort_by_cached_key(|r| Reverse(r.rank_key()));
    unique.truncate(max_items);
    unique
}
