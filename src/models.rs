//! Data models for collected records and the persisted snapshot.
//!
//! - [`RedditPost`] / [`YoutubeVideo`]: canonical records, one per provider item
//! - [`Record`]: either of the above, as stored in a [`CollectionResult`]
//! - [`Snapshot`]: the JSON document written once per run
//!
//! Canonical records are built only by the source extractors and are never
//! mutated afterwards. The YouTube record keeps the provider's camelCase
//! field names in its JSON form, which is what downstream consumers read.

use serde::Serialize;
use std::collections::BTreeMap;

/// A Reddit post as kept in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedditPost {
    /// Reddit's base-36 post id. Never empty.
    pub id: String,
    pub title: String,
    /// Self-post body; `""` when absent.
    pub selftext: String,
    pub subreddit: String,
    /// `"[deleted]"` when absent.
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    /// Unix seconds as reported by Reddit.
    pub created_utc: f64,
    /// Absolute URL on `www.reddit.com`.
    pub permalink: String,
    pub fetched_at: String,
}

/// A YouTube search hit as kept in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YoutubeVideo {
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "channelTitle")]
    pub channel_title: String,
    /// RFC 3339 publish time, as returned by the API.
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub url: String,
    pub fetched_at: String,
}

/// One canonical record of any source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Reddit(RedditPost),
    Youtube(YoutubeVideo),
}

impl From<RedditPost> for Record {
    fn from(post: RedditPost) -> Self {
        Record::Reddit(post)
    }
}

impl From<YoutubeVideo> for Record {
    fn from(video: YoutubeVideo) -> Self {
        Record::Youtube(video)
    }
}

/// Source name → ranked, deduplicated records.
///
/// Only enabled sources have an entry; an enabled source that failed or found
/// nothing maps to an empty list.
pub type CollectionResult = BTreeMap<String, Vec<Record>>;

/// Summary block at the top of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotMetadata {
    /// Always the sum of `sources` values.
    pub total_items: usize,
    pub sources: BTreeMap<String, usize>,
    pub fetched_at: String,
}

/// The document persisted once per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    pub data: CollectionResult,
}
