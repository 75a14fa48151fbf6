//! YouTube search fetcher.
//!
//! Runs one Data API v3 search per configured term, authenticated with a
//! static API key. Videos are ranked by publish time, newest first.
//!
//! # Per-term cap
//!
//! Each search asks for `max_items / search_terms.len()` results (integer
//! division). With many terms and a small `max_items` the share can round
//! down to zero, so a run may return fewer than `max_items` videos. That
//! under-fill is accepted; the cap is not rounded up.
//!
//! The search endpoint returns at most [`MAX_RESULTS_PER_SEARCH`] items per
//! request, whatever `maxResults` says. Settings whose per-term share would
//! exceed that are rejected at load time rather than silently under-filled.

use super::{Candidate, Source};
use crate::config::YoutubeSettings;
use crate::error::{CollectError, FetchError};
use crate::models::YoutubeVideo;
use crate::transport::Transport;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Largest `maxResults` the search endpoint honours.
pub const MAX_RESULTS_PER_SEARCH: usize = 50;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawSearchItem {
    id: RawVideoId,
    snippet: RawSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideoId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnippet {
    title: String,
    channel_title: String,
    published_at: String,
    description: Option<String>,
}

/// Map one search result item to a [`YoutubeVideo`].
///
/// `id.videoId`, `snippet.title`, `snippet.channelTitle` and
/// `snippet.publishedAt` are required; `snippet.description` defaults to `""`.
pub fn extract_video(raw: Value, fetched_at: &str) -> Option<YoutubeVideo> {
    let RawSearchItem { id, snippet } = serde_json::from_value(raw).ok()?;
    if id.video_id.is_empty() {
        return None;
    }
    let url = Url::parse_with_params(WATCH_URL, &[("v", id.video_id.as_str())]).ok()?;
    Some(YoutubeVideo {
        video_id: id.video_id,
        title: snippet.title,
        description: snippet.description.unwrap_or_default(),
        channel_title: snippet.channel_title,
        published_at: snippet.published_at,
        url: url.to_string(),
        fetched_at: fetched_at.to_string(),
    })
}

impl Candidate for YoutubeVideo {
    // RFC 3339 timestamps in UTC order lexically.
    type RankKey = String;

    fn identity(&self) -> &str {
        &self.video_id
    }

    fn rank_key(&self) -> String {
        self.published_at.clone()
    }
}

/// Fetcher for the configured search terms.
pub struct YoutubeFetcher<'a, T> {
    transport: &'a T,
    settings: &'a YoutubeSettings,
    api_key: String,
}

impl<'a, T: Transport> YoutubeFetcher<'a, T> {
    /// # Errors
    ///
    /// [`CollectError::MissingCredential`] if no API key was resolved.
    pub fn new(
        transport: &'a T,
        settings: &'a YoutubeSettings,
        api_key: Option<&str>,
    ) -> Result<Self, CollectError> {
        let api_key = api_key.ok_or(CollectError::MissingCredential("YOUTUBE_API_KEY"))?;
        Ok(Self {
            transport,
            settings,
            api_key: api_key.to_string(),
        })
    }
}

impl<T: Transport> Source for YoutubeFetcher<'_, T> {
    type Record = YoutubeVideo;

    fn name(&self) -> &'static str {
        "youtube"
    }

    fn enabled(&self) -> bool {
        self.settings.enabled
    }

    fn targets(&self) -> &[String] {
        &self.settings.search_terms
    }

    fn page_size(&self, max_items: usize) -> usize {
        match self.settings.search_terms.len() {
            0 => 0,
            terms => max_items / terms,
        }
    }

    fn request_delay(&self) -> Duration {
        self.settings.request_delay()
    }

    async fn fetch_target(&self, term: &str, page_size: usize) -> Result<Vec<Value>, FetchError> {
        let query = [
            ("part", "snippet".to_string()),
            ("q", term.to_string()),
            ("maxResults", page_size.to_string()),
            ("type", "video".to_string()),
            ("key", self.api_key.clone()),
        ];
        let body = self.transport.get_json(SEARCH_URL, None, &query).await?;
        let response: SearchResponse = serde_json::from_value(body)?;
        Ok(response.items)
    }

    fn extract(&self, raw: Value, fetched_at: &str) -> Option<YoutubeVideo> {
        extract_video(raw, fetched_at)
    }
}
