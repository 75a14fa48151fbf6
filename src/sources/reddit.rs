//! Reddit hot-listing fetcher.
//!
//! Authenticates with an application-only OAuth token (client-credentials
//! grant), then reads `/r/<subreddit>/hot` for every configured subreddit.
//! Posts are ranked by score.
//!
//! # Endpoints
//!
//! - Token: `POST https://www.reddit.com/api/v1/access_token`
//! - Listing: `GET https://oauth.reddit.com/r/<subreddit>/hot?limit=25&raw_json=1`

use super::{Candidate, Source};
use crate::config::{RedditCredentials, RedditSettings};
use crate::error::{CollectError, FetchError};
use crate::models::RedditPost;
use crate::transport::Transport;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";
const PERMALINK_BASE: &str = "https://www.reddit.com";
/// Posts requested per subreddit.
const PAGE_SIZE: usize = 25;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawChild {
    data: RawPost,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: String,
    title: String,
    subreddit: String,
    created_utc: f64,
    permalink: String,
    selftext: Option<String>,
    author: Option<String>,
    score: Option<i64>,
    num_comments: Option<u64>,
}

/// Map one listing child (`{"kind": "t3", "data": {...}}`) to a [`RedditPost`].
///
/// `id`, `title`, `subreddit`, `created_utc` and `permalink` are required;
/// `selftext` defaults to `""`, `author` to `"[deleted]"`, `score` and
/// `num_comments` to `0`.
pub fn extract_post(raw: Value, fetched_at: &str) -> Option<RedditPost> {
    let RawChild { data } = serde_json::from_value(raw).ok()?;
    if data.id.is_empty() {
        return None;
    }
    Some(RedditPost {
        id: data.id,
        title: data.title,
        selftext: data.selftext.unwrap_or_default(),
        subreddit: data.subreddit,
        author: data.author.unwrap_or_else(|| "[deleted]".to_string()),
        score: data.score.unwrap_or(0),
        num_comments: data.num_comments.unwrap_or(0),
        created_utc: data.created_utc,
        permalink: format!("{PERMALINK_BASE}{}", data.permalink),
        fetched_at: fetched_at.to_string(),
    })
}

impl Candidate for RedditPost {
    type RankKey = i64;

    fn identity(&self) -> &str {
        &self.id
    }

    fn rank_key(&self) -> i64 {
        self.score
    }
}

/// Hot-listing URL for one subreddit. The name is a single path segment, so
/// `/`, `?` and `#` in it are percent-encoded instead of reshaping the URL.
fn listing_url(subreddit: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(API_BASE)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().extend(["r", subreddit, "hot"]);
    }
    Ok(url)
}

/// Authenticated fetcher for the configured subreddits.
pub struct RedditFetcher<'a, T> {
    transport: &'a T,
    settings: &'a RedditSettings,
    access_token: String,
}

impl<'a, T: Transport> RedditFetcher<'a, T> {
    /// Exchange the client credentials for an access token.
    ///
    /// # Errors
    ///
    /// - [`CollectError::MissingCredential`] if no credentials were resolved
    /// - [`CollectError::Auth`] if the token endpoint fails or returns no token
    #[instrument(level = "info", skip_all, fields(source = "reddit", stage = "auth"))]
    pub async fn connect(
        transport: &'a T,
        settings: &'a RedditSettings,
        credentials: Option<&RedditCredentials>,
    ) -> Result<Self, CollectError> {
        let creds = credentials.ok_or(CollectError::MissingCredential(
            "REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET",
        ))?;

        let body = transport
            .post_form(
                TOKEN_URL,
                (creds.client_id.as_str(), creds.client_secret.as_str()),
                &[("grant_type", "client_credentials")],
            )
            .await
            .map_err(|e| CollectError::Auth {
                provider: "reddit",
                reason: e.to_string(),
            })?;
        let token: TokenResponse =
            serde_json::from_value(body).map_err(|e| CollectError::Auth {
                provider: "reddit",
                reason: format!("unexpected token response: {e}"),
            })?;

        info!("Obtained Reddit access token");
        Ok(Self {
            transport,
            settings,
            access_token: token.access_token,
        })
    }
}

impl<T: Transport> Source for RedditFetcher<'_, T> {
    type Record = RedditPost;

    fn name(&self) -> &'static str {
        "reddit"
    }

    fn enabled(&self) -> bool {
        self.settings.enabled
    }

    fn targets(&self) -> &[String] {
        &self.settings.subreddits
    }

    fn page_size(&self, _max_items: usize) -> usize {
        PAGE_SIZE
    }

    fn request_delay(&self) -> Duration {
        self.settings.request_delay()
    }

    async fn fetch_target(&self, subreddit: &str, page_size: usize) -> Result<Vec<Value>, FetchError> {
        let url = listing_url(subreddit)?;
        let query = [("limit", page_size.to_string()), ("raw_json", "1".to_string())];
        let body = self
            .transport
            .get_json(url.as_str(), Some(self.access_token.as_str()), &query)
            .await?;
        let listing: Listing = serde_json::from_value(body)?;
        Ok(listing.data.children)
    }

    fn extract(&self, raw: Value, fetched_at: &str) -> Option<RedditPost> {
        extract_post(raw, fetched_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch;
    use crate::transport::fake::FakeTransport;
    use serde_json::json;

    fn creds() -> RedditCredentials {
        RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn settings(subreddits: &[&str]) -> RedditSettings {
        RedditSettings {
            enabled: true,
            subreddits: subreddits.iter().map(|s| s.to_string()).collect(),
            request_delay_ms: 0,
        }
    }

    fn child(id: &str, score: i64) -> Value {
        json!({
            "kind": "t3",
            "data": {
                "id": id,
                "title": format!("Post {id}"),
                "selftext": "body",
                "subreddit": "SideProject",
                "author": "someone",
                "score": score,
                "num_comments": 4,
                "created_utc": 1_700_000_000.0,
                "permalink": format!("/r/SideProject/comments/{id}/post/"),
            }
        })
    }

    fn listing(children: Vec<Value>) -> Value {
        json!({ "kind": "Listing", "data": { "children": children } })
    }

    #[test]
    fn test_extract_full_post() {
        let post = extract_post(child("abc", 42), "now").unwrap();
        assert_eq!(post.id, "abc");
        assert_eq!(post.title, "Post abc");
        assert_eq!(post.score, 42);
        assert_eq!(post.num_comments, 4);
        assert_eq!(
            post.permalink,
            "https://www.reddit.com/r/SideProject/comments/abc/post/"
        );
        assert_eq!(post.fetched_at, "now");
    }

    #[test]
    fn test_extract_defaults_optional_fields() {
        let raw = json!({
            "data": {
                "id": "q1",
                "title": "Minimal",
                "subreddit": "startups",
                "created_utc": 1.0,
                "permalink": "/r/startups/comments/q1/",
            }
        });
        let post = extract_post(raw, "now").unwrap();
        assert_eq!(post.selftext, "");
        assert_eq!(post.author, "[deleted]");
        assert_eq!(post.score, 0);
        assert_eq!(post.num_comments, 0);
    }

    #[test]
    fn test_extract_rejects_missing_required_fields() {
        for field in ["id", "title", "subreddit", "created_utc", "permalink"] {
            let mut raw = child("abc", 1);
            raw["data"].as_object_mut().unwrap().remove(field);
            assert!(extract_post(raw, "now").is_none(), "missing {field}");
        }
        assert!(extract_post(json!({"kind": "t3"}), "now").is_none());
        assert!(extract_post(json!([1, 2, 3]), "now").is_none());
    }

    #[test]
    fn test_extract_rejects_empty_id() {
        assert!(extract_post(child("", 1), "now").is_none());
    }

    #[tokio::test]
    async fn test_connect_requires_credentials() {
        let fake = FakeTransport::new(|_, _| Ok(json!({})));
        let cfg = settings(&["SideProject"]);
        let err = RedditFetcher::connect(&fake, &cfg, None).await.err().unwrap();
        assert!(matches!(err, CollectError::MissingCredential(_)));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_connect_fails_on_rejected_token() {
        let fake = FakeTransport::new(|_, _| Ok(json!({}))).with_token_status(401);
        let cfg = settings(&["SideProject"]);
        let creds = creds();
        let err = RedditFetcher::connect(&fake, &cfg, Some(&creds))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CollectError::Auth { provider: "reddit", .. }));
    }

    #[tokio::test]
    async fn test_connect_fails_without_access_token() {
        let fake = FakeTransport::new(|_, _| Ok(json!({})))
            .with_token_body(json!({ "error": "invalid_grant" }));
        let cfg = settings(&["SideProject"]);
        let creds = creds();
        assert!(RedditFetcher::connect(&fake, &cfg, Some(&creds)).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_merges_subreddits() {
        let fake = FakeTransport::new(|url, _| match url {
            "https://oauth.reddit.com/r/A/hot" => Ok(listing(vec![child("1", 5), child("2", 9)])),
            "https://oauth.reddit.com/r/B/hot" => Ok(listing(vec![child("2", 9), child("3", 1)])),
            other => panic!("unexpected url {other}"),
        });
        let cfg = settings(&["A", "B"]);
        let creds = creds();
        let fetcher = RedditFetcher::connect(&fake, &cfg, Some(&creds)).await.unwrap();

        let posts = fetch(&fetcher, 2).await;
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let calls = fake.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("POST https://www.reddit.com/api/v1/access_token"));
        assert!(calls[1].contains("/r/A/hot"));
        assert!(calls[1].contains("(\"limit\", \"25\")"));
        assert!(calls[1].contains("bearer=Some(\"test-token\")"));
        assert!(calls[2].contains("/r/B/hot"));
    }

    #[tokio::test]
    async fn test_fetch_skips_unavailable_subreddit() {
        let fake = FakeTransport::new(|url, _| {
            if url.ends_with("/r/down/hot") {
                Err(FetchError::Status(503))
            } else {
                Ok(listing(vec![child("7", 3)]))
            }
        });
        let cfg = settings(&["down", "up"]);
        let creds = creds();
        let fetcher = RedditFetcher::connect(&fake, &cfg, Some(&creds)).await.unwrap();

        let posts = fetch(&fetcher, 10).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "7");
    }

    #[test]
    fn test_listing_url_escapes_subreddit() {
        assert_eq!(
            listing_url("SideProject").unwrap().as_str(),
            "https://oauth.reddit.com/r/SideProject/hot"
        );
        assert_eq!(
            listing_url("a?b#c/d").unwrap().as_str(),
            "https://oauth.reddit.com/r/a%3Fb%23c%2Fd/hot"
        );
    }

    #[tokio::test]
    async fn test_fetch_keeps_odd_subreddit_names_in_path() {
        let fake = FakeTransport::new(|_, _| Ok(listing(vec![child("1", 1)])));
        let cfg = settings(&["ideas?limit=100#top"]);
        let creds = creds();
        let fetcher = RedditFetcher::connect(&fake, &cfg, Some(&creds)).await.unwrap();

        assert_eq!(fetch(&fetcher, 10).await.len(), 1);
        let calls = fake.calls();
        let get = calls.iter().find(|c| c.starts_with("GET")).unwrap();
        assert!(get.starts_with("GET https://oauth.reddit.com/r/ideas%3Flimit=100%23top/hot "));
    }

    #[tokio::test]
    async fn test_fetch_tolerates_non_listing_body() {
        let fake = FakeTransport::new(|_, _| Ok(json!({ "message": "Forbidden" })));
        let cfg = settings(&["private"]);
        let creds = creds();
        let fetcher = RedditFetcher::connect(&fake, &cfg, Some(&creds)).await.unwrap();
        assert!(fetch(&fetcher, 10).await.is_empty());
    }
}
