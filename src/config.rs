//! Run settings loaded from a YAML file, plus resolved credentials.
//!
//! The settings file is read and validated once at startup; everything
//! downstream receives typed structs, never raw YAML.
//!
//! ```yaml
//! run:
//!   out_dir: data
//!   max_items_per_source: 20
//! sources:
//!   reddit:
//!     enabled: true
//!     subreddits: [SideProject, startups]
//!   youtube:
//!     enabled: true
//!     search_terms: ["startup ideas"]
//! ```

use crate::error::CollectError;
use crate::sources::youtube::MAX_RESULTS_PER_SEARCH;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "idea-collector/0.1";

/// Top-level settings document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub run: RunSettings,
    pub sources: SourceSettings,
}

/// Settings that apply to the whole run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Output directory; relative paths resolve against the settings file.
    pub out_dir: PathBuf,
    /// Upper bound on records kept per source.
    pub max_items_per_source: usize,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data"),
            max_items_per_source: 20,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Per-provider settings. A missing section means the source is disabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub reddit: Option<RedditSettings>,
    pub youtube: Option<YoutubeSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub enabled: bool,
    pub subreddits: Vec<String>,
    /// Pause after each subreddit request.
    pub request_delay_ms: u64,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            subreddits: Vec::new(),
            request_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    pub enabled: bool,
    pub search_terms: Vec<String>,
    /// Pause after each search request.
    pub request_delay_ms: u64,
}

impl RedditSettings {
    /// Pause applied after each subreddit request.
    ///
    /// # Returns
    ///
    /// `request_delay_ms` as a [`Duration`]; zero disables pacing.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl YoutubeSettings {
    /// Pause applied after each search request.
    ///
    /// # Returns
    ///
    /// `request_delay_ms` as a [`Duration`]; zero disables pacing.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Settings {
    /// Read, parse and validate a settings file.
    ///
    /// # Errors
    ///
    /// - [`CollectError::ConfigNotFound`] if `path` does not exist
    /// - [`CollectError::ConfigParse`] if the file is not valid YAML for [`Settings`]
    /// - [`CollectError::InvalidConfig`] if a value is out of range
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, CollectError> {
        if !path.exists() {
            return Err(CollectError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml(&text).map_err(|e| match e {
            CollectError::ConfigParse { source, .. } => CollectError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(
            enabled = ?settings.enabled_sources(),
            max_items = settings.run.max_items_per_source,
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Parse and validate settings from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, CollectError> {
        let settings: Settings =
            serde_yaml::from_str(text).map_err(|source| CollectError::ConfigParse {
                path: PathBuf::new(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges. Call again after applying command-line overrides.
    ///
    /// # Errors
    ///
    /// [`CollectError::InvalidConfig`] naming the first offending key.
    pub fn validate(&self) -> Result<(), CollectError> {
        if self.run.max_items_per_source == 0 {
            return Err(CollectError::InvalidConfig(
                "run.max_items_per_source must be at least 1".to_string(),
            ));
        }
        if self.run.timeout_secs == 0 {
            return Err(CollectError::InvalidConfig(
                "run.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.run.user_agent.trim().is_empty() {
            return Err(CollectError::InvalidConfig(
                "run.user_agent must not be empty".to_string(),
            ));
        }
        if let Some(youtube) = self.sources.youtube.as_ref().filter(|s| s.enabled) {
            let terms = youtube.search_terms.len();
            if terms > 0 && self.run.max_items_per_source / terms > MAX_RESULTS_PER_SEARCH {
                return Err(CollectError::InvalidConfig(format!(
                    "max_items_per_source {} over {terms} search term(s) asks for more than \
                     {MAX_RESULTS_PER_SEARCH} YouTube results per term",
                    self.run.max_items_per_source
                )));
            }
        }
        Ok(())
    }

    /// Names of the enabled sources, in collection order.
    pub fn enabled_sources(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.sources.youtube.as_ref().is_some_and(|s| s.enabled) {
            names.push("youtube");
        }
        if self.sources.reddit.as_ref().is_some_and(|s| s.enabled) {
            names.push("reddit");
        }
        names
    }

    /// Resolve `run.out_dir` against the directory holding the settings file.
    pub fn out_dir(&self, config_path: &Path) -> PathBuf {
        if self.run.out_dir.is_absolute() {
            return self.run.out_dir.clone();
        }
        config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.run.out_dir)
    }

    /// Per-request timeout for the HTTP client.
    ///
    /// # Returns
    ///
    /// `run.timeout_secs` as a [`Duration`]; never zero once validated.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.run.timeout_secs)
    }
}

/// Client-credentials pair for the Reddit token exchange.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Credentials resolved by the caller and handed to each fetcher.
#[derive(Clone, Default)]
pub struct Credentials {
    pub reddit: Option<RedditCredentials>,
    pub youtube_api_key: Option<String>,
}

impl Credentials {
    /// Build from optional raw strings; empty or whitespace-only values count as missing.
    pub fn resolve(
        reddit_client_id: Option<String>,
        reddit_client_secret: Option<String>,
        youtube_api_key: Option<String>,
    ) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let reddit = match (present(reddit_client_id), present(reddit_client_secret)) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };
        Self {
            reddit,
            youtube_api_key: present(youtube_api_key),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("reddit", &self.reddit)
            .field("youtube_api_key", &self.youtube_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_apply_to_missing_keys() {
        let settings = Settings::from_yaml("sources:\n  reddit:\n    enabled: true\n").unwrap();
        assert_eq!(settings.run.max_items_per_source, 20);
        assert_eq!(settings.run.out_dir, PathBuf::from("data"));
        assert_eq!(settings.run.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(settings.run.timeout_secs, 30);

        let reddit = settings.sources.reddit.unwrap();
        assert!(reddit.enabled);
        assert!(reddit.subreddits.is_empty());
        assert_eq!(reddit.request_delay(), Duration::from_secs(1));
        assert!(settings.sources.youtube.is_none());
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
run:
  out_dir: out
  max_items_per_source: 5
sources:
  reddit:
    enabled: false
    subreddits: [SideProject, startups]
  youtube:
    enabled: true
    search_terms: ["startup ideas", "saas"]
    request_delay_ms: 250
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.run.max_items_per_source, 5);
        assert_eq!(settings.enabled_sources(), vec!["youtube"]);
        let yt = settings.sources.youtube.unwrap();
        assert_eq!(yt.search_terms, vec!["startup ideas", "saas"]);
        assert_eq!(yt.request_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_max_items_rejected() {
        let err = Settings::from_yaml("run:\n  max_items_per_source: 0\n").unwrap_err();
        assert!(matches!(err, CollectError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Settings::from_yaml("run:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, CollectError::InvalidConfig(_)));
    }

    #[test]
    fn test_youtube_share_above_search_ceiling_rejected() {
        let yaml = "run:\n  max_items_per_source: 120\nsources:\n  youtube:\n    enabled: true\n    search_terms: [a, b]\n";
        let err = Settings::from_yaml(yaml).unwrap_err();
        match err {
            CollectError::InvalidConfig(msg) => assert!(msg.contains("50")),
            other => panic!("unexpected error: {other}"),
        }

        // 100 over two terms is exactly 50 per search: allowed.
        let at_limit = yaml.replace("120", "100");
        assert!(Settings::from_yaml(&at_limit).is_ok());

        // Disabled YouTube and Reddit-only runs are not bound by the ceiling.
        let disabled = yaml.replace("enabled: true", "enabled: false");
        assert!(Settings::from_yaml(&disabled).is_ok());
        let reddit_only = "run:\n  max_items_per_source: 500\nsources:\n  reddit:\n    enabled: true\n";
        assert!(Settings::from_yaml(reddit_only).is_ok());
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = Settings::from_yaml("run:\n  max_items_per_source: lots\n").unwrap_err();
        assert!(matches!(err, CollectError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, CollectError::ConfigNotFound(p) if p == path));
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "run:\n  max_items_per_source: [1, 2]\n").unwrap();
        match Settings::load(&path).unwrap_err() {
            CollectError::ConfigParse { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_dir_relative_to_config() {
        let settings = Settings::default();
        let resolved = settings.out_dir(Path::new("/etc/collector/config.yml"));
        assert_eq!(resolved, PathBuf::from("/etc/collector/data"));

        let mut absolute = Settings::default();
        absolute.run.out_dir = PathBuf::from("/var/snapshots");
        assert_eq!(
            absolute.out_dir(Path::new("/etc/collector/config.yml")),
            PathBuf::from("/var/snapshots")
        );
    }

    #[test]
    fn test_enabled_sources_order() {
        let yaml = "sources:\n  reddit:\n    enabled: true\n  youtube:\n    enabled: true\n";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.enabled_sources(), vec!["youtube", "reddit"]);
        assert!(Settings::default().enabled_sources().is_empty());
    }

    #[test]
    fn test_credentials_treat_empty_as_missing() {
        let creds = Credentials::resolve(
            Some("id".to_string()),
            Some("  ".to_string()),
            Some("key".to_string()),
        );
        assert!(creds.reddit.is_none());
        assert_eq!(creds.youtube_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::resolve(
            Some("id".to_string()),
            Some("hunter2".to_string()),
            Some("yt-key".to_string()),
        );
        let shown = format!("{creds:?}");
        assert!(shown.contains("id"));
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("yt-key"));
    }
}
