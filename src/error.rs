//! Error types for the collector.
//!
//! Two layers of failure exist:
//!
//! - [`FetchError`]: a single HTTP request went wrong. Fetchers swallow these
//!   per query target and move on to the next one.
//! - [`CollectError`]: something broke at the run or source level (settings,
//!   credentials, authentication, output). The collector isolates the
//!   source-level variants; `main` turns the rest into exit code 1.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of one request against a provider.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection failure, timeout, or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not the JSON we expected.
    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Run-level and source-level failures.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Config {} is not valid YAML: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A credential needed to construct a fetcher is absent or empty.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// The provider refused to hand out a token.
    #[error("{provider} auth failed: {reason}")]
    Auth {
        provider: &'static str,
        reason: String,
    },

    #[error("No sources enabled in config")]
    NoSourcesEnabled,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        assert_eq!(FetchError::Status(503).to_string(), "HTTP status 503");
    }

    #[test]
    fn test_auth_error_names_provider() {
        let e = CollectError::Auth {
            provider: "reddit",
            reason: "HTTP status 401".to_string(),
        };
        assert_eq!(e.to_string(), "reddit auth failed: HTTP status 401");
    }

    #[test]
    fn test_config_not_found_shows_path() {
        let e = CollectError::ConfigNotFound(PathBuf::from("/tmp/missing.yml"));
        assert_eq!(e.to_string(), "Config not found: /tmp/missing.yml");
    }
}
