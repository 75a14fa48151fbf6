//! Command-line interface definitions for the idea collector.
//!
//! Credentials can be given as flags, but normally come from the environment
//! (or a `.env` file loaded before parsing).

use crate::config::Credentials;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the idea collector.
///
/// # Examples
///
/// ```sh
/// # Use ./config.yml and credentials from the environment
/// idea_collector
///
/// # Explicit settings file and output name
/// idea_collector -c /etc/ideas/config.yml -o latest.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML settings file
    #[arg(short, long, default_value = "config.yml")]
    pub config: PathBuf,

    /// Snapshot filename inside the output directory (default: YYYY-MM-DD_HH-MM-SS.json)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override run.max_items_per_source
    #[arg(short, long, value_parser = clap::value_parser!(usize))]
    pub max_items: Option<usize>,

    /// Reddit application client id
    #[arg(long, env = "REDDIT_CLIENT_ID", hide_env_values = true)]
    pub reddit_client_id: Option<String>,

    /// Reddit application client secret
    #[arg(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    pub reddit_client_secret: Option<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,
}

impl Cli {
    /// Resolve the credential flags (or their environment fallbacks).
    ///
    /// # Returns
    ///
    /// [`Credentials`] with empty or whitespace-only values treated as absent.
    /// Reddit credentials are present only when both the id and secret are.
    pub fn credentials(&self) -> Credentials {
        Credentials::resolve(
            self.reddit_client_id.clone(),
            self.reddit_client_secret.clone(),
            self.youtube_api_key.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["idea_collector"]);
        assert_eq!(cli.config, PathBuf::from("config.yml"));
        assert!(cli.output.is_none());
        assert!(cli.max_items.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "idea_collector",
            "-c",
            "/tmp/config.yml",
            "-o",
            "latest.json",
            "-m",
            "7",
        ]);
        assert_eq!(cli.config, PathBuf::from("/tmp/config.yml"));
        assert_eq!(cli.output.as_deref(), Some("latest.json"));
        assert_eq!(cli.max_items, Some(7));
    }

    #[test]
    fn test_cli_credential_flags() {
        let cli = Cli::parse_from([
            "idea_collector",
            "--reddit-client-id",
            "id",
            "--reddit-client-secret",
            "secret",
            "--youtube-api-key",
            "key",
        ]);
        let creds = cli.credentials();
        assert_eq!(creds.reddit.unwrap().client_secret, "secret");
        assert_eq!(creds.youtube_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_cli_credentials_need_both_reddit_halves() {
        let cli = Cli::parse_from([
            "idea_collector",
            "--reddit-client-id",
            "id",
            "--reddit-client-secret",
            "",
            "--youtube-api-key",
            " ",
        ]);
        let creds = cli.credentials();
        assert!(creds.reddit.is_none());
        assert!(creds.youtube_api_key.is_none());
    }

    #[test]
    fn test_cli_rejects_non_numeric_max_items() {
        assert!(Cli::try_parse_from(["idea_collector", "--max-items", "lots"]).is_err());
    }
}
