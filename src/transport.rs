//! HTTP access for the source fetchers.
//!
//! Fetchers never touch `reqwest` directly; they go through the [`Transport`]
//! trait so a run against the real APIs and a run against scripted responses
//! share exactly the same pipeline code.
//!
//! - [`Transport`]: JSON-over-HTTP operations the fetchers need
//! - [`ApiClient`]: the `reqwest` implementation used by the binary

use crate::error::{CollectError, FetchError};
use crate::utils::truncate_for_log;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// JSON-over-HTTP operations used by the fetchers.
///
/// Both methods resolve to the decoded JSON body on a success status and to
/// [`FetchError::Status`] otherwise. Implementations attach the client's
/// user-agent to every request.
pub trait Transport {
    /// `GET url?query`, optionally with a bearer token.
    async fn get_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<Value, FetchError>;

    /// `POST url` with a form body and HTTP basic auth.
    async fn post_form(
        &self,
        url: &str,
        basic_auth: (&str, &str),
        form: &[(&str, &str)],
    ) -> Result<Value, FetchError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
pub struct ApiClient {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client that sends `user_agent` on every request and gives up
    /// on any request after `timeout`.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
            timeout,
        })
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Check the status, then decode the body as JSON.
async fn decode_response(resp: reqwest::Response) -> Result<Value, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        debug!(
            error = %e,
            body_preview = %truncate_for_log(&body, 300),
            "Response body is not JSON"
        );
        FetchError::Decode(e)
    })
}

impl Transport for ApiClient {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        let t0 = Instant::now();
        let mut req = self.client.get(url).query(query);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let res = match req.send().await {
            Ok(resp) => decode_response(resp).await,
            Err(e) => Err(e.into()),
        };
        let dt = t0.elapsed();

        match &res {
            Ok(_) => debug!(elapsed_ms = dt.as_millis() as u64, "GET succeeded"),
            Err(e) => warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "GET failed"),
        }
        res
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn post_form(
        &self,
        url: &str,
        basic_auth: (&str, &str),
        form: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        let (user, password) = basic_auth;
        let resp = self
            .client
            .post(url)
            .basic_auth(user, Some(password))
            .form(form)
            .send()
            .await?;
        decode_response(resp).await
    }
}
