// Twitter API v2 client — bearer-token HTTP over reqwest.
//
// Only the two read endpoints the watcher needs are wrapped. Every request
// goes through the shared rate limiter and is retried on 429.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::debug;

use super::posts::{self, Post, TWEET_FIELDS};
use super::rate_limit::{delay_until_reset, with_retry, RateLimited, RateLimiter};
use super::traits::{PlatformClient, UserLookupResult};
use super::users::{self, USER_FIELDS};

/// Default API root for Twitter API v2.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com/2";

/// Per-request timeout. Rate-limit waits happen outside of it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw status and body of an API response, before decoding.
struct ApiResponse {
    status: u16,
    body: String,
}

/// Authenticated client for the Twitter API v2 read endpoints.
pub struct TwitterClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
    limiter: RateLimiter,
}

impl TwitterClient {
    /// Create a client for the given API root using an app bearer token.
    pub fn new(base_url: &str, bearer_token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tweetsentry/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
            limiter: RateLimiter::default(),
        })
    }

    /// Issue one GET. A 429 becomes a `RateLimited` error so `with_retry`
    /// can recognize it; every other status is handed back for decoding.
    async fn send_get(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, path);

        debug!(path = path, "Twitter API GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Request failed: GET {path}"))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RateLimited {
                reset_after: reset_delay(response.headers()),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body: GET {path}"))?;

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        with_retry(&self.limiter, move || self.send_get(path, params)).await
    }
}

/// Read `x-rate-limit-reset` (unix seconds) into a wait duration.
fn reset_delay(headers: &HeaderMap) -> Option<Duration> {
    let reset_epoch = headers
        .get("x-rate-limit-reset")?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()?;
    Some(delay_until_reset(reset_epoch, chrono::Utc::now().timestamp()))
}

#[async_trait]
impl PlatformClient for TwitterClient {
    async fn lookup_user(&self, handle: &str) -> UserLookupResult {
        let path = format!("users/by/username/{handle}");

        match self.get(&path, &[("user.fields", USER_FIELDS)]).await {
            Ok(response) => users::decode_lookup(response.status, &response.body),
            Err(e) => UserLookupResult::Unreachable(format!("{e:#}")),
        }
    }

    async fn fetch_recent_posts(&self, user_id: &str, limit: usize) -> Result<Vec<Post>> {
        let path = format!("users/{user_id}/tweets");
        let max_results = posts::page_size(limit).to_string();

        let response = self
            .get(
                &path,
                &[("max_results", max_results.as_str()), ("tweet.fields", TWEET_FIELDS)],
            )
            .await?;

        let mut recent = posts::decode_timeline(response.status, &response.body)
            .with_context(|| format!("Failed to read timeline for user {user_id}"))?;
        // The endpoint's floor is 5; honor smaller samples by truncating.
        recent.truncate(limit);

        debug!(
            user_id = user_id,
            count = recent.len(),
            "Fetched recent posts"
        );

        Ok(recent)
    }
}
