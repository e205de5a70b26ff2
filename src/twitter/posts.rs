// Timeline decoding — `GET /2/users/:id/tweets`.
//
// Produces the simplified `Post` the watcher works with. The API returns
// posts newest-first; that order is preserved.

use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::users::{null_as_default, ApiProblem, ProblemData};
use crate::output::truncate_chars;

/// Fields requested on every timeline fetch.
pub const TWEET_FIELDS: &str = "created_at,public_metrics,possibly_sensitive";

/// The timeline endpoint rejects `max_results` outside this range.
pub const MIN_PAGE_SIZE: usize = 5;
pub const MAX_PAGE_SIZE: usize = 100;

/// Platform-assigned post identifier. Compared for equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        PostId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostMetrics {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
}

/// A simplified post — just the fields the watcher needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub created_at: Option<DateTime<Utc>>,
    pub text: String,
    pub sensitive: bool,
    pub metrics: PostMetrics,
}

/// Clamp a requested sample size into the range the endpoint accepts.
pub fn page_size(limit: usize) -> usize {
    limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

// -- Serde types for the timeline response --

#[derive(Deserialize)]
struct TimelineEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<TweetData>,
    #[serde(default, deserialize_with = "null_as_default")]
    errors: Vec<ProblemData>,
    title: Option<String>,
    detail: Option<String>,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    text: String,
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    possibly_sensitive: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    public_metrics: TweetMetricsData,
}

#[derive(Deserialize, Default)]
struct TweetMetricsData {
    #[serde(default, deserialize_with = "null_as_default")]
    like_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    retweet_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    reply_count: u64,
}

impl From<TweetData> for Post {
    fn from(t: TweetData) -> Self {
        Post {
            id: PostId(t.id),
            created_at: t.created_at,
            text: t.text,
            sensitive: t.possibly_sensitive,
            metrics: PostMetrics {
                likes: t.public_metrics.like_count,
                retweets: t.public_metrics.retweet_count,
                replies: t.public_metrics.reply_count,
            },
        }
    }
}

/// Decode a timeline response body, keeping the platform's newest-first order.
///
/// An account with no posts yields `Ok(vec![])` (the API omits `data`).
/// A response that carries only errors is an `Err`.
pub fn decode_timeline(status: u16, body: &str) -> Result<Vec<Post>> {
    if !(200..300).contains(&status) {
        anyhow::bail!(
            "timeline request returned {status}: {}",
            truncate_chars(body, 200)
        );
    }

    let envelope: TimelineEnvelope =
        serde_json::from_str(body).context("Failed to deserialize timeline response")?;

    if envelope.data.is_empty() {
        if let Some(problem) = envelope.errors.into_iter().next() {
            anyhow::bail!("timeline unavailable: {}", ApiProblem::from(problem));
        }
        if let Some(title) = envelope.title {
            anyhow::bail!(
                "timeline unavailable: {title}: {}",
                envelope.detail.unwrap_or_default()
            );
        }
    }

    Ok(envelope.data.into_iter().map(Post::from).collect())
}
