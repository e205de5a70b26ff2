// Platform client trait — the seam between the watcher and the network.
//
// `TwitterClient` implements it over HTTP. Tests implement it with canned
// responses so the classifier and the watch loop run without network access.

use anyhow::Result;
use async_trait::async_trait;

use super::posts::Post;
use super::users::{ApiProblem, UserProfile};

/// Outcome of a "get user by handle" request, already decoded.
#[derive(Debug, Clone)]
pub enum UserLookupResult {
    /// The platform returned the account's attributes.
    Found(UserProfile),
    /// A structured "not found" problem. The detail text says why
    /// (plain missing account, or suspended).
    NotFound(ApiProblem),
    /// Any other structured problem (unauthorized, bad request, ...).
    Rejected(ApiProblem),
    /// Transport-level failure: timeout, 5xx, malformed body.
    /// Worth retrying later.
    Unreachable(String),
}

/// The two read capabilities the watcher needs from the platform.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Look up an account by its public handle.
    async fn lookup_user(&self, handle: &str) -> UserLookupResult;

    /// Fetch up to `limit` of the account's most recent posts, newest first.
    /// May return an empty list.
    async fn fetch_recent_posts(&self, user_id: &str, limit: usize) -> Result<Vec<Post>>;
}
