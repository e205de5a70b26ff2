// User lookup decoding — `GET /2/users/by/username/:handle`.
//
// The endpoint answers in three shapes: a `data` object for a live account,
// an `errors` array (HTTP 200) for missing or suspended accounts, and an
// RFC 7807 problem body for request-level failures such as a bad token.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::traits::UserLookupResult;
use crate::output::truncate_chars;

/// Fields requested on every user lookup.
pub const USER_FIELDS: &str = "protected,verified,public_metrics,withheld";

/// Twitter handles are 1-15 characters of ASCII letters, digits, and underscore.
const MAX_HANDLE_LEN: usize = 15;

/// Follower/following/post counters for an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PublicMetrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub following_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tweet_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub listed_count: u64,
}

/// An account as the rest of the crate sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub protected: bool,
    pub verified: bool,
    /// The lookup carried a non-empty `withheld` object.
    pub withheld: bool,
    /// Country codes listed in that object, when it names any.
    pub withheld_in: Vec<String>,
    /// Profile-level sensitivity marker. Informational only; the
    /// `Sensitive` status flag comes from sampled posts.
    pub possibly_sensitive: bool,
    pub metrics: PublicMetrics,
}

/// A structured problem reported by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiProblem {
    pub title: String,
    pub detail: String,
    /// Problem type URI, e.g. `https://api.twitter.com/2/problems/resource-not-found`.
    pub kind: Option<String>,
}

impl ApiProblem {
    /// Whether this problem means "there is no account to look at".
    ///
    /// Twitter reports suspended accounts with title "Forbidden" but the
    /// resource-not-found problem type, so all three signals are checked.
    pub fn is_not_found(&self) -> bool {
        self.title == "Not Found Error"
            || self
                .kind
                .as_deref()
                .is_some_and(|k| k.ends_with("resource-not-found"))
            || self.mentions_suspension()
    }

    /// Whether the detail text says the account was suspended (any case).
    pub fn mentions_suspension(&self) -> bool {
        self.detail.to_lowercase().contains("suspended")
    }
}

impl fmt::Display for ApiProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{}: {}", self.title, self.detail)
        }
    }
}

// -- Serde types for the lookup response --

/// Treat an explicit `null` like a missing key. Pair with `#[serde(default)]`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
struct LookupEnvelope {
    data: Option<UserData>,
    #[serde(default, deserialize_with = "null_as_default")]
    errors: Vec<ProblemData>,
    // Top-level problem fields (RFC 7807 body on 4xx)
    title: Option<String>,
    detail: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct UserData {
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    protected: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    verified: bool,
    // Kept raw: any non-empty value marks the account, whatever keys it has.
    #[serde(default)]
    withheld: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    possibly_sensitive: bool,
    public_metrics: Option<PublicMetrics>,
}

/// Whether a `withheld` value carries anything. `null`, `false`, `{}`, `[]`
/// and `""` all mean unrestricted.
fn is_withheld(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Object(fields) => !fields.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(text) => !text.is_empty(),
        Value::Number(_) => true,
    }
}

/// Country codes from a `withheld` object. Non-string entries are skipped.
fn withheld_countries(value: &Value) -> Vec<String> {
    value
        .get("country_codes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// One entry of an `errors` array. Shared with the timeline decoder.
#[derive(Deserialize)]
pub(crate) struct ProblemData {
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    detail: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl From<ProblemData> for ApiProblem {
    fn from(p: ProblemData) -> Self {
        ApiProblem {
            title: p.title,
            detail: p.detail,
            kind: p.kind,
        }
    }
}

impl From<UserData> for UserProfile {
    fn from(u: UserData) -> Self {
        UserProfile {
            id: u.id,
            username: u.username,
            name: u.name,
            protected: u.protected,
            verified: u.verified,
            withheld: is_withheld(&u.withheld),
            withheld_in: withheld_countries(&u.withheld),
            possibly_sensitive: u.possibly_sensitive,
            metrics: u.public_metrics.unwrap_or_default(),
        }
    }
}

/// Decode a user lookup response body into a `UserLookupResult`.
///
/// Server errors and bodies that don't parse are `Unreachable` (retry later);
/// they never turn into a permanent "not found".
pub fn decode_lookup(status: u16, body: &str) -> UserLookupResult {
    if status >= 500 {
        return UserLookupResult::Unreachable(format!(
            "server returned {status}: {}",
            truncate_chars(body, 200)
        ));
    }

    let envelope: LookupEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return UserLookupResult::Unreachable(format!(
                "malformed user lookup response ({status}): {e}"
            ))
        }
    };

    if let Some(user) = envelope.data {
        return UserLookupResult::Found(user.into());
    }

    if let Some(problem) = envelope.errors.into_iter().next() {
        let problem = ApiProblem::from(problem);
        return if problem.is_not_found() {
            UserLookupResult::NotFound(problem)
        } else {
            UserLookupResult::Rejected(problem)
        };
    }

    match envelope.title {
        Some(title) => UserLookupResult::Rejected(ApiProblem {
            title,
            detail: envelope.detail.unwrap_or_default(),
            kind: envelope.kind,
        }),
        None => UserLookupResult::Unreachable(format!(
            "user lookup response ({status}) carried neither data nor errors"
        )),
    }
}

/// Normalize user input into a bare handle: trims whitespace and a leading `@`,
/// then checks the platform's handle alphabet.
pub fn normalize_handle(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);

    if handle.is_empty() {
        anyhow::bail!("No handle given");
    }
    if handle.len() > MAX_HANDLE_LEN
        || !handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        anyhow::bail!(
            "'{handle}' is not a valid handle (1-{MAX_HANDLE_LEN} letters, digits, or underscores)"
        );
    }

    Ok(handle.to_string())
}
