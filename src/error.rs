// Typed error channels for classification and watch start.
//
// Everything else in the crate uses anyhow; these two enums exist because
// callers branch on the variant (retry vs. refuse to watch).

use thiserror::Error;

use crate::twitter::users::ApiProblem;

/// Why an account could not be classified.
#[derive(Debug, Clone, Error)]
pub enum ClassificationError {
    /// Network, 5xx, timeout, or malformed body. Retry on the next cycle.
    #[error("account lookup failed, will retry: {0}")]
    Transient(String),

    /// The platform refused the request for a reason other than a missing
    /// account (bad credentials, invalid request). Retrying won't help.
    #[error("account lookup rejected: {0}")]
    Rejected(ApiProblem),
}

impl ClassificationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ClassificationError::Transient(_))
    }
}

/// Reasons a watch refuses to start.
#[derive(Debug, Clone, Error)]
pub enum WatchError {
    #[error("@{handle} has been banned; cannot watch a banned account")]
    Banned { handle: String },

    #[error("@{handle} not found")]
    NotFound { handle: String },

    #[error("cannot watch @{handle}: {problem}")]
    Rejected { handle: String, problem: ApiProblem },
}
