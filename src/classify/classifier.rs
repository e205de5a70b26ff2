// Classification rules — pure functions over already-decoded lookups.
//
// No I/O here. `account::inspect_account` feeds these from the network.

use super::status::{AccountStatus, StatusFlag};
use crate::error::ClassificationError;
use crate::twitter::posts::Post;
use crate::twitter::traits::UserLookupResult;
use crate::twitter::users::UserProfile;

/// Derive an account status from a user lookup.
///
/// Transport failures are `Transient`, never "not found". A not-found
/// problem whose detail mentions suspension is a ban. `Sensitive` is never
/// set here; see [`enrich_with_sensitivity`].
pub fn classify(lookup: &UserLookupResult) -> Result<AccountStatus, ClassificationError> {
    match lookup {
        UserLookupResult::Unreachable(reason) => {
            Err(ClassificationError::Transient(reason.clone()))
        }
        UserLookupResult::Rejected(problem) => Err(ClassificationError::Rejected(problem.clone())),
        UserLookupResult::NotFound(problem) => {
            if problem.mentions_suspension() {
                Ok(AccountStatus::banned())
            } else {
                Ok(AccountStatus::not_found())
            }
        }
        UserLookupResult::Found(user) => Ok(AccountStatus::active(flags_for(user), user.metrics)),
    }
}

fn flags_for(user: &UserProfile) -> Vec<StatusFlag> {
    let mut flags = Vec::new();
    if user.protected {
        flags.push(StatusFlag::Private);
    }
    if user.verified {
        flags.push(StatusFlag::Verified);
    }
    if user.withheld {
        flags.push(StatusFlag::Withheld);
    }
    flags
}

/// Add `Sensitive` when any sampled post is marked sensitive.
///
/// An empty sample leaves the status untouched.
pub fn enrich_with_sensitivity(status: AccountStatus, recent_posts: &[Post]) -> AccountStatus {
    if recent_posts.iter().any(|post| post.sensitive) {
        status.with_flag(StatusFlag::Sensitive)
    } else {
        status
    }
}
