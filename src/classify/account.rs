// Account inspection — look a handle up and classify it.
//
// Mirrors what the watcher needs at start time: the status (to decide
// whether to watch at all) and the profile (for the user id to poll).

use tracing::{debug, info, warn};

use super::classifier::{classify, enrich_with_sensitivity};
use super::status::AccountStatus;
use crate::error::{ClassificationError, WatchError};
use crate::twitter::traits::{PlatformClient, UserLookupResult};
use crate::twitter::users::UserProfile;

/// Result of inspecting one account.
#[derive(Debug, Clone)]
pub struct AccountReport {
    pub handle: String,
    /// Present only when the account exists.
    pub profile: Option<UserProfile>,
    pub status: AccountStatus,
}

impl AccountReport {
    /// Refuse banned and missing accounts; hand back the profile otherwise.
    pub fn into_watchable(self) -> Result<UserProfile, WatchError> {
        if self.status.is_banned() {
            return Err(WatchError::Banned {
                handle: self.handle,
            });
        }
        match self.profile {
            Some(profile) if self.status.exists() => Ok(profile),
            _ => Err(WatchError::NotFound {
                handle: self.handle,
            }),
        }
    }
}

/// Look up `handle`, classify it, and fold in sensitivity from a sample of
/// up to `sample_size` recent posts.
///
/// A failed post sample is logged and ignored: it only leaves `Sensitive`
/// unset.
pub async fn inspect_account<P>(
    client: &P,
    handle: &str,
    sample_size: usize,
) -> Result<AccountReport, ClassificationError>
where
    P: PlatformClient + ?Sized,
{
    let lookup = client.lookup_user(handle).await;
    let status = classify(&lookup)?;

    let profile = match lookup {
        UserLookupResult::Found(profile) => profile,
        _ => {
            info!(handle = handle, status = %status, "Account is not live");
            return Ok(AccountReport {
                handle: handle.to_string(),
                profile: None,
                status,
            });
        }
    };

    let status = if sample_size == 0 {
        status
    } else {
        match client.fetch_recent_posts(&profile.id, sample_size).await {
            Ok(posts) => {
                debug!(handle = handle, sampled = posts.len(), "Sampled posts for sensitivity");
                enrich_with_sensitivity(status, &posts)
            }
            Err(e) => {
                warn!(handle = handle, error = %e, "Post sample failed; sensitivity unknown");
                status
            }
        }
    };

    info!(handle = handle, status = %status, "Classified account");

    Ok(AccountReport {
        handle: handle.to_string(),
        profile: Some(profile),
        status,
    })
}
