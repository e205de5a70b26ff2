use std::collections::BTreeSet;
use std::fmt;

use crate::twitter::users::PublicMetrics;

/// A visibility or moderation marker on a live account.
///
/// Declaration order is the display order of composite labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusFlag {
    Private,
    Verified,
    Withheld,
    Sensitive,
}

impl StatusFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFlag::Private => "PRIVATE",
            StatusFlag::Verified => "VERIFIED",
            StatusFlag::Withheld => "WITHHELD",
            StatusFlag::Sensitive => "SENSITIVE",
        }
    }
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an account's state from one classification.
///
/// Fields are private so the invariant holds: a banned account does not
/// exist and carries no flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountStatus {
    exists: bool,
    banned: bool,
    flags: BTreeSet<StatusFlag>,
    followers: u64,
    following: u64,
    post_count: u64,
}

impl AccountStatus {
    /// A suspended account.
    pub fn banned() -> Self {
        Self {
            exists: false,
            banned: true,
            flags: BTreeSet::new(),
            followers: 0,
            following: 0,
            post_count: 0,
        }
    }

    /// An account that never existed or was deleted.
    pub fn not_found() -> Self {
        Self {
            banned: false,
            ..Self::banned()
        }
    }

    /// A live account with the given flags and counters.
    pub fn active(flags: impl IntoIterator<Item = StatusFlag>, metrics: PublicMetrics) -> Self {
        Self {
            exists: true,
            banned: false,
            flags: flags.into_iter().collect(),
            followers: metrics.followers_count,
            following: metrics.following_count,
            post_count: metrics.tweet_count,
        }
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_banned(&self) -> bool {
        self.banned
    }

    pub fn flags(&self) -> &BTreeSet<StatusFlag> {
        &self.flags
    }

    pub fn has(&self, flag: StatusFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn followers(&self) -> u64 {
        self.followers
    }

    pub fn following(&self) -> u64 {
        self.following
    }

    pub fn post_count(&self) -> u64 {
        self.post_count
    }

    /// A copy of this status with `flag` added. No-op for accounts that
    /// don't exist.
    pub fn with_flag(mut self, flag: StatusFlag) -> Self {
        if self.exists {
            self.flags.insert(flag);
        }
        self
    }

    /// Human-readable label: `"BANNED"`, `"NOT FOUND"`, `"PUBLIC"`, or the
    /// flags joined by `" | "`.
    pub fn label(&self) -> String {
        if self.banned {
            return "BANNED".to_string();
        }
        if !self.exists {
            return "NOT FOUND".to_string();
        }
        if self.flags.is_empty() {
            return "PUBLIC".to_string();
        }
        self.flags
            .iter()
            .map(StatusFlag::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Label shown when classification itself failed transiently.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";
