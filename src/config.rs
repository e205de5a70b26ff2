use std::env;
use std::time::Duration;

use anyhow::Result;

use crate::watch::poller::WatchSettings;

/// Poll interval used when none is given or the given one is unusable.
pub const DEFAULT_INTERVAL_SECS: u64 = 180;

/// Posts sampled per cycle (and for the start-time sensitivity check).
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file is
/// loaded at startup via dotenvy, before `load` runs. Nothing else in the
/// crate reads the environment.
pub struct Config {
    /// App-only bearer token; the only credential the read endpoints use.
    pub bearer_token: String,
    /// API root (defaults to https://api.twitter.com/2).
    pub api_url: String,
    pub interval_secs: u64,
    pub sample_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let interval_secs = env::var("TWEETSENTRY_INTERVAL")
            .ok()
            .and_then(|raw| parse_interval(&raw))
            .unwrap_or(DEFAULT_INTERVAL_SECS);

        let sample_size = env::var("TWEETSENTRY_SAMPLE_SIZE")
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_SAMPLE_SIZE);

        Ok(Self {
            bearer_token: env::var("TWITTER_BEARER_TOKEN").unwrap_or_default(),
            api_url: env::var("TWITTER_API_URL")
                .unwrap_or_else(|_| crate::twitter::client::DEFAULT_API_URL.to_string()),
            interval_secs,
            sample_size,
        })
    }

    /// Check that the bearer token is configured.
    /// Call this before any operation that talks to the API.
    pub fn require_bearer(&self) -> Result<()> {
        if self.bearer_token.is_empty() {
            anyhow::bail!(
                "TWITTER_BEARER_TOKEN not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Watch settings, with an optional interval override from the command line.
    pub fn watch_settings(&self, interval_override: Option<u64>) -> WatchSettings {
        WatchSettings {
            interval: Duration::from_secs(interval_override.unwrap_or(self.interval_secs)),
            sample_size: self.sample_size,
        }
    }
}

/// Parse a poll interval in whole seconds.
///
/// Blank, non-numeric, and zero all give `None`; callers fall back to
/// [`DEFAULT_INTERVAL_SECS`].
pub fn parse_interval(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}
