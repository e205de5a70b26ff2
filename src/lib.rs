// TweetSentry: watch a Twitter/X account for new posts and moderation changes.
//
// This is the library root. `twitter` is the platform boundary, `classify`
// turns lookups into an account status, `watch` runs the polling loop.

pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod twitter;
pub mod watch;
