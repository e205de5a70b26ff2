// Account classification — turns a user lookup into a normalized status.
//
// `status` holds the value types, `classifier` the pure rules, and
// `account` the network-facing step that looks a handle up, samples its
// timeline, and applies both.

pub mod account;
pub mod classifier;
pub mod status;
