// New-post detection across polling cycles.
//
// The watermark is the id of the newest post seen so far. The first
// observation sets it silently; after that, any different newest id is a
// new post. Ids are compared for equality only.

use crate::twitter::posts::{Post, PostId};

/// Per-watch mutable state. Lives as long as one watch loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    last_seen: Option<PostId>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current watermark, if a baseline has been taken.
    pub fn last_seen(&self) -> Option<&PostId> {
        self.last_seen.as_ref()
    }
}

/// A post that appeared since the previous cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPostEvent {
    pub post: Post,
}

/// Compare the newest post in `latest` (newest-first) with the watermark.
///
/// Returns an event only when a baseline already existed and the newest id
/// differs from it. The watermark is never cleared.
pub fn detect(state: &mut WatchState, latest: &[Post]) -> Option<NewPostEvent> {
    let candidate = latest.first()?;

    match &state.last_seen {
        None => {
            state.last_seen = Some(candidate.id.clone());
            None
        }
        Some(seen) if *seen != candidate.id => {
            state.last_seen = Some(candidate.id.clone());
            Some(NewPostEvent {
                post: candidate.clone(),
            })
        }
        Some(_) => None,
    }
}
