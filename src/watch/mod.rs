// Watching — new-post detection and the polling loop around it.

pub mod detector;
pub mod poller;
