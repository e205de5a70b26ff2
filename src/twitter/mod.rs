// Twitter API v2 client — user lookup, timeline fetching, rate limiting.
//
// Everything that touches the wire lives here. Raw JSON is decoded into the
// typed structures in `users` and `posts` before the rest of the crate sees
// it, so the classifier and the watch loop only ever handle validated data.

pub mod client;
pub mod posts;
pub mod rate_limit;
pub mod traits;
pub mod users;
