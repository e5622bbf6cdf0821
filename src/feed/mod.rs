//! Access to the upstream aircraft-position feed.

mod opensky;
mod traits;

pub use opensky::{FeedResponse, OpenSkyFeedClient};
#[cfg(test)]
pub use traits::MockAircraftFeed;
pub use traits::{AircraftFeed, FeedError, FeedRequestError};
