//! A set of helpers for testing

mod aircraft;
mod sighting;
mod subscriber;

pub use aircraft::{AircraftStateBuilder, feed_body, state_row};
pub use sighting::SightingBuilder;
pub use subscriber::SubscriberBuilder;
