//! Data models shared by the monitoring engine and its collaborators.

pub mod aircraft;
pub mod airline;
pub mod cycle;
pub mod notification;
pub mod notifier;
pub mod sighting;
pub mod subscriber;

pub use aircraft::AircraftState;
pub use cycle::{CycleResult, CycleState, SubscriberResult};
pub use sighting::{BatchContext, Sighting, SightingKey};
pub use subscriber::SubscriberGeofence;
