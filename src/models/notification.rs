//! Notification message templates.

use serde::{Deserialize, Serialize};

/// A message to be sent in a notification, with a title and body.
///
/// Both fields are minijinja templates rendered against a `Sighting`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationMessage {
    /// The title of the notification message.
    pub title: String,
    /// The body content of the notification message.
    pub body: String,
}

impl Default for NotificationMessage {
    fn default() -> Self {
        Self {
            title: "Aircraft {{ callsign or icao24 }} near you".to_string(),
            body: concat!(
                "{{ callsign or 'Unknown callsign' }} ({{ icao24 }})",
                "{% if airline %} operated by {{ airline }}{% endif %}",
                " is {{ distance_km | round(2) }} km away",
                " at {{ latitude | round(4) }}, {{ longitude | round(4) }}",
                "{% if altitude_m %}, altitude {{ altitude_m | round | int }} m{% endif %}",
                "{% if direction %}, heading {{ direction }}{% endif %}."
            )
            .to_string(),
        }
    }
}
