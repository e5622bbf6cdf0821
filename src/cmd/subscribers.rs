use clap::{Args, Subcommand};

use super::CommandError;
use crate::{models::SubscriberGeofence, persistence::SqliteSubscriberStore};

/// Manages the subscriber store.
#[derive(Args, Debug)]
pub struct SubscribersArgs {
    #[command(subcommand)]
    command: SubscribersCommand,
}

#[derive(Subcommand, Debug)]
enum SubscribersCommand {
    /// Adds a subscriber, or moves an existing one.
    Add {
        /// Subscriber identifier (e.g. an email address).
        #[arg(long)]
        id: String,
        /// Center latitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Center longitude in degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Geofence radius in kilometers.
        #[arg(long)]
        radius: f64,
    },
    /// Lists every subscriber.
    List,
    /// Removes a subscriber.
    Remove {
        /// Subscriber identifier.
        #[arg(long)]
        id: String,
    },
    /// Stops notifying a subscriber without removing it.
    Pause {
        /// Subscriber identifier.
        #[arg(long)]
        id: String,
    },
    /// Resumes a paused subscriber.
    Resume {
        /// Subscriber identifier.
        #[arg(long)]
        id: String,
    },
}

/// Executes a subscriber management command and returns the lines to print.
pub async fn execute(
    args: SubscribersArgs,
    store: &SqliteSubscriberStore,
) -> Result<Vec<String>, CommandError> {
    let output = match args.command {
        SubscribersCommand::Add { id, lat, lon, radius } => {
            let subscriber = SubscriberGeofence::new(id, lat, lon, radius);
            store.add_subscriber(&subscriber).await?;
            vec![format!("Saved subscriber '{}'.", subscriber.id)]
        }
        SubscribersCommand::List => store
            .list_subscribers()
            .await?
            .iter()
            .map(|s| format!("{}\t{:.4}\t{:.4}\t{} km", s.id, s.latitude, s.longitude, s.radius_km))
            .collect(),
        SubscribersCommand::Remove { id } => {
            store.remove_subscriber(&id).await?;
            vec![format!("Removed subscriber '{id}'.")]
        }
        SubscribersCommand::Pause { id } => {
            store.set_active(&id, false).await?;
            vec![format!("Paused subscriber '{id}'.")]
        }
        SubscribersCommand::Resume { id } => {
            store.set_active(&id, true).await?;
            vec![format!("Resumed subscriber '{id}'.")]
        }
    };
    Ok(output)
}
