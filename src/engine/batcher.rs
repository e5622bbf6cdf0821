//! Greedy spatial grouping of subscribers into shared feed queries.
//!
//! Subscribers are visited in input order. Each unassigned subscriber seeds a
//! new batch that absorbs every later unassigned subscriber within the
//! clustering threshold of the seed. Membership depends on seed choice and
//! order, so this bounds the number of queries without minimizing it.

use crate::{
    geo::{self, BoundingBox},
    models::SubscriberGeofence,
};

/// A group of nearby subscribers served by one feed query.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberBatch {
    /// Members in input order; the first one is the seed.
    pub members: Vec<SubscriberGeofence>,
    /// Box sent to the feed.
    pub query_box: BoundingBox,
    /// `max(member radius) + buffer`, measured from the seed center.
    pub query_radius_km: f64,
}

impl SubscriberBatch {
    /// The subscriber that seeded the batch.
    pub fn seed(&self) -> &SubscriberGeofence {
        &self.members[0]
    }
}

/// Builds [`SubscriberBatch`]es.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubscriberBatcher {
    clustering_threshold_km: f64,
    buffer_km: f64,
}

impl SubscriberBatcher {
    /// Creates a batcher. `buffer_km` is added around every query.
    pub fn new(clustering_threshold_km: f64, buffer_km: f64) -> Self {
        Self { clustering_threshold_km, buffer_km }
    }

    /// Groups `subscribers` into batches. Every input lands in exactly one
    /// batch and batches come out in seed order.
    pub fn batch(&self, subscribers: &[SubscriberGeofence]) -> Vec<SubscriberBatch> {
        let mut assigned = vec![false; subscribers.len()];
        let mut batches = Vec::new();

        for seed_index in 0..subscribers.len() {
            if assigned[seed_index] {
                continue;
            }
            assigned[seed_index] = true;
            let seed = &subscribers[seed_index];
            let mut members = vec![seed.clone()];

            for (index, candidate) in subscribers.iter().enumerate().skip(seed_index + 1) {
                if assigned[index] {
                    continue;
                }
                let distance = seed.distance_to(candidate.latitude, candidate.longitude);
                if distance <= self.clustering_threshold_km {
                    assigned[index] = true;
                    members.push(candidate.clone());
                }
            }

            batches.push(self.finish(members));
        }

        batches
    }

    fn finish(&self, members: Vec<SubscriberGeofence>) -> SubscriberBatch {
        let seed = &members[0];
        let max_radius = members.iter().map(|m| m.radius_km).fold(f64::MIN, f64::max);
        let query_radius_km = max_radius + self.buffer_km;

        // The seed-centered box alone misses members whose circle extends past
        // it, so each member's own buffered box is folded in.
        let query_box = members.iter().fold(
            geo::bounding_box(seed.latitude, seed.longitude, query_radius_km),
            |acc, member| acc.union(&member.bounding_box(self.buffer_km)),
        );

        SubscriberBatch { members, query_box, query_radius_km }
    }
}
