//! Drives one monitoring cycle.
//!
//! `Idle → LoadingSubscribers → Batching → Scanning → Aggregating → Idle`.
//! Batches are scanned sequentially with a pacing delay between feed queries.
//! The dedup cache is locked for the whole cycle; a second trigger arriving
//! meanwhile is rejected with [`OrchestratorError::CycleInProgress`].

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;

use super::{
    batcher::{SubscriberBatch, SubscriberBatcher},
    dedup_cache::DedupCache,
};
use crate::{
    config::MonitorConfig,
    feed::{AircraftFeed, FeedError},
    models::{
        AircraftState, BatchContext, CycleResult, CycleState, Sighting, SightingKey,
        SubscriberGeofence, SubscriberResult,
    },
    notification::NotificationSink,
    persistence::traits::SubscriberStore,
};

/// Errors that prevent a cycle from starting.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Another cycle currently owns the dedup cache.
    #[error("a monitoring cycle is already in progress")]
    CycleInProgress,
}

/// Runs monitoring cycles against a subscriber store, a feed and a sink.
pub struct CycleOrchestrator {
    store: Arc<dyn SubscriberStore>,
    feed: Arc<dyn AircraftFeed>,
    sink: Arc<dyn NotificationSink>,
    batcher: SubscriberBatcher,
    cache: Mutex<DedupCache>,
    state_tx: watch::Sender<CycleState>,
    expiry_ms: i64,
    inter_batch_delay: Duration,
    cycle_interval: Duration,
}

impl CycleOrchestrator {
    /// Creates an orchestrator with an empty dedup cache.
    ///
    /// `cycle_interval` is only used to flag cycles that overran it.
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        feed: Arc<dyn AircraftFeed>,
        sink: Arc<dyn NotificationSink>,
        config: &MonitorConfig,
        cycle_interval: Duration,
    ) -> Self {
        let (state_tx, _) = watch::channel(CycleState::Idle);
        Self {
            store,
            feed,
            sink,
            batcher: SubscriberBatcher::new(config.clustering_threshold_km, config.batch_buffer_km),
            cache: Mutex::new(DedupCache::new()),
            state_tx,
            expiry_ms: config.expiry_ms(),
            inter_batch_delay: config.inter_batch_delay,
            cycle_interval,
        }
    }

    /// The current phase.
    pub fn state(&self) -> CycleState {
        *self.state_tx.borrow()
    }

    /// A receiver that observes phase changes.
    pub fn subscribe_state(&self) -> watch::Receiver<CycleState> {
        self.state_tx.subscribe()
    }

    /// Number of tracked (subscriber, aircraft) pairs, or `None` while a
    /// cycle holds the cache.
    pub fn tracked_sightings(&self) -> Option<usize> {
        self.cache.try_lock().ok().map(|cache| cache.len())
    }

    /// Runs one cycle using the current time for dedup decisions.
    pub async fn run_cycle(
        &self,
        cancellation_token: &CancellationToken,
    ) -> Result<CycleResult, OrchestratorError> {
        self.run_cycle_at(Utc::now(), cancellation_token).await
    }

    /// Runs one cycle with dedup decisions made at `now`.
    #[tracing::instrument(skip_all, fields(started_at = %now))]
    pub async fn run_cycle_at(
        &self,
        now: DateTime<Utc>,
        cancellation_token: &CancellationToken,
    ) -> Result<CycleResult, OrchestratorError> {
        let mut cache = self.cache.try_lock().map_err(|_| OrchestratorError::CycleInProgress)?;
        let idle_on_drop = IdleOnDrop(self);
        let clock = tokio::time::Instant::now();

        let mut result = self.scan(&mut cache, now, cancellation_token).await;

        self.set_state(CycleState::Aggregating);
        let now_ms = now.timestamp_millis();
        result.evicted = cache.evict_expired(now_ms, self.expiry_ms);
        result.tracked_sightings = cache.len();
        result.total_planes = result.subscriber_results.iter().map(|r| r.planes_found).sum();
        result.new_planes = result.subscriber_results.iter().map(|r| r.new_planes).sum();

        let elapsed = clock.elapsed();
        result.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        result.overran = elapsed > self.cycle_interval;
        drop(cache);
        drop(idle_on_drop);

        if result.overran {
            tracing::error!(
                duration_ms = result.duration_ms,
                cycle_interval_ms = self.cycle_interval.as_millis() as u64,
                "Monitoring cycle took longer than the cycle interval; reduce batch count, \
                 feed timeout or retries."
            );
        }
        tracing::info!(
            subscribers = result.total_subscribers,
            batches = result.total_batches,
            feed_queries = result.feed_queries,
            planes = result.total_planes,
            new_planes = result.new_planes,
            evicted = result.evicted,
            tracked = result.tracked_sightings,
            cancelled = result.cancelled,
            duration_ms = result.duration_ms,
            "Monitoring cycle finished."
        );
        Ok(result)
    }

    async fn scan(
        &self,
        cache: &mut DedupCache,
        now: DateTime<Utc>,
        cancellation_token: &CancellationToken,
    ) -> CycleResult {
        let mut result = CycleResult::empty(now);

        self.set_state(CycleState::LoadingSubscribers);
        let subscribers = match self.store.list_active_subscribers().await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::error!(error = %e, "Subscriber store unavailable, skipping cycle.");
                result.store_error = Some(e.to_string());
                return result;
            }
        };
        result.total_subscribers = subscribers.len();
        if subscribers.is_empty() {
            tracing::debug!("No active subscribers.");
            return result;
        }

        self.set_state(CycleState::Batching);
        let mut valid = Vec::with_capacity(subscribers.len());
        for subscriber in subscribers {
            match subscriber.validate() {
                Ok(()) => valid.push(subscriber),
                Err(e) => {
                    tracing::warn!(subscriber_id = %subscriber.id, error = %e, "Skipping invalid geofence.");
                    result.subscriber_results.push(SubscriberResult::failed(&subscriber, e.to_string()));
                }
            }
        }
        let batches = self.batcher.batch(&valid);
        result.total_batches = batches.len();

        self.set_state(CycleState::Scanning);
        let mut batches = batches.into_iter().enumerate().peekable();
        while let Some((batch_index, batch)) = batches.next() {
            if cancellation_token.is_cancelled() {
                result.cancelled = true;
                result.subscriber_results.extend(unscanned(batch));
                continue;
            }

            result.feed_queries += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => None,
                fetched = self.feed.fetch_states(&batch.query_box) => Some(fetched),
            };
            let Some(fetched) = fetched else {
                tracing::warn!(batch = batch_index, "Feed query abandoned on cancellation.");
                result.cancelled = true;
                result.subscriber_results.extend(unscanned(batch));
                continue;
            };

            let batch_results = self.scan_batch(cache, now, batch_index, &batch, fetched).await;
            result.subscriber_results.extend(batch_results);

            if batches.peek().is_some() && !self.inter_batch_delay.is_zero() {
                tokio::select! {
                    _ = cancellation_token.cancelled() => {}
                    _ = tokio::time::sleep(self.inter_batch_delay) => {}
                }
            }
        }

        result
    }

    #[tracing::instrument(skip_all, fields(batch = batch_index, size = batch.members.len()))]
    async fn scan_batch(
        &self,
        cache: &mut DedupCache,
        now: DateTime<Utc>,
        batch_index: usize,
        batch: &SubscriberBatch,
        fetched: Result<Vec<AircraftState>, FeedError>,
    ) -> Vec<SubscriberResult> {
        let states = match fetched {
            Ok(states) => states,
            Err(e) => {
                tracing::error!(error = %e, "Feed unavailable for batch.");
                let message = e.to_string();
                return batch
                    .members
                    .iter()
                    .map(|member| SubscriberResult::failed(member, message.clone()))
                    .collect();
            }
        };

        let context = BatchContext {
            batch_index,
            batch_size: batch.members.len(),
            query_radius_km: batch.query_radius_km,
        };
        let now_ms = now.timestamp_millis();
        let mut results: Vec<_> = batch.members.iter().map(SubscriberResult::empty).collect();

        for aircraft in &states {
            let Some((latitude, longitude)) = aircraft.airborne_position() else {
                continue;
            };
            for (member, member_result) in batch.members.iter().zip(results.iter_mut()) {
                let distance_km = member.distance_to(latitude, longitude);
                if !(distance_km <= member.radius_km) {
                    continue;
                }
                member_result.planes_found += 1;

                let key = SightingKey::new(&member.id, &aircraft.icao24);
                if !cache.should_notify(&key, now_ms, self.expiry_ms) {
                    continue;
                }
                member_result.new_planes += 1;
                cache.record_notified(key, now_ms);

                let sighting = Sighting::new(
                    member,
                    aircraft,
                    (latitude, longitude),
                    distance_km,
                    now,
                    context.clone(),
                );
                self.emit(member, &sighting, member_result).await;
            }
        }

        results
    }

    async fn emit(
        &self,
        member: &SubscriberGeofence,
        sighting: &Sighting,
        member_result: &mut SubscriberResult,
    ) {
        tracing::info!(
            subscriber_id = %member.id,
            icao24 = %sighting.icao24,
            callsign = sighting.callsign.as_deref().unwrap_or(""),
            distance_km = sighting.distance_km,
            "New sighting."
        );
        if let Err(e) = self.sink.notify(sighting).await {
            member_result.notification_failures += 1;
            tracing::warn!(
                subscriber_id = %member.id,
                icao24 = %sighting.icao24,
                error = %e,
                "Notification delivery failed."
            );
        }
    }

    fn set_state(&self, state: CycleState) {
        self.state_tx.send_replace(state);
        tracing::trace!(?state, "Cycle state changed.");
    }
}

/// Publishes [`CycleState::Idle`] when dropped, including when the cycle
/// future is dropped mid-scan.
struct IdleOnDrop<'a>(&'a CycleOrchestrator);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set_state(CycleState::Idle);
    }
}

fn unscanned(batch: SubscriberBatch) -> impl Iterator<Item = SubscriberResult> {
    batch
        .members
        .into_iter()
        .map(|member| SubscriberResult::failed(&member, "cycle cancelled before scan"))
}
