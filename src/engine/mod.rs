//! The proximity-monitoring engine: subscriber batching, sighting dedup and
//! the cycle orchestrator that ties them to the feed and the notifiers.

pub mod batcher;
pub mod dedup_cache;
pub mod orchestrator;

pub use batcher::{SubscriberBatch, SubscriberBatcher};
pub use dedup_cache::DedupCache;
pub use orchestrator::{CycleOrchestrator, OrchestratorError};
