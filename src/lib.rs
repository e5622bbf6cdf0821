#![warn(missing_docs)]
//! Skywatch watches a live aircraft-position feed and notifies subscribers
//! when an aircraft flies inside their geofence.

pub mod cmd;
pub mod config;
pub mod context;
pub mod engine;
pub mod feed;
pub mod geo;
pub mod http_client;
pub mod http_server;
pub mod models;
pub mod notification;
pub mod persistence;
pub mod supervisor;
pub mod test_helpers;
