//! surf-lamp-core: location-centric surf-conditions ingestion &
//! distribution engine. See SPEC_FULL.md for the full component list.

pub mod adapters;
pub mod api;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod normalizer;
pub mod policy;
pub mod registry;
pub mod repository;
pub mod scheduler;

use std::sync::Arc;

use registry::Registry;
use repository::Repository;

/// Shared state handed to every axum handler.
pub struct AppState {
    pub registry: Arc<Registry>,
    pub repository: Arc<Repository>,
}
