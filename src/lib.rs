//! Offline Cache - an offline-first resource cache manager
//!
//! Intercepts resource requests and answers them from generation-tagged
//! stores or the network, according to per-resource-type policies.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notifications;
pub mod policy;
pub mod strategy;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{CacheError, Result};
pub use lifecycle::{LifecycleState, OfflineCacheManager};
pub use strategy::{Fetcher, HttpFetcher};
