//! Response DTOs for the management API

use serde::Serialize;

use crate::lifecycle::{LifecycleState, StoreSummary};

/// Statistics for one store (part of GET /__offline/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatsResponse {
    pub name: String,
    /// Item cap, null for unbounded stores
    pub max_items: Option<usize>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub write_failures: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<StoreSummary> for StoreStatsResponse {
    fn from(summary: StoreSummary) -> Self {
        let hit_rate = summary.stats.hit_rate();
        Self {
            name: summary.name,
            max_items: summary.max_items,
            hits: summary.stats.hits,
            misses: summary.stats.misses,
            evictions: summary.stats.evictions,
            write_failures: summary.stats.write_failures,
            total_entries: summary.stats.total_entries,
            hit_rate,
        }
    }
}

/// Response body for GET /__offline/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub generation: String,
    pub state: LifecycleState,
    /// Background tasks still running
    pub pending_tasks: usize,
    pub stores: Vec<StoreStatsResponse>,
}

/// Response body for GET /__offline/health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    pub state: LifecycleState,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(state: LifecycleState) -> Self {
        Self {
            status: "healthy".to_string(),
            state,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
