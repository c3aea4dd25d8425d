//! Response models for the management API
//!
//! DTOs serialized by the `/__offline/*` endpoints.

pub mod responses;

pub use responses::{HealthResponse, StatsResponse, StoreStatsResponse};
