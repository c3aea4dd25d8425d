//! Lifecycle Module
//!
//! Install, activate and intercept: the manager's state machine.

mod clients;
mod manager;
mod state;

pub use clients::ClientRegistry;
pub use manager::{ActivationReport, InstallReport, OfflineCacheManager, SeedFailure, StoreSummary};
pub use state::LifecycleState;
