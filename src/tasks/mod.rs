//! Background Tasks Module
//!
//! Detached work that outlives the request which started it.
//!
//! # Tasks
//! - Revalidation: refreshes a cached resource and writes it through

mod revalidate;

pub use revalidate::{spawn_revalidation, BackgroundTasks};
