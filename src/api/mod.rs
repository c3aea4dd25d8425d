//! API Module
//!
//! The host-facing HTTP surface: lifecycle and notification endpoints under
//! `/__offline/`, and a fallback that intercepts every other request.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
