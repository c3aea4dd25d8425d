//! Expiration Evaluator
//!
//! Decides staleness from the `stored-at` stamp and a fixed max age.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;

/// Default freshness window applied to stamped entries.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Checks whether an entry is stale right now.
///
/// Entries without a usable `stored-at` stamp are never expired.
pub fn is_expired(entry: &CacheEntry, max_age: Duration) -> bool {
    is_expired_at(entry, max_age, Utc::now())
}

/// Checks whether an entry is stale at `now`.
///
/// An entry is expired once its age is strictly greater than `max_age`.
pub fn is_expired_at(entry: &CacheEntry, max_age: Duration, now: DateTime<Utc>) -> bool {
    let Some(stored_at) = entry.stored_at() else {
        return false;
    };

    let age_ms = now.timestamp_millis().saturating_sub(stored_at.timestamp_millis());
    let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
    age_ms > max_age_ms
}
