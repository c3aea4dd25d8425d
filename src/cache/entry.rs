//! Cache Entry Module
//!
//! Defines stored responses and the synthetic `stored-at` stamp.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Header written by the manager on cached copies only, never sent to the origin.
pub const STORED_AT_HEADER: &str = "stored-at";

// == Resource Response ==
/// A response as exchanged with the origin or served to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResponse {
    /// HTTP status code
    pub status: u16,
    /// Ordered header list (name, value)
    pub headers: Vec<(String, String)>,
    /// Opaque payload
    pub body: Bytes,
}

impl ResourceResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Builder-style header append.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True for 2xx statuses; only these are written to a store.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// == Cache Entry ==
/// A stored response keyed by method + normalized URL.
///
/// Entries are immutable once written; a later write under the same key
/// replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Request identity, `"{METHOD} {url}"`
    pub key: String,
    /// Response captured for the key
    pub response: ResourceResponse,
}

impl CacheEntry {
    // == Constructor ==
    /// Wraps a response without stamping it.
    pub fn new(key: impl Into<String>, response: ResourceResponse) -> Self {
        Self {
            key: key.into(),
            response,
        }
    }

    /// Creates an entry whose copy carries a `stored-at` stamp of `now`.
    ///
    /// Any previous stamp on the response is replaced.
    pub fn stamped(key: impl Into<String>, mut response: ResourceResponse, now: DateTime<Utc>) -> Self {
        response
            .headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(STORED_AT_HEADER));
        response
            .headers
            .push((STORED_AT_HEADER.to_string(), now.timestamp_millis().to_string()));
        Self::new(key, response)
    }

    // == Stored At ==
    /// Returns the storage timestamp, or None when absent or unparseable.
    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        self.response
            .header(STORED_AT_HEADER)
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
    }
}
