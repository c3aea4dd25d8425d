//! Intercepted request model and request identity.

use std::fmt;

use bytes::Bytes;
use url::Url;

use crate::error::{CacheError, Result};

/// Declared fetch destination header.
pub const FETCH_DEST_HEADER: &str = "sec-fetch-dest";
/// Declared fetch mode header.
pub const FETCH_MODE_HEADER: &str = "sec-fetch-mode";

// == Destination ==
/// Coarse content role of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Document,
    Image,
    Font,
    Style,
    Script,
    Other,
}

impl Destination {
    /// Maps a declared fetch destination (`sec-fetch-dest`) to a kind.
    pub fn from_declared(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" | "iframe" | "frame" => Destination::Document,
            "image" => Destination::Image,
            "font" => Destination::Font,
            "style" => Destination::Style,
            "script" | "worker" | "sharedworker" => Destination::Script,
            _ => Destination::Other,
        }
    }

    /// Derives the destination from request headers.
    ///
    /// A navigate fetch mode always means a document.
    pub fn from_headers(headers: &[(String, String)]) -> Self {
        let find = |name: &str| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        };

        if find(FETCH_MODE_HEADER).is_some_and(|mode| mode.eq_ignore_ascii_case("navigate")) {
            return Destination::Document;
        }
        find(FETCH_DEST_HEADER).map_or(Destination::Other, Destination::from_declared)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Destination::Document => "document",
            Destination::Image => "image",
            Destination::Font => "font",
            Destination::Style => "style",
            Destination::Script => "script",
            Destination::Other => "other",
        };
        f.write_str(name)
    }
}

// == Intercepted Request ==
/// An outbound request raised by the host application.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    /// Upper-cased HTTP method
    pub method: String,
    /// Normalized absolute URL
    pub url: Url,
    pub destination: Destination,
    /// Headers forwarded unmodified to the origin
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl InterceptedRequest {
    /// Builds a request, normalizing the URL and deriving the destination from headers.
    pub fn new(method: &str, url: &str, headers: Vec<(String, String)>, body: Bytes) -> Result<Self> {
        Ok(Self {
            method: method.to_ascii_uppercase(),
            url: normalize_url(url)?,
            destination: Destination::from_headers(&headers),
            headers,
            body,
        })
    }

    /// Shorthand for a body-less GET.
    pub fn get(url: &str) -> Result<Self> {
        Self::new("GET", url, Vec::new(), Bytes::new())
    }

    /// Overrides the derived destination.
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    // == Key ==
    /// Identity of the cached item: method plus normalized URL.
    pub fn key(&self) -> String {
        request_key(&self.method, &self.url)
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Builds the `"{METHOD} {url}"` store key.
pub fn request_key(method: &str, url: &Url) -> String {
    format!("{} {}", method.to_ascii_uppercase(), url)
}

/// Normalizes a URL for consistent keys.
///
/// The parser lowercases scheme and host and resolves dot segments; the
/// fragment is dropped. Query strings are kept as-is.
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CacheError::InvalidRequest("empty URL".to_string()));
    }

    let mut parsed = Url::parse(trimmed)
        .map_err(|e| CacheError::InvalidRequest(format!("invalid URL '{}': {}", trimmed, e)))?;
    parsed.set_fragment(None);
    Ok(parsed)
}
