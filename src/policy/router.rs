//! Policy Router
//!
//! Ordered, total classification of intercepted requests. First match wins.

use std::fmt;

use crate::policy::{Destination, InterceptedRequest};

const FONT_SUFFIXES: &[&str] = &[".woff", ".woff2", ".ttf", ".otf", ".eot"];
const STYLE_SUFFIXES: &[&str] = &[".css"];
const SCRIPT_SUFFIXES: &[&str] = &[".js", ".mjs"];

// == Strategy ==
/// The five request-handling strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Documents: network, then any cache, then the offline placeholder
    NetworkFirstWithFallback,
    /// Images: serve cached, refresh in background
    CacheFirstRevalidate,
    /// Fonts: cached forever within a generation
    CacheFirstPermanent,
    /// Scripts and styles: serve fresh cached copy, refresh in background
    StaleWhileRevalidate,
    /// Everything else: network, then any cache, else fail
    NetworkFirst,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::NetworkFirstWithFallback => "network-first-with-fallback",
            Strategy::CacheFirstRevalidate => "cache-first-with-revalidate",
            Strategy::CacheFirstPermanent => "cache-first-permanent",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
            Strategy::NetworkFirst => "network-first-generic",
        };
        f.write_str(name)
    }
}

/// Why a request is not intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    NonGetMethod,
    ApiNamespace,
    UnsupportedScheme,
}

// == Route ==
/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Sent straight to the network with no caching
    Passthrough(Bypass),
    Intercept(Strategy),
}

/// Classifies a request.
///
/// # Rules
/// 1. Non-GET method → passthrough
/// 2. Path under `api_prefix` → passthrough
/// 3. Non-HTTP(S) scheme → passthrough
/// 4. Document → network-first-with-fallback
/// 5. Image → cache-first-with-revalidate
/// 6. Font (declared or by suffix) → cache-first-permanent
/// 7. Style or script (declared or by suffix) → stale-while-revalidate
/// 8. Otherwise → network-first-generic
pub fn classify(request: &InterceptedRequest, api_prefix: &str) -> Route {
    if request.method != "GET" {
        return Route::Passthrough(Bypass::NonGetMethod);
    }
    if in_namespace(request.path(), api_prefix) {
        return Route::Passthrough(Bypass::ApiNamespace);
    }
    if !matches!(request.url.scheme(), "http" | "https") {
        return Route::Passthrough(Bypass::UnsupportedScheme);
    }

    let path = request.path().to_ascii_lowercase();
    let strategy = match request.destination {
        Destination::Document => Strategy::NetworkFirstWithFallback,
        Destination::Image => Strategy::CacheFirstRevalidate,
        Destination::Font => Strategy::CacheFirstPermanent,
        _ if has_suffix(&path, FONT_SUFFIXES) => Strategy::CacheFirstPermanent,
        Destination::Style | Destination::Script => Strategy::StaleWhileRevalidate,
        _ if has_suffix(&path, STYLE_SUFFIXES) || has_suffix(&path, SCRIPT_SUFFIXES) => {
            Strategy::StaleWhileRevalidate
        }
        Destination::Other => Strategy::NetworkFirst,
    };
    Route::Intercept(strategy)
}

/// `/api/` matches `/api` and everything below it.
fn in_namespace(path: &str, prefix: &str) -> bool {
    let bare = prefix.trim_end_matches('/');
    if bare.is_empty() {
        return false;
    }
    path == bare || path.starts_with(&format!("{}/", bare))
}

fn has_suffix(path: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| path.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const API: &str = "/api/";

    fn get(url: &str, destination: Destination) -> InterceptedRequest {
        InterceptedRequest::get(url).unwrap().with_destination(destination)
    }

    #[test]
    fn test_non_get_passthrough_even_for_documents() {
        let request = InterceptedRequest::new("POST", "https://app.test/form", Vec::new(), Bytes::new())
            .unwrap()
            .with_destination(Destination::Document);

        assert_eq!(classify(&request, API), Route::Passthrough(Bypass::NonGetMethod));
    }

    #[test]
    fn test_api_namespace_passthrough() {
        let request = get("https://app.test/api/items?page=2", Destination::Document);
        assert_eq!(classify(&request, API), Route::Passthrough(Bypass::ApiNamespace));

        let bare = get("https://app.test/api", Destination::Other);
        assert_eq!(classify(&bare, API), Route::Passthrough(Bypass::ApiNamespace));

        let lookalike = get("https://app.test/apiary", Destination::Other);
        assert_eq!(classify(&lookalike, API), Route::Intercept(Strategy::NetworkFirst));
    }

    #[test]
    fn test_non_http_scheme_passthrough() {
        let request = get("ftp://app.test/file.css", Destination::Style);
        assert_eq!(classify(&request, API), Route::Passthrough(Bypass::UnsupportedScheme));
    }

    #[test]
    fn test_destination_routes() {
        let cases = [
            ("https://app.test/", Destination::Document, Strategy::NetworkFirstWithFallback),
            ("https://app.test/logo", Destination::Image, Strategy::CacheFirstRevalidate),
            ("https://app.test/f", Destination::Font, Strategy::CacheFirstPermanent),
            ("https://app.test/s", Destination::Style, Strategy::StaleWhileRevalidate),
            ("https://app.test/j", Destination::Script, Strategy::StaleWhileRevalidate),
            ("https://app.test/data.json", Destination::Other, Strategy::NetworkFirst),
        ];

        for (url, destination, expected) in cases {
            assert_eq!(
                classify(&get(url, destination), API),
                Route::Intercept(expected),
                "{} as {}",
                url,
                destination
            );
        }
    }

    #[test]
    fn test_suffix_routes_without_declared_destination() {
        let font = get("https://app.test/fonts/Inter.WOFF2", Destination::Other);
        assert_eq!(classify(&font, API), Route::Intercept(Strategy::CacheFirstPermanent));

        let style = get("https://app.test/app.css?v=3", Destination::Other);
        assert_eq!(classify(&style, API), Route::Intercept(Strategy::StaleWhileRevalidate));

        let script = get("https://app.test/app.mjs", Destination::Other);
        assert_eq!(classify(&script, API), Route::Intercept(Strategy::StaleWhileRevalidate));
    }

    #[test]
    fn test_document_rule_wins_over_suffix() {
        let request = get("https://app.test/print.css", Destination::Document);
        assert_eq!(
            classify(&request, API),
            Route::Intercept(Strategy::NetworkFirstWithFallback)
        );
    }

    #[test]
    fn test_font_suffix_wins_over_declared_style() {
        let request = get("https://app.test/icons.woff", Destination::Style);
        assert_eq!(classify(&request, API), Route::Intercept(Strategy::CacheFirstPermanent));
    }
}
