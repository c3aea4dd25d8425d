//! Network fetcher abstraction and its reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;

use crate::cache::ResourceResponse;
use crate::error::{CacheError, Result};
use crate::policy::InterceptedRequest;

/// Headers that describe a single hop and are not forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "host",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Issues network fetches on behalf of the manager.
///
/// `Err` means the exchange itself failed (timeout, DNS, refused); any
/// HTTP status, including errors, is a completed exchange.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResourceResponse>;
}

// == HTTP Fetcher ==
/// Fetcher backed by a pooled reqwest client.
/// Clone is cheap - reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResourceResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| CacheError::InvalidRequest(format!("bad method: {}", request.method)))?;

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            if HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h)) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CacheError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Network(e.to_string()))?;

        debug!(url = %request.url, status, bytes = body.len(), "Fetched from network");
        Ok(ResourceResponse {
            status,
            headers,
            body,
        })
    }
}

/// Scripted in-memory fetcher for unit tests.
#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct ScriptedFetcher {
        routes: Mutex<HashMap<String, ResourceResponse>>,
        failing: Mutex<Vec<String>>,
        offline: AtomicBool,
        calls: AtomicUsize,
        delay: Mutex<Option<Duration>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serves `body` with status 200 for `url`.
        pub fn respond(&self, url: &str, body: &str) {
            self.respond_with(url, ResourceResponse::new(200, body.to_string()));
        }

        pub fn respond_with(&self, url: &str, response: ResourceResponse) {
            self.routes.lock().unwrap().insert(url.to_string(), response);
        }

        /// Makes fetches of `url` fail at the network level.
        pub fn fail(&self, url: &str) {
            self.failing.lock().unwrap().push(url.to_string());
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, request: &InterceptedRequest) -> Result<ResourceResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let url = request.url.to_string();
            if self.offline.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(&url) {
                return Err(CacheError::Network(format!("unreachable: {}", url)));
            }
            Ok(self
                .routes
                .lock()
                .unwrap()
                .get(&url)
                .cloned()
                .unwrap_or_else(|| ResourceResponse::new(404, "not found")))
        }
    }
}
