//! Remote question-pool sources.
//!
//! [`RemoteSource`] is the seam between the loader and the network:
//! implementations return the raw response body and classify transport
//! failures, leaving envelope validation to the loader.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use chemdrill_core::model::PoolType;

use crate::error::LoaderError;

/// Default bound on one remote request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A source of raw question-pool response bodies.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the raw body for one `(category, pool_type)` selection.
    async fn fetch(&self, category: &str, pool_type: PoolType) -> Result<String, LoaderError>;
}

/// HTTP source: `GET <endpoint>?type=<pooltype>&category=<category>` with a
/// client-level timeout so a hung request aborts instead of suspending the
/// session indefinitely.
pub struct HttpRemoteSource {
    endpoint: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpRemoteSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
            client,
        }
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch(&self, category: &str, pool_type: PoolType) -> Result<String, LoaderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("type", pool_type.to_string().as_str()),
                ("category", category),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LoaderError::Timeout(self.timeout_secs)
                } else {
                    LoaderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Network(format!("HTTP {}", status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| LoaderError::Network(e.to_string()))
    }
}

/// A scripted source for testing the loader without a network.
///
/// Responses are consumed front to back; an exhausted script fails with a
/// network error. An optional per-call delay makes in-flight overlap
/// observable under tokio's paused clock.
#[derive(Default)]
pub struct MockRemoteSource {
    responses: Mutex<VecDeque<Result<String, LoaderError>>>,
    delay: Option<Duration>,
    call_count: AtomicU32,
}

impl MockRemoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<Result<String, LoaderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            delay: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Delay every response, so concurrent callers overlap in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn enqueue(&self, response: Result<String, LoaderError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Number of fetches made against this source.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RemoteSource for MockRemoteSource {
    async fn fetch(&self, _category: &str, _pool_type: PoolType) -> Result<String, LoaderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LoaderError::Network("mock: no scripted response".into())))
    }
}
