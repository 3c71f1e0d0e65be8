//! The multi-tier pool loader.
//!
//! `load` resolves a `(category, pool_type)` selection through, in order:
//! the two-tier cache, the remote source (with fixed-delay retries),
//! and the bundled fallback catalog. Concurrent loads for the same
//! selection share one in-flight request instead of issuing duplicates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use chemdrill_core::model::{PoolType, QuestionPool, QuestionRecord};
use chemdrill_core::parser::validate_pool;
use chemdrill_store::CacheStore;

use crate::error::LoaderError;
use crate::fallback::FallbackCatalog;
use crate::remote::RemoteSource;
use crate::validate;

/// Namespace prefix for durable cache keys.
const CACHE_NAMESPACE: &str = "chemdrill";

/// Retry policy for one load.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Additional attempts after the first failed fetch.
    pub max_retries: u32,
    /// Fixed delay between attempts — deliberately not exponential.
    pub retry_delay: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<QuestionPool, LoaderError>>>;

/// Loads question pools with caching, retry, validation, and fallback.
pub struct PoolLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    source: Arc<dyn RemoteSource>,
    cache: CacheStore,
    fallback: FallbackCatalog,
    config: LoaderConfig,
    inflight: Mutex<HashMap<String, SharedLoad>>,
}

impl PoolLoader {
    pub fn new(
        source: Arc<dyn RemoteSource>,
        cache: CacheStore,
        fallback: FallbackCatalog,
        config: LoaderConfig,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                source,
                cache,
                fallback,
                config,
                inflight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Durable cache key for a selection: `chemdrill_<category>_<pooltype>`.
    pub fn cache_key(category: &str, pool_type: PoolType) -> String {
        format!("{CACHE_NAMESPACE}_{category}_{pool_type}")
    }

    /// Load the pool for a selection.
    ///
    /// A fresh, non-empty cached pool is returned immediately; an empty
    /// cached pool counts as a miss so a transient empty response cannot
    /// wedge the selection. The only error surfaced is
    /// [`LoaderError::DataUnavailable`].
    pub async fn load(
        &self,
        category: &str,
        pool_type: PoolType,
    ) -> Result<QuestionPool, LoaderError> {
        let key = Self::cache_key(category, pool_type);

        if let Some(records) = self.inner.cache.get::<Vec<QuestionRecord>>(&key) {
            if !records.is_empty() {
                tracing::debug!(category, %pool_type, "pool served from cache");
                return Ok(QuestionPool::new(records));
            }
        }

        let load = {
            let mut inflight = self.inner.inflight.lock().unwrap();
            match inflight.get(&key) {
                Some(shared) => {
                    tracing::debug!(category, %pool_type, "joining in-flight load");
                    shared.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let category = category.to_string();
                    let shared: SharedLoad = async move {
                        inner.load_fresh(&category, pool_type).await
                    }
                    .boxed()
                    .shared();
                    inflight.insert(key.clone(), shared.clone());
                    shared
                }
            }
        };

        let result = load.await;
        self.inner.inflight.lock().unwrap().remove(&key);
        result
    }
}

impl LoaderInner {
    async fn load_fresh(
        &self,
        category: &str,
        pool_type: PoolType,
    ) -> Result<QuestionPool, LoaderError> {
        match self.fetch_with_retries(category, pool_type).await {
            Ok(records) => {
                for warning in validate_pool(&records) {
                    tracing::warn!(
                        category,
                        %pool_type,
                        record = ?warning.record_id,
                        "{}",
                        warning.message
                    );
                }
                self.cache
                    .set(&PoolLoader::cache_key(category, pool_type), &records);
                Ok(QuestionPool::new(records))
            }
            Err(err) => {
                tracing::warn!(
                    category,
                    %pool_type,
                    error = %err,
                    "remote load failed, trying bundled fallback"
                );
                match self.fallback.lookup(category, pool_type) {
                    Some(records) => Ok(QuestionPool::new(records)),
                    None => Err(LoaderError::DataUnavailable {
                        category: category.to_string(),
                        pool_type,
                    }),
                }
            }
        }
    }

    async fn fetch_with_retries(
        &self,
        category: &str,
        pool_type: PoolType,
    ) -> Result<Vec<QuestionRecord>, LoaderError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }
            match self.source.fetch(category, pool_type).await {
                // Validation failures propagate without consuming retries:
                // a misrouted endpoint will not fix itself.
                Ok(body) => return validate::parse_envelope(pool_type, &body),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(category, %pool_type, attempt, error = %e, "fetch attempt failed");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.expect("retry loop records an error before exhausting"))
    }
}
