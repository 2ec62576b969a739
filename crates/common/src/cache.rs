//! Cache backend abstraction.
//!
//! The cache is process-wide shared state, so it is modeled as an injected
//! trait object rather than a global client: services hold an
//! `Arc<dyn CacheBackend>` and tests substitute [`MemoryCache`].
//!
//! Correctness never depends on the cache. Callers treat every error from
//! this module as a cache miss and fall through to the durable store; the
//! Redis implementation additionally bounds each operation with a timeout so
//! a slow backend degrades instead of hanging a request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use fred::types::scan::Scanner;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout};

/// Number of keys requested per SCAN page when deleting by pattern.
const SCAN_PAGE_SIZE: u32 = 100;

/// Cache backend error type.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backend rejected or failed the operation.
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// The operation did not complete within the configured timeout.
    #[error("Cache operation timed out")]
    Timeout,
}

/// A string-keyed, TTL-expiring cache.
///
/// Implementations must tolerate being unreachable; callers degrade to the
/// durable store on any error.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a cached value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value with a time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a single key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key matching a glob-style pattern (e.g. `houses:list:*`).
    async fn delete_by_pattern(&self, pattern: &str) -> Result<(), CacheError>;
}

/// Redis-backed cache using fred.
#[derive(Clone)]
pub struct RedisCache {
    client: Arc<RedisClient>,
    prefix: String,
    op_timeout: Duration,
}

impl RedisCache {
    /// Create a new Redis cache.
    ///
    /// All keys (and patterns) are namespaced under `prefix`. Every operation
    /// is bounded by `op_timeout`.
    #[must_use]
    pub fn new(client: Arc<RedisClient>, prefix: impl Into<String>, op_timeout: Duration) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            op_timeout,
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }

    async fn delete_matching(&self, pattern: String) -> Result<(), CacheError> {
        let mut scan = self.client.scan(pattern, Some(SCAN_PAGE_SIZE), None);
        while let Some(page) = scan.next().await {
            let mut page = page.map_err(|e| CacheError::Backend(e.to_string()))?;
            if let Some(keys) = page.take_results() {
                if !keys.is_empty() {
                    self.client
                        .del::<u64, _>(keys)
                        .await
                        .map_err(|e| CacheError::Backend(e.to_string()))?;
                }
            }
            page.next();
        }
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let key = self.full_key(key);
        timeout(self.op_timeout, async {
            self.client
                .get::<Option<String>, _>(key)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))
        })
        .await
        .map_err(|_| CacheError::Timeout)?
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let key = self.full_key(key);
        let ttl_secs = ttl.as_secs().max(1) as i64;
        timeout(self.op_timeout, async {
            self.client
                .set::<(), _, _>(key, value, Some(Expiration::EX(ttl_secs)), None, false)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))
        })
        .await
        .map_err(|_| CacheError::Timeout)?
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let key = self.full_key(key);
        timeout(self.op_timeout, async {
            self.client
                .del::<(), _>(key)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))
        })
        .await
        .map_err(|_| CacheError::Timeout)?
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<(), CacheError> {
        let pattern = self.full_key(pattern);
        timeout(self.op_timeout, self.delete_matching(pattern))
            .await
            .map_err(|_| CacheError::Timeout)?
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory cache for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    /// Create an empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    /// Whether the cache holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Match a glob-style pattern where `*` matches any run of characters.
fn glob_match(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(segment) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == segments.len() - 1 {
            return rest.ends_with(segment);
        } else {
            match rest.find(segment) {
                Some(pos) => rest = &rest[pos + segment.len()..],
                None => return false,
            }
        }
    }

    // Pattern ended with '*'
    true
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries.lock().await.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .await
            .retain(|key, _| !glob_match(pattern, key));
        Ok(())
    }
}
