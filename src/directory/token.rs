//! Access token caching
//!
//! Tokens live in a process-wide [`TokenCache`] keyed per backend. A
//! background sweeper evicts expired entries on a fixed period; lookups
//! also treat an expired entry as a miss so a token is never handed out
//! past its declared lifetime.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::config::fetch;
use crate::error::Result;

/// Time source for expiry decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Token cache shared by every client in the process
pub struct TokenCache {
    entries: Mutex<HashMap<String, CachedToken>>,
    clock: Arc<dyn Clock>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedToken>> {
        // A panic while holding the lock leaves the map intact
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached token for `key` unless it has expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        self.lock()
            .get(key)
            .filter(|t| !t.is_expired(now))
            .map(|t| t.value.clone())
    }

    /// Store a token valid for `ttl_secs` from now.
    ///
    /// The lifetime is clamped to `0..=MAX_TOKEN_TTL_SECS`; it comes
    /// straight from the token endpoint.
    pub fn set(&self, key: &str, value: String, ttl_secs: i64) {
        let ttl = ttl_secs.clamp(0, fetch::MAX_TOKEN_TTL_SECS);
        if ttl != ttl_secs {
            debug!(
                "Token '{}' declared a lifetime of {}s, using {}s",
                key, ttl_secs, ttl
            );
        }
        let now = self.clock.now();
        let expires_at = Duration::try_seconds(ttl)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now);
        debug!(
            "Caching token '{}' until {}",
            key,
            expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        self.lock()
            .insert(key.to_string(), CachedToken { value, expires_at });
    }

    pub fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Drop every expired entry, returning how many were evicted.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, t| !t.is_expired(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run [`TokenCache::sweep`] every `period` until the cache is dropped.
pub fn spawn_sweeper(
    cache: &Arc<TokenCache>,
    period: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    let weak: Weak<TokenCache> = Arc::downgrade(cache);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(cache) = weak.upgrade() else {
                break;
            };
            let evicted = cache.sweep();
            if evicted > 0 {
                debug!("Token sweeper evicted {} entries", evicted);
            }
        }
    })
}

/// A freshly issued token and its declared lifetime in seconds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub value: String,
    pub expires_in: i64,
}

/// Per-backend view over the shared cache
pub struct TokenManager {
    cache: Arc<TokenCache>,
    key: String,
}

impl TokenManager {
    pub fn new(cache: Arc<TokenCache>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    /// Return a cached token, or call `issue` and cache its result.
    ///
    /// Issuance failures are returned as-is and nothing is cached. Two
    /// concurrent misses may both call `issue`.
    pub async fn ensure_with<F, Fut>(&self, issue: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken>>,
    {
        if let Some(token) = self.cache.get(&self.key) {
            debug!("Reusing cached token '{}'", self.key);
            return Ok(token);
        }

        debug!("No valid token '{}' in cache, issuing a new one", self.key);
        let issued = issue().await?;
        self.cache
            .set(&self.key, issued.value.clone(), issued.expires_in);
        Ok(issued.value)
    }
}
