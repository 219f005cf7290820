//! Result Cache
//!
//! TTL memoization of complete search responses.
//!
//! # Architecture
//!
//! ```text
//!                  ResultCache
//!                       |
//!        +--------------+--------------+
//!        |              |              |
//!        v              v              v
//!    CacheKey       CacheStore     CacheStats
//!  (blake3 of      (get/set/del    (hits, misses,
//!  canonical JSON)   with TTL)        errors)
//! ```
//!
//! Store failures never fail a search: a read error is a miss and a write
//! error is a no-op. Both are logged and counted.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use super::error::CacheError;
use super::models::{NormalizedQuery, SearchResponse};

// ============================================================================
// Constants
// ============================================================================

/// Default number of responses kept in memory
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Default TTL for cached responses (5 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Bump when the cached payload shape changes
const KEY_PREFIX: &str = "search:v1:";

// ============================================================================
// CacheConfig
// ============================================================================

/// Configuration for the result cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to bypass the cache entirely
    pub enabled: bool,
    /// Maximum responses held by the in-memory store
    pub capacity: usize,
    /// Time-to-live in seconds. 0 disables expiry.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

// ============================================================================
// CacheKey
// ============================================================================

/// Deterministic key for a normalized query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash the canonical JSON form of the query.
    ///
    /// Object keys are sorted at every level, so two queries that differ
    /// only in property order share a key. `force_fresh` is not part of the
    /// serialized query and never affects the key.
    pub fn for_query(query: &NormalizedQuery) -> Result<Self, CacheError> {
        let value = serde_json::to_value(query)?;
        let mut canonical = String::new();
        write_canonical(&value, &mut canonical)?;
        let digest = blake3::hash(canonical.as_bytes());
        Ok(Self(format!("{}{}", KEY_PREFIX, digest.to_hex())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), CacheError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                if let Some(inner) = map.get(key) {
                    write_canonical(inner, out)?;
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

// ============================================================================
// CacheStore
// ============================================================================

/// Key-value store with per-entry TTL backing the result cache
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}

/// Internal entry wrapper with timestamp.
#[derive(Debug, Clone)]
struct StoredEntry {
    payload: String,
    created_at: Instant,
    ttl: Duration,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        !self.ttl.is_zero() && self.created_at.elapsed() >= self.ttl
    }
}

/// Bounded in-process store: LRU eviction plus per-entry TTL
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, StoredEntry>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Live and expired entries currently held
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drop every expired entry; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.payload.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries.lock().await.put(
            key.to_string(),
            StoredEntry {
                payload: value,
                created_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.pop(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

// ============================================================================
// CacheStats
// ============================================================================

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    /// Store failures and undecodable payloads
    pub errors: u64,
    /// Reads skipped because the query asked for fresh results
    pub bypasses: u64,
    pub invalidations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

// ============================================================================
// ResultCache
// ============================================================================

/// Response cache over a pluggable store
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    enabled: bool,
    stats: RwLock<CacheStats>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            ttl: config.ttl(),
            enabled: config.enabled,
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Cache backed by a fresh [`MemoryCacheStore`]
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(Arc::new(MemoryCacheStore::new(config.capacity)), config)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Default TTL for writes
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key_for(&self, query: &NormalizedQuery) -> Result<CacheKey, CacheError> {
        CacheKey::for_query(query)
    }

    /// Look up a response. Store errors and bad payloads count as a miss.
    pub async fn get(&self, key: &CacheKey) -> Option<SearchResponse> {
        if !self.enabled {
            return None;
        }

        let payload = match self.store.get(key.as_str()).await {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                let mut stats = self.stats.write().await;
                stats.errors += 1;
                stats.misses += 1;
                return None;
            }
        };

        let Some(payload) = payload else {
            self.stats.write().await.misses += 1;
            return None;
        };

        match serde_json::from_str::<SearchResponse>(&payload) {
            Ok(response) => {
                self.stats.write().await.hits += 1;
                Some(response)
            }
            Err(e) => {
                log::warn!("Discarding undecodable cache entry {}: {}", key, e);
                let mut stats = self.stats.write().await;
                stats.errors += 1;
                stats.misses += 1;
                None
            }
        }
    }

    /// Store a response. Failures are logged and otherwise ignored.
    pub async fn set(&self, key: &CacheKey, value: &SearchResponse, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Cache payload encoding failed for {}: {}", key, e);
                self.stats.write().await.errors += 1;
                return;
            }
        };

        match self.store.set(key.as_str(), payload, ttl).await {
            Ok(()) => self.stats.write().await.writes += 1,
            Err(e) => {
                log::warn!("Cache write failed for {}, skipping: {}", key, e);
                self.stats.write().await.errors += 1;
            }
        }
    }

    /// Note a read skipped at the caller's request
    pub async fn record_bypass(&self) {
        self.stats.write().await.bypasses += 1;
    }

    /// Remove one entry
    pub async fn invalidate(&self, key: &CacheKey) {
        match self.store.delete(key.as_str()).await {
            Ok(()) => self.stats.write().await.invalidations += 1,
            Err(e) => {
                log::warn!("Cache invalidation failed for {}: {}", key, e);
                self.stats.write().await.errors += 1;
            }
        }
    }

    /// Remove every entry
    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            log::warn!("Cache clear failed: {}", e);
            self.stats.write().await.errors += 1;
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
