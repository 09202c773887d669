// src/services/cache.rs
use async_trait::async_trait;
use log::{debug, info};
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::models::{DividendRecord, Ticker};
use crate::BoxError;

pub type Result<T> = std::result::Result<T, BoxError>;

pub const CACHE_KEY_PREFIX: &str = "si_dividendos";
/// Ten days.
pub const DIVIDEND_TTL_SECS: u64 = 864_000;

pub fn cache_key(ticker: &Ticker) -> String {
    format!("{}:{}", CACHE_KEY_PREFIX, ticker)
}

/// Key-value store with per-key expiration.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        info!("Connected to Redis at {}", redis_url);
        Ok(RedisStore { conn })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }
}

/// In-process store that expires entries on the tokio clock.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that have not expired yet.
    pub async fn live_keys(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        if ttl_secs == 0 {
            return Err("TTL must be positive".into());
        }
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }
}

/// Typed access to cached dividend records.
#[derive(Clone)]
pub struct DividendCache {
    store: Arc<dyn CacheStore>,
}

impl DividendCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        DividendCache { store }
    }

    /// Overwrite the ticker's record and reset its TTL.
    pub async fn store(&self, ticker: &Ticker, record: &DividendRecord) -> Result<()> {
        let key = cache_key(ticker);
        let payload = serde_json::to_string(record)?;
        self.store.set_ex(&key, &payload, DIVIDEND_TTL_SECS).await?;
        debug!("SET {} EX {} -> {}", key, DIVIDEND_TTL_SECS, payload);
        Ok(())
    }

    /// Expired, never-written and JSON `null` entries all load as `None`.
    pub async fn load(&self, ticker: &Ticker) -> Result<Option<DividendRecord>> {
        let key = cache_key(ticker);
        match self.store.get(&key).await? {
            Some(payload) => Ok(serde_json::from_str::<Option<DividendRecord>>(&payload)?),
            None => Ok(None),
        }
    }
}
