use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::error::ServiceResult;

use super::UserResolver;

// Positive entries above this count trigger a full sweep of expired rows.
const SWEEP_THRESHOLD: usize = 4096;

struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// Resolver wrapper that caches positive lookups for a short TTL.
///
/// Negative results are never cached: a user may register between calls,
/// and a stale "unknown" would wrongly reject invites. The User service
/// stays the source of truth; the TTL only bounds how stale a cached
/// mapping can get.
pub struct CachedUserResolver {
    inner: Arc<dyn UserResolver>,
    ttl: Duration,
    by_name: RwLock<HashMap<String, CacheEntry<u64>>>,
    by_uid: RwLock<HashMap<u64, CacheEntry<String>>>,
}

impl CachedUserResolver {
    pub fn new(inner: Arc<dyn UserResolver>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            by_name: RwLock::new(HashMap::new()),
            by_uid: RwLock::new(HashMap::new()),
        }
    }

    fn fresh<T>(&self, entry: Option<&CacheEntry<T>>) -> Option<T>
    where
        T: Clone,
    {
        entry
            .filter(|e| e.inserted_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }
}

fn insert_swept<K, V>(map: &mut HashMap<K, CacheEntry<V>>, key: K, value: V, ttl: Duration)
where
    K: std::hash::Hash + Eq,
{
    if map.len() >= SWEEP_THRESHOLD {
        map.retain(|_, e| e.inserted_at.elapsed() < ttl);
    }
    map.insert(
        key,
        CacheEntry {
            value,
            inserted_at: Instant::now(),
        },
    );
}

#[async_trait::async_trait]
impl UserResolver for CachedUserResolver {
    async fn resolve_username(&self, username: &str) -> ServiceResult<Option<u64>> {
        {
            let cache = self.by_name.read().await;
            if let Some(uid) = self.fresh(cache.get(username)) {
                return Ok(Some(uid));
            }
        }

        let resolved = self.inner.resolve_username(username).await?;
        if let Some(uid) = resolved {
            let mut cache = self.by_name.write().await;
            insert_swept(&mut cache, username.to_string(), uid, self.ttl);
        }
        Ok(resolved)
    }

    async fn lookup_username(&self, uid: u64) -> ServiceResult<Option<String>> {
        {
            let cache = self.by_uid.read().await;
            if let Some(name) = self.fresh(cache.get(&uid)) {
                return Ok(Some(name));
            }
        }

        let resolved = self.inner.lookup_username(uid).await?;
        if let Some(name) = &resolved {
            let mut cache = self.by_uid.write().await;
            insert_swept(&mut cache, uid, name.clone(), self.ttl);
        }
        Ok(resolved)
    }
}
