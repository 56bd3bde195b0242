use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tokio::sync::{OnceCell, RwLock};
use tracing::info;

use crate::client::short_link::{ResolvedShareLink, ShareContext};

// Declare the static OnceLock to hold the process-wide LinkCache.
static LINK_CACHE_INSTANCE: OnceLock<LinkCache> = OnceLock::new();

/// Memoization key of a resolution. The target address is not part of it:
/// two requests that differ only in target share one cached link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkCacheKey {
    pub service_url: String,
    pub amount: u32,
    pub context: ShareContext,
}

impl LinkCacheKey {
    pub fn new(service_url: &str, amount: u32, context: ShareContext) -> Self {
        Self { service_url: service_url.to_owned(), amount, context }
    }
}

/// One slot per key. Concurrent resolutions of the same key wait on the
/// same slot, so at most one request is in flight per key. A failed
/// resolution leaves the slot empty and the next caller retries.
pub type LinkSlot = Arc<OnceCell<ResolvedShareLink>>;

/// Short-link memoization cache.
///
/// Lives as long as its last clone. `LinkCache::global()` is the
/// process-wide instance shared by every widget on the page; tests and
/// hosts that need isolation construct their own with `LinkCache::new()`.
#[derive(Debug, Clone, Default)]
pub struct LinkCache {
    inner: Arc<RwLock<HashMap<LinkCacheKey, LinkSlot>>>,
}

impl LinkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Self {
        LINK_CACHE_INSTANCE
            .get_or_init(|| {
                info!("Initializing static LinkCache...");
                LinkCache::new()
            })
            .clone()
    }

    /// Slot for `key`, created empty on first use.
    pub async fn slot(&self, key: &LinkCacheKey) -> LinkSlot {
        if let Some(slot) = self.inner.read().await.get(key) {
            return slot.clone();
        }
        let mut guard = self.inner.write().await;
        guard.entry(key.clone()).or_default().clone()
    }

    /// Resolved value for `key`, if any.
    pub async fn get(&self, key: &LinkCacheKey) -> Option<ResolvedShareLink> {
        let guard = self.inner.read().await;
        guard.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Number of resolved entries.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slots_are_shared_per_key() {
        let cache = LinkCache::new();
        let key = LinkCacheKey::new("https://svc.test", 2, ShareContext::UrlBox);

        let first = cache.slot(&key).await;
        let second = cache.slot(&key).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty().await);

        first
            .set(ResolvedShareLink::unsuccessful())
            .expect("slot starts empty");
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&key).await, Some(ResolvedShareLink::unsuccessful()));
    }

    #[tokio::test]
    async fn context_is_part_of_the_key() {
        let cache = LinkCache::new();
        let url_box = cache.slot(&LinkCacheKey::new("https://svc.test", 1, ShareContext::UrlBox)).await;
        let social = cache.slot(&LinkCacheKey::new("https://svc.test", 1, ShareContext::Social)).await;
        assert!(!Arc::ptr_eq(&url_box, &social));
    }
}
