//! Credential caching layer.
//!
//! Each cache key owns an async mutex. A caller that finds the entry stale
//! holds that mutex for the whole refresh, so concurrent callers for the same
//! key wait for the in-flight refresh and reuse its result instead of minting
//! again. The entry is replaced only after the refresh completes; an error or
//! a dropped future leaves the previous value in place.
//!
//! Keys whose credential has expired are evicted after each successful
//! refresh, so the map tracks live credentials rather than every key ever
//! requested.

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::{Clock, Credential};
use crate::Result;

/// Default safety window before real expiry that forces a refresh.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

type Slot = Arc<Mutex<Option<Credential>>>;

/// Keyed credential cache with single-flight refresh.
pub struct CredentialCache<K> {
    slots: DashMap<K, Slot>,
    margin: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<K> CredentialCache<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(clock: Arc<dyn Clock>, margin: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            margin: TimeDelta::from_std(margin).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    pub fn margin(&self) -> TimeDelta {
        self.margin
    }

    fn slot(&self, key: &K) -> Slot {
        self.slots.entry(key.clone()).or_default().value().clone()
    }

    /// Return the cached credential for `key` if it is still fresh, otherwise
    /// run `refresh` and store its result.
    ///
    /// With `force`, a fresh entry is ignored and `refresh` always runs; a
    /// failure still leaves the old entry untouched.
    pub async fn get_or_refresh<F, Fut>(&self, key: K, force: bool, refresh: F) -> Result<Credential>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credential>>,
    {
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;

        if !force
            && let Some(ref cached) = *entry
            && cached.is_fresh_at(self.clock.now(), self.margin)
        {
            tracing::debug!(?key, "credential cache hit");
            return Ok(cached.clone());
        }

        tracing::debug!(?key, force, "credential cache miss, refreshing");
        let credential = refresh().await?;
        *entry = Some(credential.clone());
        drop(entry);
        drop(slot);

        self.evict_expired();
        Ok(credential)
    }

    /// Drop keys whose credential is missing or past its expiry.
    ///
    /// A slot still referenced outside the map belongs to a caller that is
    /// waiting on or refreshing it, and is kept.
    fn evict_expired(&self) {
        let now = self.clock.now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|c| !c.is_expired_at(now)),
                Err(_) => true,
            }
        });
        let evicted = before.saturating_sub(self.slots.len());
        if evicted > 0 {
            tracing::debug!(evicted, "evicted expired credentials");
        }
    }

    /// Cached credential for `key` if it is still fresh.
    pub async fn get(&self, key: &K) -> Option<Credential> {
        let slot = self.slots.get(key)?.value().clone();
        let entry = slot.lock().await;
        entry
            .as_ref()
            .filter(|c| c.is_fresh_at(self.clock.now(), self.margin))
            .cloned()
    }

    pub async fn invalidate(&self, key: &K) {
        let slot = self.slots.get(key).map(|s| s.value().clone());
        if let Some(slot) = slot {
            *slot.lock().await = None;
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Eq + Hash> Debug for CredentialCache<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("entries", &self.slots.len())
            .field("margin", &self.margin)
            .finish()
    }
}
