//! In-memory [`CacheStore`] implementation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::CachedResponse;
use crate::platform::PlatformFuture;

use super::CacheStore;

/// Cache store backed by a `HashMap`, keyed by `(namespace, path)`.
///
/// Carries hit/miss counters for diagnostics. All operations take the inner
/// lock for the duration of one entry access only, which is the atomicity
/// the store contract promises.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<(String, String), CachedResponse>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Cache miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Hit rate as a fraction (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Number of entries across all namespaces.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), CachedResponse>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheStore for MemoryCacheStore {
    fn put(
        &self,
        namespace: String,
        path: String,
        response: CachedResponse,
    ) -> PlatformFuture<'_, Result<(), String>> {
        Box::pin(async move {
            self.lock().insert((namespace, path), response);
            Ok(())
        })
    }

    fn get(&self, namespace: String, path: String) -> PlatformFuture<'_, Option<CachedResponse>> {
        Box::pin(async move {
            let found = self.lock().get(&(namespace, path)).cloned();
            if found.is_some() {
                self.hits.fetch_add(1, Ordering::Relaxed);
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
            found
        })
    }

    fn contains(&self, namespace: String, path: String) -> PlatformFuture<'_, bool> {
        Box::pin(async move { self.lock().contains_key(&(namespace, path)) })
    }

    fn namespaces(&self) -> PlatformFuture<'_, Vec<String>> {
        Box::pin(async move {
            let mut names: Vec<String> = self.lock().keys().map(|(ns, _)| ns.clone()).collect();
            names.sort();
            names.dedup();
            names
        })
    }

    fn delete_namespace(&self, namespace: String) -> PlatformFuture<'_, Result<bool, String>> {
        Box::pin(async move {
            let mut entries = self.lock();
            let before = entries.len();
            entries.retain(|(ns, _), _| *ns != namespace);
            Ok(entries.len() != before)
        })
    }
}
