//! Versioned key-value store for cached responses.
//!
//! Entries live under a *namespace* — one per cache generation, named after
//! the deployed [`CacheVersion`](crate::agent::config::AgentConfig::cache_version).
//! The store only offers atomic per-entry operations plus whole-namespace
//! deletion; there are no multi-entry transactions, and none are needed:
//! the lifecycle manager reclaims stale generations by deleting their
//! namespace wholesale.

mod memory;

pub use memory::MemoryCacheStore;

use crate::CachedResponse;
use crate::platform::PlatformFuture;

/// Persistent store mapping `(namespace, path)` to a stored response.
///
/// Dyn-compatible so the agent can hold it as `Arc<dyn CacheStore>`;
/// implementations must be safe under concurrent handler access.
pub trait CacheStore: Send + Sync {
    /// Insert or overwrite one entry.
    fn put(
        &self,
        namespace: String,
        path: String,
        response: CachedResponse,
    ) -> PlatformFuture<'_, Result<(), String>>;

    /// Look up one entry.
    fn get(&self, namespace: String, path: String) -> PlatformFuture<'_, Option<CachedResponse>>;

    /// Whether an entry exists, without counting a hit or miss.
    fn contains(&self, namespace: String, path: String) -> PlatformFuture<'_, bool>;

    /// Every namespace that currently holds at least one entry.
    fn namespaces(&self) -> PlatformFuture<'_, Vec<String>>;

    /// Delete a whole namespace. Returns `true` if anything was removed.
    fn delete_namespace(&self, namespace: String) -> PlatformFuture<'_, Result<bool, String>>;
}
