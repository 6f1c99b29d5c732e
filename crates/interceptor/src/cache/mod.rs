//! Delegate cache.
//!
//! Maps an [`ExtensionName`] to the [`ExtensionHandle`] the locator returned
//! for it. One cache is shared by every capability: it is keyed by name only,
//! so a handle cached while serving one capability is reused, unverified, for
//! the others.
//!
//! The cache only grows. Entries are released together when the session
//! shuts down.
//!
//! The map is sharded (`dashmap`). No lock is held while the resolver waits
//! on the locator. When two callers race to insert the same name, the first
//! insert wins and both observe the winning handle.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::capability::CapabilitySet;
use crate::identifiers::ExtensionName;
use crate::ports::ExtensionHandle;
use crate::types::Timestamp;


/// A cached extension handle and the time it was resolved.
#[derive(Debug, Clone)]
struct CacheEntry {
    handle: ExtensionHandle,
    resolved_at: Timestamp,
}

impl CacheEntry {
    fn new(handle: ExtensionHandle) -> Self {
        Self {
            handle,
            resolved_at: Timestamp::now(),
        }
    }
}

/// Serialisable description of one cache entry, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntrySummary {
    /// Extension type name.
    pub name: ExtensionName,
    /// Capabilities the cached extension advertises.
    pub capabilities: CapabilitySet,
    /// When the extension was resolved.
    pub resolved_at: Timestamp,
}

/// Concurrent name → extension handle map.
#[derive(Debug, Default)]
pub struct DelegateCache {
    entries: DashMap<ExtensionName, CacheEntry>,
}

impl DelegateCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle cached under `name`, if any.
    pub fn get(&self, name: &ExtensionName) -> Option<ExtensionHandle> {
        self.entries.get(name).map(|entry| entry.handle.clone())
    }

    /// Caches `handle` under `name` unless the name is already present.
    ///
    /// Returns the handle that is cached once the call completes: `handle`
    /// itself, or the handle of an earlier insert that won the race.
    pub fn insert_if_absent(&self, name: ExtensionName, handle: ExtensionHandle) -> ExtensionHandle {
        self.entries
            .entry(name)
            .or_insert_with(|| CacheEntry::new(handle))
            .handle
            .clone()
    }

    /// Returns `true` if `name` is cached.
    pub fn contains(&self, name: &ExtensionName) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of cached extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Summarises every entry, ordered by name.
    pub fn snapshot(&self) -> Vec<CacheEntrySummary> {
        let mut summaries: Vec<CacheEntrySummary> = self
            .entries
            .iter()
            .map(|entry| CacheEntrySummary {
                name: entry.key().clone(),
                capabilities: entry.value().handle.capabilities(),
                resolved_at: entry.value().resolved_at,
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}
