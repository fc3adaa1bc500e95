//! Shared map from sheet key to worksheet fragment
//!
//! Many threads may add, list and delete rules on the same document at
//! once. The registry hands every caller the same fragment for a key,
//! and each fragment carries its own lock so sheets do not contend with
//! one another.

use std::sync::Arc;

use dashmap::DashMap;
use log::trace;
use parking_lot::RwLock;

use crate::worksheet::Worksheet;

/// Shared handle to one worksheet fragment
pub type SheetHandle = Arc<RwLock<Worksheet>>;

/// Lazily populated map of worksheet fragments
#[derive(Debug, Default)]
pub struct SheetRegistry {
    sheets: DashMap<String, SheetHandle, ahash::RandomState>,
}

impl SheetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the fragment for `key`, creating it with `init` on first use
    ///
    /// Creation happens under the map's entry lock, so concurrent first
    /// callers all receive the one fragment that won.
    pub fn get_or_create<F>(&self, key: &str, init: F) -> SheetHandle
    where
        F: FnOnce() -> Worksheet,
    {
        if let Some(handle) = self.sheets.get(key) {
            return handle.value().clone();
        }
        self.sheets
            .entry(key.to_string())
            .or_insert_with(|| {
                trace!("creating worksheet fragment {}", key);
                Arc::new(RwLock::new(init()))
            })
            .value()
            .clone()
    }

    /// Get an existing fragment
    pub fn get(&self, key: &str) -> Option<SheetHandle> {
        self.sheets.get(key).map(|r| r.value().clone())
    }

    /// Store a fragment, replacing any previous one for the key
    pub fn insert(&self, key: &str, worksheet: Worksheet) -> SheetHandle {
        let handle = Arc::new(RwLock::new(worksheet));
        self.sheets.insert(key.to_string(), Arc::clone(&handle));
        handle
    }

    /// Drop a fragment
    pub fn remove(&self, key: &str) -> Option<SheetHandle> {
        self.sheets.remove(key).map(|(_, handle)| handle)
    }

    /// Check if a fragment exists for the key
    pub fn contains(&self, key: &str) -> bool {
        self.sheets.contains_key(key)
    }

    /// Number of fragments created so far
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Check if no fragment was created yet
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Keys of every fragment, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.sheets.iter().map(|r| r.key().clone()).collect()
    }
}
