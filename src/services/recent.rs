//! Recent-search log.
//!
//! Most-recent-first, deduplicated by exact string. Saving a query that is
//! already present moves it to the front. The log is stored as a JSON
//! array of strings under a single storage key and has no expiry; it lives
//! until the user clears it.

use serde_json::Value;

use super::storage::LocalStorage;
use crate::config::RecentConfig;
use crate::error::PaletteResult;

/// Storage key holding the log.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

pub struct RecentSearches {
    entries: Vec<String>,
    capacity: usize,
    display: usize,
    storage: LocalStorage,
}

impl RecentSearches {
    /// Load the log from `storage`. Non-string items are skipped.
    pub fn load(storage: LocalStorage, config: &RecentConfig) -> Self {
        let capacity = config.capacity.max(1);
        let mut entries: Vec<String> = Vec::new();

        if let Some(Value::Array(items)) = storage.get(RECENT_SEARCHES_KEY) {
            for item in items {
                if let Some(s) = item.as_str() {
                    if !entries.iter().any(|e| e == s) {
                        entries.push(s.to_string());
                    }
                }
            }
        }
        entries.truncate(capacity);

        Self {
            entries,
            capacity,
            display: config.display.clamp(1, capacity),
            storage,
        }
    }

    /// In-memory log, useful when no data directory is available.
    pub fn in_memory(config: &RecentConfig) -> Self {
        Self::load(LocalStorage::in_memory(), config)
    }

    /// Record `query` at the front. Blank queries are ignored.
    pub fn save(&mut self, query: &str) -> PaletteResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        self.entries.retain(|e| e != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.capacity);
        self.persist()
    }

    /// Entries for display, most recent first.
    pub fn list(&self) -> &[String] {
        &self.entries[..self.entries.len().min(self.display)]
    }

    /// Every stored entry.
    pub fn all(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) -> PaletteResult<()> {
        self.entries.clear();
        self.storage.remove(RECENT_SEARCHES_KEY)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&mut self) -> PaletteResult<()> {
        let value = serde_json::to_value(&self.entries)?;
        self.storage.set(RECENT_SEARCHES_KEY, value)
    }
}
