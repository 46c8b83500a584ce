//! Client-local key-value storage.
//!
//! A single JSON object file standing in for browser local storage. Values
//! are cached in memory and written through on every modification. Nothing
//! stored here leaves the machine.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{PaletteError, PaletteResult};

pub struct LocalStorage {
    /// Backing file; `None` keeps everything in memory.
    path: Option<PathBuf>,
    cache: HashMap<String, Value>,
    dirty: bool,
}

impl LocalStorage {
    /// Open storage backed by `path`, loading it if present.
    ///
    /// A corrupted file is treated as empty and overwritten on next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let cache: HashMap<String, Value> = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring corrupted storage file");
                    HashMap::new()
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to read storage file");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Self {
            path: Some(path),
            cache,
            dirty: false,
        }
    }

    /// Open the per-user storage file under the platform data directory.
    pub fn open_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::open(path),
            None => Self::in_memory(),
        }
    }

    /// Storage that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cache: HashMap::new(),
            dirty: false,
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("pmis-palette").join("storage.json"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.cache.get(key)
    }

    /// Set a value and write it through to disk.
    pub fn set(&mut self, key: &str, value: Value) -> PaletteResult<()> {
        self.cache.insert(key.to_string(), value);
        self.dirty = true;
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> PaletteResult<()> {
        if self.cache.remove(key).is_some() {
            self.dirty = true;
            self.flush()?;
        }
        Ok(())
    }

    /// Flush cached changes to disk.
    pub fn flush(&mut self) -> PaletteResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let Some(path) = &self.path else {
            self.dirty = false;
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PaletteError::Storage(format!(
                    "Failed to create storage directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let contents = serde_json::to_string_pretty(&self.cache)?;
        fs::write(path, contents).map_err(|e| {
            PaletteError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        self.dirty = false;
        Ok(())
    }
}

impl Drop for LocalStorage {
    fn drop(&mut self) {
        // Best-effort flush on drop
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = LocalStorage::open(temp_dir.path().join("storage.json"));

        storage.set("theme", serde_json::json!("dark")).unwrap();
        assert_eq!(storage.get("theme"), Some(&serde_json::json!("dark")));
        assert_eq!(storage.get("missing"), None);

        storage.remove("theme").unwrap();
        assert_eq!(storage.get("theme"), None);
    }

    #[test]
    fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");

        {
            let mut storage = LocalStorage::open(&path);
            storage
                .set("recentSearches", serde_json::json!(["risk", "tender"]))
                .unwrap();
        }

        let storage = LocalStorage::open(&path);
        assert_eq!(
            storage.get("recentSearches"),
            Some(&serde_json::json!(["risk", "tender"]))
        );
    }

    #[test]
    fn test_corrupted_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let mut storage = LocalStorage::open(&path);
        assert_eq!(storage.get("anything"), None);

        storage.set("k", serde_json::json!(1)).unwrap();
        let reopened = LocalStorage::open(&path);
        assert_eq!(reopened.get("k"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_in_memory_never_writes() {
        let mut storage = LocalStorage::in_memory();
        storage.set("k", serde_json::json!(true)).unwrap();

        assert_eq!(storage.path(), None);
        assert_eq!(storage.get("k"), Some(&serde_json::json!(true)));
    }
}
