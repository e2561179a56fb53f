//! Local durable cache for planner snapshots.
//!
//! A cache is a flat string key/value store. The planner only ever uses one
//! key, [`STORAGE_KEY`], holding the whole serialized snapshot.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use super::error::CacheError;

/// The single global slot the planner writes to.
pub const STORAGE_KEY: &str = "tripPlannerData";

pub trait LocalCache {
    /// Returns `Ok(None)` when nothing was stored under `key` yet.
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(CacheError::Unavailable(format!("invalid cache key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalCache for FileCache {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => {
                debug!(path = %path.display(), bytes = raw.len(), "cache read");
                Ok(Some(raw))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // temp file + rename keeps the previous value intact if the write dies
        let tmp = path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), bytes = value.len(), "cache write");
        Ok(())
    }
}

/// In-process cache. Clones share the same storage, so a caller can keep a
/// handle after giving one to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    items: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `set_item` fail until switched back.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl LocalCache for MemoryCache {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        if self.fail_writes.get() {
            return Err(CacheError::Unavailable("writes disabled".into()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_cache_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert!(cache.get_item(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn file_cache_overwrites_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested"));

        cache.set_item(STORAGE_KEY, "first").unwrap();
        cache.set_item(STORAGE_KEY, "second").unwrap();

        assert_eq!(cache.get_item(STORAGE_KEY).unwrap().as_deref(), Some("second"));
        assert!(cache.dir().join("tripPlannerData.json").exists());
        assert!(!cache.dir().join("tripPlannerData.json.tmp").exists());
    }

    #[test]
    fn file_cache_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert!(cache.set_item("../escape", "x").is_err());
        assert!(cache.get_item("").is_err());
    }

    #[test]
    fn memory_cache_clones_share_storage() {
        let cache = MemoryCache::new();
        let handle = cache.clone();
        cache.set_item("k", "v").unwrap();
        assert_eq!(handle.get_item("k").unwrap().as_deref(), Some("v"));

        handle.fail_writes(true);
        assert!(cache.set_item("k", "w").is_err());
        assert_eq!(cache.get_item("k").unwrap().as_deref(), Some("v"));
    }
}
