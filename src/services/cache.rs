use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::models::snapshot::DirectorySnapshot;

/// Latest snapshot per path.
///
/// Written by scan tasks on any thread and read from the UI context. Values
/// are `Arc`s swapped under the lock, so a reader holds either the old or the
/// new snapshot, never a mix. Entries are never evicted.
#[derive(Debug, Default)]
pub struct DirCache {
    entries: RwLock<HashMap<String, Arc<DirectorySnapshot>>>,
}

impl DirCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<DirectorySnapshot>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
    }

    pub fn put(&self, path: &str, snapshot: Arc<DirectorySnapshot>) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if entries.insert(path.to_string(), snapshot).is_some() {
            log::debug!("cache entry replaced: {path}");
        } else {
            log::debug!("cache entry added: {path}");
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn get_returns_what_was_put() {
        let cache = DirCache::new();
        assert!(cache.get("/a").is_none());
        assert!(!cache.contains("/a"));

        let snap = Arc::new(DirectorySnapshot::failed("/a", "first"));
        cache.put("/a", snap.clone());

        assert!(cache.contains("/a"));
        assert!(Arc::ptr_eq(&cache.get("/a").unwrap(), &snap));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_replaces_whole_value() {
        let cache = DirCache::new();
        let old = Arc::new(DirectorySnapshot::failed("/a", "old"));
        cache.put("/a", old.clone());
        cache.put("/a", Arc::new(DirectorySnapshot::failed("/a", "new")));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("/a").unwrap().error(), Some("new"));
        // readers that grabbed the old value keep a complete snapshot
        assert_eq!(old.error(), Some("old"));
    }

    #[test]
    fn concurrent_writers_never_tear_values() {
        let cache = Arc::new(DirCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for j in 0..200 {
                        let msg = format!("writer{i}-{j}");
                        cache.put("/shared", Arc::new(DirectorySnapshot::failed("/shared", msg)));
                        let seen = cache.get("/shared").unwrap();
                        assert_eq!(seen.path, "/shared");
                        assert!(seen.error().unwrap().starts_with("writer"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }
}
