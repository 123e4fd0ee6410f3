//! Texture cache bookkeeping.
//!
//! Keyed by path, unbounded for the session (the asset set is small and
//! finite). The pending set guarantees at most one in-flight request per
//! path: `begin_load` answers whether the caller should actually fetch.
//! Failures clear the pending mark without populating the cache, so the
//! next foreground load retries the fetch. The platform side owns the
//! actual fetching and decoding and calls back into `insert`/`mark_failed`.

use fnv::{FnvHashMap, FnvHashSet};

pub struct TextureCache<T> {
    entries: FnvHashMap<String, T>,
    pending: FnvHashSet<String>,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        Self {
            entries: FnvHashMap::default(),
            pending: FnvHashSet::default(),
        }
    }
}

impl<T> TextureCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&T> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.pending.contains(path)
    }

    /// Claim a load for `path`. Returns `false` when the path is already
    /// cached or a request is in flight; the caller must not fetch again.
    pub fn begin_load(&mut self, path: &str) -> bool {
        if self.entries.contains_key(path) || self.pending.contains(path) {
            return false;
        }
        self.pending.insert(path.to_string());
        true
    }

    pub fn insert(&mut self, path: &str, value: T) {
        self.pending.remove(path);
        self.entries.insert(path.to_string(), value);
    }

    pub fn mark_failed(&mut self, path: &str) {
        self.pending.remove(path);
    }

    /// Of `paths`, claim and return the ones that actually need fetching;
    /// cached and in-flight paths are silently skipped.
    pub fn preload_targets<'a, I>(&mut self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Vec::new();
        for path in paths {
            if self.begin_load(path) {
                out.push(path.to_string());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_load_dedupes_by_pending_set() {
        let mut cache = TextureCache::<u32>::new();
        assert!(cache.begin_load("/a.jpg"));
        // Second request while the first is in flight must not fetch.
        assert!(!cache.begin_load("/a.jpg"));
        cache.insert("/a.jpg", 7);
        assert_eq!(cache.get("/a.jpg"), Some(&7));
        // Cached now, still no refetch.
        assert!(!cache.begin_load("/a.jpg"));
    }

    #[test]
    fn failed_load_is_retriable() {
        let mut cache = TextureCache::<u32>::new();
        assert!(cache.begin_load("/a.jpg"));
        cache.mark_failed("/a.jpg");
        assert!(!cache.contains("/a.jpg"));
        assert!(cache.begin_load("/a.jpg"));
    }

    #[test]
    fn preload_targets_skips_cached_and_pending() {
        let mut cache = TextureCache::<u32>::new();
        cache.insert("/cached.jpg", 1);
        assert!(cache.begin_load("/pending.jpg"));
        let targets =
            cache.preload_targets(["/cached.jpg", "/pending.jpg", "/new.jpg"].into_iter());
        assert_eq!(targets, vec!["/new.jpg".to_string()]);
    }
}
