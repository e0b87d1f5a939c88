//! Bounded LRU cache of footers keyed by file path
//!
//! An entry remembers the modification time the file had when its footer was
//! read. It only answers a lookup while that time is not older than the time
//! currently reported for the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use jiff::Timestamp;
use parking_lot::RwLock;
use tracing::debug;

use crate::metadata::Footer;

/// A cached footer and the modification time it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterCacheEntry {
    modification_time: Timestamp,
    footer: Footer,
}

impl FooterCacheEntry {
    pub fn new(modification_time: Timestamp, footer: Footer) -> Self {
        Self {
            modification_time,
            footer,
        }
    }

    pub fn modification_time(&self) -> Timestamp {
        self.modification_time
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// Still valid for a file currently reporting `current_modification_time`
    pub fn is_current(&self, current_modification_time: Timestamp) -> bool {
        self.modification_time >= current_modification_time
    }

    /// Strictly newer than `other`; anything is newer than no entry
    pub fn is_newer_than(&self, other: Option<&FooterCacheEntry>) -> bool {
        match other {
            Some(other) => self.modification_time > other.modification_time,
            None => true,
        }
    }
}

#[derive(Debug)]
struct CacheState {
    // least recently used first
    entries: IndexMap<PathBuf, Arc<FooterCacheEntry>>,
    capacity: usize,
}

impl CacheState {
    fn evict_over_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            if let Some((path, _)) = self.entries.shift_remove_index(0) {
                debug!(path = %path.display(), "evicted footer from cache");
            }
        }
    }
}

/// Thread-safe footer cache shared by planners
#[derive(Debug)]
pub struct FooterCache {
    state: RwLock<CacheState>,
}

impl FooterCache {
    /// A cache holding at most `capacity` footers, at least one
    pub fn new(capacity: usize) -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: IndexMap::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Sized for `file_count` files but never below `floor`
    pub fn for_file_count(file_count: usize, floor: usize) -> Self {
        Self::new(file_count.max(floor))
    }

    /// The entry for `path` if it is current for `current_modification_time`.
    /// Does not change recency.
    pub fn lookup(
        &self,
        path: &Path,
        current_modification_time: Timestamp,
    ) -> Option<Arc<FooterCacheEntry>> {
        let state = self.state.read();
        let entry = state.entries.get(path)?;
        if entry.is_current(current_modification_time) {
            Some(Arc::clone(entry))
        } else {
            debug!(
                path = %path.display(),
                cached = %entry.modification_time,
                current = %current_modification_time,
                "cached footer is stale"
            );
            None
        }
    }

    /// Store `entry` if it is current for `observed_modification_time` and
    /// newer than the cached one; returns whether it was stored
    pub fn put_if_current(
        &self,
        path: impl Into<PathBuf>,
        entry: FooterCacheEntry,
        observed_modification_time: Timestamp,
    ) -> bool {
        let path = path.into();
        if !entry.is_current(observed_modification_time) {
            debug!(
                path = %path.display(),
                modification_time = %entry.modification_time,
                observed = %observed_modification_time,
                "ignoring footer older than the file"
            );
            return false;
        }
        self.put(path, entry)
    }

    /// Store `entry` as the most recently used one. An existing entry is only
    /// replaced by a strictly newer one; returns whether `entry` was stored.
    /// Currency is not checked, see [`FooterCache::put_if_current`].
    pub fn put(&self, path: impl Into<PathBuf>, entry: FooterCacheEntry) -> bool {
        let path = path.into();
        let mut state = self.state.write();
        if !entry.is_newer_than(state.entries.get(&path).map(Arc::as_ref)) {
            debug!(
                path = %path.display(),
                modification_time = %entry.modification_time,
                "ignoring footer that is not newer than the cached one"
            );
            return false;
        }
        state.entries.shift_remove(&path);
        state.entries.insert(path, Arc::new(entry));
        state.evict_over_capacity();
        true
    }

    /// Mark `path` as most recently used
    pub fn touch(&self, path: &Path) -> bool {
        let mut state = self.state.write();
        match state.entries.get_index_of(path) {
            Some(index) => {
                let last = state.entries.len() - 1;
                state.entries.move_index(index, last);
                true
            }
            None => false,
        }
    }

    /// Raise the capacity to at least `capacity`; never shrinks
    pub fn grow_capacity(&self, capacity: usize) {
        let mut state = self.state.write();
        if capacity > state.capacity {
            state.capacity = capacity;
        }
    }

    pub fn remove(&self, path: &Path) -> Option<Arc<FooterCacheEntry>> {
        self.state.write().entries.shift_remove(path)
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.state.read().capacity
    }

    pub fn clear(&self) {
        self.state.write().entries.clear();
    }

    /// Cached paths from least to most recently used
    pub fn paths(&self) -> Vec<PathBuf> {
        self.state.read().entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{empty_footer, ts};

    fn entry(path: &str, seconds: i64) -> FooterCacheEntry {
        FooterCacheEntry::new(ts(seconds), empty_footer(path))
    }

    #[test]
    fn test_currency() {
        let e = entry("/a", 10);
        assert!(e.is_current(ts(10)));
        assert!(e.is_current(ts(9)));
        assert!(!e.is_current(ts(11)));
    }

    #[test]
    fn test_newness() {
        assert!(entry("/a", 10).is_newer_than(None));
        assert!(entry("/a", 11).is_newer_than(Some(&entry("/a", 10))));
        assert!(!entry("/a", 10).is_newer_than(Some(&entry("/a", 10))));
        assert!(!entry("/a", 9).is_newer_than(Some(&entry("/a", 10))));
    }

    #[test]
    fn test_lookup_does_not_change_recency() {
        let cache = FooterCache::new(2);
        cache.put("/a", entry("/a", 1));
        cache.put("/b", entry("/b", 1));

        assert!(cache.lookup(Path::new("/a"), ts(1)).is_some());
        cache.put("/c", entry("/c", 1));
        assert_eq!(cache.paths(), vec![PathBuf::from("/b"), PathBuf::from("/c")]);
    }

    #[test]
    fn test_touch_changes_recency() {
        let cache = FooterCache::new(2);
        cache.put("/a", entry("/a", 1));
        cache.put("/b", entry("/b", 1));

        assert!(cache.touch(Path::new("/a")));
        assert!(!cache.touch(Path::new("/missing")));
        cache.put("/c", entry("/c", 1));
        assert_eq!(cache.paths(), vec![PathBuf::from("/a"), PathBuf::from("/c")]);
    }

    #[test]
    fn test_replacement_moves_to_most_recent() {
        let cache = FooterCache::new(3);
        cache.put("/a", entry("/a", 1));
        cache.put("/b", entry("/b", 1));
        assert!(cache.put("/a", entry("/a", 2)));
        assert_eq!(cache.paths(), vec![PathBuf::from("/b"), PathBuf::from("/a")]);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(FooterCache::new(0).capacity(), 1);
        assert_eq!(FooterCache::for_file_count(7, 100).capacity(), 100);
        assert_eq!(FooterCache::for_file_count(250, 100).capacity(), 250);

        let cache = FooterCache::new(5);
        cache.grow_capacity(3);
        assert_eq!(cache.capacity(), 5);
        cache.grow_capacity(8);
        assert_eq!(cache.capacity(), 8);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = FooterCache::new(4);
        cache.put("/a", entry("/a", 1));
        cache.put("/b", entry("/b", 1));
        assert!(cache.remove(Path::new("/a")).is_some());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
