use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use parquet_planner::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use test_helpers::*;

fn entry(path: &str, seconds: i64) -> FooterCacheEntry {
    FooterCacheEntry::new(
        ts(seconds),
        Footer::new(path, Arc::new(document_metadata(&[4]))),
    )
}

#[test]
fn test_lookup_respects_modification_time() {
    let cache = FooterCache::new(MIN_FOOTER_CACHE_SIZE);
    assert!(cache.put("/data/a.parquet", entry("/data/a.parquet", 10)));

    let path = Path::new("/data/a.parquet");
    let hit = cache.lookup(path, ts(10)).unwrap();
    assert_eq!(hit.modification_time(), ts(10));
    assert_eq!(hit.footer().path(), path);

    // the file changed after its footer was cached
    assert!(cache.lookup(path, ts(11)).is_none());
    // a stale miss keeps the entry
    assert_eq!(cache.len(), 1);

    assert!(cache.lookup(Path::new("/data/b.parquet"), ts(10)).is_none());
}

#[test]
fn test_only_strictly_newer_entries_replace() {
    let cache = FooterCache::new(4);
    assert!(cache.put("/a", entry("/a", 10)));
    assert!(!cache.put("/a", entry("/a", 9)));
    assert!(!cache.put("/a", entry("/a", 10)));
    assert_eq!(
        cache.lookup(Path::new("/a"), ts(0)).unwrap().modification_time(),
        ts(10)
    );

    assert!(cache.put("/a", entry("/a", 12)));
    assert!(cache.lookup(Path::new("/a"), ts(11)).is_some());
}

#[test]
fn test_least_recently_used_is_evicted() {
    let cache = FooterCache::new(3);
    for name in ["/a", "/b", "/c"] {
        cache.put(name, entry(name, 1));
    }
    cache.touch(Path::new("/a"));
    cache.put("/d", entry("/d", 1));

    assert_eq!(cache.len(), 3);
    assert!(cache.lookup(Path::new("/b"), ts(1)).is_none());
    assert_eq!(
        cache.paths(),
        vec![PathBuf::from("/c"), PathBuf::from("/a"), PathBuf::from("/d")]
    );
}

#[test]
fn test_concurrent_puts_keep_newest() {
    let cache = FooterCache::new(8);
    let mut rng = StdRng::seed_from_u64(7);
    let orders: Vec<Vec<i64>> = (0..8)
        .map(|_| {
            let mut times: Vec<i64> = (1..=64).collect();
            times.shuffle(&mut rng);
            times
        })
        .collect();

    thread::scope(|scope| {
        for times in &orders {
            let cache = &cache;
            scope.spawn(move || {
                for &t in times {
                    cache.put("/shared", entry("/shared", t));
                    if let Some(seen) = cache.lookup(Path::new("/shared"), ts(0)) {
                        assert_eq!(seen.footer().path(), Path::new("/shared"));
                    }
                }
            });
        }
    });

    let entry = cache.lookup(Path::new("/shared"), ts(64)).unwrap();
    assert_eq!(entry.modification_time(), ts(64));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_lookup_snapshot_survives_replacement() {
    let cache = FooterCache::new(2);
    cache.put("/a", entry("/a", 1));
    let snapshot = cache.lookup(Path::new("/a"), ts(1)).unwrap();

    cache.put("/a", entry("/a", 2));
    cache.clear();
    assert_eq!(snapshot.modification_time(), ts(1));
    assert_eq!(snapshot.footer().metadata().row_groups().len(), 1);
}

#[test]
fn test_put_if_current_rejects_entries_older_than_the_file() {
    let cache = FooterCache::new(4);
    let path = Path::new("/a");

    // footer read at 10, but the file has since moved to 11
    assert!(!cache.put_if_current(path, entry("/a", 10), ts(11)));
    assert!(cache.is_empty());

    assert!(cache.put_if_current(path, entry("/a", 11), ts(11)));
    assert!(cache.lookup(path, ts(11)).is_some());

    // still subject to the newness rule
    assert!(!cache.put_if_current(path, entry("/a", 11), ts(10)));
    assert!(cache.put_if_current(path, entry("/a", 12), ts(12)));
    assert_eq!(cache.lookup(path, ts(12)).unwrap().modification_time(), ts(12));
}
