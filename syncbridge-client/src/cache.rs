//! Per-path status cache.
//!
//! Keys are absolute local paths. Entries are only ever overwritten, never
//! removed: losing the daemon rewrites every value to `unknown` in place so
//! adapters never see an entry vanish.
//!
//! All writes take the single write lock for their whole duration, so a
//! batch apply and an invalidation sweep can never interleave, and readers
//! never observe half of a batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use syncbridge_core::{ConnectionState, FileStatus};

/// Daemon presence flag shared by the supervisor and the cache.
#[derive(Debug, Default)]
pub(crate) struct Presence(AtomicBool);

impl Presence {
    pub(crate) fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Store the new value, returning the previous one.
    pub(crate) fn swap(&self, present: bool) -> bool {
        self.0.swap(present, Ordering::AcqRel)
    }

    pub(crate) fn state(&self) -> ConnectionState {
        ConnectionState::from(self.get())
    }
}

#[derive(Debug)]
pub struct StatusCache {
    presence: Arc<Presence>,
    entries: RwLock<HashMap<PathBuf, FileStatus>>,
}

impl StatusCache {
    pub(crate) fn new(presence: Arc<Presence>) -> Self {
        Self {
            presence,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Last known status of `path`.
    ///
    /// `Unknown` when the path was never seen or when the daemon is absent;
    /// a disconnected client never vouches for a possibly stale value.
    pub fn get(&self, path: &Path) -> FileStatus {
        if !self.presence.get() {
            return FileStatus::Unknown;
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(path).copied().unwrap_or_default()
    }

    pub fn replace(&self, path: PathBuf, status: FileStatus) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(path, status);
    }

    pub fn batch_replace<I>(&self, batch: I)
    where
        I: IntoIterator<Item = (PathBuf, FileStatus)>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.extend(batch);
    }

    /// Rewrite every value to `Unknown`, keeping every key.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for status in entries.values_mut() {
            *status = FileStatus::Unknown;
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw copy of the map, ignoring presence.
    pub fn snapshot(&self) -> HashMap<PathBuf, FileStatus> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_cache() -> StatusCache {
        let presence = Arc::new(Presence::default());
        presence.swap(true);
        StatusCache::new(presence)
    }

    #[test]
    fn unseen_path_is_unknown() {
        let cache = connected_cache();
        assert_eq!(cache.get(Path::new("/never/queried")), FileStatus::Unknown);
    }

    #[test]
    fn batch_then_get() {
        let cache = connected_cache();
        cache.batch_replace([
            (PathBuf::from("/d/a"), FileStatus::Synced),
            (PathBuf::from("/d/b"), FileStatus::CloudOnly),
        ]);
        assert_eq!(cache.get(Path::new("/d/a")), FileStatus::Synced);
        assert_eq!(cache.get(Path::new("/d/b")), FileStatus::CloudOnly);
    }

    #[test]
    fn disconnected_reads_are_unknown_but_values_stay() {
        let presence = Arc::new(Presence::default());
        let cache = StatusCache::new(presence.clone());
        cache.replace(PathBuf::from("/d/a"), FileStatus::Synced);
        assert_eq!(cache.get(Path::new("/d/a")), FileStatus::Unknown);

        presence.swap(true);
        assert_eq!(cache.get(Path::new("/d/a")), FileStatus::Synced);
    }

    #[test]
    fn invalidate_keeps_keys() {
        let cache = connected_cache();
        cache.batch_replace([
            (PathBuf::from("/d/a"), FileStatus::Synced),
            (PathBuf::from("/d/b"), FileStatus::Conflict),
            (PathBuf::from("/d/c"), FileStatus::Pending),
        ]);
        cache.invalidate_all();

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.values().all(|s| *s == FileStatus::Unknown));
    }

    #[test]
    fn later_write_wins() {
        let cache = connected_cache();
        cache.batch_replace([(PathBuf::from("/d/a"), FileStatus::Syncing)]);
        cache.replace(PathBuf::from("/d/a"), FileStatus::Synced);
        assert_eq!(cache.get(Path::new("/d/a")), FileStatus::Synced);
    }

    #[test]
    fn concurrent_readers_never_see_half_a_batch() {
        let cache = Arc::new(connected_cache());
        let paths: Vec<PathBuf> = (0..64).map(|i| PathBuf::from(format!("/d/{i}"))).collect();

        let writer = {
            let cache = cache.clone();
            let paths = paths.clone();
            std::thread::spawn(move || {
                for round in 0..200 {
                    let status = if round % 2 == 0 {
                        FileStatus::Synced
                    } else {
                        FileStatus::CloudOnly
                    };
                    cache.batch_replace(paths.iter().cloned().map(|p| (p, status)));
                }
            })
        };

        for _ in 0..200 {
            let snapshot = cache.snapshot();
            let mut distinct: Vec<FileStatus> = snapshot.values().copied().collect();
            distinct.sort_by_key(|s| s.as_str());
            distinct.dedup();
            assert!(distinct.len() <= 1, "mixed batch observed: {distinct:?}");
        }
        writer.join().expect("writer thread");
    }
}
