//! 内存快照存储

use super::{SnapshotStore, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 内存快照存储（记录写入次数）
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<String, String>>,
    write_count: AtomicUsize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已执行的 save 次数
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// 当前快照数量
    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(snapshots.get(key).cloned())
    }

    fn save(&self, key: &str, content: &str) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        snapshots.insert(key.to_string(), content.to_string());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip_and_count() {
        let store = MemorySnapshotStore::new();
        assert!(store.is_empty());
        assert!(store.load("a").unwrap().is_none());

        store.save("a", "one").unwrap();
        store.save("a", "two").unwrap();

        assert_eq!(store.load("a").unwrap().as_deref(), Some("two"));
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_survives_poisoned_lock() {
        let store = std::sync::Arc::new(MemorySnapshotStore::new());
        store.save("a", "one").unwrap();

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.snapshots.lock().unwrap();
            panic!("panic while holding the snapshot lock");
        })
        .join();

        assert!(store.snapshots.is_poisoned());
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        assert_eq!(store.load("a").unwrap().as_deref(), Some("one"));
    }
}
