//! 变更检测 - 比较规范化内容与已存快照，确认变化时更新快照

use crate::fingerprint::fingerprint;
use crate::snapshot::{SnapshotStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// 检测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeResult {
    Changed,
    Unchanged,
}

/// 检测错误
#[derive(Debug, Error)]
pub enum DetectError {
    /// 读取旧快照失败，未做任何写入
    #[error("cannot load baseline: {0}")]
    Load(#[source] StoreError),
    /// 已判定为 Changed，但新基线没有保存成功
    #[error("content changed but baseline was not updated: {0}")]
    Save(#[source] StoreError),
}

/// 变更检测器
pub struct ChangeDetector<S> {
    store: S,
}

impl<S: SnapshotStore> ChangeDetector<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 检测变化并在 Changed 时写入新基线
    ///
    /// - 没有旧快照：视为 Changed（首次观察）
    /// - 指纹相同：Unchanged，不写入
    /// - 指纹不同：Changed，写入一次
    pub fn detect_and_update(&self, key: &str, normalized: &str) -> Result<ChangeResult, DetectError> {
        let previous = self.store.load(key).map_err(DetectError::Load)?;

        let result = match previous {
            None => {
                debug!(key = %key, "No baseline, treating as changed");
                ChangeResult::Changed
            }
            Some(previous) if fingerprint(&previous) == fingerprint(normalized) => {
                ChangeResult::Unchanged
            }
            Some(_) => ChangeResult::Changed,
        };

        if result == ChangeResult::Changed {
            self.store.save(key, normalized).map_err(DetectError::Save)?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MemorySnapshotStore;
    use std::io;

    #[test]
    fn test_first_observation_is_changed_and_stored() {
        let detector = ChangeDetector::new(MemorySnapshotStore::new());

        let result = detector.detect_and_update("example.com", "<p>N1</p>").unwrap();

        assert_eq!(result, ChangeResult::Changed);
        assert_eq!(
            detector.store().load("example.com").unwrap().as_deref(),
            Some("<p>N1</p>")
        );
    }

    #[test]
    fn test_no_redundant_writes() {
        let detector = ChangeDetector::new(MemorySnapshotStore::new());

        assert_eq!(detector.detect_and_update("k", "same").unwrap(), ChangeResult::Changed);
        assert_eq!(detector.detect_and_update("k", "same").unwrap(), ChangeResult::Unchanged);
        assert_eq!(detector.store().write_count(), 1);
    }

    #[test]
    fn test_change_overwrites_baseline() {
        let detector = ChangeDetector::new(MemorySnapshotStore::new());
        detector.detect_and_update("k", "old").unwrap();

        assert_eq!(detector.detect_and_update("k", "new").unwrap(), ChangeResult::Changed);
        assert_eq!(detector.store().load("k").unwrap().as_deref(), Some("new"));
        assert_eq!(detector.store().write_count(), 2);
    }

    #[test]
    fn test_keys_are_independent() {
        let detector = ChangeDetector::new(MemorySnapshotStore::new());
        detector.detect_and_update("a", "content").unwrap();

        assert_eq!(detector.detect_and_update("b", "content").unwrap(), ChangeResult::Changed);
    }

    /// 读写都会失败的存储
    struct BrokenStore {
        fail_load: bool,
    }

    impl SnapshotStore for BrokenStore {
        fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_load {
                Err(StoreError::Read {
                    key: key.to_string(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                })
            } else {
                Ok(Some("old".to_string()))
            }
        }

        fn save(&self, key: &str, _content: &str) -> Result<(), StoreError> {
            Err(StoreError::Write {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            })
        }
    }

    #[test]
    fn test_load_failure_is_surfaced() {
        let detector = ChangeDetector::new(BrokenStore { fail_load: true });
        let err = detector.detect_and_update("k", "new").unwrap_err();
        assert!(matches!(err, DetectError::Load(StoreError::Read { .. })));
    }

    #[test]
    fn test_save_failure_is_surfaced() {
        let detector = ChangeDetector::new(BrokenStore { fail_load: false });
        let err = detector.detect_and_update("k", "new").unwrap_err();
        assert!(matches!(err, DetectError::Save(StoreError::Write { .. })));
    }

    #[test]
    fn test_unchanged_never_writes_even_if_store_is_read_only() {
        let detector = ChangeDetector::new(BrokenStore { fail_load: false });
        assert_eq!(detector.detect_and_update("k", "old").unwrap(), ChangeResult::Unchanged);
    }
}
