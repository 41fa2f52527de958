//! 快照存储 - 每个目标最近一次规范化内容的持久化
//!
//! - `FileSnapshotStore`: 每个目标一个 `<slug>.html` 文件
//! - `MemorySnapshotStore`: 进程内存储，记录写入次数

pub mod file;
pub mod memory;

pub use file::{FileSnapshotStore, RunLock};
pub use memory::MemorySnapshotStore;

use std::io;
use thiserror::Error;

/// 快照存储错误（"不存在" 不是错误，由 `load` 返回 `None` 表示）
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read snapshot '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("snapshot '{key}' is not valid UTF-8")]
    Corrupt { key: String },
    #[error("failed to write snapshot '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("snapshot directory {path} is locked by another run")]
    Locked { path: String },
    #[error("cannot prepare snapshot directory {path}: {source}")]
    Init {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// 快照存储 trait
///
/// 同一个 key 不支持并发写入，由调用方保证串行。
pub trait SnapshotStore {
    /// 读取快照，不存在时返回 `Ok(None)`
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 完整覆盖写入快照
    fn save(&self, key: &str, content: &str) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, content: &str) -> Result<(), StoreError> {
        (**self).save(key, content)
    }
}
