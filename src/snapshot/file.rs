//! 文件快照存储

use super::{SnapshotStore, StoreError};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const SNAPSHOT_EXTENSION: &str = "html";
const LOCK_FILE: &str = ".lock";

/// 文件快照存储：`<dir>/<slug>.html`
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// 打开存储目录（不存在则创建）
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Init {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 获取快照文件路径
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, SNAPSHOT_EXTENSION))
    }

    /// 获取运行锁，防止两次运行同时写同一个目录
    pub fn lock(&self) -> Result<RunLock, StoreError> {
        let path = self.dir.join(LOCK_FILE);
        let init_err = |source: io::Error| StoreError::Init {
            path: path.display().to_string(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(init_err)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(RunLock { file }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Err(StoreError::Locked {
                path: self.dir.display().to_string(),
            }),
            Err(e) => Err(init_err(e)),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(key = %key, "No snapshot yet");
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    key: key.to_string(),
                    source,
                })
            }
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StoreError::Corrupt {
                key: key.to_string(),
            })
    }

    fn save(&self, key: &str, content: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let write_err = |source: io::Error| StoreError::Write {
            key: key.to_string(),
            source,
        };

        // 先写临时文件再原子替换
        let temp_path = path.with_extension("tmp");
        {
            let mut temp_file = File::create(&temp_path).map_err(write_err)?;
            temp_file.write_all(content.as_bytes()).map_err(write_err)?;
            temp_file.sync_all().map_err(write_err)?;
        }

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(e));
        }

        debug!(key = %key, bytes = content.len(), "Snapshot saved");
        Ok(())
    }
}

/// 运行锁，drop 时释放
#[derive(Debug)]
pub struct RunLock {
    file: File,
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
