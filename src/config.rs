//! 配置加载 - `~/.config/page-watch/config.json`
//!
//! 文件不存在时使用默认值；所有字段都是可选的。

use crate::normalizer::NormalizePolicy;
use crate::notification::{DEFAULT_DISPLAY_SECS, DEFAULT_TITLE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 通知配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// 通知标题
    pub title: String,
    /// 显示时长（秒）
    pub display_secs: u64,
    /// 启用的渠道：`desktop` / `console`
    pub channels: Vec<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            display_secs: DEFAULT_DISPLAY_SECS,
            channels: vec!["desktop".to_string()],
        }
    }
}

/// 运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// URL 列表文件
    pub urls_file: PathBuf,
    /// 快照目录
    pub snapshot_dir: PathBuf,
    /// 抓取超时（毫秒）
    pub fetch_timeout_ms: u64,
    /// 外部渲染命令（设置后代替 HTTP 抓取）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer_command: Option<Vec<String>>,
    /// HTTP 抓取使用的 User-Agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// 动态内容标记 class
    pub dynamic_classes: Vec<String>,
    /// 视为噪声的嵌入标签
    pub embed_tags: Vec<String>,
    /// 通知配置
    pub notification: NotificationConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        let policy = NormalizePolicy::default();
        Self {
            urls_file: PathBuf::from("urls.txt"),
            snapshot_dir: PathBuf::from("snapshots"),
            fetch_timeout_ms: 30_000,
            renderer_command: None,
            user_agent: None,
            dynamic_classes: policy.dynamic_classes,
            embed_tags: policy.embed_tags,
            notification: NotificationConfig::default(),
        }
    }
}

impl WatchConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("page-watch")
            .join("config.json")
    }

    /// 加载配置；指定路径必须存在，默认路径不存在时使用默认值
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// 从 JSON 文件读取
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn normalize_policy(&self) -> NormalizePolicy {
        NormalizePolicy::new(self.dynamic_classes.clone(), self.embed_tags.clone())
    }
}
