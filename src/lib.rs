//! Page Watch - 监控网页内容变化并发送通知
//!
//! 抓取页面 → 规范化（去掉脚本、注释、广告等噪声）→ 与快照比较指纹 →
//! 变化时更新快照并通知。

pub mod config;
pub mod detector;
pub mod fetch;
pub mod fingerprint;
pub mod normalizer;
pub mod notification;
pub mod pipeline;
pub mod snapshot;
pub mod target;

pub use config::{ConfigError, WatchConfig};
pub use detector::{ChangeDetector, ChangeResult, DetectError};
pub use fetch::{CommandFetcher, FetchError, HttpFetcher, PageFetcher};
pub use fingerprint::{fingerprint, ContentFingerprint};
pub use normalizer::{NormalizePolicy, Normalizer};
pub use notification::{Notification, NotificationBuilder, NotificationChannel, NotificationDispatcher, SendResult};
pub use pipeline::{repeat_until, Pipeline, RunSummary, StatusLine, TargetOutcome, TargetReport};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore, StoreError};
pub use target::{load_targets, parse_url_list, slug, MonitoredTarget};
