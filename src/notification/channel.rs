//! 通知渠道 trait 定义

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 默认通知标题
pub const DEFAULT_TITLE: &str = "🚨 Website Change Detected 🚨";

/// 默认显示时长（秒）
pub const DEFAULT_DISPLAY_SECS: u64 = 3;

/// 变更通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// 标题
    pub title: String,
    /// 消息内容
    pub message: String,
    /// 显示时长（秒）
    pub display_secs: u64,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            display_secs: DEFAULT_DISPLAY_SECS,
        }
    }

    /// 页面变化通知
    pub fn page_changed(title: impl Into<String>, url: &str) -> Self {
        Self::new(title, format!("Changes were detected on: {}", url))
    }

    /// 设置显示时长
    pub fn with_display_secs(mut self, secs: u64) -> Self {
        self.display_secs = secs;
        self
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run 或渠道不可用）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 通知渠道 trait
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志和配置）
    fn name(&self) -> &str;

    /// 发送通知
    fn send(&self, notification: &Notification) -> Result<SendResult>;
}
