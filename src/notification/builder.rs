//! 通知系统构建器 - 按名称配置渠道

use super::channels::{ConsoleChannel, DesktopChannel};
use super::dispatcher::NotificationDispatcher;
use anyhow::{bail, Result};
use std::sync::Arc;

/// 通知系统构建器
pub struct NotificationBuilder {
    channels: Vec<String>,
    dry_run: bool,
}

impl NotificationBuilder {
    pub fn new() -> Self {
        Self {
            channels: vec!["desktop".to_string()],
            dry_run: false,
        }
    }

    /// 设置渠道名称列表（`desktop` / `console`）
    pub fn channels(mut self, channels: Vec<String>) -> Self {
        self.channels = channels;
        self
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 构建 NotificationDispatcher
    pub fn build(self) -> Result<NotificationDispatcher> {
        let mut dispatcher = NotificationDispatcher::new().with_dry_run(self.dry_run);

        for name in &self.channels {
            match name.as_str() {
                "desktop" => dispatcher.register_channel(Arc::new(DesktopChannel::new())),
                "console" => dispatcher.register_channel(Arc::new(ConsoleChannel::new())),
                other => bail!("Unknown notification channel: {}", other),
            }
        }

        Ok(dispatcher)
    }
}

impl Default for NotificationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
