//! 桌面通知渠道（Linux: notify-send，macOS: osascript）

use crate::notification::channel::{Notification, NotificationChannel, SendResult};
use anyhow::Result;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// 桌面通知后端
#[derive(Debug, Clone, PartialEq)]
enum Backend {
    NotifySend(PathBuf),
    Osascript(PathBuf),
}

/// 桌面通知渠道
pub struct DesktopChannel {
    backend: Option<Backend>,
}

impl DesktopChannel {
    /// 自动检测可用的通知命令
    pub fn new() -> Self {
        let backend = if cfg!(target_os = "macos") {
            which::which("osascript").ok().map(Backend::Osascript)
        } else {
            which::which("notify-send").ok().map(Backend::NotifySend)
        };

        match &backend {
            Some(b) => debug!(backend = ?b, "Desktop notifier detected"),
            None => warn!("No desktop notifier found, desktop notifications disabled"),
        }

        Self { backend }
    }

    /// 是否找到了通知命令
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }
}

impl Default for DesktopChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for DesktopChannel {
    fn name(&self) -> &str {
        "desktop"
    }

    fn send(&self, notification: &Notification) -> Result<SendResult> {
        let mut command = match &self.backend {
            Some(Backend::NotifySend(path)) => {
                let mut cmd = Command::new(path);
                cmd.arg("--app-name=page-watch")
                    .arg("-t")
                    .arg(notify_send_timeout_ms(notification.display_secs).to_string())
                    .arg(&notification.title)
                    .arg(&notification.message);
                cmd
            }
            Some(Backend::Osascript(path)) => {
                let mut cmd = Command::new(path);
                cmd.arg("-e").arg(apple_script(notification));
                cmd
            }
            None => return Ok(SendResult::Skipped("no desktop notifier".to_string())),
        };

        let output = command.output()?;
        if output.status.success() {
            Ok(SendResult::Sent)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(SendResult::Failed(stderr.trim().to_string()))
        }
    }
}

/// `notify-send -t` 的毫秒数，按 gint 上限截断
fn notify_send_timeout_ms(display_secs: u64) -> u64 {
    display_secs.saturating_mul(1000).min(i32::MAX as u64)
}

/// 生成 `display notification` 脚本
fn apple_script(notification: &Notification) -> String {
    format!(
        "display notification \"{}\" with title \"{}\"",
        escape_apple_string(&notification.message),
        escape_apple_string(&notification.title)
    )
}

fn escape_apple_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
