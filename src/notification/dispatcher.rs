//! 通知分发器 - 管理多个渠道并路由消息

use super::channel::{Notification, NotificationChannel, SendResult};
use std::sync::Arc;
use tracing::{info, warn};

/// 通知分发器 - 管理多个渠道并路由消息
///
/// 发送失败只记录日志，不向调用方传播。
pub struct NotificationDispatcher {
    /// 所有注册的渠道
    channels: Vec<Arc<dyn NotificationChannel>>,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl NotificationDispatcher {
    /// 创建新的分发器
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册渠道
    pub fn register_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        info!(channel = channel.name(), "Registering notification channel");
        self.channels.push(channel);
    }

    /// 发送到所有渠道
    pub fn notify(&self, notification: &Notification) -> Vec<(String, SendResult)> {
        let mut results = Vec::new();

        for channel in &self.channels {
            let name = channel.name().to_string();

            if self.dry_run {
                info!(channel = %name, message = %notification.message, "Dry-run, notification not sent");
                results.push((name, SendResult::Skipped("dry-run".to_string())));
                continue;
            }

            let result = match channel.send(notification) {
                Ok(r) => r,
                Err(e) => SendResult::Failed(e.to_string()),
            };

            if let SendResult::Failed(reason) = &result {
                warn!(channel = %name, error = %reason, "Notification send failed");
            }

            results.push((name, result));
        }

        results
    }

    /// 获取已注册的渠道数量
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 获取已注册的渠道名称
    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 测试用的 mock 渠道
    struct MockChannel {
        name: String,
        send_count: AtomicUsize,
        fail: bool,
    }

    impl MockChannel {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                send_count: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                fail: true,
                ..Self::new(name)
            }
        }

        fn get_send_count(&self) -> usize {
            self.send_count.load(Ordering::SeqCst)
        }
    }

    impl NotificationChannel for MockChannel {
        fn name(&self) -> &str {
            &self.name
        }

        fn send(&self, _notification: &Notification) -> Result<SendResult> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(anyhow!("no display"))
            } else {
                Ok(SendResult::Sent)
            }
        }
    }

    #[test]
    fn test_dispatcher_register_channel() {
        let mut dispatcher = NotificationDispatcher::new();
        assert_eq!(dispatcher.channel_count(), 0);

        dispatcher.register_channel(Arc::new(MockChannel::new("test")));
        assert_eq!(dispatcher.channel_count(), 1);
        assert_eq!(dispatcher.channel_names(), vec!["test"]);
    }

    #[test]
    fn test_dispatcher_notify() {
        let mut dispatcher = NotificationDispatcher::new();
        let channel = Arc::new(MockChannel::new("test"));
        dispatcher.register_channel(channel.clone());

        let results = dispatcher.notify(&Notification::new("t", "m"));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "test");
        assert_eq!(results[0].1, SendResult::Sent);
        assert_eq!(channel.get_send_count(), 1);
    }

    #[test]
    fn test_dispatcher_dry_run() {
        let mut dispatcher = NotificationDispatcher::new().with_dry_run(true);
        let channel = Arc::new(MockChannel::new("test"));
        dispatcher.register_channel(channel.clone());

        let results = dispatcher.notify(&Notification::new("t", "m"));

        assert_eq!(results[0].1, SendResult::Skipped("dry-run".to_string()));
        assert_eq!(channel.get_send_count(), 0); // 不应该实际发送
    }

    #[test]
    fn test_failing_channel_does_not_stop_others() {
        let mut dispatcher = NotificationDispatcher::new();
        let broken = Arc::new(MockChannel::failing("broken"));
        let ok = Arc::new(MockChannel::new("ok"));
        dispatcher.register_channel(broken.clone());
        dispatcher.register_channel(ok.clone());

        let results = dispatcher.notify(&Notification::new("t", "m"));

        assert_eq!(results[0].1, SendResult::Failed("no display".to_string()));
        assert_eq!(results[1].1, SendResult::Sent);
        assert_eq!(ok.get_send_count(), 1);
    }
}
