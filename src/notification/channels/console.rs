//! 控制台渠道 - 直接打印到 stdout

use crate::notification::channel::{Notification, NotificationChannel, SendResult};
use anyhow::Result;

pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    fn send(&self, notification: &Notification) -> Result<SendResult> {
        println!("[通知] {} {}", notification.title, notification.message);
        Ok(SendResult::Sent)
    }
}
