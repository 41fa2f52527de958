//! 通知抽象层 - 页面变化时通知用户
//!
//! 所有渠道实现 `NotificationChannel` trait，由 `NotificationDispatcher` 统一分发。
//! 通知是 fire-and-forget：任何渠道失败都只记录日志，不影响检测流程。
//!
//! # 使用示例
//! ```ignore
//! use page_watch::notification::{Notification, NotificationBuilder};
//!
//! let dispatcher = NotificationBuilder::new().build()?;
//! dispatcher.notify(&Notification::page_changed("Changed", "https://example.com"));
//! ```

pub mod builder;
pub mod channel;
pub mod channels;
pub mod dispatcher;

pub use builder::NotificationBuilder;
pub use channel::{Notification, NotificationChannel, SendResult, DEFAULT_DISPLAY_SECS, DEFAULT_TITLE};
pub use dispatcher::NotificationDispatcher;
