//! 页面抓取 - 获取渲染后的 body markup
//!
//! - `HttpFetcher`: 直接 HTTP GET，提取 `<body>` 内容
//! - `CommandFetcher`: 调用外部渲染命令（如 headless 浏览器脚本），读取 stdout

pub mod command;
pub mod http;

pub use command::CommandFetcher;
pub use http::HttpFetcher;

use std::time::Duration;
use thiserror::Error;

/// 默认抓取超时
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(30_000);

/// 抓取错误
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("page body is empty")]
    EmptyBody,
}

/// 页面抓取 trait
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// 抓取页面 body 的渲染 markup，超时视为失败
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        (**self).fetch(url, timeout).await
    }
}
