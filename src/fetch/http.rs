//! HTTP 抓取

use super::{FetchError, PageFetcher};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("body selector"));

const DEFAULT_USER_AGENT: &str = concat!("page-watch/", env!("CARGO_PKG_VERSION"));

/// 基于 reqwest 的抓取器（不执行页面脚本）
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: Option<&str>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Network(e.to_string())
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Navigation(format!("HTTP {}", status)));
        }

        let html = response.text().await.map_err(map_err)?;
        debug!(url = %url, bytes = html.len(), "Page downloaded");

        extract_body(&html)
    }
}

/// 提取 `<body>` 的 inner markup
pub fn extract_body(html: &str) -> Result<String, FetchError> {
    let document = Html::parse_document(html);
    let body = document
        .select(&BODY)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default();

    if body.trim().is_empty() {
        return Err(FetchError::EmptyBody);
    }
    Ok(body)
}
