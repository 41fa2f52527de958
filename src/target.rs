//! 监控目标 - URL 列表加载与快照 key 生成

use crate::fingerprint::fingerprint;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// key 最大长度，加上 `.html` 后仍在常见文件名上限（255 字节）内
pub const MAX_SLUG_LEN: usize = 200;

static SCHEME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("scheme prefix regex")
});

/// 单个监控目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitoredTarget {
    /// 原始 URL
    pub url: String,
    /// 快照 key（由 URL 派生）
    pub slug: String,
}

impl MonitoredTarget {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let slug = slug(&url);
        Self { url, slug }
    }
}

/// 从 URL 生成文件系统安全的快照 key
///
/// 去掉 scheme 前缀和开头的 `www.`，路径分隔符以及其他不安全字符替换为 `_`。
/// 超过 `MAX_SLUG_LEN` 时截断，并追加整个 URL 指纹的前 12 位以区分同前缀的 URL。
/// 同一个 URL 永远得到同一个 key。
pub fn slug(url: &str) -> String {
    let trimmed = url.trim();
    let without_scheme = SCHEME_PREFIX.replace(trimmed, "");
    let host_and_path = without_scheme
        .strip_prefix("www.")
        .unwrap_or(&without_scheme);

    let key: String = host_and_path
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if key.is_empty() {
        return "_".to_string();
    }
    if key.len() <= MAX_SLUG_LEN {
        return key;
    }

    // key 只含 ASCII，按字节截断安全
    let suffix = format!("-{}", fingerprint(trimmed).short());
    let mut capped = key[..MAX_SLUG_LEN - suffix.len()].to_string();
    capped.push_str(&suffix);
    capped
}

/// 解析 URL 列表文本
///
/// 每行一个 URL；空行和 `#` 开头的注释行忽略；重复 URL 只保留第一次出现。
pub fn parse_url_list(content: &str) -> Vec<MonitoredTarget> {
    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(line.to_string()))
        .map(MonitoredTarget::new)
        .collect()
}

/// 读取 URL 列表文件
pub fn load_targets(path: &Path) -> Result<Vec<MonitoredTarget>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read URL list {}", path.display()))?;
    Ok(parse_url_list(&content))
}
