//! 检测流水线 - 依次抓取每个目标、规范化、比较并通知
//!
//! 每个目标的失败都被隔离：抓取失败跳过该目标且不访问快照，
//! 存储失败记录日志后继续处理后面的目标。

use crate::detector::{ChangeDetector, ChangeResult, DetectError};
use crate::fetch::{PageFetcher, DEFAULT_FETCH_TIMEOUT};
use crate::normalizer::Normalizer;
use crate::notification::{Notification, NotificationDispatcher, DEFAULT_DISPLAY_SECS, DEFAULT_TITLE};
use crate::snapshot::SnapshotStore;
use crate::target::MonitoredTarget;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// 单个目标的检查结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    Unchanged,
    Changed {
        /// 新基线是否保存成功
        baseline_saved: bool,
    },
    FetchFailed {
        reason: String,
    },
    StoreFailed {
        reason: String,
    },
}

/// 目标报告
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub url: String,
    pub slug: String,
    #[serde(flatten)]
    pub outcome: TargetOutcome,
}

/// 一次运行的汇总
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<TargetReport>,
}

impl RunSummary {
    pub fn changed(&self) -> usize {
        self.count(|o| matches!(o, TargetOutcome::Changed { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, TargetOutcome::Unchanged))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                TargetOutcome::FetchFailed { .. } | TargetOutcome::StoreFailed { .. }
            )
        })
    }

    fn count(&self, pred: impl Fn(&TargetOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|t| pred(&t.outcome)).count()
    }
}

/// 控制台状态行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine<'a> {
    Checking(&'a str),
    NoChange(&'a str),
    Changed(&'a str),
    FetchError(&'a str),
    StoreError(&'a str),
}

impl fmt::Display for StatusLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::Checking(url) => write!(f, "[INFO] Checking {}...", url),
            StatusLine::NoChange(url) => write!(f, "[OK] No change at {}", url),
            StatusLine::Changed(url) => write!(f, "🚨 [CHANGED] {}", url),
            StatusLine::FetchError(url) => write!(f, "[ERROR] Failed to fetch {}. Skipping...", url),
            StatusLine::StoreError(url) => write!(f, "[ERROR] Snapshot store failed for {}", url),
        }
    }
}

/// 检测流水线
pub struct Pipeline<F, S> {
    fetcher: F,
    normalizer: Normalizer,
    detector: ChangeDetector<S>,
    dispatcher: NotificationDispatcher,
    timeout: Duration,
    title: String,
    display_secs: u64,
    print_status: bool,
}

impl<F: PageFetcher, S: SnapshotStore> Pipeline<F, S> {
    pub fn new(fetcher: F, detector: ChangeDetector<S>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::default(),
            detector,
            dispatcher,
            timeout: DEFAULT_FETCH_TIMEOUT,
            title: DEFAULT_TITLE.to_string(),
            display_secs: DEFAULT_DISPLAY_SECS,
            print_status: true,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// 设置抓取超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 设置通知标题和显示时长
    pub fn with_notification(mut self, title: impl Into<String>, display_secs: u64) -> Self {
        self.title = title.into();
        self.display_secs = display_secs;
        self
    }

    /// 是否在 stdout 打印状态行
    pub fn with_status_output(mut self, enabled: bool) -> Self {
        self.print_status = enabled;
        self
    }

    pub fn detector(&self) -> &ChangeDetector<S> {
        &self.detector
    }

    /// 依次检查所有目标
    pub async fn run(&self, targets: &[MonitoredTarget]) -> RunSummary {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(targets.len());

        for target in targets {
            let outcome = self.check_target(target).await;
            reports.push(TargetReport {
                url: target.url.clone(),
                slug: target.slug.clone(),
                outcome,
            });
        }

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            outcomes: reports,
        };

        info!(
            changed = summary.changed(),
            unchanged = summary.unchanged(),
            failed = summary.failed(),
            "Run finished"
        );
        summary
    }

    /// 检查单个目标
    pub async fn check_target(&self, target: &MonitoredTarget) -> TargetOutcome {
        let url = target.url.as_str();
        self.status(StatusLine::Checking(url));

        let raw = match self.fetcher.fetch(url, self.timeout).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed, skipping target");
                self.status(StatusLine::FetchError(url));
                return TargetOutcome::FetchFailed {
                    reason: e.to_string(),
                };
            }
        };

        let normalized = self.normalizer.normalize(&raw);

        match self.detector.detect_and_update(&target.slug, &normalized) {
            Ok(ChangeResult::Unchanged) => {
                info!(url = %url, "No change");
                self.status(StatusLine::NoChange(url));
                TargetOutcome::Unchanged
            }
            Ok(ChangeResult::Changed) => {
                info!(url = %url, slug = %target.slug, "Change detected, baseline updated");
                self.status(StatusLine::Changed(url));
                self.notify(url);
                TargetOutcome::Changed {
                    baseline_saved: true,
                }
            }
            Err(DetectError::Save(e)) => {
                error!(
                    url = %url,
                    error = %e,
                    "Change detected but baseline was NOT updated; next run will report it again"
                );
                self.status(StatusLine::Changed(url));
                self.notify(url);
                TargetOutcome::Changed {
                    baseline_saved: false,
                }
            }
            Err(DetectError::Load(e)) => {
                error!(url = %url, error = %e, "Cannot read snapshot, skipping target");
                self.status(StatusLine::StoreError(url));
                TargetOutcome::StoreFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn notify(&self, url: &str) {
        let notification =
            Notification::page_changed(self.title.clone(), url).with_display_secs(self.display_secs);
        self.dispatcher.notify(&notification);
    }

    fn status(&self, line: StatusLine<'_>) {
        if self.print_status {
            println!("{}", line);
        }
    }
}

/// 按固定间隔重复执行 `pass`，直到 `shutdown` 完成
///
/// 关闭信号在检查进行中和等待间隔时都会生效，进行中的检查会被直接丢弃。
/// 返回完整执行的检查次数。
pub async fn repeat_until<P, Fut, S>(interval: Duration, shutdown: S, mut pass: P) -> usize
where
    P: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut completed = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(completed, "Interrupted during a pass, stopping");
                break;
            }
            _ = pass() => completed += 1,
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!(completed, "Interrupted, stopping");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    completed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        let url = "https://example.com";
        assert_eq!(
            StatusLine::Checking(url).to_string(),
            "[INFO] Checking https://example.com..."
        );
        assert_eq!(
            StatusLine::NoChange(url).to_string(),
            "[OK] No change at https://example.com"
        );
        assert_eq!(StatusLine::Changed(url).to_string(), "🚨 [CHANGED] https://example.com");
        assert_eq!(
            StatusLine::FetchError(url).to_string(),
            "[ERROR] Failed to fetch https://example.com. Skipping..."
        );
    }

    #[test]
    fn test_report_serialization() {
        let report = TargetReport {
            url: "https://example.com".to_string(),
            slug: "example.com".to_string(),
            outcome: TargetOutcome::Changed {
                baseline_saved: false,
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "changed");
        assert_eq!(json["baseline_saved"], false);
        assert_eq!(json["slug"], "example.com");
    }

    #[test]
    fn test_summary_serializes_outcomes() {
        let summary = RunSummary {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes: vec![TargetReport {
                url: "https://example.com".to_string(),
                slug: "example.com".to_string(),
                outcome: TargetOutcome::Unchanged,
            }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("targets").is_none());
        assert_eq!(json["outcomes"][0]["status"], "unchanged");
        assert_eq!(json["outcomes"][0]["url"], "https://example.com");
        assert!(json["started_at"].is_string());
    }

    #[tokio::test]
    async fn test_repeat_until_interrupts_running_pass() {
        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        let completed = tokio::time::timeout(
            Duration::from_secs(5),
            repeat_until(Duration::from_secs(3600), shutdown, std::future::pending::<()>),
        )
        .await
        .expect("shutdown must cancel a pass that never finishes");
        assert_eq!(completed, 0);
    }

    #[tokio::test]
    async fn test_repeat_until_interrupts_interval_wait() {
        let mut calls = 0;
        let completed = repeat_until(
            Duration::from_secs(3600),
            tokio::time::sleep(Duration::from_millis(50)),
            || {
                calls += 1;
                async {}
            },
        )
        .await;
        assert_eq!(completed, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_summary_counts() {
        let report = |outcome| TargetReport {
            url: String::new(),
            slug: String::new(),
            outcome,
        };
        let summary = RunSummary {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes: vec![
                report(TargetOutcome::Unchanged),
                report(TargetOutcome::Changed {
                    baseline_saved: true,
                }),
                report(TargetOutcome::FetchFailed {
                    reason: "timeout".to_string(),
                }),
                report(TargetOutcome::StoreFailed {
                    reason: "denied".to_string(),
                }),
            ],
        };

        assert_eq!(summary.changed(), 1);
        assert_eq!(summary.unchanged(), 1);
        assert_eq!(summary.failed(), 2);
    }
}
