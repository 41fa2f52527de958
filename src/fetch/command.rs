//! 外部渲染命令抓取
//!
//! 执行 `<program> <args...> <url>`，stdout 即 body markup。
//! 超时时间通过环境变量 `PAGE_WATCH_TIMEOUT_MS` 传给渲染命令。

use super::{FetchError, PageFetcher};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// 外部渲染命令抓取器
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: String,
    args: Vec<String>,
}

impl CommandFetcher {
    /// 从命令行数组创建（第一个元素为程序）
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl PageFetcher for CommandFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .env("PAGE_WATCH_TIMEOUT_MS", timeout.as_millis().to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FetchError::Navigation(format!("cannot start {}: {}", self.program, e)))?;

        // 超时后 future 被丢弃，kill_on_drop 负责结束子进程
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| FetchError::Timeout(timeout))?
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Navigation(format!(
                "renderer exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let markup = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(url = %url, bytes = markup.len(), "Renderer output received");

        if markup.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(markup)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandFetcher {
        CommandFetcher::new(&["sh".to_string(), "-c".to_string(), script.to_string()]).unwrap()
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(CommandFetcher::new(&[]).is_none());
    }

    #[tokio::test]
    async fn test_command_receives_url() {
        // sh -c 的第一个额外参数是 $0
        let fetcher = sh(r#"printf '<p>%s</p>' "$0""#);
        let markup = fetcher
            .fetch("https://example.com", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(markup, "<p>https://example.com</p>");
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let fetcher = sh("sleep 5");
        let err = fetcher
            .fetch("https://example.com", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_command_failure_is_navigation_error() {
        let fetcher = sh("echo 'net::ERR_NAME_NOT_RESOLVED' >&2; exit 3");
        let err = fetcher
            .fetch("https://example.invalid", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            FetchError::Navigation(msg) => assert!(msg.contains("ERR_NAME_NOT_RESOLVED")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let fetcher = CommandFetcher::new(&["/nonexistent/renderer".to_string()]).unwrap();
        let err = fetcher
            .fetch("https://example.com", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Navigation(_)));
    }

    #[tokio::test]
    async fn test_empty_output() {
        let fetcher = sh("true");
        let err = fetcher
            .fetch("https://example.com", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::EmptyBody));
    }
}
