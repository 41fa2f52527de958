//! Page Watch CLI
//!
//! 监控网页内容变化，发现变化时发送桌面通知

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use page_watch::{
    fingerprint, load_targets, repeat_until, slug, ChangeDetector, CommandFetcher,
    ContentFingerprint, FetchError, FileSnapshotStore, HttpFetcher, NotificationBuilder,
    Normalizer, PageFetcher, Pipeline, RunSummary, SnapshotStore, WatchConfig,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "pwatch")]
#[command(about = "Page Watch - 监控网页内容变化并发送通知")]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/page-watch/config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 检查所有目标一次
    Check(RunArgs),
    /// 按固定间隔持续检查，Ctrl-C 退出
    Watch {
        /// 检查间隔（秒）
        #[arg(long, short, default_value = "3600")]
        interval: u64,
        #[command(flatten)]
        run: RunArgs,
    },
    /// 列出目标及其快照状态
    Status {
        #[command(flatten)]
        paths: PathArgs,
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
    /// 打印 URL 对应的快照 key
    Slug {
        url: String,
    },
    /// 打印 markup 文件的规范化结果
    Normalize {
        file: PathBuf,
    },
}

#[derive(Args, Clone)]
struct PathArgs {
    /// URL 列表文件
    #[arg(long)]
    urls: Option<PathBuf>,
    /// 快照目录
    #[arg(long)]
    snapshots: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct RunArgs {
    #[command(flatten)]
    paths: PathArgs,
    /// 抓取超时（毫秒）
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// 不发送通知
    #[arg(long)]
    dry_run: bool,
    /// 输出 JSON 汇总（不打印状态行）
    #[arg(long)]
    json: bool,
}

impl PathArgs {
    fn apply(&self, config: &mut WatchConfig) {
        if let Some(urls) = &self.urls {
            config.urls_file = urls.clone();
        }
        if let Some(dir) = &self.snapshots {
            config.snapshot_dir = dir.clone();
        }
    }
}

impl RunArgs {
    fn apply(&self, config: &mut WatchConfig) {
        self.paths.apply(config);
        if let Some(ms) = self.timeout_ms {
            config.fetch_timeout_ms = ms;
        }
    }
}

/// 按配置选择的抓取器
enum Fetcher {
    Http(HttpFetcher),
    Command(CommandFetcher),
}

impl Fetcher {
    fn from_config(config: &WatchConfig) -> Result<Self> {
        match &config.renderer_command {
            Some(command) => CommandFetcher::new(command)
                .map(Fetcher::Command)
                .ok_or_else(|| anyhow!("renderer_command must not be empty")),
            None => Ok(Fetcher::Http(HttpFetcher::new(config.user_agent.as_deref())?)),
        }
    }
}

impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        match self {
            Fetcher::Http(f) => f.fetch(url, timeout).await,
            Fetcher::Command(f) => f.fetch(url, timeout).await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("page_watch=info,pwatch=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let mut config = WatchConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Check(args) => {
            args.apply(&mut config);
            let summary = run_pass(&config, &args).await?;
            report(&summary, args.json)?;
        }
        Commands::Watch { interval, run } => {
            run.apply(&mut config);
            let interval = Duration::from_secs(interval.max(1));
            info!(interval_secs = interval.as_secs(), "Watching pages");

            let config = &config;
            let run = &run;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Cannot listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };

            let passes = repeat_until(interval, shutdown, move || async move {
                match run_pass(config, run).await {
                    Ok(summary) => {
                        if let Err(e) = report(&summary, run.json) {
                            warn!(error = %e, "Cannot print run summary");
                        }
                    }
                    Err(e) => warn!(error = %e, "Pass aborted"),
                }
            })
            .await;
            info!(passes, "Watch stopped");
        }
        Commands::Status { paths, json } => {
            paths.apply(&mut config);
            show_status(&config, json)?;
        }
        Commands::Slug { url } => {
            println!("{}", slug(&url));
        }
        Commands::Normalize { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let normalizer = Normalizer::new(config.normalize_policy());
            println!("{}", normalizer.normalize(&raw));
        }
    }

    Ok(())
}

/// 执行一次完整检查
async fn run_pass(config: &WatchConfig, args: &RunArgs) -> Result<RunSummary> {
    let targets = load_targets(&config.urls_file)?;
    let store = FileSnapshotStore::open(&config.snapshot_dir)?;
    let _lock = store.lock()?;

    let dispatcher = NotificationBuilder::new()
        .channels(config.notification.channels.clone())
        .dry_run(args.dry_run)
        .build()?;

    let pipeline = Pipeline::new(Fetcher::from_config(config)?, ChangeDetector::new(store), dispatcher)
        .with_normalizer(Normalizer::new(config.normalize_policy()))
        .with_timeout(config.fetch_timeout())
        .with_notification(config.notification.title.clone(), config.notification.display_secs)
        .with_status_output(!args.json);

    Ok(pipeline.run(&targets).await)
}

fn report(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!(
            "Done: {} changed, {} unchanged, {} failed",
            summary.changed(),
            summary.unchanged(),
            summary.failed()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusEntry {
    url: String,
    slug: String,
    fingerprint: Option<ContentFingerprint>,
}

fn show_status(config: &WatchConfig, json: bool) -> Result<()> {
    let targets = load_targets(&config.urls_file)?;
    let store = FileSnapshotStore::open(&config.snapshot_dir)?;

    let mut entries = Vec::with_capacity(targets.len());
    for target in targets {
        let fp = store.load(&target.slug)?.map(|s| fingerprint(&s));
        entries.push(StatusEntry {
            url: target.url,
            slug: target.slug,
            fingerprint: fp,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        let fp = entry
            .fingerprint
            .as_ref()
            .map(ContentFingerprint::short)
            .unwrap_or_else(|| "(none)".to_string());
        println!("{:<14} {:<40} {}", fp, entry.slug, entry.url);
    }
    Ok(())
}
