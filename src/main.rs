// ==========================================
// 货运智能追踪系统 - 命令行入口
// ==========================================
// 命令: inspect（仅导入并列出货运）/ track（完整追踪并导出）
// 输出: 结果写 stdout，日志与进度写 stderr
// ==========================================

use anyhow::Context;
use cargo_tracker::api::{TrackRunResponse, TrackerApi};
use cargo_tracker::config::{ConfigManager, ConfigOverrides};
use cargo_tracker::domain::Shipment;
use cargo_tracker::engine::{CancellationFlag, ChannelEventPublisher, EnrichmentEventType};
use cargo_tracker::logging::{self, LogFormat};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cargo-tracker")]
#[command(about = "Enrich a cargo shipment spreadsheet with live tracking status")]
#[command(version)]
struct Cli {
    /// 配置文件路径（TOML）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read and classify a spreadsheet without contacting the tracking service
    Inspect {
        /// Input spreadsheet (.xlsx/.xlsm/.xls/.ods/.csv)
        input: PathBuf,
    },
    /// Track every shipment and export the enriched spreadsheet
    Track {
        /// Input spreadsheet (.xlsx/.xlsm/.xls/.ods/.csv)
        input: PathBuf,

        /// Output file (.xlsx or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tracking service endpoint
        #[arg(long)]
        backend_url: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Retries per shipment after a failed request
        #[arg(long)]
        max_retries: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    });

    let mut manager = ConfigManager::new();
    if let Some(path) = &cli.config {
        manager = manager.with_path(path);
    }

    match cli.command {
        Commands::Inspect { input } => {
            let config = manager
                .load(&ConfigOverrides::default())
                .context("配置加载失败")?;
            inspect(&TrackerApi::new(config), &input)
        }
        Commands::Track {
            input,
            output,
            backend_url,
            timeout_secs,
            max_retries,
        } => {
            let overrides = ConfigOverrides {
                backend_url,
                request_timeout_secs: timeout_secs,
                max_retries,
            };
            let config = manager.load(&overrides).context("配置加载失败")?;
            track(&TrackerApi::new(config), &input, output.as_deref()).await
        }
    }
}

fn inspect(api: &TrackerApi, input: &Path) -> anyhow::Result<()> {
    let outcome = api
        .import(input)
        .with_context(|| format!("无法读取 {}", input.display()))?;

    println!(
        "{} rows read ({} layout), {} shipments, {} dropped",
        outcome.total_rows, outcome.header_mode, outcome.shipments.len(), outcome.dropped_rows
    );
    if outcome.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:>4}  {:<20} {:<24} {:<4} {}",
        "ID", "TRACKING", "CARRIER", "TYPE", "SYSTEM ETA"
    );
    for shipment in &outcome.shipments {
        println!(
            "{:>4}  {:<20} {:<24} {:<4} {}",
            shipment.id,
            shipment.tracking_number,
            shipment.carrier,
            shipment.shipment_type,
            shipment.system_eta
        );
    }
    Ok(())
}

async fn track(api: &TrackerApi, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let cancel = CancellationFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("收到中断信号，停止追踪（已完成结果仍会导出）");
                cancel.cancel();
            }
        });
    }

    let (publisher, mut events) = ChannelEventPublisher::channel();
    let progress = tokio::spawn(async move {
        let mut stderr = std::io::stderr();
        let mut shown = false;
        while let Some(event) = events.recv().await {
            if event.event_type == EnrichmentEventType::ItemFinished {
                let _ = write!(stderr, "\rTracking {:.0}%", event.progress.percent());
                let _ = stderr.flush();
                shown = true;
            }
        }
        if shown {
            let _ = writeln!(stderr);
        }
    });

    info!(backend = %api.config().backend.url, "开始追踪");
    let result = api
        .track_file(input, output, Arc::new(publisher), &cancel)
        .await
        .with_context(|| format!("追踪失败: {}", input.display()));

    // 发布者已随引擎释放，进度任务随通道关闭结束
    let _ = progress.await;

    match result? {
        None => println!("No trackable shipments found in {}", input.display()),
        Some(run) => print_summary(&run),
    }
    Ok(())
}

fn print_summary(run: &TrackRunResponse) {
    let report = &run.report;
    println!(
        "Tracked {}/{} shipments ({} ok, {} failed{})",
        report.succeeded + report.failed,
        report.total,
        report.succeeded,
        report.failed,
        if report.cancelled {
            format!(", {} skipped after cancel", report.skipped)
        } else {
            String::new()
        }
    );
    println!("Dropped rows: {}", run.dropped_rows);

    println!();
    println!("Status:");
    for (tone, count) in tally(&run.shipments, Shipment::status_tone) {
        println!("  {:<10} {}", tone.to_string(), count);
    }

    println!("ETA:");
    for (alignment, count) in tally(&run.shipments, Shipment::eta_alignment) {
        println!("  {:<10} {}", alignment.to_string(), count);
    }

    println!();
    println!(
        "Exported {} rows x {} columns to {}",
        run.export.rows,
        run.export.columns,
        run.export.path.display()
    );
}

fn tally<K, F>(shipments: &[Shipment], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&Shipment) -> K,
{
    let mut counts = BTreeMap::new();
    for shipment in shipments {
        *counts.entry(key(shipment)).or_insert(0) += 1;
    }
    counts
}
