use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use asnrecon_common::config::ScanConfig;
use asnrecon_core::plan::ScanPlan;
use asnrecon_core::pool::AddressSource;
use asnrecon_core::prober::TlsProber;
use asnrecon_core::sink::FileSink;
use asnrecon_core::worker::{ScanSummary, WorkerPool};

use super::Commands;
use crate::terminal::{colors, print, spinner};

pub async fn scan(target: Commands, cfg: &ScanConfig) -> anyhow::Result<()> {
    let plan: ScanPlan = match target {
        Commands::Asn { hostname } => {
            print::header("building pool from AS prefixes");
            ScanPlan::for_hostname(&hostname, cfg).await?
        }
        Commands::Range { cidr } => {
            print::header("building pool from range");
            ScanPlan::for_range(&cidr, cfg)?
        }
    };

    let total: u64 = plan.address_count();
    let source: Arc<dyn AddressSource> = plan.into_source()?;
    let prober = Arc::new(TlsProber::from_config(cfg).context("setting up the TLS prober")?);

    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {}", cfg.output_dir.display()))?;
    let sink = Arc::new(FileSink::new(&cfg.output_dir));

    let cancel: CancellationToken = CancellationToken::new();
    watch_interrupt(cancel.clone());

    print::header("scanning");
    info!(
        "Probing up to {total} addresses with {} workers (port {}, {}s timeout)",
        cfg.workers.max(1),
        cfg.port,
        cfg.probe_timeout.as_secs()
    );

    spinner::start();
    let start_time: Instant = Instant::now();
    let summary: ScanSummary = WorkerPool::new(source, prober, sink, cfg.workers)
        .with_progress(Arc::new(spinner::report_progress))
        .run(cancel)
        .await;
    spinner::finish();

    if summary.interrupted {
        warn!("Terminating...");
    } else {
        info!("Finished.");
    }

    print_summary(&summary, start_time.elapsed(), cfg);
    Ok(())
}

fn watch_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}

fn print_summary(summary: &ScanSummary, total_time: Duration, cfg: &ScanConfig) {
    print::header("scan summary");
    print::aligned_line("Probed", summary.claimed);
    print::aligned_line("Domains found", summary.found);
    print::aligned_line("Failures", summary.failures);
    print::aligned_line("Results in", cfg.output_dir.display());

    let found: ColoredString = format!("{} domains", summary.found).bold().green();
    let elapsed: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().color(colors::ACCENT);
    print::fat_separator();
    print::centerln(&format!("Scan complete: {found} discovered in {elapsed}"));
}
