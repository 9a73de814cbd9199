//! Bounded concurrent consumption of an [`AddressSource`].
//!
//! A [`WorkerPool`] spawns a fixed number of tokio tasks. Each task claims an
//! address, probes it and records any discovery, until the source is exhausted or
//! the scan is cancelled. Nothing that goes wrong while handling one address stops
//! a worker.

use std::net::Ipv4Addr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::pool::{AddressSource, Claim, ClaimResult};
use crate::prober::CertificateProber;
use crate::sink::{Discovery, ResultSink};

/// Tracing target of the `Domain found` events, so front ends can set them apart.
pub const DISCOVERY_TARGET: &str = "asnrecon_core::discovery";

/// Called after every processed claim with `(claimed, found)` so far.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Addresses handed to a worker.
    pub claimed: usize,
    /// Discoveries written to the sink.
    pub found: usize,
    /// Probes, sink writes or iterations that failed unexpectedly.
    pub failures: usize,
    /// The scan was cancelled before the source ran dry.
    pub interrupted: bool,
}

#[derive(Default)]
struct Counters {
    claimed: AtomicUsize,
    found: AtomicUsize,
    failures: AtomicUsize,
}

pub struct WorkerPool {
    source: Arc<dyn AddressSource>,
    prober: Arc<dyn CertificateProber>,
    sink: Arc<dyn ResultSink>,
    workers: usize,
    on_progress: Option<ProgressCallback>,
}

impl WorkerPool {
    pub fn new(
        source: Arc<dyn AddressSource>,
        prober: Arc<dyn CertificateProber>,
        sink: Arc<dyn ResultSink>,
        workers: usize,
    ) -> Self {
        Self {
            source,
            prober,
            sink,
            workers: workers.max(1),
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs every worker to completion.
    ///
    /// Returns once all workers have stopped, either because the source is
    /// exhausted or because `cancel` fired. Probes already in flight when `cancel`
    /// fires are allowed to finish.
    pub async fn run(&self, cancel: CancellationToken) -> ScanSummary {
        let counters: Arc<Counters> = Arc::new(Counters::default());

        let handles: Vec<JoinHandle<()>> = (0..self.workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    source: Arc::clone(&self.source),
                    prober: Arc::clone(&self.prober),
                    sink: Arc::clone(&self.sink),
                    counters: Arc::clone(&counters),
                    on_progress: self.on_progress.clone(),
                    cancel: cancel.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        for (id, result) in futures::future::join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = result {
                error!("Worker {id} terminated abnormally: {e}");
            }
        }

        ScanSummary {
            claimed: counters.claimed.load(Ordering::Relaxed),
            found: counters.found.load(Ordering::Relaxed),
            failures: counters.failures.load(Ordering::Relaxed),
            interrupted: cancel.is_cancelled(),
        }
    }
}

struct Worker {
    id: usize,
    source: Arc<dyn AddressSource>,
    prober: Arc<dyn CertificateProber>,
    sink: Arc<dyn ResultSink>,
    counters: Arc<Counters>,
    on_progress: Option<ProgressCallback>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                debug!("Worker {} stopping on cancellation", self.id);
                return;
            }

            let claim: ClaimResult = match self.source.claim_next() {
                Claim::Address(claim) => claim,
                Claim::Exhausted => return,
            };
            let claimed: usize = self.counters.claimed.fetch_add(1, Ordering::Relaxed) + 1;

            let address: Ipv4Addr = claim.address;
            let outcome = AssertUnwindSafe(self.process(claim)).catch_unwind().await;
            if let Err(panic) = outcome {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    "Worker {} recovered from a panic while handling {address}: {}",
                    self.id,
                    panic_message(panic.as_ref())
                );
            }

            if let Some(callback) = &self.on_progress {
                callback(claimed, self.counters.found.load(Ordering::Relaxed));
            }
        }
    }

    async fn process(&self, claim: ClaimResult) {
        if let Some(label) = claim.range_label() {
            info!("Testing {label}...");
        }

        let address: Ipv4Addr = claim.address;
        let common_name: String = match self.prober.probe(address).await {
            Ok(Some(name)) => name,
            Ok(None) => return,
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                error!("Probe of {address} failed: {e:#}");
                return;
            }
        };

        let discovery = Discovery {
            address,
            common_name,
        };
        match self.sink.append(claim.output_key(), &discovery).await {
            Ok(()) => {
                self.counters.found.fetch_add(1, Ordering::Relaxed);
                info!(target: DISCOVERY_TARGET, "Domain found - {discovery}");
            }
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                error!("Failed to record {discovery}: {e:#}");
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
