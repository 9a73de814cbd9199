//! Blacklist filtering on top of an [`IpPool`].

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use asnrecon_common::network::ignore::{self, IgnoreInterval};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::pool::{AddressSource, Claim, ClaimResult, IpPool};

/// Wraps a pool and silently drops every claim inside an ignored interval.
///
/// Dropped addresses are consumed from the pool, never re-queued, so each address
/// is still claimed exactly once overall.
#[derive(Debug)]
pub struct IgnoreFilter {
    pool: IpPool,
    intervals: Vec<IgnoreInterval>,
    skipped: AtomicUsize,
}

impl IgnoreFilter {
    pub fn new(pool: IpPool, intervals: Vec<IgnoreInterval>) -> Self {
        Self {
            pool,
            intervals,
            skipped: AtomicUsize::new(0),
        }
    }

    /// Builds the filter from a comma-separated list of CIDR descriptors.
    pub fn from_descriptors(pool: IpPool, list: &str) -> Result<Self, ConfigError> {
        let intervals: Vec<IgnoreInterval> = ignore::parse_ignore_list(list)
            .map_err(|(entry, source)| ConfigError::InvalidIgnoreRange { entry, source })?;
        Ok(Self::new(pool, intervals))
    }

    pub fn is_ignored(&self, addr: std::net::Ipv4Addr) -> bool {
        self.intervals.iter().any(|interval| interval.contains(addr))
    }

    /// Number of claims dropped so far.
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }
}

impl AddressSource for IgnoreFilter {
    fn claim_next(&self) -> Claim {
        let mut pending_label: Option<ClaimResult> = None;

        loop {
            let mut claim: ClaimResult = match self.pool.claim_next() {
                Claim::Address(claim) => claim,
                Claim::Exhausted => return Claim::Exhausted,
            };

            if self.is_ignored(claim.address) {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                if claim.first_in_range {
                    pending_label = Some(claim);
                }
                continue;
            }

            // Keep the range caption when the first address of a range was dropped.
            if let Some(dropped) = pending_label.take() {
                if dropped.same_range(&claim) {
                    claim.first_in_range = true;
                }
            }
            return Claim::Address(claim);
        }
    }
}

/// Reads the comma-separated ignore list at `path`.
///
/// A missing file is not an error: the scan proceeds unfiltered and `None` is
/// returned. Malformed entries are fatal.
pub fn load_blacklist(path: &Path) -> Result<Option<Vec<IgnoreInterval>>, ConfigError> {
    let contents: String = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("File \"{}\" is missing, ips will not be ignored.", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::BlacklistUnreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let intervals: Vec<IgnoreInterval> = ignore::parse_ignore_list(&contents)
        .map_err(|(entry, source)| ConfigError::InvalidIgnoreRange { entry, source })?;
    debug!("Loaded {} ignored range(s) from {}", intervals.len(), path.display());

    Ok(Some(intervals))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
