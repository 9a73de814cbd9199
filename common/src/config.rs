use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 50;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_TLS_PORT: u16 = 443;
pub const DEFAULT_BLACKLIST_FILE: &str = "main.config";
pub const DEFAULT_ASN_DB_FILE: &str = "rib.dat";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of concurrent probe workers.
    pub workers: usize,
    /// Upper bound for connect + TLS handshake of a single probe.
    pub probe_timeout: Duration,
    /// Port the TLS prober connects to.
    pub port: u16,
    /// Directory the per-range result files are appended to.
    pub output_dir: PathBuf,
    /// Comma-separated list of CIDRs that are never probed.
    pub blacklist_path: PathBuf,
    /// IPASN routing table used for hostname scans.
    pub asn_db_path: PathBuf,
    /// Also apply the blacklist to direct range scans.
    ///
    /// Hostname scans always consult the blacklist.
    pub filter_direct_ranges: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            port: DEFAULT_TLS_PORT,
            output_dir: PathBuf::from("."),
            blacklist_path: PathBuf::from(DEFAULT_BLACKLIST_FILE),
            asn_db_path: PathBuf::from(DEFAULT_ASN_DB_FILE),
            filter_direct_ranges: false,
        }
    }
}
