pub mod menu;
pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use asnrecon_common::config::{
    DEFAULT_ASN_DB_FILE, DEFAULT_BLACKLIST_FILE, DEFAULT_TLS_PORT, DEFAULT_WORKERS, ScanConfig,
};
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "asnrecon", version)]
#[command(about = "Maps the IPv4 footprint of an organization to the names on its TLS certificates.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Number of concurrent probe workers
    #[arg(short, long, global = true, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Seconds to wait for connect + TLS handshake
    #[arg(short, long, global = true, default_value_t = 5)]
    pub timeout: u64,

    /// Port to probe for TLS
    #[arg(short, long, global = true, default_value_t = DEFAULT_TLS_PORT)]
    pub port: u16,

    /// Directory the <range>_domains.txt files are appended to
    #[arg(short, long, global = true, default_value = ".")]
    pub output_dir: PathBuf,

    /// Comma-separated list of ranges that are never probed
    #[arg(long, global = true, default_value = DEFAULT_BLACKLIST_FILE)]
    pub blacklist: PathBuf,

    /// IPASN routing table used to find the prefixes of an AS
    #[arg(long, global = true, default_value = DEFAULT_ASN_DB_FILE)]
    pub db: PathBuf,

    /// Apply the blacklist to direct range scans as well
    #[arg(long, global = true)]
    pub filter_ranges: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Scan every prefix announced by the AS hosting a hostname
    #[command(alias = "a")]
    Asn { hostname: String },
    /// Scan a single IPv4 range, e.g. 104.36.195.0/24
    #[command(alias = "r")]
    Range { cidr: String },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> ScanConfig {
        ScanConfig {
            workers: self.workers,
            probe_timeout: Duration::from_secs(self.timeout),
            port: self.port,
            output_dir: self.output_dir.clone(),
            blacklist_path: self.blacklist.clone(),
            asn_db_path: self.db.clone(),
            filter_direct_ranges: self.filter_ranges,
        }
    }
}
