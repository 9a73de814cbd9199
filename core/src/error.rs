use std::net::Ipv4Addr;
use std::path::PathBuf;

use asnrecon_common::network::range::RangeError;
use thiserror::Error;

/// Everything that stops a scan before the first worker starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("routing database '{}' not found", path.display())]
    DatabaseMissing { path: PathBuf },
    #[error("failed to read routing database '{}'", path.display())]
    DatabaseUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("routing database line {line} is malformed: {reason}")]
    DatabaseMalformed { line: usize, reason: String },
    #[error("couldn't get ip for host {0}")]
    UnresolvableHost(String),
    #[error("{0} is not covered by any announced prefix")]
    AddressNotRouted(Ipv4Addr),
    #[error("invalid ignore range '{entry}'")]
    InvalidIgnoreRange {
        entry: String,
        #[source]
        source: RangeError,
    },
    #[error("failed to read ignore list '{}'", path.display())]
    BlacklistUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    InvalidRange(#[from] RangeError),
    #[error("list of ip ranges is empty")]
    EmptyRangeList,
}
