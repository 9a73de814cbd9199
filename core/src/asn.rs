//! # Routing Database
//!
//! Maps an address to the Autonomous System announcing it, and an AS to every
//! prefix it announces. The data comes from an IPASN file, the text routing table
//! produced from a BGP RIB dump:
//!
//! ```text
//! ; IP-ASN32-DAT file
//! ; Original source:  rib.20240101.0000.bz2
//! 1.0.0.0/24	13335
//! 1.0.4.0/22	38803
//! ```

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use pnet::ipnetwork::Ipv4Network;
use tracing::{debug, trace, warn};

use crate::error::ConfigError;

#[derive(Debug, Default)]
pub struct AsnDatabase {
    routes: Vec<(Ipv4Network, u32)>,
    by_asn: HashMap<u32, Vec<usize>>,
}

impl AsnDatabase {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents: String = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::DatabaseMissing {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::DatabaseUnreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let db: AsnDatabase = contents.parse()?;
        if db.is_empty() {
            warn!("Routing database {} has no IPv4 routes", path.display());
        }
        debug!("Loaded {} IPv4 routes from {}", db.len(), path.display());
        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn insert(&mut self, network: Ipv4Network, asn: u32) {
        self.by_asn.entry(asn).or_default().push(self.routes.len());
        self.routes.push((network, asn));
    }

    /// Longest-prefix match: the AS announcing `addr` and the covering prefix.
    pub fn lookup(&self, addr: Ipv4Addr) -> Option<(u32, Ipv4Network)> {
        self.routes
            .iter()
            .filter(|(network, _)| network.contains(addr))
            .max_by_key(|(network, _)| network.prefix())
            .map(|(network, asn)| (*asn, *network))
    }

    /// Every prefix announced by `asn`, deduplicated and ordered by address.
    pub fn prefixes_of(&self, asn: u32) -> Vec<Ipv4Network> {
        let mut prefixes: Vec<Ipv4Network> = self
            .by_asn
            .get(&asn)
            .map(|indices| indices.iter().map(|&idx| self.routes[idx].0).collect())
            .unwrap_or_default();

        prefixes.sort_by_key(|network| (network.network(), network.prefix()));
        prefixes.dedup();
        prefixes
    }
}

impl std::str::FromStr for AsnDatabase {
    type Err = ConfigError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        let mut db = AsnDatabase::default();

        for (idx, raw) in contents.lines().enumerate() {
            let line_no: usize = idx + 1;
            let line: &str = raw.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let malformed = |reason: &str| ConfigError::DatabaseMalformed {
                line: line_no,
                reason: reason.to_string(),
            };

            let mut fields = line.split_whitespace();
            let (Some(prefix), Some(asn)) = (fields.next(), fields.next()) else {
                return Err(malformed("expected '<prefix> <asn>'"));
            };

            if prefix.contains(':') {
                continue;
            }

            let network: Ipv4Network = prefix
                .parse()
                .map_err(|e| malformed(&format!("bad prefix '{prefix}': {e}")))?;

            // AS sets ("{64500,64501}") have no single origin to scan.
            let Ok(asn) = asn.parse::<u32>() else {
                trace!("skipping {prefix} with origin '{asn}'");
                continue;
            };

            db.insert(network, asn);
        }

        Ok(db)
    }
}

/// Resolves `hostname` to its first IPv4 address.
pub async fn resolve_host(hostname: &str) -> Result<Ipv4Addr, ConfigError> {
    let unresolvable = || ConfigError::UnresolvableHost(hostname.to_string());

    if let Ok(addr) = hostname.parse::<Ipv4Addr>() {
        return Ok(addr);
    }

    let addrs = tokio::net::lookup_host((hostname, 0))
        .await
        .map_err(|_| unresolvable())?;

    addrs
        .filter_map(|socket| match socket.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(unresolvable)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
