//! Turning operator input into something workers can consume.

use std::sync::Arc;

use asnrecon_common::config::ScanConfig;
use asnrecon_common::network::ignore::IgnoreInterval;
use asnrecon_common::network::range::RangeSpec;
use pnet::ipnetwork::Ipv4Network;
use tracing::info;

use crate::asn::{self, AsnDatabase};
use crate::error::ConfigError;
use crate::filter::{self, IgnoreFilter};
use crate::pool::{AddressSource, IpPool};

#[derive(Debug, Clone, Default)]
pub struct ScanPlan {
    pub ranges: Vec<RangeSpec>,
    pub ignored: Vec<IgnoreInterval>,
}

impl ScanPlan {
    pub fn new(ranges: Vec<RangeSpec>, ignored: Vec<IgnoreInterval>) -> Self {
        Self { ranges, ignored }
    }

    /// Every prefix announced by the AS that hosts `hostname`, minus the blacklist.
    pub async fn for_hostname(hostname: &str, cfg: &ScanConfig) -> Result<Self, ConfigError> {
        let db: AsnDatabase = AsnDatabase::load(&cfg.asn_db_path)?;
        let main_ip = asn::resolve_host(hostname.trim()).await?;
        let ignored: Vec<IgnoreInterval> = filter::load_blacklist(&cfg.blacklist_path)?.unwrap_or_default();

        let (asn, _) = db
            .lookup(main_ip)
            .ok_or(ConfigError::AddressNotRouted(main_ip))?;
        let prefixes: Vec<Ipv4Network> = db.prefixes_of(asn);

        let ranges: Vec<RangeSpec> = prefixes
            .iter()
            .map(|network| network.to_string().parse::<RangeSpec>())
            .collect::<Result<_, _>>()?;

        let listed: Vec<&str> = ranges.iter().map(RangeSpec::label).collect();
        info!("{hostname} ({main_ip}) belongs to AS{asn}");
        info!("Found ranges [{}]", listed.join(", "));

        Ok(Self::new(ranges, ignored))
    }

    /// A single CIDR typed in by the operator.
    ///
    /// The blacklist only applies here when `filter_direct_ranges` is set.
    pub fn for_range(cidr: &str, cfg: &ScanConfig) -> Result<Self, ConfigError> {
        let range: RangeSpec = cidr.parse()?;

        let ignored: Vec<IgnoreInterval> = if cfg.filter_direct_ranges {
            filter::load_blacklist(&cfg.blacklist_path)?.unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(Self::new(vec![range], ignored))
    }

    /// Total number of addresses the plan covers, network addresses included.
    pub fn address_count(&self) -> u64 {
        self.ranges.iter().map(RangeSpec::range_size).sum()
    }

    pub fn into_source(self) -> Result<Arc<dyn AddressSource>, ConfigError> {
        let pool: IpPool = IpPool::new(self.ranges)?;
        if self.ignored.is_empty() {
            return Ok(Arc::new(pool));
        }
        Ok(Arc::new(IgnoreFilter::new(pool, self.ignored)))
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
