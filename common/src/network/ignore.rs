use std::net::Ipv4Addr;

use crate::network::range::{RangeError, RangeSpec};

/// Inclusive block of addresses that must never be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IgnoreInterval {
    low: Ipv4Addr,
    high: Ipv4Addr,
}

impl IgnoreInterval {
    pub fn new(low: Ipv4Addr, high: Ipv4Addr) -> Self {
        Self { low, high }
    }

    pub fn high(&self) -> Ipv4Addr {
        self.high
    }

    /// Octet-wise comparison, which for IPv4 is plain numeric ordering.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.low <= addr && addr <= self.high
    }
}

impl From<&RangeSpec> for IgnoreInterval {
    fn from(range: &RangeSpec) -> Self {
        Self::new(range.first_address(), range.last_address())
    }
}

/// Parses a comma-separated list of CIDR descriptors. Blank entries are skipped.
///
/// Returns the offending entry alongside the error so callers can report it.
pub fn parse_ignore_list(list: &str) -> Result<Vec<IgnoreInterval>, (String, RangeError)> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<RangeSpec>()
                .map(|range| IgnoreInterval::from(&range))
                .map_err(|e| (entry.to_string(), e))
        })
        .collect()
}
