//! The shared enumeration cursor.
//!
//! An [`IpPool`] owns an ordered list of ranges and a single position inside them
//! (range index + offset). Workers call [`AddressSource::claim_next`] concurrently;
//! every call runs the whole read-modify-write under one mutex, so each valid
//! address is handed out exactly once. Nothing but O(1) bookkeeping happens while
//! the lock is held.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use asnrecon_common::network::range::{self, RangeSpec};

use crate::error::ConfigError;

/// Anything workers can pull addresses from.
pub trait AddressSource: Send + Sync {
    fn claim_next(&self) -> Claim;
}

/// Outcome of a single claim. There is no third state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    Address(ClaimResult),
    Exhausted,
}

impl Claim {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Claim::Exhausted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimResult {
    pub address: Ipv4Addr,
    pub(crate) range: Arc<RangeSpec>,
    pub(crate) first_in_range: bool,
}

impl ClaimResult {
    /// Caption of the range, present only on the first claim made in it.
    pub fn range_label(&self) -> Option<&str> {
        self.first_in_range.then(|| self.range.label())
    }

    pub fn output_key(&self) -> &str {
        self.range.output_key()
    }

    pub(crate) fn same_range(&self, other: &ClaimResult) -> bool {
        Arc::ptr_eq(&self.range, &other.range)
    }
}

#[derive(Debug)]
struct EnumerationState {
    range_idx: usize,
    offset: u64,
    exhausted: bool,
}

#[derive(Debug)]
pub struct IpPool {
    ranges: Vec<Arc<RangeSpec>>,
    state: Mutex<EnumerationState>,
}

impl IpPool {
    pub fn new(ranges: Vec<RangeSpec>) -> Result<Self, ConfigError> {
        if ranges.is_empty() {
            return Err(ConfigError::EmptyRangeList);
        }

        let ranges: Vec<Arc<RangeSpec>> = ranges.into_iter().map(Arc::new).collect();
        let state = EnumerationState {
            range_idx: 0,
            offset: start_offset(&ranges[0]),
            exhausted: false,
        };

        Ok(Self {
            ranges,
            state: Mutex::new(state),
        })
    }

    pub fn ranges(&self) -> impl Iterator<Item = &RangeSpec> {
        self.ranges.iter().map(|range| range.as_ref())
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock_state().exhausted
    }

    fn lock_state(&self) -> MutexGuard<'_, EnumerationState> {
        // The state is consistent after every statement, so a poisoned lock is safe to reuse.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AddressSource for IpPool {
    fn claim_next(&self) -> Claim {
        let mut state = self.lock_state();
        if state.exhausted {
            return Claim::Exhausted;
        }

        let range: &Arc<RangeSpec> = &self.ranges[state.range_idx];
        let claim = ClaimResult {
            address: range.address_at(state.offset),
            range: Arc::clone(range),
            first_in_range: state.offset == start_offset(range),
        };

        state.offset += 1;
        if range::is_network_offset(state.offset) {
            state.offset += 1;
        }

        if state.offset >= range.range_size() {
            state.range_idx += 1;
            match self.ranges.get(state.range_idx) {
                Some(next) => state.offset = start_offset(next),
                None => state.exhausted = true,
            }
        }

        Claim::Address(claim)
    }
}

/// First offset handed out in `range`. Offset 0 is the network address, except in
/// a /32 where it is the only host.
fn start_offset(range: &RangeSpec) -> u64 {
    if range.range_size() == 1 { 0 } else { 1 }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
