//! # asnrecon core
//!
//! Enumerates IPv4 ranges and hands every candidate address to exactly one of a
//! fixed number of concurrent workers, which probe it for a TLS certificate.
//!
//! * [`pool`]: the shared, lock-guarded cursor over all ranges.
//! * [`filter`]: skips blacklisted addresses on top of a pool.
//! * [`worker`]: the worker pool consuming an [`pool::AddressSource`].
//! * [`prober`] / [`sink`]: the certificate prober and result file seams.
//! * [`asn`] / [`plan`]: building the range list from a hostname or a CIDR.

pub mod asn;
pub mod error;
pub mod filter;
pub mod plan;
pub mod pool;
pub mod prober;
pub mod sink;
pub mod worker;
