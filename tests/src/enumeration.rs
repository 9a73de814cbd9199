#![cfg(test)]
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

use asnrecon_common::network::ignore::IgnoreInterval;
use asnrecon_common::network::range::RangeSpec;
use asnrecon_core::filter::IgnoreFilter;
use asnrecon_core::pool::{AddressSource, Claim, IpPool};

use crate::utils::{drain, ip, pool, ranges};

/// Every address of the range whose offset is not a multiple of 256; a /32 is its base.
fn expected_addresses(range: &RangeSpec) -> Vec<Ipv4Addr> {
    if range.range_size() == 1 {
        return vec![range.base()];
    }
    (1..range.range_size())
        .filter(|offset| offset % 256 != 0)
        .map(|offset| range.address_at(offset))
        .collect()
}

#[test]
fn scenario_a_single_small_range() {
    let pool = pool(&["10.0.0.0/30"]);
    assert_eq!(drain(&pool), vec![ip("10.0.0.1"), ip("10.0.0.2"), ip("10.0.0.3")]);
    assert_eq!(pool.claim_next(), Claim::Exhausted);
}

#[test]
fn scenario_b_two_ranges_with_ignore_interval() {
    let filter = IgnoreFilter::new(
        pool(&["10.0.0.0/30", "10.0.1.0/30"]),
        vec![IgnoreInterval::new(ip("10.0.0.1"), ip("10.0.0.2"))],
    );

    assert_eq!(
        drain(&filter),
        vec![ip("10.0.0.3"), ip("10.0.1.1"), ip("10.0.1.2"), ip("10.0.1.3")]
    );
    assert_eq!(filter.claim_next(), Claim::Exhausted);
}

#[test]
fn descriptor_round_trips_to_first_and_last_address() {
    for descriptor in ["10.0.0.0/30", "172.16.0.0/12", "192.168.100.0/22", "1.2.3.4/32", "0.0.0.0/1"] {
        let range: RangeSpec = descriptor.parse().unwrap();
        let size = range.range_size();
        let first = u32::from(range.first_address());
        let last = u32::from(range.last_address());

        assert_eq!(range.first_address(), range.base(), "{descriptor}");
        assert_eq!(u64::from(last - first) + 1, size, "{descriptor}");
    }
}

#[test]
fn single_range_claims_match_the_valid_addresses() {
    for descriptor in ["10.4.0.0/21", "192.168.1.0/24", "100.64.0.0/31", "198.51.100.9/32"] {
        let range: RangeSpec = descriptor.parse().unwrap();
        let pool = IpPool::new(vec![range.clone()]).unwrap();
        assert_eq!(drain(&pool), expected_addresses(&range), "{descriptor}");
    }
}

#[test]
fn concurrent_claimers_cover_every_range_once() {
    let specs = ranges(&["10.10.0.0/22", "10.20.0.0/24", "10.25.0.1/32", "10.30.0.0/29", "10.40.0.0/23"]);
    let expected: HashSet<Ipv4Addr> = specs.iter().flat_map(expected_addresses).collect();

    for claimers in [1usize, 3, 16, 64] {
        let pool = Arc::new(IpPool::new(specs.clone()).unwrap());
        let handles: Vec<_> = (0..claimers)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || drain(pool.as_ref()))
            })
            .collect();

        let mut claimed: Vec<Ipv4Addr> = Vec::new();
        for handle in handles {
            claimed.extend(handle.join().unwrap());
        }

        let unique: HashSet<Ipv4Addr> = claimed.iter().copied().collect();
        assert_eq!(unique.len(), claimed.len(), "duplicates with {claimers} claimers");
        assert_eq!(unique, expected, "coverage with {claimers} claimers");
    }
}

#[test]
fn filter_under_concurrency_never_yields_ignored() {
    let specs = ranges(&["10.50.0.0/22", "10.60.0.0/24"]);
    let ignored = vec![
        IgnoreInterval::new(ip("10.50.1.0"), ip("10.50.2.17")),
        IgnoreInterval::new(ip("10.60.0.200"), ip("10.60.0.255")),
    ];
    let full: HashSet<Ipv4Addr> = specs.iter().flat_map(expected_addresses).collect();

    let filter = Arc::new(IgnoreFilter::new(IpPool::new(specs).unwrap(), ignored.clone()));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let filter = Arc::clone(&filter);
            std::thread::spawn(move || drain(filter.as_ref() as &dyn AddressSource))
        })
        .collect();

    let mut yielded: Vec<Ipv4Addr> = Vec::new();
    for handle in handles {
        yielded.extend(handle.join().unwrap());
    }

    assert!(yielded.iter().all(|addr| !ignored.iter().any(|i| i.contains(*addr))));
    assert_eq!(yielded.len() + filter.skipped(), full.len());

    let mut union: HashSet<Ipv4Addr> = yielded.into_iter().collect();
    union.extend(full.iter().copied().filter(|addr| ignored.iter().any(|i| i.contains(*addr))));
    assert_eq!(union, full);
}

#[test]
fn exhausted_pool_is_idempotent() {
    let pool = pool(&["10.0.0.0/31", "10.0.0.2/31"]);
    assert_eq!(drain(&pool).len(), 2);
    for _ in 0..1_000 {
        assert_eq!(pool.claim_next(), Claim::Exhausted);
    }
    assert!(pool.is_exhausted());
}
