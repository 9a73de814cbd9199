#![cfg(test)]
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use asnrecon_common::config::ScanConfig;
use asnrecon_core::plan::ScanPlan;
use asnrecon_core::sink::FileSink;
use asnrecon_core::worker::{ScanSummary, WorkerPool};
use tokio_util::sync::CancellationToken;

use crate::utils::{CountingSink, Scripted, ScriptedProber, pool, temp_dir};

#[tokio::test]
async fn scenario_c_no_results_still_enumerates_everything() {
    let prober = Arc::new(ScriptedProber::default());
    let sink = Arc::new(CountingSink::default());
    let workers = WorkerPool::new(
        Arc::new(pool(&["10.0.0.0/24", "10.0.8.0/29"])),
        prober.clone(),
        sink.clone(),
        50,
    );

    let summary: ScanSummary = workers.run(CancellationToken::new()).await;

    assert_eq!(summary.claimed, 255 + 7);
    assert_eq!(summary.found, 0);
    assert!(sink.records.lock().unwrap().is_empty());

    let probed: HashSet<Ipv4Addr> = prober.probed().into_iter().collect();
    assert_eq!(probed.len(), 262);
}

#[tokio::test]
async fn scenario_d_failure_then_discovery_written_to_file() {
    let dir = temp_dir("scenario-d");
    let prober = Arc::new(ScriptedProber::new(&[
        ("10.0.0.1", Scripted::Fail("simulated timeout")),
        ("10.0.0.2", Scripted::Name("example.com")),
    ]));
    let sink = Arc::new(FileSink::new(&dir));
    let workers = WorkerPool::new(Arc::new(pool(&["10.0.0.0/30"])), prober, sink.clone(), 50);

    let summary = workers.run(CancellationToken::new()).await;

    let contents = std::fs::read_to_string(sink.path_for("10.0.0.0(30)_domains.txt")).unwrap();
    let files = std::fs::read_dir(&dir).unwrap().count();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(contents, "https://10.0.0.2 - example.com\n");
    assert_eq!(files, 1);
    assert_eq!(summary.claimed, 3);
    assert_eq!(summary.found, 1);
    assert_eq!(summary.failures, 1);
}

#[tokio::test]
async fn discoveries_land_in_the_file_of_their_range() {
    let dir = temp_dir("per-range");
    let prober = Arc::new(ScriptedProber::new(&[
        ("192.0.2.5", Scripted::Name("a.example.org")),
        ("192.0.2.9", Scripted::Name("b.example.org")),
        ("198.51.100.77", Scripted::Name("c.example.net")),
    ]));
    let sink = Arc::new(FileSink::new(&dir));
    let workers = WorkerPool::new(
        Arc::new(pool(&["192.0.2.0/28", "198.51.100.0/24"])),
        prober,
        sink.clone(),
        7,
    );

    workers.run(CancellationToken::new()).await;

    let mut first: Vec<String> = std::fs::read_to_string(sink.path_for("192.0.2.0(28)_domains.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    first.sort();
    let second = std::fs::read_to_string(sink.path_for("198.51.100.0(24)_domains.txt")).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(first, vec!["https://192.0.2.5 - a.example.org", "https://192.0.2.9 - b.example.org"]);
    assert_eq!(second, "https://198.51.100.77 - c.example.net\n");
}

#[tokio::test]
async fn ignored_addresses_are_never_probed() {
    let dir = temp_dir("blacklist");
    let blacklist = dir.join("main.config");
    std::fs::write(&blacklist, "10.0.0.0/26,\n10.0.0.128/25").unwrap();

    let cfg = ScanConfig {
        blacklist_path: blacklist,
        filter_direct_ranges: true,
        ..ScanConfig::default()
    };
    let source = ScanPlan::for_range("10.0.0.0/24", &cfg).unwrap().into_source().unwrap();
    let prober = Arc::new(ScriptedProber::default());
    WorkerPool::new(source, prober.clone(), Arc::new(CountingSink::default()), 12)
        .run(CancellationToken::new())
        .await;
    std::fs::remove_dir_all(&dir).unwrap();

    let mut probed = prober.probed();
    probed.sort();
    let expected: Vec<Ipv4Addr> = (64..=127).map(|d| Ipv4Addr::new(10, 0, 0, d)).collect();
    assert_eq!(probed, expected);
}

#[tokio::test]
async fn interrupted_scan_returns_and_reports_it() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let prober = Arc::new(ScriptedProber::new(&[("10.0.0.1", Scripted::Name("never.probed"))]));
    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        WorkerPool::new(Arc::new(pool(&["10.0.0.0/16"])), prober.clone(), Arc::new(CountingSink::default()), 50)
            .run(cancel),
    )
    .await
    .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.claimed, 0);
    assert!(prober.probed().is_empty());
}

#[tokio::test]
async fn single_host_range_is_probed_once() {
    let dir = temp_dir("single-host");
    let prober = Arc::new(ScriptedProber::new(&[("1.2.3.4", Scripted::Name("host.example.com"))]));
    let sink = Arc::new(FileSink::new(&dir));

    let source = ScanPlan::for_range("1.2.3.4/32", &ScanConfig::default()).unwrap().into_source().unwrap();
    let summary = WorkerPool::new(source, prober.clone(), sink.clone(), 50)
        .run(CancellationToken::new())
        .await;

    let contents = std::fs::read_to_string(sink.path_for("1.2.3.4(32)_domains.txt")).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();

    assert_eq!(summary.claimed, 1);
    assert_eq!(summary.found, 1);
    assert_eq!(prober.probed(), vec![Ipv4Addr::new(1, 2, 3, 4)]);
    assert_eq!(contents, "https://1.2.3.4 - host.example.com\n");
}

#[tokio::test]
async fn host_routes_mixed_with_prefixes_are_all_covered() {
    let prober = Arc::new(ScriptedProber::default());
    let summary = WorkerPool::new(
        Arc::new(pool(&["10.0.0.0/31", "8.8.8.8/32", "10.0.1.0/30"])),
        prober.clone(),
        Arc::new(CountingSink::default()),
        4,
    )
    .run(CancellationToken::new())
    .await;

    let mut probed = prober.probed();
    probed.sort();
    assert_eq!(summary.claimed, 5);
    assert_eq!(
        probed,
        vec![
            Ipv4Addr::new(8, 8, 8, 8),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 1, 1),
            Ipv4Addr::new(10, 0, 1, 2),
            Ipv4Addr::new(10, 0, 1, 3),
        ]
    );
}
