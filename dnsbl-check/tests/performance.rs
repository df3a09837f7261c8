// dnsbl-check/tests/performance.rs

mod common;

use common::dnsbl_check;
use std::time::{Duration, Instant};
use tempfile::TempDir;

// Unparseable addresses fail before any query is sent, so these measure the
// fan-out and output path without touching the network.

fn bogus_addresses(count: usize) -> String {
    (0..count)
        .map(|i| format!("host-{}", i))
        .collect::<Vec<_>>()
        .join(",")
}

fn zones(count: usize) -> String {
    (0..count)
        .map(|i| format!("bl{}.example", i))
        .collect::<Vec<_>>()
        .join(",")
}

#[test]
fn test_large_fan_out_completes() {
    let start = Instant::now();

    let home = TempDir::new().unwrap();
    let output = dnsbl_check(&home)
        .args(["--nameserver", "127.0.0.1", "-c", "25"])
        .args(["-z", &zones(20)])
        .args(["-i", &bogus_addresses(250)])
        .timeout(Duration::from_secs(30))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 250 * 20);
    assert!(stdout.lines().all(|line| line.starts_with("ERR\t")));

    let duration = start.elapsed();
    assert!(
        duration.as_secs() < 30,
        "5000 lookups took too long: {:?}",
        duration
    );
}

#[test]
fn test_concurrency_one_still_completes() {
    let home = TempDir::new().unwrap();
    let output = dnsbl_check(&home)
        .args(["--nameserver", "127.0.0.1", "-c", "1", "--json"])
        .args(["-z", &zones(5)])
        .args(["-i", &bogus_addresses(40)])
        .timeout(Duration::from_secs(15))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 200);
}
