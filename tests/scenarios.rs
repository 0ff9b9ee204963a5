//! End-to-end runs over file-backed inputs

use std::io::Write;

use mem_sim::io::{read_virtual_addresses, FileBackingStore};
use mem_sim::{AccessKind, SimConfig, SimError, VmManager, BACKING_STORE_SIZE, PAGE_SIZE};
use tempfile::{NamedTempFile, TempDir};

/// Byte `i` of page `p` is `(p + i) mod 256`
fn backing_store(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("BACKING_STORE.bin");
    let bytes: Vec<u8> = (0..BACKING_STORE_SIZE)
        .map(|i| ((i / PAGE_SIZE + i % PAGE_SIZE) % 256) as u8)
        .collect();
    std::fs::write(&path, bytes).unwrap();
    path
}

fn address_file(lines: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(lines.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn simulate(input: &str, policy: &str, frames: i64) -> Result<(Vec<String>, String), SimError> {
    let dir = tempfile::tempdir().unwrap();
    let addresses_file = address_file(input);
    let config = SimConfig::new(addresses_file.path(), backing_store(&dir), frames, policy)?;

    let addresses = read_virtual_addresses(&config.addresses)?;
    let store = FileBackingStore::open(&config.backing_store)?;
    let mut vm = VmManager::new(config.frames, config.policy, store);

    let mut lines = Vec::new();
    let metrics = vm.run(&addresses, |record| {
        lines.push(record.to_string());
        Ok(())
    })?;
    Ok((lines, metrics.to_string()))
}

#[test]
fn test_fifo_scenario_summary() {
    let (lines, summary) = simulate("0\n256\n512\n0\n", "FIFO", 2).unwrap();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("0, 0, 0, 0, 000102"));
    assert!(lines[1].starts_with("256, 1, 1, 1, 010203"));
    assert!(lines[2].starts_with("512, 2, 2, 0, 020304"));
    assert!(lines[3].starts_with("0, 0, 0, 1, 000102"));
    assert_eq!(
        summary,
        "Number of Translated Addresses = 4\n\
         Page Faults = 4\n\
         Page Fault Rate = 1.000\n\
         TLB Hits = 0\n\
         TLB Misses = 4\n\
         TLB Hit Rate = 0.000"
    );
}

#[test]
fn test_lru_scenario_summary() {
    let (lines, summary) = simulate("0\n256\n512\n0\n", "LRU", 2).unwrap();
    assert!(lines[3].starts_with("0, 0, 0, 1, "));
    assert!(summary.contains("Page Faults = 4\n"));
}

#[test]
fn test_signed_bytes_in_output() {
    // Page 0 offset 200 holds 200, printed as a signed byte
    let (lines, _) = simulate("200\n", "OPT", 1).unwrap();
    assert!(lines[0].starts_with("200, -56, 0, 0, "));
    assert!(lines[0].ends_with("FDFEFF"));
}

#[test]
fn test_single_address_repeated() {
    let (_, summary) = simulate("1234\n1234\n1234\n1234\n", "LRU", 1).unwrap();
    assert!(summary.contains("Page Faults = 1\n"));
    assert!(summary.contains("TLB Hits = 3\n"));
    assert!(summary.ends_with("TLB Hit Rate = 0.750"));
}

#[test]
fn test_idempotent_runs() {
    let input = "16916\n62493\n30198\n53683\n40185\n28781\n24462\n48399\n64815\n18295\n16916\n62493\n";
    for policy in ["FIFO", "LRU", "OPT"] {
        assert_eq!(simulate(input, policy, 3).unwrap(), simulate(input, policy, 3).unwrap());
    }
}

#[test]
fn test_invalid_policy_before_any_address() {
    // The address file is malformed too, but the policy is rejected first
    let result = simulate("not a number\n", "RANDOM", 4);
    assert!(matches!(result, Err(SimError::InvalidPolicy(_))));
}

#[test]
fn test_zero_frames_rejected() {
    let result = simulate("0\n", "FIFO", 0);
    assert!(matches!(result, Err(SimError::Configuration(_))));
}

#[test]
fn test_malformed_address_file() {
    let result = simulate("1\n2\n70000\n", "FIFO", 4);
    assert!(matches!(result, Err(SimError::MalformedAddress { line: 3, .. })));
}

#[test]
fn test_truncated_backing_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.bin");
    std::fs::write(&path, vec![0u8; BACKING_STORE_SIZE / 2]).unwrap();

    let result = FileBackingStore::open(&path);
    assert!(matches!(result, Err(SimError::StorageCorruption(_))));
}

#[test]
fn test_opt_keeps_page_needed_soonest() {
    // Pages 1 2 3 1 2 with two frames: page 1 is needed before page 2, so
    // page 3 takes page 2's frame and only page 2's return faults again
    let dir = tempfile::tempdir().unwrap();
    let store = FileBackingStore::open(backing_store(&dir)).unwrap();
    let config = SimConfig::new("unused", "unused", 2, "OPT").unwrap();
    let mut vm = VmManager::new(config.frames, config.policy, store);

    let addresses = mem_sim::io::parse_addresses("256\n512\n768\n256\n512\n").unwrap();
    let records = vm.translate_all(&addresses).unwrap();
    let kinds: Vec<AccessKind> = records.iter().map(|r| r.kind).collect();

    assert_eq!(
        kinds,
        vec![
            AccessKind::HardFault,
            AccessKind::HardFault,
            AccessKind::HardFault,
            AccessKind::TlbHit,
            AccessKind::HardFault,
        ]
    );
    assert_eq!(records[2].frame, 1);
}
