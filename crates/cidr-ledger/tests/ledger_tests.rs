//! Integration tests for cidr-ledger
//!
//! Exercises the public API end to end: parsing, subnet enumeration,
//! allocation bookkeeping and free-space reporting.

use cidr_ledger::{Address, BatchMode, Block, Error, LedgerConfig, Range, RangeSet};
use std::str::FromStr;

/// Route ledger logs to the test writer; repeat calls are ignored
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cidr_ledger=debug")
        .with_test_writer()
        .try_init();
}

fn range(start: u64, end: u64) -> Range {
    Range::new(start, end).unwrap()
}

fn ip(text: &str) -> u64 {
    u64::from(Address::from_str(text).unwrap().value())
}

// ============================================================================
// Block Arithmetic Tests
// ============================================================================

#[test]
fn test_block_from_string() {
    let block = Block::from_str("10.0.0.0/24").unwrap();

    assert_eq!(block.mask().to_string(), "255.255.255.0");

    let hosts = block.host_range().unwrap();
    assert_eq!(
        [hosts.first.to_string(), hosts.last.to_string()],
        ["10.0.0.1", "10.0.0.254"]
    );

    assert!(Block::from_str("10.0.0.0/31").unwrap().host_range().is_none());
}

#[test]
fn test_make_subnets_quarters() {
    let block = Block::from_str("10.0.0.0/24").unwrap();
    let subnets = block.make_subnets(2, 0, None).unwrap();

    let expected: Vec<Block> = ["10.0.0.0/26", "10.0.0.64/26", "10.0.0.128/26", "10.0.0.192/26"]
        .iter()
        .map(|s| Block::from_str(s).unwrap())
        .collect();
    assert_eq!(subnets, expected);
    assert!(subnets.iter().all(|s| block.contains(s)));
}

#[test]
fn test_make_subnets_does_not_allocate() {
    let block = Block::from_str("10.0.0.0/24").unwrap();
    block.make_subnets(1, 0, None).unwrap();

    assert!(block.allocations().is_empty());
}

// ============================================================================
// Allocation Tests
// ============================================================================

#[test]
fn test_allocate_alternating_quarters() {
    init_tracing();
    let mut block = Block::from_str("10.0.0.0/24").unwrap();

    block.allocate_subnets(2, 0, Some(1)).unwrap();
    block.allocate_subnets(2, 2, Some(3)).unwrap();

    let free = block.free_space();
    assert_eq!(
        free.ranges,
        vec![
            range(ip("10.0.0.64"), ip("10.0.0.128")),
            range(ip("10.0.0.192"), ip("10.0.1.0")),
        ]
    );
    assert!(free.ranges.iter().all(|r| r.length() == 64));

    let aligned: Vec<String> = free
        .ranges
        .iter()
        .map(|r| Block::from_range(r).unwrap().to_string())
        .collect();
    assert_eq!(aligned, ["10.0.0.64/26", "10.0.0.192/26"]);
}

#[test]
fn test_allocate_same_range_twice() {
    init_tracing();
    let mut block = Block::from_str("10.0.0.0/24").unwrap();

    block.allocate_subnets(2, 1, Some(3)).unwrap();
    let err = block.allocate_subnets(2, 1, Some(3)).unwrap_err();

    match err {
        Error::AlreadyAllocated { subnet, source } => {
            assert_eq!(subnet, "10.0.0.64/26");
            assert!(matches!(*source, Error::Overlap { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fill_block_completely() {
    let mut block = Block::from_str("172.16.0.0/20").unwrap();

    for index in (0..16).rev() {
        block.allocate_subnets(4, index, Some(index + 1)).unwrap();
    }

    assert_eq!(block.allocations().len(), 1);
    assert_eq!(block.allocations().ranges()[0], block.allocations().boundary());
    assert_eq!(block.free_space().total, 0);
}

#[test]
fn test_batch_modes_on_conflict() {
    for (mode, expected_allocated) in [(BatchMode::Atomic, 64), (BatchMode::Partial, 192)] {
        let config = LedgerConfig { batch_mode: mode };
        let mut block = Block::with_config(Address::from_str("10.0.0.0").unwrap(), 24, config).unwrap();

        block.allocate_subnets(2, 2, Some(3)).unwrap();
        assert!(block.allocate_subnets(2, 0, None).is_err());

        assert_eq!(
            block.allocations().allocated_length(),
            expected_allocated,
            "{mode:?}"
        );
    }
}

#[test]
fn test_take_mixed_sizes() {
    let mut block = Block::from_str("192.168.0.0/16").unwrap();

    block.take(&Block::from_str("192.168.0.0/24").unwrap()).unwrap();
    block.take(&Block::from_str("192.168.1.0/25").unwrap()).unwrap();
    block.take(&Block::from_str("192.168.1.128/25").unwrap()).unwrap();

    assert_eq!(
        block.allocations().ranges(),
        &[range(ip("192.168.0.0"), ip("192.168.2.0"))]
    );

    // Subnet enumeration sees the taken space
    let err = block.allocate_subnets(8, 1, Some(2)).unwrap_err();
    assert!(err.is_overlap());
    block.allocate_subnets(8, 2, Some(3)).unwrap();
}

// ============================================================================
// Range Set Tests
// ============================================================================

#[test]
fn test_overlap_leaves_set_unchanged() {
    let mut set = RangeSet::new(range(0, 1000));
    set.insert(range(100, 200)).unwrap();
    let before = set.available_ranges();

    let err = set.insert(range(150, 250)).unwrap_err();
    assert!(matches!(err, Error::Overlap { .. }));
    assert_eq!(set.available_ranges(), before);
}

#[test]
fn test_touching_ranges_merge() {
    let mut set = RangeSet::new(range(0, 1000));
    let a = range(100, 200);
    let b = range(200, 350);

    set.insert(a).unwrap();
    set.insert(b).unwrap();

    assert_eq!(set.ranges(), &[range(100, 350)]);
    assert_eq!(set.allocated_length(), a.length() + b.length());
}

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_describe_free_space() {
    let mut block = Block::from_str("10.0.0.0/24").unwrap();
    block.allocate_subnets(2, 0, Some(1)).unwrap();
    block.allocate_subnets(2, 2, Some(3)).unwrap();

    let report = block.describe_free_space();
    assert_eq!(
        report.to_string(),
        "10.0.0.64 - 10.0.0.127 (64) (10.0.0.64/26)\n\
         10.0.0.192 - 10.0.0.255 (64) (10.0.0.192/26)\n\
         total (128)"
    );
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_address_text_roundtrip(a in 0u8..=255, b in 0u8..=255, c in 0u8..=255, d in 0u8..=255) {
            let text = format!("{}.{}.{}.{}", a, b, c, d);
            let addr = Address::from_str(&text).unwrap();
            prop_assert_eq!(addr.to_string(), text);
        }

        #[test]
        fn test_address_integer_roundtrip(n in any::<u32>()) {
            prop_assert_eq!(Address::from(n).value(), n);
            prop_assert_eq!(Address::from_str(&Address::from(n).to_string()).unwrap().value(), n);
        }

        #[test]
        fn test_single_insert_is_exact(start in 0u64..1024, len in 0u64..1024) {
            let mut set = RangeSet::new(range(0, 2048));
            let r = range(start, start + len);
            set.insert(r).unwrap();
            prop_assert_eq!(set.ranges(), &[r]);
        }

        #[test]
        fn test_free_plus_allocated_is_boundary(
            candidates in proptest::collection::vec((0u64..4096, 1u64..256), 0..64)
        ) {
            let boundary = range(0, 4096);
            let mut set = RangeSet::new(boundary);

            for (start, len) in candidates {
                let end = (start + len).min(boundary.end());
                let _ = set.insert(range(start, end));
            }

            let free = set.available_ranges();
            let free_sum: u64 = free.ranges.iter().map(Range::length).sum();
            prop_assert_eq!(free_sum, free.total);
            prop_assert_eq!(free.total + set.allocated_length(), boundary.length());

            // Sorted, disjoint and never touching
            for pair in set.ranges().windows(2) {
                prop_assert!(pair[0].end() < pair[1].start());
            }
        }

        #[test]
        fn test_overlapping_insert_fails(start in 0u64..512, len in 1u64..256, offset in 0u64..256) {
            let mut set = RangeSet::new(range(0, 1024));
            let first = range(start, start + len);
            set.insert(first).unwrap();

            // Any range sharing a point with `first`
            let shared = start + offset % len;
            let second = range(shared, shared + 1 + offset);
            let before = set.clone();

            prop_assert!(set.insert(second).unwrap_err().is_overlap());
            prop_assert_eq!(set, before);
        }
    }
}
