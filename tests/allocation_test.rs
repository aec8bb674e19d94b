//! Tests for the withdrawal allocation algorithm
//!
//! The allocation core is a pure function; these tests pin down the
//! ordering, exact-cover, and under-funding behaviors.

mod common;

use common::reserve_setting;
use pegbtc_client::withdraw::allocate;

#[test]
fn single_reserve_covers_the_full_request() {
    // requested 50 against quotas A:30, B:10, C:100 -> C alone pays
    let reserves = vec![
        (30, reserve_setting("A", 1_000)),
        (10, reserve_setting("B", 1_000)),
        (100, reserve_setting("C", 1_000)),
    ];

    let plan = allocate(50, reserves);

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].reserve.address, "C");
    assert_eq!(plan[0].amount_satoshi, 50);
}

#[test]
fn allocation_sums_exactly_to_the_request_when_covered() {
    let reserves = vec![
        (40, reserve_setting("A", 1_000)),
        (35, reserve_setting("B", 1_000)),
        (25, reserve_setting("C", 1_000)),
    ];

    let plan = allocate(90, reserves);

    let total: u64 = plan.iter().map(|a| a.amount_satoshi).sum();
    assert_eq!(total, 90);
    // visited in descending quota order
    let order: Vec<&str> = plan.iter().map(|a| a.reserve.address.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "C"]);
    assert_eq!(plan[0].amount_satoshi, 40);
    assert_eq!(plan[1].amount_satoshi, 35);
    assert_eq!(plan[2].amount_satoshi, 15);
}

#[test]
fn each_share_stays_within_its_reserve_quota() {
    let reserves = vec![
        (7, reserve_setting("A", 1_000)),
        (13, reserve_setting("B", 1_000)),
        (2, reserve_setting("C", 1_000)),
    ];

    let plan = allocate(20, reserves.clone());

    for allocation in &plan {
        let quota = reserves
            .iter()
            .find(|(_, r)| r.address == allocation.reserve.address)
            .map(|(q, _)| *q)
            .unwrap();
        assert!(allocation.amount_satoshi <= quota);
    }
}

#[test]
fn under_funded_request_allocates_everything_available() {
    let reserves = vec![
        (30, reserve_setting("A", 1_000)),
        (10, reserve_setting("B", 1_000)),
    ];

    let plan = allocate(100, reserves);

    let total: u64 = plan.iter().map(|a| a.amount_satoshi).sum();
    assert_eq!(total, 40);
    assert_eq!(plan.len(), 2);
}

#[test]
fn zero_quota_reserves_contribute_no_allocation() {
    let reserves = vec![
        (0, reserve_setting("A", 1_000)),
        (15, reserve_setting("B", 1_000)),
        (0, reserve_setting("C", 1_000)),
    ];

    let plan = allocate(100, reserves);

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].reserve.address, "B");
}

#[test]
fn total_quota_zero_yields_an_empty_plan() {
    let reserves = vec![
        (0, reserve_setting("A", 1_000)),
        (0, reserve_setting("B", 1_000)),
    ];
    assert!(allocate(100, reserves).is_empty());
}

#[test]
fn equal_quotas_break_ties_by_address() {
    let reserves = vec![
        (50, reserve_setting("Zeta", 1_000)),
        (50, reserve_setting("Alpha", 1_000)),
        (50, reserve_setting("Mid", 1_000)),
    ];

    let plan = allocate(120, reserves);

    let order: Vec<&str> = plan.iter().map(|a| a.reserve.address.as_str()).collect();
    assert_eq!(order, vec!["Alpha", "Mid", "Zeta"]);
}

#[test]
fn allocation_stops_once_the_request_is_met() {
    let reserves = vec![
        (100, reserve_setting("A", 1_000)),
        (100, reserve_setting("B", 1_000)),
        (100, reserve_setting("C", 1_000)),
    ];

    let plan = allocate(100, reserves);
    assert_eq!(plan.len(), 1);
}

#[test]
fn zero_request_yields_an_empty_plan() {
    let reserves = vec![(100, reserve_setting("A", 1_000))];
    assert!(allocate(0, reserves).is_empty());
}
