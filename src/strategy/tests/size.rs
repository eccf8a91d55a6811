use super::common::{sample_candidate, GIB};
use crate::strategy::{SizeParams, SizeStrategy, Strategy, ValidationError};

fn scenario_strategy() -> SizeStrategy {
    SizeStrategy::new(SizeParams {
        min_size: GIB,
        max_size: 20 * GIB,
        min_disk_space: 50 * GIB,
        priority_weight: 1.0,
    })
}

#[test]
fn accepts_mid_band_torrent_with_headroom() {
    let strategy = scenario_strategy();
    let mut item = sample_candidate();
    item.size_bytes = 8 * GIB;
    item.disk_space_bytes = 80 * GIB;

    let verdict = strategy.evaluate(&item);
    assert!(verdict.accepted, "unexpected reject: {}", verdict.reason);
}

#[test]
fn rejects_torrent_above_maximum() {
    let strategy = scenario_strategy();
    let mut item = sample_candidate();
    item.size_bytes = 25 * GIB;
    item.disk_space_bytes = 80 * GIB;

    let verdict = strategy.evaluate(&item);
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("above maximum"));
}

#[test]
fn rejects_torrent_below_minimum() {
    let strategy = scenario_strategy();
    let mut item = sample_candidate();
    item.size_bytes = GIB / 2;

    let verdict = strategy.evaluate(&item);
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("below minimum"));
}

#[test]
fn rejects_when_download_would_eat_the_disk_reserve() {
    let strategy = scenario_strategy();
    let mut item = sample_candidate();
    item.size_bytes = 15 * GIB;
    item.disk_space_bytes = 60 * GIB; // leaves 45 GiB, reserve is 50 GiB

    let verdict = strategy.evaluate(&item);
    assert!(!verdict.accepted);
    assert!(verdict.reason.contains("reserve"));
}

#[test]
fn rejects_when_size_exceeds_free_space_entirely() {
    let strategy = scenario_strategy();
    let mut item = sample_candidate();
    item.size_bytes = 10 * GIB;
    item.disk_space_bytes = 8 * GIB;

    assert!(!strategy.evaluate(&item).accepted);
}

#[test]
fn priority_stays_normalized() {
    let strategy = scenario_strategy();
    for size_gib in [0, 1, 8, 10, 20, 25, 500] {
        let mut item = sample_candidate();
        item.size_bytes = size_gib * GIB;
        let priority = strategy.priority(&item);
        assert!(
            (0.0..=1.0).contains(&priority),
            "priority {priority} out of range for {size_gib} GiB"
        );
    }
}

#[test]
fn priority_peaks_at_the_band_midpoint() {
    let strategy = scenario_strategy();

    let mut mid = sample_candidate();
    mid.size_bytes = 10 * GIB + GIB / 2; // midpoint of [1, 20] GiB
    let mut edge = sample_candidate();
    edge.size_bytes = 2 * GIB;

    assert!(strategy.priority(&mid) > strategy.priority(&edge));
    assert!((strategy.priority(&mid) - 1.0).abs() < 1e-9);
}

#[test]
fn priority_rewards_fuller_disk_utilization() {
    let strategy = scenario_strategy();

    let mut snug = sample_candidate();
    snug.size_bytes = 4 * GIB;
    snug.disk_space_bytes = 8 * GIB;
    let mut roomy = sample_candidate();
    roomy.size_bytes = 4 * GIB;
    roomy.disk_space_bytes = 800 * GIB;

    assert!(strategy.priority(&snug) > strategy.priority(&roomy));
}

#[test]
fn validate_rejects_inverted_bounds() {
    let strategy = SizeStrategy::new(SizeParams {
        min_size: 20 * GIB,
        max_size: GIB,
        ..SizeParams::default()
    });
    assert_eq!(
        strategy.validate(),
        Err(ValidationError::InvertedBounds {
            min_field: "min_size",
            max_field: "max_size",
        })
    );
}

#[test]
fn default_params_validate() {
    assert!(SizeStrategy::new(SizeParams::default()).validate().is_ok());
}
