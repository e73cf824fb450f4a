use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_empty_uses_defaults() {
    let cfg = RollcallConfig::from_lookup(|_| None);
    assert_eq!(cfg, RollcallConfig::default());
    assert_eq!(cfg.session.token_ttl_secs, 15);
    assert_eq!(cfg.history_cap, 5);
    assert_eq!(cfg.tick_interval, Duration::from_secs(1));
    assert_eq!(cfg.scan_delay, Duration::ZERO);
    assert_eq!(cfg.ended_retention, Duration::from_secs(3600));
}

#[test]
fn from_lookup_reads_every_key() {
    let cfg = RollcallConfig::from_lookup(lookup_from(&[
        ("ROLLCALL_TOKEN_TTL_SECS", "30"),
        ("ROLLCALL_FILL_IN_PROBABILITY", "0.5"),
        ("ROLLCALL_FILL_IN_MAX_BATCH", "4"),
        ("ROLLCALL_HISTORY_CAP", "10"),
        ("ROLLCALL_TICK_INTERVAL_MS", "250"),
        ("ROLLCALL_SCAN_DELAY_MS", "2000"),
        ("ROLLCALL_DEFAULT_RADIUS_METERS", "75.5"),
        ("ROLLCALL_ENDED_RETENTION_SECS", "600"),
    ]));
    assert_eq!(cfg.session.token_ttl_secs, 30);
    assert_eq!(cfg.session.fill_in, FillInPolicy { probability: 0.5, max_batch: 4 });
    assert_eq!(cfg.history_cap, 10);
    assert_eq!(cfg.tick_interval, Duration::from_millis(250));
    assert_eq!(cfg.scan_delay, Duration::from_secs(2));
    assert!((cfg.default_radius_meters - 75.5).abs() < f64::EPSILON);
    assert_eq!(cfg.ended_retention, Duration::from_secs(600));
}

#[test]
fn from_lookup_ignores_garbage() {
    let cfg = RollcallConfig::from_lookup(lookup_from(&[
        ("ROLLCALL_TOKEN_TTL_SECS", "fifteen"),
        ("ROLLCALL_HISTORY_CAP", "-3"),
    ]));
    assert_eq!(cfg.session.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
    assert_eq!(cfg.history_cap, DEFAULT_HISTORY_CAP);
}

#[test]
fn from_lookup_trims_whitespace() {
    let cfg = RollcallConfig::from_lookup(lookup_from(&[("ROLLCALL_TOKEN_TTL_SECS", " 20 ")]));
    assert_eq!(cfg.session.token_ttl_secs, 20);
}

#[test]
fn zero_ttl_and_cap_are_raised_to_one() {
    let cfg = RollcallConfig::from_lookup(lookup_from(&[
        ("ROLLCALL_TOKEN_TTL_SECS", "0"),
        ("ROLLCALL_HISTORY_CAP", "0"),
        ("ROLLCALL_TICK_INTERVAL_MS", "0"),
    ]));
    assert_eq!(cfg.session.token_ttl_secs, 1);
    assert_eq!(cfg.history_cap, 1);
    assert_eq!(cfg.tick_interval, Duration::from_millis(1));
}

#[test]
fn probability_is_clamped() {
    let high = RollcallConfig::from_lookup(lookup_from(&[("ROLLCALL_FILL_IN_PROBABILITY", "1.7")]));
    assert!((high.session.fill_in.probability - 1.0).abs() < f64::EPSILON);

    let low = RollcallConfig::from_lookup(lookup_from(&[("ROLLCALL_FILL_IN_PROBABILITY", "-0.2")]));
    assert!(low.session.fill_in.probability.abs() < f64::EPSILON);

    let nan = RollcallConfig::from_lookup(lookup_from(&[("ROLLCALL_FILL_IN_PROBABILITY", "NaN")]));
    assert!((nan.session.fill_in.probability - DEFAULT_FILL_IN_PROBABILITY).abs() < f64::EPSILON);
}

#[test]
fn non_positive_radius_falls_back() {
    let cfg = RollcallConfig::from_lookup(lookup_from(&[("ROLLCALL_DEFAULT_RADIUS_METERS", "0")]));
    assert!((cfg.default_radius_meters - DEFAULT_RADIUS_METERS).abs() < f64::EPSILON);
}

#[test]
fn fill_in_disabled_never_fires() {
    let policy = FillInPolicy::disabled();
    assert!(policy.probability.abs() < f64::EPSILON);
    assert_eq!(policy.max_batch, 0);
}
