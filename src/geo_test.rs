use super::*;

fn origin() -> Coordinate {
    Coordinate::new(0.0, 0.0).unwrap()
}

// =============================================================================
// Coordinate
// =============================================================================

#[test]
fn coordinate_rejects_out_of_range() {
    assert!(Coordinate::new(90.1, 0.0).is_err());
    assert!(Coordinate::new(0.0, -180.5).is_err());
    assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    assert!(Coordinate::new(-90.0, 180.0).is_ok());
}

#[test]
fn coordinate_parses_lat_lng_text() {
    let c: Coordinate = "40.712800, -74.006000".parse().unwrap();
    assert!((c.lat - 40.7128).abs() < 1e-9);
    assert!((c.lng + 74.006).abs() < 1e-9);
}

#[test]
fn coordinate_parse_rejects_labels() {
    assert!("Lab A-201".parse::<Coordinate>().is_err());
    assert!("north, south".parse::<Coordinate>().is_err());
    assert!("91, 0".parse::<Coordinate>().is_err());
}

#[test]
fn coordinate_displays_six_decimals() {
    let c = Coordinate::new(1.5, -2.25).unwrap();
    assert_eq!(c.to_string(), "1.500000, -2.250000");
}

// =============================================================================
// distance_meters
// =============================================================================

#[test]
fn distance_to_self_is_zero() {
    assert!(distance_meters(origin(), origin()).abs() < 1e-9);
}

#[test]
fn one_degree_of_latitude_is_about_111_km() {
    let north = Coordinate::new(1.0, 0.0).unwrap();
    let d = distance_meters(origin(), north);
    assert!((d - 111_195.0).abs() < 10.0, "got {d}");
}

#[test]
fn distance_is_symmetric() {
    let a = Coordinate::new(48.8566, 2.3522).unwrap();
    let b = Coordinate::new(51.5074, -0.1278).unwrap();
    assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-6);
}

#[test]
fn offset_north_round_trips_through_distance() {
    let moved = origin().offset_north(50.0);
    assert!((distance_meters(origin(), moved) - 50.0).abs() < 1e-6);
}

// =============================================================================
// LocationPolicy
// =============================================================================

#[test]
fn policy_requires_location() {
    assert!(matches!(LocationPolicy::parse("   ", 50.0), Err(AttendanceError::Validation(_))));
}

#[test]
fn policy_requires_positive_radius() {
    assert!(LocationPolicy::parse("0, 0", 0.0).is_err());
    assert!(LocationPolicy::parse("0, 0", -5.0).is_err());
    assert!(LocationPolicy::parse("0, 0", f64::INFINITY).is_err());
}

#[test]
fn policy_with_coordinate_has_center() {
    let policy = LocationPolicy::parse("0, 0", 50.0).unwrap();
    assert_eq!(policy.center(), Some(origin()));
    assert_eq!(policy.label(), "0.000000, 0.000000");
}

#[test]
fn policy_with_text_falls_back_to_label() {
    let policy = LocationPolicy::parse(" Lab A-201 ", 50.0).unwrap();
    assert_eq!(policy.center(), None);
    assert_eq!(policy.label(), "Lab A-201");
}

#[test]
fn policy_with_out_of_range_pair_is_rejected() {
    assert!(matches!(LocationPolicy::parse("40.0, 200.0", 50.0), Err(AttendanceError::Validation(_))));
    assert!(matches!(LocationPolicy::parse("-91, 0", 50.0), Err(AttendanceError::Validation(_))));
}

#[test]
fn policy_with_one_numeric_half_is_a_label() {
    let policy = LocationPolicy::parse("Room 4, Building B", 50.0).unwrap();
    assert_eq!(policy.center(), None);
}

#[test]
fn check_inside_outside_and_boundary() {
    let policy = LocationPolicy::parse("0, 0", 50.0).unwrap();
    assert!(matches!(policy.check(origin()), RadiusCheck::Within { .. }));
    assert!(policy.check(origin().offset_north(49.0)).is_allowed());
    assert!(!policy.check(origin().offset_north(51.0)).is_allowed());
}

#[test]
fn label_site_is_unenforced() {
    let policy = LocationPolicy::parse("Lab A-201", 50.0).unwrap();
    let far = Coordinate::new(45.0, 45.0).unwrap();
    assert_eq!(policy.check(far), RadiusCheck::Unenforced);
    assert!(policy.check(far).is_allowed());
}

#[test]
fn site_serializes_with_kind_tag() {
    let policy = LocationPolicy::parse("Lab A-201", 25.0).unwrap();
    let json = serde_json::to_value(&policy).unwrap();
    assert_eq!(json["site"]["kind"], "label");
    assert_eq!(json["site"]["text"], "Lab A-201");
    assert_eq!(json["radius_meters"], 25.0);
}
