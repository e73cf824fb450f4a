use std::collections::HashSet;

use super::*;
use crate::geo::Coordinate;

fn policy() -> LocationPolicy {
    LocationPolicy::parse("0, 0", 50.0).unwrap()
}

fn pending(method: SubmissionMethod) -> AttendanceAttempt {
    AttendanceAttempt::new(Uuid::nil(), "cs-001", method, "abc", true, 1_000)
}

// =============================================================================
// judge_location
// =============================================================================

#[test]
fn unavailable_is_location_denied() {
    let outcome = judge_location(&LocationSample::unavailable("off"), &policy());
    assert_eq!(outcome, Outcome::Denied(DenialReason::LocationDenied));
}

#[test]
fn far_fix_is_outside_radius() {
    let far = Coordinate::new(0.0, 0.0).unwrap().offset_north(120.0);
    assert_eq!(judge_location(&LocationSample::Fix(far), &policy()), Outcome::Denied(DenialReason::OutsideRadius));
}

#[test]
fn near_fix_is_success() {
    let near = Coordinate::new(0.0, 0.0).unwrap().offset_north(10.0);
    assert_eq!(judge_location(&LocationSample::Fix(near), &policy()), Outcome::Success);
}

#[test]
fn label_site_accepts_any_fix() {
    let label = LocationPolicy::parse("Lab A-201", 50.0).unwrap();
    let far = Coordinate::new(10.0, 10.0).unwrap();
    assert_eq!(judge_location(&LocationSample::Fix(far), &label), Outcome::Success);
}

// =============================================================================
// DenialReason
// =============================================================================

#[test]
fn denial_codes_and_messages_are_distinct() {
    let reasons = [DenialReason::LocationDenied, DenialReason::OutsideRadius, DenialReason::InvalidToken];
    let codes: HashSet<_> = reasons.iter().map(|r| r.code()).collect();
    let messages: HashSet<_> = reasons.iter().map(|r| r.message()).collect();
    assert_eq!(codes.len(), 3);
    assert_eq!(messages.len(), 3);
    assert_eq!(DenialReason::OutsideRadius.to_string(), "outside_radius");
}

#[test]
fn outcome_serializes_with_reason() {
    let json = serde_json::to_value(Outcome::Denied(DenialReason::InvalidToken)).unwrap();
    assert_eq!(json["status"], "denied");
    assert_eq!(json["reason"], "invalid_token");
    let ok = serde_json::to_value(Outcome::Success).unwrap();
    assert_eq!(ok["status"], "success");
}

// =============================================================================
// AttendanceAttempt + AttemptResult
// =============================================================================

#[test]
fn new_attempt_is_pending() {
    let attempt = pending(SubmissionMethod::Scan);
    assert!(!attempt.is_resolved());
    assert_eq!(attempt.location_sample, None);
    assert_eq!(attempt.resolved_at, None);
}

#[test]
fn resolve_sets_outcome_and_time() {
    let attempt = pending(SubmissionMethod::Scan).resolve(Outcome::Denied(DenialReason::OutsideRadius), 2_000);
    assert!(attempt.is_resolved());
    assert!(!attempt.is_success());
    assert_eq!(attempt.denial(), Some(DenialReason::OutsideRadius));
    assert_eq!(attempt.resolved_at, Some(2_000));
}

#[test]
fn denied_result_carries_reason_message() {
    let attempt = pending(SubmissionMethod::Scan).resolve(Outcome::Denied(DenialReason::LocationDenied), 2_000);
    let result = AttemptResult::denied(attempt);
    assert_eq!(result.message, DenialReason::LocationDenied.message());
    assert!(result.session_info.is_none());
}

#[test]
fn success_message_depends_on_method() {
    let info = SessionInfo { class_name: "CS".into(), timestamp: 2_000, location: "Lab".into() };
    let scan = AttemptResult::success(pending(SubmissionMethod::Scan).resolve(Outcome::Success, 2_000), info.clone());
    let manual =
        AttemptResult::success(pending(SubmissionMethod::ManualCode).resolve(Outcome::Success, 2_000), info.clone());
    assert_eq!(scan.message, "Attendance marked successfully!");
    assert_eq!(manual.message, "Attendance marked via manual code entry!");
    assert_eq!(manual.session_info, Some(info));
    assert_eq!(manual.outcome(), Outcome::Success);
}
