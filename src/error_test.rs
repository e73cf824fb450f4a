use super::*;

#[test]
fn validation_error_code_and_message() {
    let err = AttendanceError::validation("location is required");
    assert_eq!(err.error_code(), "E_VALIDATION");
    assert_eq!(err.to_string(), "validation failed: location is required");
    assert!(!err.retryable());
}

#[test]
fn invalid_state_names_operation_and_state() {
    let err = AttendanceError::invalid_state("end", SessionState::Ended);
    assert_eq!(err.error_code(), "E_INVALID_STATE");
    assert_eq!(err.to_string(), "cannot end a session that is ended");
}

#[test]
fn session_not_found_includes_id() {
    let err = AttendanceError::SessionNotFound(Uuid::nil());
    assert_eq!(err.error_code(), "E_SESSION_NOT_FOUND");
    assert!(err.to_string().contains("00000000-0000-0000-0000-000000000000"));
}
