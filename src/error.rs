//! Structural errors for session and attempt operations.
//!
//! DESIGN
//! ======
//! Only failures that the caller caused are errors: malformed input, an
//! operation against a session in the wrong lifecycle state, or an unknown
//! session id. Attendance denials are ordinary outcomes and live in
//! `attempt::DenialReason`, never here.

use uuid::Uuid;

use crate::session::SessionState;

/// Stable machine-readable code for an error value.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttendanceError {
    /// Missing or malformed input. Nothing was mutated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The session is not in a state that allows the operation.
    #[error("cannot {operation} a session that is {state}")]
    InvalidState { operation: &'static str, state: SessionState },

    /// No session is registered under this id.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
}

impl AttendanceError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }
}

impl ErrorCode for AttendanceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::InvalidState { .. } => "E_INVALID_STATE",
            Self::SessionNotFound(_) => "E_SESSION_NOT_FOUND",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
