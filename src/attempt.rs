//! A single student's attendance claim and how it resolves.
//!
//! An attempt is created `Pending` when a student presents a code and is
//! resolved exactly once: `resolve` consumes the pending value and hands back
//! the terminal one. Denials are outcomes, not errors, and each reason keeps
//! its own code and message so callers can tell them apart.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::{LocationPolicy, RadiusCheck};
use crate::location::LocationSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMethod {
    Scan,
    ManualCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    LocationDenied,
    OutsideRadius,
    InvalidToken,
}

impl DenialReason {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::LocationDenied => "location_denied",
            Self::OutsideRadius => "outside_radius",
            Self::InvalidToken => "invalid_token",
        }
    }

    /// Human-readable explanation for the student.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::LocationDenied => "Location access denied. Please enable location services to mark attendance.",
            Self::OutsideRadius => {
                "You are outside the allowed radius for this class. Please move closer to the classroom."
            }
            Self::InvalidToken => "Invalid or expired session code. Please scan the current code and try again.",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    Success,
    Denied(DenialReason),
}

/// Decide the outcome of the location step for an attempt whose code matched.
#[must_use]
pub fn judge_location(sample: &LocationSample, policy: &LocationPolicy) -> Outcome {
    match sample {
        LocationSample::Unavailable { .. } => Outcome::Denied(DenialReason::LocationDenied),
        LocationSample::Fix(fix) => match policy.check(*fix) {
            RadiusCheck::Outside { .. } => Outcome::Denied(DenialReason::OutsideRadius),
            RadiusCheck::Within { .. } | RadiusCheck::Unenforced => Outcome::Success,
        },
    }
}

// =============================================================================
// ATTEMPT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceAttempt {
    pub id: Uuid,
    pub session_id: Uuid,
    pub student_id: String,
    pub method: SubmissionMethod,
    pub presented_token: String,
    /// Whether the code matched when it was presented. Never re-evaluated.
    pub token_matched: bool,
    pub submitted_at: i64,
    /// `None` when the attempt was denied before a location was requested.
    pub location_sample: Option<LocationSample>,
    pub outcome: Outcome,
    pub resolved_at: Option<i64>,
}

impl AttendanceAttempt {
    pub(crate) fn new(
        session_id: Uuid,
        student_id: &str,
        method: SubmissionMethod,
        presented_token: &str,
        token_matched: bool,
        submitted_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            student_id: student_id.to_string(),
            method,
            presented_token: presented_token.to_string(),
            token_matched,
            submitted_at,
            location_sample: None,
            outcome: Outcome::Pending,
            resolved_at: None,
        }
    }

    pub(crate) fn with_location(mut self, sample: LocationSample) -> Self {
        self.location_sample = Some(sample);
        self
    }

    pub(crate) fn resolve(mut self, outcome: Outcome, now: i64) -> Self {
        debug_assert!(self.outcome == Outcome::Pending, "attempt resolved twice");
        debug_assert!(outcome != Outcome::Pending, "attempt resolved to pending");
        self.outcome = outcome;
        self.resolved_at = Some(now);
        self
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.outcome != Outcome::Pending
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    #[must_use]
    pub fn denial(&self) -> Option<DenialReason> {
        match self.outcome {
            Outcome::Denied(reason) => Some(reason),
            Outcome::Pending | Outcome::Success => None,
        }
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// What the student sees after a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub class_name: String,
    pub timestamp: i64,
    pub location: String,
}

/// Terminal notification for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt: AttendanceAttempt,
    pub message: String,
    /// Present only on success.
    pub session_info: Option<SessionInfo>,
}

impl AttemptResult {
    pub(crate) fn denied(attempt: AttendanceAttempt) -> Self {
        let message = attempt.denial().map_or_else(String::new, |r| r.message().to_string());
        Self { attempt, message, session_info: None }
    }

    pub(crate) fn success(attempt: AttendanceAttempt, info: SessionInfo) -> Self {
        let message = match attempt.method {
            SubmissionMethod::Scan => "Attendance marked successfully!",
            SubmissionMethod::ManualCode => "Attendance marked via manual code entry!",
        };
        Self { attempt, message: message.to_string(), session_info: Some(info) }
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.attempt.outcome
    }
}

#[cfg(test)]
#[path = "attempt_test.rs"]
mod tests;
