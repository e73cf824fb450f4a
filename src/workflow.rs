//! Student-side attendance submission.
//!
//! ARCHITECTURE
//! ============
//! An attempt moves through scanning, location check and radius check, then
//! resolves once. The registry lock is held only for the short read at
//! presentation time and the roster write on success; the scan delay and the
//! location request run unlocked so one slow device never stalls the
//! session's rotation.
//!
//! TRADE-OFFS
//! ==========
//! The code is compared when it is presented and the verdict is carried in
//! the attempt. A code that rotates while the location request is in flight
//! does not invalidate the attempt, so a student who scanned just before a
//! rotation is not penalized.
//!
//! If the session ends while an attempt is in flight, the attempt still
//! resolves, but a success cannot be written to the frozen roster and the
//! caller gets `InvalidState` instead of a result.
//!
//! Denied attempts can always be retried; each retry is a new attempt.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::attempt::{
    AttemptResult, AttendanceAttempt, DenialReason, Outcome, SessionInfo, SubmissionMethod, judge_location,
};
use crate::error::AttendanceError;
use crate::geo::LocationPolicy;
use crate::history::AttendanceHistory;
use crate::location::LocationProvider;
use crate::registry::SessionRegistry;
use crate::session::{MarkOutcome, SessionState};

/// Session facts read into an attempt at presentation time.
struct Presentation {
    token_matched: bool,
    class_name: String,
    policy: LocationPolicy,
}

#[derive(Clone)]
pub struct AttendanceWorkflow {
    registry: SessionRegistry,
    location: Arc<dyn LocationProvider>,
    scan_delay: Duration,
}

impl AttendanceWorkflow {
    #[must_use]
    pub fn new(registry: SessionRegistry, location: Arc<dyn LocationProvider>) -> Self {
        Self { registry, location, scan_delay: Duration::ZERO }
    }

    /// Simulated camera time before a scanned code is read.
    #[must_use]
    pub fn with_scan_delay(mut self, scan_delay: Duration) -> Self {
        self.scan_delay = scan_delay;
        self
    }

    /// Submit a code read from the classroom display.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `InvalidState` when the session is not active at
    /// presentation or has ended before a success could be recorded, and
    /// `Validation` for a student not enrolled in the class.
    pub async fn submit_via_scan(
        &self,
        session_id: Uuid,
        student_id: &str,
        presented_token: &str,
        history: &mut AttendanceHistory,
    ) -> Result<AttemptResult, AttendanceError> {
        if !self.scan_delay.is_zero() {
            tokio::time::sleep(self.scan_delay).await;
        }
        self.submit(session_id, student_id, presented_token, SubmissionMethod::Scan, history).await
    }

    /// Submit a code typed by the student. Skips the scan step only.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank code, otherwise as
    /// [`AttendanceWorkflow::submit_via_scan`].
    pub async fn submit_via_manual_code(
        &self,
        session_id: Uuid,
        student_id: &str,
        code: &str,
        history: &mut AttendanceHistory,
    ) -> Result<AttemptResult, AttendanceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AttendanceError::validation("session code is required"));
        }
        self.submit(session_id, student_id, code, SubmissionMethod::ManualCode, history).await
    }

    async fn submit(
        &self,
        session_id: Uuid,
        student_id: &str,
        presented_token: &str,
        method: SubmissionMethod,
        history: &mut AttendanceHistory,
    ) -> Result<AttemptResult, AttendanceError> {
        let presentation = self.present(session_id, student_id, presented_token).await?;
        let clock = self.registry.clock();
        let attempt = AttendanceAttempt::new(
            session_id,
            student_id,
            method,
            presented_token,
            presentation.token_matched,
            clock.now_ms(),
        );

        if !presentation.token_matched {
            let attempt = attempt.resolve(Outcome::Denied(DenialReason::InvalidToken), clock.now_ms());
            log_denied(&attempt);
            return Ok(AttemptResult::denied(attempt));
        }

        let sample = self.location.current_location().await;
        let outcome = judge_location(&sample, &presentation.policy);
        let attempt = attempt.with_location(sample);
        if outcome != Outcome::Success {
            let attempt = attempt.resolve(outcome, clock.now_ms());
            log_denied(&attempt);
            return Ok(AttemptResult::denied(attempt));
        }

        let mark = match self.registry.mark_present(session_id, student_id).await {
            Ok(mark) => mark,
            Err(e) => {
                warn!(%session_id, student_id, error = %e, "attendance write rejected");
                return Err(e);
            }
        };

        let now = clock.now_ms();
        let attempt = attempt.resolve(Outcome::Success, now);
        let info = SessionInfo {
            class_name: presentation.class_name,
            timestamp: now,
            location: presentation.policy.label(),
        };
        history.record_success(&attempt, &info);
        info!(
            %session_id,
            student_id,
            method = ?attempt.method,
            already_present = mark == MarkOutcome::AlreadyPresent,
            "attendance marked"
        );
        Ok(AttemptResult::success(attempt, info))
    }

    async fn present(
        &self,
        session_id: Uuid,
        student_id: &str,
        presented_token: &str,
    ) -> Result<Presentation, AttendanceError> {
        self.registry
            .with_session(session_id, |session| {
                if session.state() != SessionState::Active {
                    return Err(AttendanceError::invalid_state("submit attendance to", session.state()));
                }
                if !session.is_enrolled(student_id) {
                    return Err(AttendanceError::validation(format!(
                        "student {student_id} is not enrolled in class {}",
                        session.class_ref()
                    )));
                }
                Ok(Presentation {
                    token_matched: session.token_matches(presented_token),
                    class_name: session.class_name().to_string(),
                    policy: session.policy().clone(),
                })
            })
            .await?
    }
}

fn log_denied(attempt: &AttendanceAttempt) {
    if let Some(reason) = attempt.denial() {
        info!(
            session_id = %attempt.session_id,
            student_id = %attempt.student_id,
            reason = reason.code(),
            "attendance denied"
        );
    }
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
