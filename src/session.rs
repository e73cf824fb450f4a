//! Attendance session lifecycle, rotating codes, and the roster.
//!
//! ARCHITECTURE
//! ============
//! A `Session` is the single writer for its roster. It moves through
//! `Inactive -> Active -> Ended`; `Ended` is terminal and a new session needs
//! a new value. While active it holds exactly one valid code, replaced every
//! `token_ttl_secs` calls to `tick`. There is no grace period: the moment a
//! code rotates, the old one stops matching.
//!
//! Every operation validates before it mutates, so a rejected call leaves the
//! session exactly as it was.
//!
//! TRADE-OFFS
//! ==========
//! Each rotation may also mark a few absent students present at random. This
//! stands in for check-ins arriving from devices the session cannot see. The
//! RNG is owned by the session and seedable, so a replay with the same seed
//! fills in the same students.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::ClassInfo;
use crate::config::SessionSettings;
use crate::error::AttendanceError;
use crate::geo::LocationPolicy;
use crate::token::next_token;

// =============================================================================
// STATE + MARKS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Inactive,
    Active,
    Ended,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Ended => "ended",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    Present,
    Absent,
}

/// What `mark_present` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    AlreadyPresent,
}

/// A code rotation reported by `tick`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub token: String,
    pub issued_at: i64,
    /// Students marked present by the simulated check-ins of this rotation.
    pub filled_in: Vec<String>,
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub mark: Mark,
}

/// Read-only view for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub class_ref: String,
    pub class_name: String,
    pub location: LocationPolicy,
    pub state: SessionState,
    pub current_token: Option<String>,
    pub token_issued_at: Option<i64>,
    pub token_ttl_secs: u32,
    /// Ticks left before the next rotation.
    pub countdown: u32,
    pub present: usize,
    pub total: usize,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
}

/// Final report produced when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub class_ref: String,
    pub class_name: String,
    pub location: String,
    pub radius_meters: f64,
    pub started_at: i64,
    pub ended_at: i64,
    pub present: usize,
    pub total: usize,
    /// `present / total`, 0 when nobody is enrolled.
    pub rate: f64,
    pub roster: Vec<RosterEntry>,
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    class_ref: String,
    class_name: String,
    policy: LocationPolicy,
    settings: SessionSettings,
    state: SessionState,
    token: Option<String>,
    token_issued_at: Option<i64>,
    countdown: u32,
    roster: BTreeMap<String, Mark>,
    present: usize,
    started_at: Option<i64>,
    ended_at: Option<i64>,
    rng: StdRng,
}

impl Session {
    /// Create an inactive session for `class` at `location`.
    ///
    /// # Errors
    ///
    /// `Validation` when the class id or location is empty, or the radius is
    /// not a positive finite number.
    pub fn new(
        class: &ClassInfo,
        location: &str,
        radius_meters: f64,
        settings: SessionSettings,
        rng: StdRng,
    ) -> Result<Self, AttendanceError> {
        if class.id.trim().is_empty() {
            return Err(AttendanceError::validation("class is required"));
        }
        let policy = LocationPolicy::parse(location, radius_meters)?;
        let roster: BTreeMap<String, Mark> = class.students.iter().map(|s| (s.clone(), Mark::Absent)).collect();

        Ok(Self {
            id: Uuid::new_v4(),
            class_ref: class.id.clone(),
            class_name: class.name.clone(),
            policy,
            settings,
            state: SessionState::Inactive,
            token: None,
            token_issued_at: None,
            countdown: settings.token_ttl_secs,
            roster,
            present: 0,
            started_at: None,
            ended_at: None,
            rng,
        })
    }

    /// Create and immediately start a session.
    ///
    /// # Errors
    ///
    /// Same as [`Session::new`].
    pub fn start_session(
        class: &ClassInfo,
        location: &str,
        radius_meters: f64,
        settings: SessionSettings,
        rng: StdRng,
        now: i64,
    ) -> Result<Self, AttendanceError> {
        let mut session = Self::new(class, location, radius_meters, settings, rng)?;
        session.start(now)?;
        Ok(session)
    }

    /// Activate the session and issue its first code.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is `Inactive`.
    pub fn start(&mut self, now: i64) -> Result<(), AttendanceError> {
        if self.state != SessionState::Inactive {
            return Err(AttendanceError::invalid_state("start", self.state));
        }
        self.state = SessionState::Active;
        self.started_at = Some(now);
        self.issue_token(now);

        info!(
            session_id = %self.id,
            class_ref = %self.class_ref,
            location = %self.policy.site,
            radius_meters = self.policy.radius_meters,
            enrolled = self.roster.len(),
            "attendance session started"
        );
        Ok(())
    }

    /// Advance the rotation countdown by one step.
    ///
    /// Returns the rotation when this tick replaced the code.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is `Active`.
    pub fn tick(&mut self, now: i64) -> Result<Option<Rotation>, AttendanceError> {
        if self.state != SessionState::Active {
            return Err(AttendanceError::invalid_state("tick", self.state));
        }
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return Ok(None);
        }

        let token = self.issue_token(now);
        let filled_in = self.simulate_check_ins();
        debug!(
            session_id = %self.id,
            filled_in = filled_in.len(),
            present = self.present,
            "attendance code rotated"
        );
        Ok(Some(Rotation { token, issued_at: now, filled_in }))
    }

    /// End the session and freeze its roster.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is `Active`.
    pub fn end(&mut self, now: i64) -> Result<SessionSummary, AttendanceError> {
        if self.state != SessionState::Active {
            return Err(AttendanceError::invalid_state("end", self.state));
        }
        self.state = SessionState::Ended;
        self.token = None;
        self.token_issued_at = None;
        self.ended_at = Some(now);

        info!(
            session_id = %self.id,
            class_ref = %self.class_ref,
            present = self.present,
            total = self.roster.len(),
            "attendance session ended"
        );
        Ok(self.summary(now))
    }

    /// Mark an enrolled student present. Re-marking is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is `Active`; `Validation` when the
    /// student is not enrolled in this class.
    pub fn mark_present(&mut self, student_id: &str) -> Result<MarkOutcome, AttendanceError> {
        if self.state != SessionState::Active {
            return Err(AttendanceError::invalid_state("mark attendance in", self.state));
        }
        match self.roster.get_mut(student_id) {
            None => Err(AttendanceError::validation(format!(
                "student {student_id} is not enrolled in class {}",
                self.class_ref
            ))),
            Some(Mark::Present) => Ok(MarkOutcome::AlreadyPresent),
            Some(mark) => {
                *mark = Mark::Present;
                self.present += 1;
                Ok(MarkOutcome::Marked)
            }
        }
    }

    /// Exact, case-sensitive comparison against the one valid code.
    #[must_use]
    pub fn token_matches(&self, presented: &str) -> bool {
        self.token.as_deref() == Some(presented)
    }

    #[must_use]
    pub fn is_enrolled(&self, student_id: &str) -> bool {
        self.roster.contains_key(student_id)
    }

    #[must_use]
    pub fn mark_of(&self, student_id: &str) -> Option<Mark> {
        self.roster.get(student_id).copied()
    }

    #[must_use]
    pub fn present_count(&self) -> usize {
        self.present
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.roster.len()
    }

    #[must_use]
    pub fn absent_count(&self) -> usize {
        self.total() - self.present
    }

    #[must_use]
    pub fn attendance_rate(&self) -> f64 {
        rate(self.present, self.total())
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn class_ref(&self) -> &str {
        &self.class_ref
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn policy(&self) -> &LocationPolicy {
        &self.policy
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn token_issued_at(&self) -> Option<i64> {
        self.token_issued_at
    }

    #[must_use]
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<i64> {
        self.ended_at
    }

    #[must_use]
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            class_ref: self.class_ref.clone(),
            class_name: self.class_name.clone(),
            location: self.policy.clone(),
            state: self.state,
            current_token: self.token.clone(),
            token_issued_at: self.token_issued_at,
            token_ttl_secs: self.settings.token_ttl_secs,
            countdown: self.countdown,
            present: self.present,
            total: self.total(),
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    fn issue_token(&mut self, now: i64) -> String {
        let token = next_token(&mut self.rng, self.token.as_deref());
        self.token = Some(token.clone());
        self.token_issued_at = Some(now);
        self.countdown = self.settings.token_ttl_secs.max(1);
        token
    }

    fn simulate_check_ins(&mut self) -> Vec<String> {
        let policy = self.settings.fill_in;
        if policy.max_batch == 0 || policy.probability <= 0.0 {
            return Vec::new();
        }
        if self.rng.random::<f64>() >= policy.probability {
            return Vec::new();
        }

        let absent: Vec<String> = self
            .roster
            .iter()
            .filter(|(_, mark)| **mark == Mark::Absent)
            .map(|(id, _)| id.clone())
            .collect();
        if absent.is_empty() {
            return Vec::new();
        }

        let want = self.rng.random_range(1..=policy.max_batch);
        let picked: Vec<String> = absent.choose_multiple(&mut self.rng, want).cloned().collect();
        for id in &picked {
            self.roster.insert(id.clone(), Mark::Present);
        }
        self.present += picked.len();
        picked
    }

    fn summary(&self, ended_at: i64) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            class_ref: self.class_ref.clone(),
            class_name: self.class_name.clone(),
            location: self.policy.label(),
            radius_meters: self.policy.radius_meters,
            started_at: self.started_at.unwrap_or(ended_at),
            ended_at,
            present: self.present,
            total: self.total(),
            rate: self.attendance_rate(),
            roster: self
                .roster
                .iter()
                .map(|(student_id, mark)| RosterEntry { student_id: student_id.clone(), mark: *mark })
                .collect(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn rate(present: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { present as f64 / total as f64 }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
