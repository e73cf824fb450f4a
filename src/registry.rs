//! Shared owner of live sessions.
//!
//! DESIGN
//! ======
//! `SessionRegistry` is cheap to clone; every clone sees the same sessions.
//! Sessions live behind one `RwLock` keyed by session id, so ticks, roster
//! writes and reads against a session are serialized and never interleave
//! partially. Callers outside the crate only ever get snapshots back.
//!
//! Ended sessions stay registered (so a second `end` still reports
//! `InvalidState`) until `prune_ended` drops them after a retention window.
//!
//! A class may have at most one active session at a time. Each new session
//! gets its own RNG derived from the registry's seeder, so a registry built
//! with `with_seed` replays the same codes and check-ins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::clock::Clock;
use crate::config::SessionSettings;
use crate::error::AttendanceError;
use crate::session::{MarkOutcome, Rotation, Session, SessionState, SessionSnapshot, SessionSummary};

#[derive(Clone)]
pub struct SessionRegistry {
    catalog: Arc<Catalog>,
    settings: SessionSettings,
    clock: Arc<dyn Clock>,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    seeder: Arc<Mutex<StdRng>>,
}

impl SessionRegistry {
    /// Registry whose sessions draw randomness from the OS.
    #[must_use]
    pub fn new(catalog: Catalog, settings: SessionSettings, clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(catalog, settings, clock, StdRng::from_os_rng())
    }

    /// Registry with reproducible codes and check-ins.
    #[must_use]
    pub fn with_seed(catalog: Catalog, settings: SessionSettings, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(catalog, settings, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Catalog, settings: SessionSettings, clock: Arc<dyn Clock>, seeder: StdRng) -> Self {
        Self {
            catalog: Arc::new(catalog),
            settings,
            clock,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            seeder: Arc::new(Mutex::new(seeder)),
        }
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start a session for a catalog class.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty or unknown class, an empty location, or a bad
    /// radius; `InvalidState` if the class already has an active session.
    pub async fn start_session(
        &self,
        class_ref: &str,
        location: &str,
        radius_meters: f64,
    ) -> Result<SessionSnapshot, AttendanceError> {
        let class_ref = class_ref.trim();
        if class_ref.is_empty() {
            return Err(AttendanceError::validation("class is required"));
        }
        let Some(class) = self.catalog.get(class_ref) else {
            return Err(AttendanceError::validation(format!("unknown class: {class_ref}")));
        };

        let mut sessions = self.sessions.write().await;
        if sessions
            .values()
            .any(|s| s.class_ref() == class_ref && s.state() == SessionState::Active)
        {
            return Err(AttendanceError::invalid_state("start", SessionState::Active));
        }

        let rng = {
            let mut seeder = self.seeder.lock().unwrap_or_else(PoisonError::into_inner);
            StdRng::from_rng(&mut *seeder)
        };
        let session = Session::start_session(class, location, radius_meters, self.settings, rng, self.clock.now_ms())?;
        let snapshot = session.snapshot();
        sessions.insert(session.id(), session);
        Ok(snapshot)
    }

    /// End a session and return its final report.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` or `InvalidState` when the session is not active.
    pub async fn end_session(&self, session_id: Uuid) -> Result<SessionSummary, AttendanceError> {
        let now = self.clock.now_ms();
        self.with_session_mut(session_id, |s| s.end(now)).await?
    }

    /// Advance one session's countdown.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` or `InvalidState` when the session is not active.
    pub async fn tick(&self, session_id: Uuid) -> Result<Option<Rotation>, AttendanceError> {
        let now = self.clock.now_ms();
        self.with_session_mut(session_id, |s| s.tick(now)).await?
    }

    /// Advance every active session; returns the rotations that happened.
    pub async fn tick_all(&self) -> Vec<(Uuid, Rotation)> {
        let now = self.clock.now_ms();
        let mut sessions = self.sessions.write().await;
        let mut rotations = Vec::new();
        for (id, session) in sessions.iter_mut() {
            if session.state() != SessionState::Active {
                continue;
            }
            match session.tick(now) {
                Ok(Some(rotation)) => rotations.push((*id, rotation)),
                Ok(None) => {}
                Err(e) => warn!(session_id = %id, error = %e, "tick failed"),
            }
        }
        rotations
    }

    /// Mark a student present through the session's single writer.
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `InvalidState` after the session ended, or
    /// `Validation` for a student outside the class.
    pub async fn mark_present(&self, session_id: Uuid, student_id: &str) -> Result<MarkOutcome, AttendanceError> {
        self.with_session_mut(session_id, |s| s.mark_present(student_id)).await?
    }

    /// # Errors
    ///
    /// `SessionNotFound` for an unknown id.
    pub async fn snapshot(&self, session_id: Uuid) -> Result<SessionSnapshot, AttendanceError> {
        self.with_session(session_id, Session::snapshot).await
    }

    /// Id of the class's active session, if any.
    pub async fn active_session_for(&self, class_ref: &str) -> Option<Uuid> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .find(|s| s.class_ref() == class_ref && s.state() == SessionState::Active)
            .map(Session::id)
    }

    /// Drop sessions that ended at least `retention` ago; returns how many
    /// were removed. Ids of pruned sessions then report `SessionNotFound`.
    pub async fn prune_ended(&self, retention: Duration) -> usize {
        let retention_ms = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.clock.now_ms().saturating_sub(retention_ms);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.ended_at().is_some_and(|ended| ended <= cutoff));
        before - sessions.len()
    }

    /// Number of registered sessions, ended ones included.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub(crate) async fn with_session<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&Session) -> R,
    ) -> Result<R, AttendanceError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&session_id).ok_or(AttendanceError::SessionNotFound(session_id))?;
        Ok(f(session))
    }

    async fn with_session_mut<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, AttendanceError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&session_id).ok_or(AttendanceError::SessionNotFound(session_id))?;
        Ok(f(session))
    }
}

/// Spawn the background task that ticks every active session once per
/// `interval` and prunes sessions ended more than `ended_retention` ago.
/// Returns a handle for shutdown.
pub fn spawn_rotation_task(registry: SessionRegistry, interval: Duration, ended_retention: Duration) -> JoinHandle<()> {
    info!(
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        ended_retention_secs = ended_retention.as_secs(),
        "code rotation task configured"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the countdown
        // starts one full interval after spawn.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            for (session_id, rotation) in registry.tick_all().await {
                debug!(%session_id, filled_in = rotation.filled_in.len(), "rotation applied");
            }
            let pruned = registry.prune_ended(ended_retention).await;
            if pruned > 0 {
                debug!(pruned, "ended sessions pruned");
            }
        }
    })
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
