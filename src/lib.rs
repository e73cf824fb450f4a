//! Classroom attendance sessions with rotating check-in codes.
//!
//! ARCHITECTURE
//! ============
//! The instructor side runs a [`Session`] (owned by a [`SessionRegistry`]) that
//! shows a short-lived code and keeps the roster. The student side submits a
//! presented code plus a location sample through an [`AttendanceWorkflow`],
//! which resolves each attempt to success or a specific denial and records
//! successes in the student's [`AttendanceHistory`].
//!
//! Time, randomness and device location are injected ([`Clock`], seeded
//! `StdRng`, [`LocationProvider`]) so every branch can be driven from tests.

pub mod attempt;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod history;
pub mod location;
pub mod registry;
pub mod report;
pub mod session;
pub mod token;
pub mod workflow;

pub use attempt::{AttemptResult, AttendanceAttempt, DenialReason, Outcome, SessionInfo, SubmissionMethod};
pub use catalog::{Catalog, ClassInfo};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FillInPolicy, RollcallConfig, SessionSettings};
pub use error::{AttendanceError, ErrorCode};
pub use geo::{Coordinate, LocationPolicy};
pub use history::{AttendanceHistory, HistoryEntry};
pub use location::{FixedLocationProvider, LocationProvider, LocationSample, SimulatedLocationProvider};
pub use registry::{SessionRegistry, spawn_rotation_task};
pub use report::{SessionReport, Standing, StudentRecord};
pub use session::{Mark, Session, SessionSnapshot, SessionState, SessionSummary};
pub use workflow::AttendanceWorkflow;
