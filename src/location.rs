//! Student-side location providers.
//!
//! DESIGN
//! ======
//! A provider answers "where is this device right now?" and may be slow or
//! refuse. Refusal is a value (`LocationSample::Unavailable`), not an error,
//! because the workflow turns it into a `location_denied` outcome.
//!
//! `SimulatedLocationProvider` reproduces the classroom demo: most requests
//! are granted, and most granted fixes land inside the session radius.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;
use crate::geo::Coordinate;

pub const DEFAULT_GRANT_PROBABILITY: f64 = 0.7;
pub const DEFAULT_WITHIN_PROBABILITY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationSample {
    Fix(Coordinate),
    Unavailable { reason: String },
}

impl LocationSample {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable { reason: reason.into() }
    }
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// Async source of the submitting device's location. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> LocationSample;
}

/// Always answers with the same sample.
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    sample: LocationSample,
}

impl FixedLocationProvider {
    #[must_use]
    pub fn new(sample: LocationSample) -> Self {
        Self { sample }
    }

    #[must_use]
    pub fn at(coordinate: Coordinate) -> Self {
        Self::new(LocationSample::Fix(coordinate))
    }

    #[must_use]
    pub fn denied() -> Self {
        Self::new(LocationSample::unavailable("permission denied"))
    }
}

#[async_trait::async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> LocationSample {
        self.sample.clone()
    }
}

// =============================================================================
// SIMULATED PROVIDER
// =============================================================================

/// Random fixes around a classroom, for demos and soak runs.
#[derive(Debug)]
pub struct SimulatedLocationProvider {
    center: Coordinate,
    radius_meters: f64,
    grant_probability: f64,
    within_probability: f64,
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedLocationProvider {
    /// # Errors
    ///
    /// `Validation` unless the radius is a positive finite number.
    pub fn new(center: Coordinate, radius_meters: f64, rng: StdRng) -> Result<Self, AttendanceError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(AttendanceError::validation(format!("radius must be a positive number, got {radius_meters}")));
        }
        Ok(Self {
            center,
            radius_meters,
            grant_probability: DEFAULT_GRANT_PROBABILITY,
            within_probability: DEFAULT_WITHIN_PROBABILITY,
            delay: Duration::ZERO,
            rng: Mutex::new(rng),
        })
    }

    /// Override the grant and within-radius chances (each clamped to `[0, 1]`).
    #[must_use]
    pub fn with_probabilities(mut self, grant: f64, within: f64) -> Self {
        self.grant_probability = grant.clamp(0.0, 1.0);
        self.within_probability = within.clamp(0.0, 1.0);
        self
    }

    /// Simulated time the device takes to produce a fix.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn draw(&self) -> LocationSample {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.random::<f64>() >= self.grant_probability {
            return LocationSample::unavailable("permission denied");
        }
        // Inside: up to 90% of the radius. Outside: 1.5x to 3x the radius.
        let distance = if rng.random::<f64>() < self.within_probability {
            rng.random_range(0.0..=self.radius_meters * 0.9)
        } else {
            rng.random_range(self.radius_meters * 1.5..=self.radius_meters * 3.0)
        };
        let north = if rng.random::<bool>() { distance } else { -distance };
        LocationSample::Fix(self.center.offset_north(north))
    }
}

#[async_trait::async_trait]
impl LocationProvider for SimulatedLocationProvider {
    async fn current_location(&self) -> LocationSample {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.draw()
    }
}

#[cfg(test)]
#[path = "location_test.rs"]
mod tests;
