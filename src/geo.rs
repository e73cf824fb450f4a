//! Coordinates, site policies, and great-circle distance.
//!
//! DESIGN
//! ======
//! A session site is either a coordinate (the usual case, typed as
//! `"lat, lng"` or filled in from the instructor's device) or a free-text label
//! such as a room name. Only coordinate sites can enforce a radius; a label
//! site accepts any location fix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// COORDINATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Validated constructor: latitude in `[-90, 90]`, longitude in `[-180, 180]`.
    pub fn new(lat: f64, lng: f64) -> Result<Self, AttendanceError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AttendanceError::validation(format!("latitude out of range: {lat}")));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(AttendanceError::validation(format!("longitude out of range: {lng}")));
        }
        Ok(Self { lat, lng })
    }

    /// Coordinate `meters` due north (negative: south), clamped at the poles.
    #[must_use]
    pub fn offset_north(self, meters: f64) -> Self {
        let lat = (self.lat + meters_to_degrees(meters)).clamp(-90.0, 90.0);
        Self { lat, lng: self.lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl FromStr for Coordinate {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((lat, lng)) = s.split_once(',') else {
            return Err(AttendanceError::validation(format!("not a coordinate: {s:?}")));
        };
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| AttendanceError::validation(format!("invalid latitude: {:?}", lat.trim())))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| AttendanceError::validation(format!("invalid longitude: {:?}", lng.trim())))?;
        Self::new(lat, lng)
    }
}

/// Great-circle distance in meters (haversine).
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// `"a, b"` where both halves parse as numbers.
fn numeric_pair(s: &str) -> Option<(f64, f64)> {
    let (lat, lng) = s.split_once(',')?;
    let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) else {
        return None;
    };
    Some((lat, lng))
}

fn meters_to_degrees(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_METERS).to_degrees()
}

// =============================================================================
// SITE + POLICY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Site {
    Coordinate(Coordinate),
    Label { text: String },
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinate(c) => c.fmt(f),
            Self::Label { text } => f.write_str(text),
        }
    }
}

/// Where a session takes place and how far from it students may be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPolicy {
    pub site: Site,
    pub radius_meters: f64,
}

/// Result of comparing a location fix against a policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusCheck {
    Within { distance_meters: f64 },
    Outside { distance_meters: f64 },
    /// Label sites have no center to measure from.
    Unenforced,
}

impl RadiusCheck {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        !matches!(self, Self::Outside { .. })
    }
}

impl LocationPolicy {
    /// Parse user input: a numeric `"lat, lng"` pair becomes a center, anything
    /// else a label.
    pub fn parse(location: &str, radius_meters: f64) -> Result<Self, AttendanceError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(AttendanceError::validation("location is required"));
        }
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(AttendanceError::validation(format!("radius must be a positive number, got {radius_meters}")));
        }
        // Two numbers are always a coordinate; an out-of-range pair is a typo,
        // not a room name.
        let site = match numeric_pair(location) {
            Some((lat, lng)) => Site::Coordinate(Coordinate::new(lat, lng)?),
            None => Site::Label { text: location.to_string() },
        };
        Ok(Self { site, radius_meters })
    }

    #[must_use]
    pub fn center(&self) -> Option<Coordinate> {
        match &self.site {
            Site::Coordinate(c) => Some(*c),
            Site::Label { .. } => None,
        }
    }

    /// Display form of the site.
    #[must_use]
    pub fn label(&self) -> String {
        self.site.to_string()
    }

    #[must_use]
    pub fn check(&self, fix: Coordinate) -> RadiusCheck {
        let Some(center) = self.center() else {
            return RadiusCheck::Unenforced;
        };
        let distance_meters = distance_meters(center, fix);
        if distance_meters > self.radius_meters {
            RadiusCheck::Outside { distance_meters }
        } else {
            RadiusCheck::Within { distance_meters }
        }
    }
}

#[cfg(test)]
#[path = "geo_test.rs"]
mod tests;
