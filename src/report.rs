//! End-of-session reports and per-student attendance standing.
//!
//! Thresholds match what the classroom dashboard highlights: a live session
//! is on target at 80% present, a finished session is excellent at 85%, and
//! a student's running record is good at 80%, a warning from 70%, and
//! critical below that.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{Mark, SessionSummary};

pub const ON_TARGET_PERCENT: f64 = 80.0;
pub const EXCELLENT_SESSION_PERCENT: f64 = 85.0;
pub const GOOD_STANDING_PERCENT: f64 = 80.0;
pub const WARNING_STANDING_PERCENT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionQuality {
    Excellent,
    Good,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Good,
    Warning,
    Critical,
}

impl Standing {
    #[must_use]
    pub fn classify(percentage: f64) -> Self {
        if percentage >= GOOD_STANDING_PERCENT {
            Self::Good
        } else if percentage >= WARNING_STANDING_PERCENT {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

// =============================================================================
// SESSION REPORT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub class_name: String,
    pub present: usize,
    pub absent: usize,
    pub total: usize,
    pub rate_percent: f64,
    pub on_target: bool,
    pub quality: SessionQuality,
}

impl SessionReport {
    #[must_use]
    pub fn from_summary(summary: &SessionSummary) -> Self {
        let rate_percent = percent(summary.present, summary.total);
        let quality =
            if rate_percent >= EXCELLENT_SESSION_PERCENT { SessionQuality::Excellent } else { SessionQuality::Good };
        Self {
            session_id: summary.session_id,
            class_name: summary.class_name.clone(),
            present: summary.present,
            absent: summary.total.saturating_sub(summary.present),
            total: summary.total,
            rate_percent,
            on_target: rate_percent >= ON_TARGET_PERCENT,
            quality,
        }
    }
}

// =============================================================================
// STUDENT RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub student_id: String,
    pub present: usize,
    pub total: usize,
}

impl StudentRecord {
    #[must_use]
    pub fn percentage(&self) -> f64 {
        percent(self.present, self.total)
    }

    #[must_use]
    pub fn standing(&self) -> Standing {
        Standing::classify(self.percentage())
    }
}

/// Per-student totals across finished sessions, ordered by student id.
#[must_use]
pub fn aggregate(summaries: &[SessionSummary]) -> Vec<StudentRecord> {
    let mut totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for summary in summaries {
        for entry in &summary.roster {
            let counts = totals.entry(entry.student_id.as_str()).or_default();
            counts.1 += 1;
            if entry.mark == Mark::Present {
                counts.0 += 1;
            }
        }
    }
    totals
        .into_iter()
        .map(|(student_id, (present, total))| StudentRecord { student_id: student_id.to_string(), present, total })
        .collect()
}

/// Render records as CSV with a header row.
#[must_use]
pub fn to_csv(records: &[StudentRecord]) -> String {
    let mut out = String::from("student_id,present,total,percentage,standing\n");
    for r in records {
        out.push_str(&format!(
            "{},{},{},{:.0},{}\n",
            csv_field(&r.student_id),
            r.present,
            r.total,
            r.percentage(),
            r.standing().as_str()
        ));
    }
    out
}

/// `present / total` as a percentage, computed so whole-number tier
/// boundaries compare exactly.
#[allow(clippy::cast_precision_loss)]
fn percent(present: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { present as f64 * 100.0 / total as f64 }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) { format!("\"{}\"", value.replace('"', "\"\"")) } else { value.to_string() }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
