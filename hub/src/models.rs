// hub/src/models.rs
//
// Wire and domain types shared by every component: the temporal graph,
// the correlator/escalator pure functions, the advisory store, and the
// API layer all speak these types rather than passing ad-hoc tuples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity as reported by the submitting participant, on the submission itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

/// Severity tier assigned to an alert by the escalator, based on participant count.
/// Ordered CRITICAL > HIGH > MEDIUM so the pipeline can compare "did this tier rise".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityTier {
    Medium,
    High,
    Critical,
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeverityTier::Medium => "MEDIUM",
            SeverityTier::High => "HIGH",
            SeverityTier::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

/// Qualitative strength of a correlation, derived from participant count + time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        };
        write!(f, "{s}")
    }
}

/// One participant→fingerprint edge: who saw what, how severe, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub participant_id: String,
    pub fingerprint: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

/// Inbound submission, prior to validation. `timestamp` is optional on the
/// wire; the pipeline substitutes server "now" when absent (§4.5).
///
/// `severity` is deserialized as a plain string rather than `Severity`
/// directly: an unrecognized value (e.g. `"URGENT"`) must surface as a 400
/// validation error (§7), not the 422 axum's `Json` extractor produces for
/// a field that fails to deserialize into its target enum.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionRequest {
    pub fingerprint: String,
    pub entity_id: String,
    pub severity: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Severity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// A validated submission, ready for `Pipeline::submit`.
#[derive(Debug, Clone)]
pub struct Submission {
    pub participant_id: String,
    pub fingerprint: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

/// Derived, transient: evidence that a fingerprint was co-observed by
/// enough distinct participants within the configured window.
#[derive(Debug, Clone)]
pub struct Correlation {
    pub fingerprint: String,
    pub participant_count: usize,
    pub time_span_seconds: i64,
    pub confidence: Confidence,
    pub observations: Vec<Observation>,
}

/// Derived, transient: the escalator's verdict on a correlation.
#[derive(Debug, Clone)]
pub struct IntentAlert {
    pub alert_id: String,
    pub fingerprint: String,
    pub severity_tier: SeverityTier,
    pub confidence: Confidence,
    pub fraud_score: u8,
    pub participant_count: usize,
    pub time_span_seconds: i64,
    pub rationale: String,
    pub timestamp: DateTime<Utc>,
}

/// Stored record; the unit of state the advisory store owns.
#[derive(Debug, Clone, Serialize)]
pub struct Advisory {
    pub advisory_id: String,
    pub fingerprint: String,
    pub severity: SeverityTier,
    pub fraud_score: u8,
    pub entity_count: usize,
    pub confidence: Confidence,
    pub message: String,
    pub recommended_actions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of per-fingerprint node attributes, as returned by `/patterns/{fingerprint}`.
#[derive(Debug, Clone, Serialize)]
pub struct PatternInfo {
    pub fingerprint: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub observation_count: usize,
    pub recent_participants: Vec<String>,
}

/// Snapshot of per-participant activity, as returned by `/entities/{id}/activity`.
#[derive(Debug, Clone, Serialize)]
pub struct EntityActivity {
    pub entity_id: String,
    pub recent_fingerprints: Vec<String>,
    pub last_submission: Option<DateTime<Utc>>,
}

/// Graph-wide counters, as returned by `/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub unique_patterns: usize,
    pub total_observations: u64,
    pub active_entities: usize,
    pub memory_size_bytes: usize,
    pub temporal_coverage_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(Severity::parse("high"), Some(Severity::High));
        assert_eq!(Severity::parse("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::parse("URGENT"), None);
    }
}
