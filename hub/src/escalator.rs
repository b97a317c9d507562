// hub/src/escalator.rs
//
// Pure function: turn a Correlation plus the triggering submission's
// severity into an optional alert. Tier thresholds and the fraud-score
// weighting mirror the composite-score/tier-threshold shape of the
// signal-fusion engine this module replaces, collapsed from a weighted
// multi-signal sum down to the single participant-count signal this
// system actually has.

use crate::config::Config;
use crate::models::{Confidence, Correlation, IntentAlert, Severity, SeverityTier};

pub fn escalate(correlation: &Correlation, severity: Severity, config: &Config) -> Option<IntentAlert> {
    let k = correlation.participant_count;

    let tier = if k >= config.critical_threshold {
        SeverityTier::Critical
    } else if k >= config.high_threshold {
        SeverityTier::High
    } else if k >= config.medium_threshold {
        SeverityTier::Medium
    } else {
        return None;
    };

    let fraud_score = fraud_score(correlation, severity);
    let rationale = format!(
        "Pattern observed by {} distinct participants within {} seconds (confidence {})",
        correlation.participant_count, correlation.time_span_seconds, correlation.confidence
    );

    Some(IntentAlert {
        alert_id: alert_id(&correlation.fingerprint),
        fingerprint: correlation.fingerprint.clone(),
        severity_tier: tier,
        confidence: correlation.confidence,
        fraud_score,
        participant_count: correlation.participant_count,
        time_span_seconds: correlation.time_span_seconds,
        rationale,
        timestamp: chrono::Utc::now(),
    })
}

fn fraud_score(correlation: &Correlation, severity: Severity) -> u8 {
    let base = (20 * correlation.participant_count).min(80) as i32;

    let confidence_bonus = match correlation.confidence {
        Confidence::High => 10,
        Confidence::Medium => 5,
        Confidence::Low => 0,
    };

    let recency_penalty = if correlation.time_span_seconds > 600 { -10 } else { 0 };

    let severity_adjustment = match severity {
        Severity::Low => -5,
        Severity::Medium => 0,
        Severity::High => 5,
        Severity::Critical => 10,
    };

    (base + confidence_bonus + recency_penalty + severity_adjustment).clamp(0, 100) as u8
}

fn alert_id(fingerprint: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut h = Sha256::new();
    h.update(fingerprint.as_bytes());
    h.update(chrono::Utc::now().timestamp_millis().to_le_bytes());
    hex::encode(&h.finalize()[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;

    fn cfg() -> Config {
        Config {
            host: "0.0.0.0".into(),
            port: 8000,
            api_key: "x".into(),
            entity_threshold: 2,
            time_window_seconds: 300,
            critical_threshold: 4,
            high_threshold: 3,
            medium_threshold: 2,
            confidence_high_participants: 3,
            confidence_high_span_seconds: 180,
            confidence_medium_participants: 2,
            confidence_medium_span_seconds: 300,
            max_graph_age_seconds: 3600,
            prune_interval_seconds: 300,
            max_advisories: 1000,
            max_clock_skew_seconds: 60,
        }
    }

    fn correlation(participant_count: usize, span: i64, confidence: Confidence) -> Correlation {
        Correlation {
            fingerprint: "FP1".into(),
            participant_count,
            time_span_seconds: span,
            confidence,
            observations: Vec::new(),
        }
    }

    #[test]
    fn below_medium_threshold_never_alerts() {
        let c = correlation(1, 10, Confidence::Low);
        assert!(escalate(&c, Severity::High, &cfg()).is_none());
    }

    #[test]
    fn crosses_critical_threshold() {
        let c = correlation(4, 10, Confidence::High);
        let alert = escalate(&c, Severity::High, &cfg()).unwrap();
        assert_eq!(alert.severity_tier, SeverityTier::Critical);
    }

    #[test]
    fn fraud_score_is_bounded_and_monotone_in_participant_count() {
        let low = correlation(2, 10, Confidence::Low);
        let high = correlation(4, 10, Confidence::Low);
        let low_score = fraud_score(&low, Severity::Medium);
        let high_score = fraud_score(&high, Severity::Medium);
        assert!(low_score <= 100 && high_score <= 100);
        assert!(high_score >= low_score);
    }
}
