// hub/src/pipeline.rs
//
// Single entry point for submissions (§4.5). Ties graph → correlator →
// escalator → advisory store together. The graph's write lock is held only
// for the add_observation call and released before correlate() takes its
// own read lock, so the sequence is not one atomic section — what actually
// prevents an interleaving submission for the same fingerprint from
// double-firing the same tier is `last_advised` below, which is read and
// updated under its own mutex around the decision to append an advisory.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::Mutex;

use crate::advisory_store::{build_advisory, AdvisoryStore};
use crate::config::Config;
use crate::correlator::correlate;
use crate::escalator::escalate;
use crate::graph::ObservationGraph;
use crate::models::{Severity, SeverityTier, Submission};

pub struct SubmissionAck {
    pub fingerprint: String,
    pub participant_id: String,
    pub correlation_detected: bool,
}

pub struct Pipeline {
    pub graph: Arc<ObservationGraph>,
    pub advisories: Arc<AdvisoryStore>,
    config: Config,
    // Highest severity tier already advised for a fingerprint (§4.4's
    // "fires at most once per rising tier" rule). Cleared when a
    // fingerprint is fully pruned from the graph.
    last_advised: Mutex<HashMap<String, SeverityTier>>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("fingerprint must not be empty")]
    EmptyFingerprint,
    #[error("entity_id must not be empty")]
    EmptyEntityId,
    #[error("timestamp is too far in the future")]
    TimestampTooFarAhead,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            graph: Arc::new(ObservationGraph::new()),
            advisories: Arc::new(AdvisoryStore::new(config.max_advisories)),
            config,
            last_advised: Mutex::new(HashMap::new()),
        }
    }

    pub fn submit(
        &self,
        participant_id: String,
        fingerprint: String,
        severity: Severity,
        timestamp: Option<chrono::DateTime<Utc>>,
    ) -> Result<SubmissionAck, SubmitError> {
        if fingerprint.trim().is_empty() {
            return Err(SubmitError::EmptyFingerprint);
        }
        if participant_id.trim().is_empty() {
            return Err(SubmitError::EmptyEntityId);
        }

        let now = Utc::now();
        let timestamp = timestamp.unwrap_or(now);
        if timestamp > now + Duration::seconds(self.config.max_clock_skew_seconds) {
            return Err(SubmitError::TimestampTooFarAhead);
        }

        let submission = Submission { participant_id, fingerprint, severity, timestamp };

        self.graph.add_observation(
            &submission.participant_id,
            &submission.fingerprint,
            submission.severity,
            submission.timestamp,
        );

        let correlation = correlate(&self.graph, &submission.fingerprint, &self.config);
        let correlation_detected = correlation.is_some();

        if let Some(correlation) = correlation {
            if let Some(alert) = escalate(&correlation, submission.severity, &self.config) {
                let mut last_advised = self.last_advised.lock();
                let should_advise = match last_advised.get(&submission.fingerprint) {
                    Some(&previous) => alert.severity_tier > previous,
                    None => true,
                };
                if should_advise {
                    last_advised.insert(submission.fingerprint.clone(), alert.severity_tier);
                    drop(last_advised);
                    self.advisories.append(build_advisory(&alert));
                }
            }
        }

        Ok(SubmissionAck {
            fingerprint: submission.fingerprint,
            participant_id: submission.participant_id,
            correlation_detected,
        })
    }

    /// Run one pruning sweep and forget advisory dedup state for any
    /// fingerprint the sweep fully evicted, so it can advise again from
    /// scratch if it resurfaces (§4.4).
    pub fn prune(&self) {
        self.graph.prune(Duration::seconds(self.config.max_graph_age_seconds));
        let mut last_advised = self.last_advised.lock();
        last_advised.retain(|fp, _| {
            self.graph
                .fingerprint_info(fp, Duration::seconds(self.config.time_window_seconds))
                .is_some()
        });
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn single_submission_has_no_correlation() {
        let p = Pipeline::new(cfg());
        let ack = p.submit("A".into(), "FP1".into(), Severity::High, None).unwrap();
        assert!(!ack.correlation_detected);
        assert!(p.advisories.is_empty());
    }

    #[test]
    fn two_participants_trigger_medium_advisory() {
        let p = Pipeline::new(cfg());
        p.submit("A".into(), "FP2".into(), Severity::High, None).unwrap();
        let ack = p.submit("B".into(), "FP2".into(), Severity::High, None).unwrap();
        assert!(ack.correlation_detected);
        assert_eq!(p.advisories.len(), 1);
        assert_eq!(p.advisories.list(1, None)[0].severity, SeverityTier::Medium);
    }

    #[test]
    fn rejects_empty_fingerprint() {
        let p = Pipeline::new(cfg());
        assert!(p.submit("A".into(), "".into(), Severity::Low, None).is_err());
    }

    #[test]
    fn rejects_timestamp_far_in_future() {
        let p = Pipeline::new(cfg());
        let future = Utc::now() + Duration::seconds(600);
        assert!(p.submit("A".into(), "FP1".into(), Severity::Low, Some(future)).is_err());
    }

    #[test]
    fn same_tier_reescalation_does_not_duplicate_advisory() {
        let p = Pipeline::new(cfg());
        p.submit("A".into(), "FP3".into(), Severity::High, None).unwrap();
        p.submit("B".into(), "FP3".into(), Severity::High, None).unwrap();
        assert_eq!(p.advisories.len(), 1);
        // a third participant pushes the tier from MEDIUM to HIGH — new advisory
        p.submit("C".into(), "FP3".into(), Severity::High, None).unwrap();
        assert_eq!(p.advisories.len(), 2);
        // a fourth at the same HIGH-crossing tier still escalates again once CRITICAL is reached
        p.submit("D".into(), "FP3".into(), Severity::High, None).unwrap();
        assert_eq!(p.advisories.len(), 3);
    }
}
