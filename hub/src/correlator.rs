// hub/src/correlator.rs
//
// Pure function: does the evidence already in the graph say this
// fingerprint is being co-observed by enough distinct participants?
// No I/O, no mutation — the pipeline decides what to do with the answer.

use chrono::Duration;

use crate::config::Config;
use crate::graph::ObservationGraph;
use crate::models::{Confidence, Correlation};

pub fn correlate(graph: &ObservationGraph, fingerprint: &str, config: &Config) -> Option<Correlation> {
    let window = Duration::seconds(config.time_window_seconds);
    let observations = graph.recent_observations(fingerprint, window);

    let mut participants: Vec<&str> = observations.iter().map(|o| o.participant_id.as_str()).collect();
    participants.sort_unstable();
    participants.dedup();
    let participant_count = participants.len();

    if participant_count < config.entity_threshold {
        return None;
    }

    let time_span_seconds = observations
        .first()
        .zip(observations.last())
        .map(|(first, last)| (last.timestamp - first.timestamp).num_seconds())
        .unwrap_or(0);

    let confidence = if participant_count >= config.confidence_high_participants
        && time_span_seconds <= config.confidence_high_span_seconds
    {
        Confidence::High
    } else if participant_count >= config.confidence_medium_participants
        && time_span_seconds <= config.confidence_medium_span_seconds
    {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    Some(Correlation {
        fingerprint: fingerprint.to_string(),
        participant_count,
        time_span_seconds,
        confidence,
        observations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use chrono::Utc;

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
    fn below_threshold_is_no_correlation() {
        let g = ObservationGraph::new();
        g.add_observation("A", "FP1", Severity::High, Utc::now());
        assert!(correlate(&g, "FP1", &cfg()).is_none());
    }

    #[test]
    fn exactly_threshold_correlates_boundary_inclusive() {
        let g = ObservationGraph::new();
        g.add_observation("A", "FP1", Severity::High, Utc::now());
        g.add_observation("B", "FP1", Severity::High, Utc::now());
        let c = correlate(&g, "FP1", &cfg()).expect("should correlate at threshold");
        assert_eq!(c.participant_count, 2);
    }

    #[test]
    fn three_participants_tight_window_is_high_confidence() {
        let g = ObservationGraph::new();
        let now = Utc::now();
        g.add_observation("A", "FP1", Severity::High, now);
        g.add_observation("B", "FP1", Severity::High, now + chrono::Duration::seconds(30));
        g.add_observation("C", "FP1", Severity::High, now + chrono::Duration::seconds(120));
        let c = correlate(&g, "FP1", &cfg()).unwrap();
        assert_eq!(c.confidence, Confidence::High);
    }
}
