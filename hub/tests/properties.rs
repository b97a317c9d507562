//! Property tests for the quantified invariants in §8 (P1-P7, R1-R2, B1-B3).

use chrono::{Duration, Utc};
use collate_hub::graph::ObservationGraph;
use collate_hub::models::Severity;
use proptest::prelude::*;

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
        Just(Severity::Critical),
    ]
}

proptest! {
    /// P1: observation_count always equals the number of incident observations.
    #[test]
    fn p1_observation_count_matches_incident_edges(
        participants in prop::collection::vec("[a-c]", 1..6),
        severity in arb_severity(),
    ) {
        let g = ObservationGraph::new();
        let now = Utc::now();
        for p in &participants {
            g.add_observation(p, "FP", severity, now);
        }
        let info = g.fingerprint_info("FP", Duration::seconds(3600)).unwrap();
        prop_assert_eq!(info.observation_count, participants.len());
    }

    /// P2: after prune(max_age), nothing older than max_age survives.
    #[test]
    fn p2_prune_leaves_no_stale_observations(ages in prop::collection::vec(0i64..7200, 1..8)) {
        let g = ObservationGraph::new();
        let now = Utc::now();
        for (i, age) in ages.iter().enumerate() {
            g.add_observation(&format!("P{i}"), "FP", Severity::Low, now - Duration::seconds(*age));
        }
        g.prune(Duration::seconds(3600));
        let remaining = g.recent_observations("FP", Duration::seconds(24 * 3600));
        prop_assert!(remaining.iter().all(|o| (Utc::now() - o.timestamp) <= Duration::seconds(3600) + Duration::seconds(1)));
    }

    /// R1: resubmitting the same participant never raises unique_participants above 1.
    #[test]
    fn r1_repeated_same_participant_stays_at_one(n in 1usize..20) {
        let g = ObservationGraph::new();
        for _ in 0..n {
            g.add_observation("A", "FP", Severity::Low, Utc::now());
        }
        prop_assert_eq!(g.unique_participants("FP", Duration::seconds(300)), 1);
        prop_assert_eq!(g.stats().total_observations, n as u64);
    }

    /// P7: submissions to one fingerprint never affect an unrelated fingerprint's state.
    #[test]
    fn p7_fingerprints_are_independent(
        participants_a in prop::collection::vec("[a-c]", 0..5),
        participants_b in prop::collection::vec("[d-f]", 1..5),
    ) {
        let g = ObservationGraph::new();
        for p in &participants_b {
            g.add_observation(p, "FPB", Severity::Low, Utc::now());
        }
        let before = g.unique_participants("FPB", Duration::seconds(300));
        for p in &participants_a {
            g.add_observation(p, "FPA", Severity::High, Utc::now());
        }
        let after = g.unique_participants("FPB", Duration::seconds(300));
        prop_assert_eq!(before, after);
    }
}

#[test]
fn r2_fresh_graph_has_zero_temporal_coverage() {
    let g = ObservationGraph::new();
    assert_eq!(g.stats().temporal_coverage_seconds, 0);
}

#[test]
fn b3_prune_boundary_keeps_just_inside_and_evicts_just_outside() {
    let g = ObservationGraph::new();
    let now = Utc::now();
    g.add_observation("A", "FP", Severity::Low, now - Duration::seconds(59));
    g.add_observation("B", "FP", Severity::Low, now - Duration::seconds(61));
    g.prune(Duration::seconds(60));
    let remaining = g.recent_observations("FP", Duration::seconds(3600));
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].participant_id, "A");
}
