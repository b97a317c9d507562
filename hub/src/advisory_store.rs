// hub/src/advisory_store.rs
//
// Bounded, insertion-ordered advisory collection, plus the logic that
// turns an IntentAlert into the Advisory the store actually keeps. Takes
// its own lock, separate from the graph's, acquired only after the graph
// lock is released (§5 — graph, then advisory store, never reversed).

use std::collections::VecDeque;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::models::{Advisory, IntentAlert, SeverityTier};

pub struct AdvisoryStore {
    max_advisories: usize,
    advisories: Mutex<VecDeque<Advisory>>,
}

impl AdvisoryStore {
    pub fn new(max_advisories: usize) -> Self {
        Self { max_advisories, advisories: Mutex::new(VecDeque::new()) }
    }

    pub fn append(&self, advisory: Advisory) {
        let mut store = self.advisories.lock();
        store.push_back(advisory);
        while store.len() > self.max_advisories {
            store.pop_front();
        }
    }

    /// Newest first, optionally filtered by tier.
    pub fn list(&self, limit: usize, severity: Option<SeverityTier>) -> Vec<Advisory> {
        let store = self.advisories.lock();
        store
            .iter()
            .rev()
            .filter(|a| severity.map(|s| a.severity == s).unwrap_or(true))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn list_for_fingerprint(&self, fingerprint: &str) -> Vec<Advisory> {
        let store = self.advisories.lock();
        store.iter().filter(|a| a.fingerprint == fingerprint).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.advisories.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Recommended-action text, fixed so clients can match on it byte-for-byte (§4.4).
fn recommended_actions(tier: SeverityTier) -> Vec<String> {
    let actions: &[&str] = match tier {
        SeverityTier::Critical => &[
            "IMMEDIATE: review all activity matching this pattern",
            "IMMEDIATE: apply protective transaction limits",
            "URGENT: open an internal investigation",
            "URGENT: notify peer participants of this pattern",
            "RECOMMENDED: share this pattern via the advisory feed",
            "RECOMMENDED: update local detection rules",
        ],
        SeverityTier::High => &[
            "URGENT: review activity matching this pattern",
            "URGENT: notify peer participants of this pattern",
            "RECOMMENDED: apply protective transaction limits",
            "RECOMMENDED: share this pattern via the advisory feed",
            "OPTIONAL: update local detection rules",
        ],
        SeverityTier::Medium => &[
            "RECOMMENDED: monitor activity matching this pattern",
            "RECOMMENDED: notify peer participants of this pattern",
            "OPTIONAL: review activity matching this pattern",
            "OPTIONAL: update local detection rules",
        ],
    };
    actions.iter().map(|s| s.to_string()).collect()
}

fn advisory_id(fingerprint: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    let mut h = Sha256::new();
    // Coarse (minute-resolution) timestamp so repeated advisories for the same
    // fingerprint within a minute still get distinguishable but stable ids.
    h.update((now.timestamp() / 60).to_le_bytes());
    h.update(fingerprint.as_bytes());
    hex::encode(&h.finalize()[..8])
}

/// Build the stored Advisory for an alert. Pure aside from reading `Utc::now()`
/// for the id (the alert already carries its own `timestamp`).
pub fn build_advisory(alert: &IntentAlert) -> Advisory {
    let message = format!(
        "{} severity pattern detected: {} participants observed the same fingerprint \
         (confidence {}, fraud score {}).\n{}",
        alert.severity_tier, alert.participant_count, alert.confidence, alert.fraud_score, alert.rationale
    );

    Advisory {
        advisory_id: advisory_id(&alert.fingerprint, alert.timestamp),
        fingerprint: alert.fingerprint.clone(),
        severity: alert.severity_tier,
        fraud_score: alert.fraud_score,
        entity_count: alert.participant_count,
        confidence: alert.confidence,
        message,
        recommended_actions: recommended_actions(alert.severity_tier),
        timestamp: alert.timestamp,
    }
}
