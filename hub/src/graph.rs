// hub/src/graph.rs
//
// Bipartite participant↔fingerprint graph, held behind a single
// readers-writer lock (§5). petgraph::StableGraph is the arena; NodeIndex
// is the integer handle the design notes call for. Stable indices survive
// `prune`'s removals, which is the whole reason this crate finally has a
// use for the `petgraph` dependency.
//
// Each edge is exactly one Observation. Same (participant, fingerprint)
// pair submitted twice yields two parallel edges — observations are a
// multiset (R1), not a set.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Undirected;

use crate::models::{GraphStats, Observation, PatternInfo, Severity};

#[derive(Debug, Clone)]
enum NodeKind {
    Participant {
        id: String,
    },
    Fingerprint {
        id: String,
        first_seen: DateTime<Utc>,
        last_seen: DateTime<Utc>,
    },
}

struct GraphInner {
    graph: StableGraph<NodeKind, Observation, Undirected>,
    participants: HashMap<String, NodeIndex>,
    fingerprints: HashMap<String, NodeIndex>,
}

impl GraphInner {
    fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            participants: HashMap::new(),
            fingerprints: HashMap::new(),
        }
    }

    fn participant_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.participants.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(NodeKind::Participant { id: id.to_string() });
        self.participants.insert(id.to_string(), idx);
        idx
    }

    fn fingerprint_node(&mut self, fp: &str, now: DateTime<Utc>) -> NodeIndex {
        if let Some(&idx) = self.fingerprints.get(fp) {
            if let Some(NodeKind::Fingerprint { last_seen, .. }) = self.graph.node_weight_mut(idx) {
                if now > *last_seen {
                    *last_seen = now;
                }
            }
            return idx;
        }
        let idx = self.graph.add_node(NodeKind::Fingerprint {
            id: fp.to_string(),
            first_seen: now,
            last_seen: now,
        });
        self.fingerprints.insert(fp.to_string(), idx);
        idx
    }
}

pub struct ObservationGraph {
    inner: RwLock<GraphInner>,
}

impl ObservationGraph {
    pub fn new() -> Self {
        Self { inner: RwLock::new(GraphInner::new()) }
    }

    /// Record one observation. Lazily creates both endpoint nodes.
    pub fn add_observation(
        &self,
        participant_id: &str,
        fingerprint: &str,
        severity: Severity,
        timestamp: DateTime<Utc>,
    ) {
        let mut inner = self.inner.write();
        let p = inner.participant_node(participant_id);
        let f = inner.fingerprint_node(fingerprint, timestamp);
        inner.graph.add_edge(
            p,
            f,
            Observation {
                participant_id: participant_id.to_string(),
                fingerprint: fingerprint.to_string(),
                severity,
                timestamp,
            },
        );
    }

    /// Observations incident to `fingerprint` with `timestamp >= now - window`,
    /// in chronological order. Walks only the fingerprint's own edges.
    pub fn recent_observations(&self, fingerprint: &str, window: Duration) -> Vec<Observation> {
        let inner = self.inner.read();
        let Some(&idx) = inner.fingerprints.get(fingerprint) else {
            return Vec::new();
        };
        let cutoff = Utc::now() - window;
        let mut obs: Vec<Observation> = inner
            .graph
            .edges(idx)
            .map(|e| e.weight().clone())
            .filter(|o| o.timestamp >= cutoff)
            .collect();
        obs.sort_by_key(|o| o.timestamp);
        obs
    }

    /// Distinct participant_ids among `recent_observations(fingerprint, window)`.
    pub fn unique_participants(&self, fingerprint: &str, window: Duration) -> usize {
        let obs = self.recent_observations(fingerprint, window);
        let mut seen: Vec<&str> = obs.iter().map(|o| o.participant_id.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Participant ids with at least one observation in the last `window`.
    pub fn active_participants(&self, window: Duration) -> Vec<String> {
        let inner = self.inner.read();
        let cutoff = Utc::now() - window;
        inner
            .participants
            .iter()
            .filter(|(_, &idx)| inner.graph.edges(idx).any(|e| e.weight().timestamp >= cutoff))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Evict observations older than `max_age`, then any node left with zero
    /// incident edges. Exactly-`max_age`-old observations are retained (B3).
    pub fn prune(&self, max_age: Duration) -> usize {
        let mut inner = self.inner.write();
        let cutoff = Utc::now() - max_age;

        let stale: Vec<_> = inner
            .graph
            .edge_indices()
            .filter(|&e| inner.graph.edge_weight(e).map(|o| o.timestamp < cutoff).unwrap_or(false))
            .collect();
        let removed_edges = stale.len();
        for e in stale {
            inner.graph.remove_edge(e);
        }

        let orphan_fps: Vec<String> = inner
            .fingerprints
            .iter()
            .filter(|(_, &idx)| inner.graph.edges(idx).count() == 0)
            .map(|(fp, _)| fp.clone())
            .collect();
        for fp in orphan_fps {
            if let Some(idx) = inner.fingerprints.remove(&fp) {
                inner.graph.remove_node(idx);
            }
        }

        let orphan_participants: Vec<String> = inner
            .participants
            .iter()
            .filter(|(_, &idx)| inner.graph.edges(idx).count() == 0)
            .map(|(id, _)| id.clone())
            .collect();
        for id in orphan_participants {
            if let Some(idx) = inner.participants.remove(&id) {
                inner.graph.remove_node(idx);
            }
        }

        removed_edges
    }

    pub fn stats(&self) -> GraphStats {
        let inner = self.inner.read();
        let earliest = inner
            .graph
            .edge_weights()
            .map(|o| o.timestamp)
            .min();
        let coverage = earliest.map(|t| (Utc::now() - t).num_seconds()).unwrap_or(0);

        GraphStats {
            unique_patterns: inner.fingerprints.len(),
            total_observations: inner.graph.edge_count() as u64,
            active_entities: inner.participants.len(),
            memory_size_bytes: inner.graph.node_count() * 96 + inner.graph.edge_count() * 80,
            temporal_coverage_seconds: coverage,
        }
    }

    pub fn fingerprint_info(&self, fingerprint: &str, recent_window: Duration) -> Option<PatternInfo> {
        let inner = self.inner.read();
        let &idx = inner.fingerprints.get(fingerprint)?;
        let Some(NodeKind::Fingerprint { first_seen, last_seen, .. }) = inner.graph.node_weight(idx) else {
            return None;
        };
        let cutoff = Utc::now() - recent_window;
        let mut recent: Vec<&str> = inner
            .graph
            .edges(idx)
            .filter(|e| e.weight().timestamp >= cutoff)
            .map(|e| e.weight().participant_id.as_str())
            .collect();
        recent.sort_unstable();
        recent.dedup();

        Some(PatternInfo {
            fingerprint: fingerprint.to_string(),
            first_seen: *first_seen,
            last_seen: *last_seen,
            observation_count: inner.graph.edges(idx).count(),
            recent_participants: recent.into_iter().map(String::from).collect(),
        })
    }

    /// `recent_window` bounds `recent_fingerprints`; `last_submission` is the
    /// participant's most recent submission overall, independent of the window.
    pub fn participant_fingerprints(
        &self,
        participant_id: &str,
        recent_window: Duration,
    ) -> Option<(Vec<String>, Option<DateTime<Utc>>)> {
        let inner = self.inner.read();
        let &idx = inner.participants.get(participant_id)?;
        let mut fps: Vec<(String, DateTime<Utc>)> = inner
            .graph
            .edges(idx)
            .map(|e| (e.weight().fingerprint.clone(), e.weight().timestamp))
            .collect();
        fps.sort_by_key(|(_, ts)| std::cmp::Reverse(*ts));
        let last = fps.first().map(|(_, ts)| *ts);

        let cutoff = Utc::now() - recent_window;
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for (fp, ts) in &fps {
            if *ts >= cutoff && seen.insert(fp.clone()) {
                names.push(fp.clone());
            }
        }
        Some((names, last))
    }
}

impl Default for ObservationGraph {
    fn default() -> Self {
        Self::new()
    }
}
