//! Troubleshooting helpers: dump, invariant check, stats.
//!
//! None of this is needed for correct operation. The dump format is for
//! humans and carries no stability guarantee.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ConnectionError, Result};
use crate::ids::LaneId;
use super::connection_graph::ConnectionGraph;
use super::lane_end::LaneEnd;
use super::LaneTopology;

/// Size summary of a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Lane ends with at least one record.
    pub lane_ends: usize,
    /// All records, hints included.
    pub edges: usize,
    /// Records with an empty mask.
    pub hint_edges: usize,
}

impl ConnectionGraph {
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            lane_ends: self.lane_ends.len(),
            ..GraphStats::default()
        };
        for collection in self.lane_ends.values() {
            stats.edges += collection.len();
            stats.hint_edges += collection.iter().filter(|edge| edge.is_empty()).count();
        }
        stats
    }

    /// Describe every lane end present, its records and cached masks, with a
    /// live validity check against `topology`. Lines are also logged at info.
    pub fn dump(&self, topology: &dyn LaneTopology) -> Vec<String> {
        let lanes: BTreeSet<LaneId> = self.lane_ends.keys().map(|key| key.lane).collect();
        let mut lines = Vec::new();

        for lane in lanes {
            let valid = topology.is_lane_valid(lane);
            if !valid {
                warn!(%lane, "connection graph references an invalid lane");
            }
            lines.push(format!("{}: valid? {}", lane, valid));

            for start_node in [false, true] {
                let key = LaneEnd::new(lane, start_node);
                let Some(collection) = self.lane_ends.get(&key) else {
                    continue;
                };
                let node = topology
                    .node_id(lane, start_node)
                    .map_or_else(|| "node ?".to_string(), |node| node.to_string());
                lines.push(format!(
                    "\tstart_node: {} ({}): outgoing={} incoming={}",
                    start_node,
                    node,
                    collection.outgoing_cached(),
                    collection.incoming_cached(),
                ));
                for (i, edge) in collection.iter().enumerate() {
                    lines.push(format!(
                        "\t\tEntry {}: {} (valid? {})",
                        i,
                        edge,
                        topology.is_lane_valid(edge.target_lane()),
                    ));
                }
            }
        }

        for line in &lines {
            info!("{}", line);
        }
        lines
    }

    /// Verify the structural invariants, reporting every violation found.
    pub fn check_invariants(&self) -> Result<()> {
        let mut violations = Vec::new();

        for (key, collection) in &self.lane_ends {
            if collection.is_empty() {
                violations.push(format!("{} has an empty collection", key));
                continue;
            }

            let mut seen = BTreeSet::new();
            for edge in collection {
                if !seen.insert(edge.target_lane()) {
                    violations.push(format!("{} holds duplicate records for {}", key, edge.target_lane()));
                }
                if edge.target_lane() == key.lane {
                    violations.push(format!("{} points at its own lane", key));
                }

                match self
                    .lane_ends
                    .get(&edge.target)
                    .and_then(|neighbour| neighbour.edge(key.lane))
                {
                    None => violations.push(format!("{} {} has no mirrored record", key, edge)),
                    Some(mirror) => {
                        if mirror.target != *key {
                            violations.push(format!(
                                "{} mirror of {} points at {} instead",
                                edge.target, key, mirror.target
                            ));
                        }
                        if edge.is_empty() && mirror.is_empty() {
                            violations.push(format!("{} and {} keep an empty pair", key, edge.target));
                        }
                    }
                }
            }

            if let Some((outgoing, incoming)) = self.computed_cache(*key) {
                if collection.outgoing_cached() != outgoing || collection.incoming_cached() != incoming {
                    violations.push(format!(
                        "{} cache out={} in={} expected out={} in={}",
                        key,
                        collection.outgoing_cached(),
                        collection.incoming_cached(),
                        outgoing,
                        incoming,
                    ));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            for violation in &violations {
                warn!("{}", violation);
            }
            Err(ConnectionError::InvariantViolation(violations.join("; ")))
        }
    }
}
