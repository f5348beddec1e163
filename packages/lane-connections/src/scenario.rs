//! Scenario files: a road network plus an ordered list of operations.
//!
//! Used by the `lane-graph` binary to replay tool sessions and by the
//! integration tests. Format (JSON):
//!
//! ```json
//! {
//!   "config": { "verify_after_mutation": true },
//!   "segments": [
//!     { "id": 1, "start_node": 5, "end_node": 6, "lanes": [{ "id": 100, "groups": "all" }] }
//!   ],
//!   "operations": [
//!     { "op": "connect", "source": 100, "target": 200, "node": 5, "group": "track" }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{LaneId, NodeId, SegmentId};
use crate::manager::{LaneConnectionManager, ManagerConfig};
use crate::network::RoadNetwork;
use crate::transition::TransitionGroup;

fn all_groups() -> TransitionGroup {
    TransitionGroup::ALL
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSpec {
    pub id: LaneId,
    #[serde(default = "all_groups")]
    pub groups: TransitionGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub id: SegmentId,
    pub start_node: NodeId,
    pub end_node: NodeId,
    #[serde(default)]
    pub lanes: Vec<LaneSpec>,
}

/// One step of a scenario. Mirrors the manager's public operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Connect {
        source: LaneId,
        target: LaneId,
        node: NodeId,
        #[serde(default = "all_groups")]
        group: TransitionGroup,
    },
    Disconnect {
        source: LaneId,
        target: LaneId,
        node: NodeId,
        #[serde(default = "all_groups")]
        group: TransitionGroup,
    },
    Query {
        source: LaneId,
        target: LaneId,
        node: NodeId,
        #[serde(default = "all_groups")]
        group: TransitionGroup,
    },
    RemoveLane {
        lane: LaneId,
    },
    RemoveLaneEnd {
        lane: LaneId,
        start_node: bool,
    },
    ReleaseLane {
        lane: LaneId,
    },
    ReleaseSegment {
        segment: SegmentId,
    },
}

/// What applying an operation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Mutation that only reports success.
    Applied,
    /// Connect/disconnect: whether anything changed.
    Changed { changed: bool },
    /// Query answer.
    Connected { connected: bool },
    /// Bulk removal: number of connection pairs removed.
    Removed { count: usize },
    Failed { code: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub index: usize,
    pub operation: Operation,
    pub outcome: Outcome,
}

impl Operation {
    pub fn apply(&self, manager: &mut LaneConnectionManager) -> Result<Outcome> {
        Ok(match *self {
            Operation::Connect { source, target, node, group } => Outcome::Changed {
                changed: manager.add_lane_connection(source, target, node, group)?,
            },
            Operation::Disconnect { source, target, node, group } => Outcome::Changed {
                changed: manager.remove_lane_connection(source, target, node, group)?,
            },
            Operation::Query { source, target, node, group } => Outcome::Connected {
                connected: manager.is_connected_to(source, target, node, group),
            },
            Operation::RemoveLane { lane } => Outcome::Removed {
                count: manager.remove_lane_connections(lane)?,
            },
            Operation::RemoveLaneEnd { lane, start_node } => Outcome::Removed {
                count: manager.remove_lane_end_connections(lane, start_node)?,
            },
            Operation::ReleaseLane { lane } => {
                manager.release_lane(lane)?;
                Outcome::Applied
            }
            Operation::ReleaseSegment { segment } => {
                manager.release_segment(segment)?;
                Outcome::Applied
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: ManagerConfig,
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn build_network(&self) -> Result<RoadNetwork> {
        let mut network = RoadNetwork::new();
        for seg in &self.segments {
            network.add_segment(seg.id, seg.start_node, seg.end_node)?;
            for lane in &seg.lanes {
                network.add_lane(lane.id, seg.id, lane.groups)?;
            }
        }
        Ok(network)
    }

    pub fn build_manager(&self) -> Result<LaneConnectionManager> {
        Ok(LaneConnectionManager::with_config(self.build_network()?, self.config))
    }

    /// Apply every operation in order. A failing operation is reported in
    /// its outcome and does not stop the run.
    pub fn run(&self, manager: &mut LaneConnectionManager) -> Vec<OperationOutcome> {
        self.operations
            .iter()
            .enumerate()
            .map(|(index, operation)| {
                let outcome = operation.apply(manager).unwrap_or_else(|e| Outcome::Failed {
                    code: e.code().to_string(),
                    message: e.to_string(),
                });
                OperationOutcome {
                    index,
                    operation: operation.clone(),
                    outcome,
                }
            })
            .collect()
    }
}
