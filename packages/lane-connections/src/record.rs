//! Snapshot of one lane end's connections for undo and copy-paste.
//!
//! A record stores the targets and categories granted from a lane end. It
//! can be replayed onto the same lane (`restore`) or onto copies of the
//! lanes (`transfer`). Records encode to MessagePack.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConnectionError, Result};
use crate::graph::LaneTopology;
use crate::ids::{LaneId, NodeId};
use crate::manager::LaneConnectionManager;
use crate::network::RoadNetwork;
use crate::transition::TransitionGroup;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConnectionRecord {
    pub lane_id: LaneId,
    pub start_node: bool,
    #[serde(default)]
    connections: Vec<LaneId>,
    /// Parallel to `connections`. Records written without groups replay
    /// every missing entry as `ALL`.
    #[serde(default)]
    groups: Vec<TransitionGroup>,
}

impl LaneConnectionRecord {
    pub fn new(lane_id: LaneId, start_node: bool) -> Self {
        Self {
            lane_id,
            start_node,
            connections: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// New record already filled from `manager`.
    pub fn capture(manager: &LaneConnectionManager, lane_id: LaneId, start_node: bool) -> Self {
        let mut record = Self::new(lane_id, start_node);
        record.record(manager);
        record
    }

    /// One empty record per lane end touching `node`.
    pub fn lanes_at_node(network: &RoadNetwork, node: NodeId) -> Vec<Self> {
        network
            .lanes_at_node(node)
            .into_iter()
            .map(|(lane, start_node)| Self::new(lane, start_node))
            .collect()
    }

    /// Recorded `(target, group)` pairs with missing groups filled in.
    pub fn connections(&self) -> Vec<(LaneId, TransitionGroup)> {
        self.connections
            .iter()
            .enumerate()
            .map(|(i, target)| (*target, self.group_at(i)))
            .collect()
    }

    /// Overwrite the stored connections with the current state.
    pub fn record(&mut self, manager: &LaneConnectionManager) {
        let (connections, groups): (Vec<_>, Vec<_>) = manager
            .get_lane_connections(self.lane_id, self.start_node)
            .into_iter()
            .unzip();
        self.connections = connections;
        self.groups = groups;
    }

    /// Reset what the lane end grants to the recorded connections.
    /// Connections granted toward it by other lanes are left alone, so the
    /// records of one junction can be restored in any order.
    ///
    /// Targets that no longer resolve at the lane end's node are skipped
    /// with a warning; any other failure stops the replay.
    /// Returns how many connections were replayed.
    pub fn restore(&self, manager: &mut LaneConnectionManager) -> Result<usize> {
        self.replay(manager, self.lane_id, Some)
    }

    /// Replay the record onto mapped lanes (copy-paste, move).
    ///
    /// Nothing happens if the record's own lane is not in `map`; targets
    /// missing from `map` are skipped, which is expected when only part of a
    /// junction was copied.
    pub fn transfer(&self, manager: &mut LaneConnectionManager, map: &HashMap<LaneId, LaneId>) -> Result<usize> {
        let Some(&mapped) = map.get(&self.lane_id) else {
            debug!(lane = %self.lane_id, "lane not mapped, record not transferred");
            return Ok(0);
        };
        self.replay(manager, mapped, |target| {
            let mapped_target = map.get(&target).copied();
            if mapped_target.is_none() {
                debug!(lane = %target, "target lane not mapped, connection skipped");
            }
            mapped_target
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    fn group_at(&self, i: usize) -> TransitionGroup {
        self.groups.get(i).copied().unwrap_or(TransitionGroup::ALL)
    }

    fn replay(
        &self,
        manager: &mut LaneConnectionManager,
        lane: LaneId,
        mut map_target: impl FnMut(LaneId) -> Option<LaneId>,
    ) -> Result<usize> {
        if !manager.network().is_lane_valid(lane) {
            return Err(ConnectionError::UnknownLane(lane));
        }
        manager.clear_lane_end_outgoing(lane, self.start_node)?;

        let mut replayed = 0;
        for (target, group) in self.connections() {
            let Some(target) = map_target(target) else {
                continue;
            };
            match manager.add_lane_connection_at(lane, target, self.start_node, group) {
                Ok(true) => replayed += 1,
                Ok(false) => {}
                Err(
                    e @ (ConnectionError::UnknownLane(_)
                    | ConnectionError::NodeNotOnLane { .. }
                    | ConnectionError::SelfConnection(_)),
                ) => warn!(%lane, %target, error = %e, "recorded connection not replayed"),
                Err(e) => return Err(e),
            }
        }
        Ok(replayed)
    }
}
