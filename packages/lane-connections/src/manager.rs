//! LaneConnectionManager - owner of one road network and its lane connections
//!
//! The manager is the explicit handle callers (tools, snapshot restore,
//! debug commands) use instead of a global instance. It validates requests
//! against the network before touching the graph and is the only path
//! through which lanes leave the network, so connections of a released lane
//! never outlive it.
//!
//! Not `Sync`-aware on its own: hosts that share it across threads wrap it in
//! a `RwLock`.

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConnectionError, Result};
use crate::graph::{ConnectionGraph, GraphStats, LaneEnd, LaneTopology};
use crate::ids::{LaneId, NodeId, SegmentId};
use crate::network::{Lane, RoadNetwork};
use crate::transition::TransitionGroup;

/// Manager behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Run the full invariant check after every mutating call.
    pub verify_after_mutation: bool,
    /// Mask requested categories by what both lanes support.
    pub restrict_to_supported_groups: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            verify_after_mutation: false,
            restrict_to_supported_groups: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LaneConnectionManager {
    config: ManagerConfig,
    network: RoadNetwork,
    graph: ConnectionGraph,
}

impl LaneConnectionManager {
    pub fn new(network: RoadNetwork) -> Self {
        Self::with_config(network, ManagerConfig::default())
    }

    pub fn with_config(network: RoadNetwork, config: ManagerConfig) -> Self {
        Self {
            config,
            network,
            graph: ConnectionGraph::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ManagerConfig) {
        self.config = config;
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Mutable access for adding segments and lanes. Removal goes through
    /// [`release_lane`](Self::release_lane) / [`release_segment`](Self::release_segment).
    pub fn network_mut(&mut self) -> &mut RoadNetwork {
        &mut self.network
    }

    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    #[cfg(test)]
    pub(crate) fn graph_mut(&mut self) -> &mut ConnectionGraph {
        &mut self.graph
    }

    // -- Queries --------------------------------------------------------------

    pub fn is_connected_to(&self, source: LaneId, target: LaneId, node: NodeId, group: TransitionGroup) -> bool {
        self.graph.is_connected_to(&self.network, source, target, node, group)
    }

    /// Connections granted from the given lane end, hint-only records omitted.
    pub fn get_lane_connections(&self, lane: LaneId, start_node: bool) -> Vec<(LaneId, TransitionGroup)> {
        self.graph
            .connections(LaneEnd::new(lane, start_node))
            .into_iter()
            .filter(|(_, group)| !group.is_empty())
            .collect()
    }

    pub fn has_outgoing_connections(&self, lane: LaneId, start_node: bool, group: TransitionGroup) -> bool {
        self.graph.has_outgoing(LaneEnd::new(lane, start_node), group)
    }

    pub fn has_incoming_connections(&self, lane: LaneId, start_node: bool, group: TransitionGroup) -> bool {
        self.graph.has_incoming(LaneEnd::new(lane, start_node), group)
    }

    pub fn has_connections(&self, lane: LaneId, start_node: bool, group: TransitionGroup) -> bool {
        self.graph.has_connections(LaneEnd::new(lane, start_node), group)
    }

    // -- Mutation -------------------------------------------------------------

    /// Allow `source` to transition onto `target` at `node` for `group`.
    ///
    /// Returns `Ok(false)` when nothing could be granted because the lanes
    /// share none of the requested categories.
    pub fn add_lane_connection(
        &mut self,
        source: LaneId,
        target: LaneId,
        node: NodeId,
        group: TransitionGroup,
    ) -> Result<bool> {
        let (source_end, target_end, group) = self.resolve(source, target, node, group)?;
        if group.is_empty() {
            debug!(%source, %target, %node, "no common transition group, connection skipped");
            return Ok(false);
        }
        self.graph.connect_ends(source_end, target_end, group)?;
        self.verify()?;
        Ok(true)
    }

    /// [`add_lane_connection`](Self::add_lane_connection) with the node given
    /// as the source lane's end.
    pub fn add_lane_connection_at(
        &mut self,
        source: LaneId,
        target: LaneId,
        start_node: bool,
        group: TransitionGroup,
    ) -> Result<bool> {
        let node = self
            .network
            .node_id(source, start_node)
            .ok_or(ConnectionError::UnknownLane(source))?;
        self.add_lane_connection(source, target, node, group)
    }

    /// Withdraw `group` from `source -> target` at `node`. Returns whether a
    /// connection granting all of it existed.
    pub fn remove_lane_connection(
        &mut self,
        source: LaneId,
        target: LaneId,
        node: NodeId,
        group: TransitionGroup,
    ) -> Result<bool> {
        let (source_end, _, group) = self.resolve(source, target, node, group)?;
        let removed = self.graph.disconnect_at(source_end, target, group);
        self.verify()?;
        Ok(removed)
    }

    /// Remove all connections of one lane end.
    pub fn remove_lane_end_connections(&mut self, lane: LaneId, start_node: bool) -> Result<usize> {
        let removed = self.graph.remove_connections(LaneEnd::new(lane, start_node));
        self.verify()?;
        Ok(removed)
    }

    /// Withdraw everything one lane end grants outward. Connections other
    /// lanes grant toward it are kept.
    pub fn clear_lane_end_outgoing(&mut self, lane: LaneId, start_node: bool) -> Result<usize> {
        let cleared = self.graph.clear_outgoing(LaneEnd::new(lane, start_node));
        self.verify()?;
        Ok(cleared)
    }

    /// Remove all connections of both ends of `lane`.
    pub fn remove_lane_connections(&mut self, lane: LaneId) -> Result<usize> {
        let removed = self.graph.remove_lane_connections(lane);
        self.verify()?;
        Ok(removed)
    }

    // -- Lifecycle ------------------------------------------------------------

    /// Drop `lane` from the network after removing its connections.
    pub fn release_lane(&mut self, lane: LaneId) -> Result<Lane> {
        if !self.network.is_lane_valid(lane) {
            return Err(ConnectionError::UnknownLane(lane));
        }
        let removed = self.graph.remove_lane_connections(lane);
        debug!(%lane, removed, "lane released");
        let released = self.network.release_lane(lane)?;
        self.verify()?;
        Ok(released)
    }

    /// Drop `segment` and all its lanes after removing their connections.
    pub fn release_segment(&mut self, segment: SegmentId) -> Result<()> {
        let lanes = self
            .network
            .segment(segment)
            .ok_or(ConnectionError::UnknownSegment(segment))?
            .lanes()
            .to_vec();
        for lane in lanes {
            self.graph.remove_lane_connections(lane);
        }
        self.network.release_segment(segment)?;
        debug!(%segment, "segment released");
        self.verify()
    }

    // -- Diagnostics ----------------------------------------------------------

    pub fn dump(&self) -> Vec<String> {
        self.graph.dump(&self.network)
    }

    pub fn check(&self) -> Result<()> {
        self.graph.check_invariants()
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    // -- Internals ------------------------------------------------------------

    fn resolve(
        &self,
        source: LaneId,
        target: LaneId,
        node: NodeId,
        group: TransitionGroup,
    ) -> Result<(LaneEnd, LaneEnd, TransitionGroup)> {
        if source == target {
            return Err(ConnectionError::SelfConnection(source));
        }
        let source_lane = self.network.lane(source).ok_or(ConnectionError::UnknownLane(source))?;
        let target_lane = self.network.lane(target).ok_or(ConnectionError::UnknownLane(target))?;
        let source_end = self.network.lane_end(source, node)?;
        let target_end = self.network.lane_end(target, node)?;

        let group = if self.config.restrict_to_supported_groups {
            group & source_lane.groups & target_lane.groups
        } else {
            group
        };
        Ok((source_end, target_end, group))
    }

    fn verify(&self) -> Result<()> {
        if self.config.verify_after_mutation {
            self.graph.check_invariants()?;
        }
        Ok(())
    }
}
