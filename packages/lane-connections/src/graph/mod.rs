//! Lane connection graph API and implementation

pub mod collection;
pub mod connection_graph;
pub mod diagnostics;
pub mod lane_end;

pub use collection::{AppendOp, EdgeCollection};
pub use connection_graph::ConnectionGraph;
pub use diagnostics::GraphStats;
pub use lane_end::{ConnectionEdge, LaneEnd};

use crate::error::{ConnectionError, Result};
use crate::ids::{LaneId, NodeId};

/// Read-only view of the road network the graph needs to resolve keys.
///
/// The graph never mutates the provider. Implementations must keep a lane
/// resolvable for as long as the graph holds connections for it; removing a
/// lane has to go through [`ConnectionGraph::remove_lane_connections`] first.
pub trait LaneTopology {
    /// Which terminal of the lane's segment `node` is.
    ///
    /// `None` if the lane is unknown or `node` is not one of its segment's
    /// two terminal nodes.
    fn is_start_node(&self, lane: LaneId, node: NodeId) -> Option<bool>;

    /// Inverse of `is_start_node`: the node at the given end of the lane.
    fn node_id(&self, lane: LaneId, start_node: bool) -> Option<NodeId>;

    /// Whether the lane exists and has not been released.
    fn is_lane_valid(&self, lane: LaneId) -> bool;

    /// Resolve `(lane, node)` into the lane end key.
    fn lane_end(&self, lane: LaneId, node: NodeId) -> Result<LaneEnd> {
        self.is_start_node(lane, node)
            .map(|start_node| LaneEnd::new(lane, start_node))
            .ok_or(ConnectionError::NodeNotOnLane { lane, node })
    }
}
