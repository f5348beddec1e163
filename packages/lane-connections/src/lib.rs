//! Lane connection graph
//!
//! Per-lane-end overrides of which lanes a vehicle may transition onto at a
//! junction. The core is [`ConnectionGraph`], a sparse bidirectional
//! adjacency store keyed by [`LaneEnd`]; [`LaneConnectionManager`] pairs it
//! with a [`RoadNetwork`] and is the handle callers normally use.
//!
//! ```
//! use lane_connections::{LaneConnectionManager, LaneId, NodeId, RoadNetwork, SegmentId, TransitionGroup};
//!
//! let mut network = RoadNetwork::new();
//! network.add_segment(SegmentId(1), NodeId(5), NodeId(6)).unwrap();
//! network.add_segment(SegmentId(2), NodeId(7), NodeId(5)).unwrap();
//! network.add_lane(LaneId(100), SegmentId(1), TransitionGroup::ALL).unwrap();
//! network.add_lane(LaneId(200), SegmentId(2), TransitionGroup::ALL).unwrap();
//!
//! let mut manager = LaneConnectionManager::new(network);
//! manager.add_lane_connection(LaneId(100), LaneId(200), NodeId(5), TransitionGroup::TRACK).unwrap();
//! assert!(manager.is_connected_to(LaneId(100), LaneId(200), NodeId(5), TransitionGroup::TRACK));
//! assert!(!manager.is_connected_to(LaneId(200), LaneId(100), NodeId(5), TransitionGroup::TRACK));
//! ```

pub mod error;
pub mod graph;
pub mod ids;
pub mod manager;
pub mod network;
pub mod record;
pub mod scenario;
pub mod transition;

pub use error::{ConnectionError, Result};
pub use graph::{ConnectionEdge, ConnectionGraph, EdgeCollection, GraphStats, LaneEnd, LaneTopology};
pub use ids::{LaneId, NodeId, SegmentId};
pub use manager::{LaneConnectionManager, ManagerConfig};
pub use network::RoadNetwork;
pub use record::LaneConnectionRecord;
pub use scenario::{Operation, Outcome, Scenario};
pub use transition::TransitionGroup;
