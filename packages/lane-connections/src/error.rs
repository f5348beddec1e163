//! Error types for the lane connection graph

use thiserror::Error;

use crate::graph::LaneEnd;
use crate::ids::{LaneId, NodeId, SegmentId};

pub type Result<T> = std::result::Result<T, ConnectionError>;

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("{0} not found")]
    UnknownLane(LaneId),

    #[error("{0} not found")]
    UnknownSegment(SegmentId),

    #[error("{node} is not a terminal node of {lane}")]
    NodeNotOnLane { lane: LaneId, node: NodeId },

    #[error("Cannot connect {0} to itself")]
    SelfConnection(LaneId),

    #[error("{0} already exists")]
    DuplicateLane(LaneId),

    #[error("{0} already exists")]
    DuplicateSegment(SegmentId),

    #[error("{0} starts and ends at the same node")]
    DegenerateSegment(SegmentId),

    #[error("{lane_end} already links {existing}, cannot also link {requested}")]
    ConflictingLaneEnd {
        lane_end: LaneEnd,
        existing: LaneEnd,
        requested: LaneEnd,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record encode error: {0}")]
    RecordEncode(#[from] rmp_serde::encode::Error),

    #[error("Record decode error: {0}")]
    RecordDecode(#[from] rmp_serde::decode::Error),
}

impl ConnectionError {
    /// Stable error code for CLI output
    pub fn code(&self) -> &'static str {
        match self {
            ConnectionError::UnknownLane(_) => "UNKNOWN_LANE",
            ConnectionError::UnknownSegment(_) => "UNKNOWN_SEGMENT",
            ConnectionError::NodeNotOnLane { .. } => "NODE_NOT_ON_LANE",
            ConnectionError::SelfConnection(_) => "SELF_CONNECTION",
            ConnectionError::DuplicateLane(_) => "DUPLICATE_LANE",
            ConnectionError::DuplicateSegment(_) => "DUPLICATE_SEGMENT",
            ConnectionError::DegenerateSegment(_) => "DEGENERATE_SEGMENT",
            ConnectionError::ConflictingLaneEnd { .. } => "CONFLICTING_LANE_END",
            ConnectionError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            _ => "INTERNAL_ERROR",
        }
    }
}
