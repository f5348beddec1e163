//! In-memory road network used as the topology provider.
//!
//! Holds only what the connection graph needs: segments with their two
//! terminal nodes and the lanes laid on each segment. Lanes and segments are
//! released through [`LaneConnectionManager`](crate::manager::LaneConnectionManager)
//! so their connections are always cleaned up first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectionError, Result};
use crate::graph::LaneTopology;
use crate::ids::{LaneId, NodeId, SegmentId};
use crate::transition::TransitionGroup;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start_node: NodeId,
    pub end_node: NodeId,
    lanes: Vec<LaneId>,
}

impl Segment {
    pub fn node(&self, start_node: bool) -> NodeId {
        if start_node {
            self.start_node
        } else {
            self.end_node
        }
    }

    pub fn lanes(&self) -> &[LaneId] {
        &self.lanes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub segment: SegmentId,
    /// Vehicle categories that can use this lane at all.
    pub groups: TransitionGroup,
}

#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    segments: HashMap<SegmentId, Segment>,
    lanes: HashMap<LaneId, Lane>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Building -------------------------------------------------------------

    pub fn add_segment(&mut self, id: SegmentId, start_node: NodeId, end_node: NodeId) -> Result<()> {
        if self.segments.contains_key(&id) {
            return Err(ConnectionError::DuplicateSegment(id));
        }
        // a lane end at a node must be unambiguous
        if start_node == end_node {
            return Err(ConnectionError::DegenerateSegment(id));
        }
        self.segments.insert(id, Segment { start_node, end_node, lanes: Vec::new() });
        Ok(())
    }

    pub fn add_lane(&mut self, id: LaneId, segment: SegmentId, groups: TransitionGroup) -> Result<()> {
        if self.lanes.contains_key(&id) {
            return Err(ConnectionError::DuplicateLane(id));
        }
        let seg = self
            .segments
            .get_mut(&segment)
            .ok_or(ConnectionError::UnknownSegment(segment))?;
        seg.lanes.push(id);
        self.lanes.insert(id, Lane { segment, groups });
        Ok(())
    }

    // -- Lookup ---------------------------------------------------------------

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(&id)
    }

    pub fn lane_segment(&self, lane: LaneId) -> Option<&Segment> {
        self.lanes.get(&lane).and_then(|l| self.segments.get(&l.segment))
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Segments with `node` as a terminal, sorted by id.
    pub fn segments_at_node(&self, node: NodeId) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self
            .segments
            .iter()
            .filter(|(_, seg)| seg.start_node == node || seg.end_node == node)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Every lane touching `node` with the end it touches it at.
    /// Ordered by segment id, then lane order within the segment.
    pub fn lanes_at_node(&self, node: NodeId) -> Vec<(LaneId, bool)> {
        self.segments_at_node(node)
            .into_iter()
            .filter_map(|id| self.segments.get(&id))
            .flat_map(|seg| {
                let start_node = seg.start_node == node;
                seg.lanes.iter().map(move |lane| (*lane, start_node))
            })
            .collect()
    }

    // -- Release (manager only) -----------------------------------------------

    pub(crate) fn release_lane(&mut self, id: LaneId) -> Result<Lane> {
        let lane = self.lanes.remove(&id).ok_or(ConnectionError::UnknownLane(id))?;
        if let Some(seg) = self.segments.get_mut(&lane.segment) {
            seg.lanes.retain(|l| *l != id);
        }
        Ok(lane)
    }

    pub(crate) fn release_segment(&mut self, id: SegmentId) -> Result<Segment> {
        let seg = self.segments.remove(&id).ok_or(ConnectionError::UnknownSegment(id))?;
        for lane in &seg.lanes {
            self.lanes.remove(lane);
        }
        Ok(seg)
    }
}

impl LaneTopology for RoadNetwork {
    fn is_start_node(&self, lane: LaneId, node: NodeId) -> Option<bool> {
        let seg = self.lane_segment(lane)?;
        if seg.start_node == node {
            Some(true)
        } else if seg.end_node == node {
            Some(false)
        } else {
            None
        }
    }

    fn node_id(&self, lane: LaneId, start_node: bool) -> Option<NodeId> {
        self.lane_segment(lane).map(|seg| seg.node(start_node))
    }

    fn is_lane_valid(&self, lane: LaneId) -> bool {
        self.lane_segment(lane).is_some()
    }
}
