//! Value types: lane endpoints and single directed connection records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::LaneId;
use crate::transition::TransitionGroup;

/// One endpoint of a lane: the lane plus which terminal node of its
/// segment is meant. Sole key type of [`ConnectionGraph`](super::ConnectionGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LaneEnd {
    pub lane: LaneId,
    pub start_node: bool,
}

impl LaneEnd {
    #[inline]
    pub const fn new(lane: LaneId, start_node: bool) -> Self {
        Self { lane, start_node }
    }

    #[inline]
    pub const fn start(lane: LaneId) -> Self {
        Self::new(lane, true)
    }

    #[inline]
    pub const fn end(lane: LaneId) -> Self {
        Self::new(lane, false)
    }
}

impl fmt::Display for LaneEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.start_node { "start" } else { "end" };
        write!(f, "{} ({})", self.lane, side)
    }
}

/// A single directed connection record stored under the source lane end.
///
/// `group == NONE` is a hint: the record exists only so the reverse
/// direction can be found locally, it grants no traversal.
/// The target is kept as a full [`LaneEnd`] so the mirrored record can be
/// reached without asking the topology provider again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionEdge {
    pub target: LaneEnd,
    pub group: TransitionGroup,
}

impl ConnectionEdge {
    #[inline]
    pub const fn new(target: LaneEnd, group: TransitionGroup) -> Self {
        Self { target, group }
    }

    /// Hint record pointing back at `target`.
    #[inline]
    pub const fn hint(target: LaneEnd) -> Self {
        Self::new(target, TransitionGroup::NONE)
    }

    #[inline]
    pub const fn target_lane(&self) -> LaneId {
        self.target.lane
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    /// True when this record grants every category in `group`.
    /// Requesting nothing never matches.
    #[inline]
    pub const fn has(&self, group: TransitionGroup) -> bool {
        !group.is_empty() && self.group.contains(group)
    }

    #[inline]
    pub fn subtract(&mut self, group: TransitionGroup) {
        self.group.remove(group);
    }
}

impl fmt::Display for ConnectionEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-> {} [{}]", self.target, self.group)
    }
}
