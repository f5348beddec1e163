//! Per-lane-end edge list with cached aggregate masks.
//!
//! Edges are kept in insertion order, one record per target lane.
//! Linear scan is fine: a collection only ever holds the lanes meeting at
//! one junction.
//!
//! The cached masks are written only by `ConnectionGraph`; the collection
//! never recomputes them on its own.

use smallvec::SmallVec;

use crate::ids::LaneId;
use crate::transition::TransitionGroup;
use super::lane_end::ConnectionEdge;

/// Result of appending an edge to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOp {
    /// No record for the target existed; a new one was pushed.
    Inserted,
    /// An existing record for the target had the new bits OR-ed in.
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeCollection {
    edges: SmallVec<[ConnectionEdge; 4]>,
    outgoing_cached: TransitionGroup,
    incoming_cached: TransitionGroup,
}

impl EdgeCollection {
    /// A collection is never empty, so it is always created from its first edge.
    pub fn new(edge: ConnectionEdge) -> Self {
        let mut edges = SmallVec::new();
        edges.push(edge);
        Self {
            edges,
            outgoing_cached: TransitionGroup::NONE,
            incoming_cached: TransitionGroup::NONE,
        }
    }

    // -- Mutation -------------------------------------------------------------

    /// Merge `edge` into the record for the same target lane, or push it.
    pub fn append(&mut self, edge: ConnectionEdge) -> AppendOp {
        match self.edge_mut(edge.target_lane()) {
            Some(existing) => {
                existing.group |= edge.group;
                AppendOp::Merged
            }
            None => {
                self.edges.push(edge);
                AppendOp::Inserted
            }
        }
    }

    /// Drop the record for `target`.
    ///
    /// Returns `true` when the collection is now empty and must be removed
    /// from the graph by the owner.
    pub fn remove_edge(&mut self, target: LaneId) -> bool {
        self.edges.retain(|edge| edge.target_lane() != target);
        self.edges.is_empty()
    }

    // -- Lookup ---------------------------------------------------------------

    pub fn edge(&self, target: LaneId) -> Option<&ConnectionEdge> {
        self.edges.iter().find(|edge| edge.target_lane() == target)
    }

    pub fn edge_mut(&mut self, target: LaneId) -> Option<&mut ConnectionEdge> {
        self.edges.iter_mut().find(|edge| edge.target_lane() == target)
    }

    pub fn edges(&self) -> &[ConnectionEdge] {
        &self.edges
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// OR of this collection's own edge masks, computed fresh.
    pub fn outgoing_groups(&self) -> TransitionGroup {
        self.edges
            .iter()
            .fold(TransitionGroup::NONE, |acc, edge| acc | edge.group)
    }

    // -- Cache ----------------------------------------------------------------

    pub fn outgoing_cached(&self) -> TransitionGroup {
        self.outgoing_cached
    }

    pub fn incoming_cached(&self) -> TransitionGroup {
        self.incoming_cached
    }

    /// Categories granted in either direction.
    pub fn connection_cached(&self) -> TransitionGroup {
        self.outgoing_cached | self.incoming_cached
    }

    pub(crate) fn set_cache(&mut self, outgoing: TransitionGroup, incoming: TransitionGroup) {
        self.outgoing_cached = outgoing;
        self.incoming_cached = incoming;
    }

    pub(crate) fn add_outgoing_cached(&mut self, group: TransitionGroup) {
        self.outgoing_cached |= group;
    }

    pub(crate) fn add_incoming_cached(&mut self, group: TransitionGroup) {
        self.incoming_cached |= group;
    }
}

impl<'a> IntoIterator for &'a EdgeCollection {
    type Item = &'a ConnectionEdge;
    type IntoIter = std::slice::Iter<'a, ConnectionEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LaneEnd;

    fn edge(lane: u32, group: TransitionGroup) -> ConnectionEdge {
        ConnectionEdge::new(LaneEnd::start(LaneId(lane)), group)
    }

    #[test]
    fn test_new_holds_single_edge_with_empty_cache() {
        let c = EdgeCollection::new(edge(1, TransitionGroup::TRACK));
        assert_eq!(c.len(), 1);
        assert!(!c.is_empty());
        assert_eq!(c.outgoing_cached(), TransitionGroup::NONE);
        assert_eq!(c.incoming_cached(), TransitionGroup::NONE);
    }

    #[test]
    fn test_append_merges_same_target() {
        let mut c = EdgeCollection::new(edge(1, TransitionGroup::TRACK));
        assert_eq!(c.append(edge(1, TransitionGroup::NORMAL)), AppendOp::Merged);
        assert_eq!(c.len(), 1);
        assert_eq!(c.edge(LaneId(1)).unwrap().group, TransitionGroup::ALL);

        // merging a hint leaves the mask alone
        assert_eq!(c.append(edge(1, TransitionGroup::NONE)), AppendOp::Merged);
        assert_eq!(c.edge(LaneId(1)).unwrap().group, TransitionGroup::ALL);
    }

    #[test]
    fn test_append_new_target_preserves_order() {
        let mut c = EdgeCollection::new(edge(3, TransitionGroup::TRACK));
        assert_eq!(c.append(edge(1, TransitionGroup::NONE)), AppendOp::Inserted);
        assert_eq!(c.append(edge(2, TransitionGroup::NORMAL)), AppendOp::Inserted);

        let targets: Vec<u32> = c.iter().map(|e| e.target_lane().raw()).collect();
        assert_eq!(targets, vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_edge_signals_empty() {
        let mut c = EdgeCollection::new(edge(1, TransitionGroup::TRACK));
        c.append(edge(2, TransitionGroup::NORMAL));

        assert!(!c.remove_edge(LaneId(1)));
        assert!(c.edge(LaneId(1)).is_none());
        // removing an absent target changes nothing
        assert!(!c.remove_edge(LaneId(99)));
        assert_eq!(c.len(), 1);

        assert!(c.remove_edge(LaneId(2)));
        assert!(c.is_empty());
    }

    #[test]
    fn test_cache_is_not_recomputed_implicitly() {
        let mut c = EdgeCollection::new(edge(1, TransitionGroup::TRACK));
        assert_eq!(c.outgoing_groups(), TransitionGroup::TRACK);
        assert_eq!(c.outgoing_cached(), TransitionGroup::NONE);

        c.set_cache(TransitionGroup::TRACK, TransitionGroup::NORMAL);
        c.append(edge(2, TransitionGroup::NORMAL));
        assert_eq!(c.outgoing_cached(), TransitionGroup::TRACK);
        assert_eq!(c.connection_cached(), TransitionGroup::ALL);
        assert_eq!(c.outgoing_groups(), TransitionGroup::ALL);
    }
}
