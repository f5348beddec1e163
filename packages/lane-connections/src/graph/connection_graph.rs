//! ConnectionGraph: sparse bidirectional adjacency keyed by lane end.
//!
//! Every logical connection A -> B is stored twice: a forward record under
//! A carrying the granted categories, and a mirrored record under B pointing
//! back at A carrying whatever B -> A grants (possibly nothing, a "hint").
//! "Who points at me" is therefore answered from the lane end's own
//! collection instead of a scan over every lane.
//!
//! Invariants held after every public call:
//! - a key is present iff its collection is non-empty;
//! - forward and mirrored records always exist together and are dropped
//!   together, exactly when both masks are empty;
//! - each collection's cached outgoing/incoming masks match its edges.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConnectionError, Result};
use crate::ids::{LaneId, NodeId};
use crate::transition::TransitionGroup;
use super::collection::{AppendOp, EdgeCollection};
use super::lane_end::{ConnectionEdge, LaneEnd};
use super::LaneTopology;

#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph {
    pub(crate) lane_ends: HashMap<LaneEnd, EdgeCollection>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Whether `source` may transition onto `target` at `node` for every
    /// category in `group`.
    ///
    /// `false` if the source lane does not terminate at `node`, if it has no
    /// entry, or if `group` is empty.
    pub fn is_connected_to(
        &self,
        topology: &dyn LaneTopology,
        source: LaneId,
        target: LaneId,
        node: NodeId,
        group: TransitionGroup,
    ) -> bool {
        match topology.is_start_node(source, node) {
            Some(start_node) => self.is_connected_at(LaneEnd::new(source, start_node), target, group),
            None => false,
        }
    }

    /// Key-level form of [`is_connected_to`](Self::is_connected_to).
    pub fn is_connected_at(&self, source: LaneEnd, target: LaneId, group: TransitionGroup) -> bool {
        self.lane_ends
            .get(&source)
            .and_then(|collection| collection.edge(target))
            .map_or(false, |edge| edge.has(group))
    }

    pub fn get(&self, lane_end: LaneEnd) -> Option<&EdgeCollection> {
        self.lane_ends.get(&lane_end)
    }

    pub fn contains(&self, lane_end: LaneEnd) -> bool {
        self.lane_ends.contains_key(&lane_end)
    }

    /// Every record stored under `lane_end` as `(target lane, categories)`,
    /// hints included, in insertion order.
    pub fn connections(&self, lane_end: LaneEnd) -> Vec<(LaneId, TransitionGroup)> {
        self.lane_ends
            .get(&lane_end)
            .map(|collection| {
                collection
                    .iter()
                    .map(|edge| (edge.target_lane(), edge.group))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cached union of the categories `lane_end` grants outward.
    pub fn outgoing_groups(&self, lane_end: LaneEnd) -> TransitionGroup {
        self.lane_ends
            .get(&lane_end)
            .map_or(TransitionGroup::NONE, EdgeCollection::outgoing_cached)
    }

    /// Cached union of the categories granted toward `lane_end`.
    pub fn incoming_groups(&self, lane_end: LaneEnd) -> TransitionGroup {
        self.lane_ends
            .get(&lane_end)
            .map_or(TransitionGroup::NONE, EdgeCollection::incoming_cached)
    }

    pub fn has_outgoing(&self, lane_end: LaneEnd, group: TransitionGroup) -> bool {
        self.outgoing_groups(lane_end).intersects(group)
    }

    pub fn has_incoming(&self, lane_end: LaneEnd, group: TransitionGroup) -> bool {
        self.incoming_groups(lane_end).intersects(group)
    }

    /// Any connection in either direction intersecting `group`.
    pub fn has_connections(&self, lane_end: LaneEnd, group: TransitionGroup) -> bool {
        self.lane_ends
            .get(&lane_end)
            .map_or(false, |collection| collection.connection_cached().intersects(group))
    }

    /// Number of lane ends with at least one record.
    pub fn len(&self) -> usize {
        self.lane_ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lane_ends.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LaneEnd, &EdgeCollection)> {
        self.lane_ends.iter()
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Grant `group` from `source` to `target` at `node`.
    ///
    /// Idempotent. Fails only when either lane cannot be resolved at `node`
    /// or both are the same lane.
    pub fn connect(
        &mut self,
        topology: &dyn LaneTopology,
        source: LaneId,
        target: LaneId,
        node: NodeId,
        group: TransitionGroup,
    ) -> Result<()> {
        if source == target {
            return Err(ConnectionError::SelfConnection(source));
        }
        let source_end = topology.lane_end(source, node)?;
        let target_end = topology.lane_end(target, node)?;
        self.connect_ends(source_end, target_end, group)
    }

    /// Key-level form of [`connect`](Self::connect). Connecting a lane to
    /// itself or with an empty group is a no-op.
    ///
    /// Fails without touching the graph when either end already holds a
    /// record for the other lane that points at that lane's opposite end.
    pub fn connect_ends(&mut self, source: LaneEnd, target: LaneEnd, group: TransitionGroup) -> Result<()> {
        if group.is_empty() || source.lane == target.lane {
            return Ok(());
        }
        self.check_pair_ends(source, target)?;
        self.check_pair_ends(target, source)?;

        let (op, forward) = self.add_edge(source, ConnectionEdge::new(target, group));
        forward.add_outgoing_cached(group);
        let (_, backward) = self.add_edge(target, ConnectionEdge::hint(source));
        backward.add_incoming_cached(group);

        match op {
            AppendOp::Inserted => debug!(%source, %target, %group, "lane connection added"),
            AppendOp::Merged => debug!(%source, %target, %group, "lane connection merged"),
        }
        Ok(())
    }

    /// Clear `group` from the forward record `source -> target` at `node`.
    ///
    /// Returns `Ok(false)` when no forward record granting all of `group`
    /// existed. When both directions end up empty the pair is removed and
    /// any collection left empty leaves the graph.
    pub fn disconnect(
        &mut self,
        topology: &dyn LaneTopology,
        source: LaneId,
        target: LaneId,
        node: NodeId,
        group: TransitionGroup,
    ) -> Result<bool> {
        let source_end = topology.lane_end(source, node)?;
        Ok(self.disconnect_at(source_end, target, group))
    }

    /// Key-level form of [`disconnect`](Self::disconnect).
    pub fn disconnect_at(&mut self, source: LaneEnd, target: LaneId, group: TransitionGroup) -> bool {
        let (target_end, forward_empty) = {
            let Some(edge) = self
                .lane_ends
                .get_mut(&source)
                .and_then(|collection| collection.edge_mut(target))
            else {
                return false;
            };
            if !edge.has(group) {
                return false;
            }
            edge.subtract(group);
            (edge.target, edge.is_empty())
        };

        // a missing mirror would break the pair invariant; treat it as empty
        let backward_empty = self
            .lane_ends
            .get(&target_end)
            .and_then(|collection| collection.edge(source.lane))
            .map_or(true, ConnectionEdge::is_empty);

        if forward_empty && backward_empty {
            self.remove_edge(target_end, source.lane);
            self.remove_edge(source, target);
            debug!(%source, target = %target_end, "lane connection pair removed");
        }

        self.refresh_cache(source);
        self.refresh_cache(target_end);

        debug!(%source, target = %target_end, %group, "lane connection disabled");
        true
    }

    /// Remove every record anchored at `lane_end` together with the mirrored
    /// records held by its neighbours. Returns the number of pairs removed.
    pub fn remove_connections(&mut self, lane_end: LaneEnd) -> usize {
        let Some(collection) = self.lane_ends.remove(&lane_end) else {
            return 0;
        };

        for edge in &collection {
            self.remove_edge(edge.target, lane_end.lane);
            self.refresh_cache(edge.target);
        }

        debug!(%lane_end, removed = collection.len(), "lane end connections removed");
        collection.len()
    }

    /// Withdraw every category `lane_end` grants outward while keeping what
    /// its neighbours grant toward it. Returns the number of records cleared.
    pub fn clear_outgoing(&mut self, lane_end: LaneEnd) -> usize {
        let granted: Vec<(LaneId, TransitionGroup)> = self
            .connections(lane_end)
            .into_iter()
            .filter(|(_, group)| !group.is_empty())
            .collect();
        for (target, group) in &granted {
            self.disconnect_at(lane_end, *target, *group);
        }
        granted.len()
    }

    /// Remove the connections of both ends of `lane`.
    pub fn remove_lane_connections(&mut self, lane: LaneId) -> usize {
        self.remove_connections(LaneEnd::start(lane)) + self.remove_connections(LaneEnd::end(lane))
    }

    /// Recompute the cached masks of `lane_end` from its records and the
    /// records its neighbours hold for it. No-op if absent.
    pub fn refresh_cache(&mut self, lane_end: LaneEnd) {
        let Some((outgoing, incoming)) = self.computed_cache(lane_end) else {
            return;
        };
        if let Some(collection) = self.lane_ends.get_mut(&lane_end) {
            collection.set_cache(outgoing, incoming);
        }
    }

    pub fn clear(&mut self) {
        self.lane_ends.clear();
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// `(outgoing, incoming)` as they should be cached for `lane_end`.
    pub(crate) fn computed_cache(&self, lane_end: LaneEnd) -> Option<(TransitionGroup, TransitionGroup)> {
        let collection = self.lane_ends.get(&lane_end)?;
        let mut outgoing = TransitionGroup::NONE;
        let mut incoming = TransitionGroup::NONE;
        for edge in collection {
            outgoing |= edge.group;
            if let Some(backward) = self
                .lane_ends
                .get(&edge.target)
                .and_then(|neighbour| neighbour.edge(lane_end.lane))
            {
                incoming |= backward.group;
            }
        }
        Some((outgoing, incoming))
    }

    /// A collection holds one record per target lane, so an existing record
    /// for `requested.lane` must already point at `requested` itself.
    fn check_pair_ends(&self, lane_end: LaneEnd, requested: LaneEnd) -> Result<()> {
        match self
            .lane_ends
            .get(&lane_end)
            .and_then(|collection| collection.edge(requested.lane))
        {
            Some(edge) if edge.target != requested => Err(ConnectionError::ConflictingLaneEnd {
                lane_end,
                existing: edge.target,
                requested,
            }),
            _ => Ok(()),
        }
    }

    fn add_edge(&mut self, lane_end: LaneEnd, edge: ConnectionEdge) -> (AppendOp, &mut EdgeCollection) {
        match self.lane_ends.entry(lane_end) {
            Entry::Occupied(entry) => {
                let collection = entry.into_mut();
                (collection.append(edge), collection)
            }
            Entry::Vacant(entry) => (AppendOp::Inserted, entry.insert(EdgeCollection::new(edge))),
        }
    }

    fn remove_edge(&mut self, lane_end: LaneEnd, target: LaneId) {
        if let Some(collection) = self.lane_ends.get_mut(&lane_end) {
            if collection.remove_edge(target) {
                self.lane_ends.remove(&lane_end);
            }
        }
    }
}
