//! Integration test: documented connect/disconnect scenarios.
//!
//! Runs through the public graph and manager APIs only, with the road
//! network as topology provider.

use lane_connections::{
    ConnectionGraph, LaneConnectionManager, LaneEnd, LaneId, LaneTopology, NodeId, RoadNetwork, SegmentId,
    TransitionGroup,
};

const TRACK: TransitionGroup = TransitionGroup::TRACK;
const NORMAL: TransitionGroup = TransitionGroup::NORMAL;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lane 100 starts at node 5, lane 200 ends at node 5, lane 300 starts at
/// node 5. Every lane supports every category.
fn network() -> RoadNetwork {
    let mut net = RoadNetwork::new();
    net.add_segment(SegmentId(1), NodeId(5), NodeId(6)).unwrap();
    net.add_segment(SegmentId(2), NodeId(7), NodeId(5)).unwrap();
    net.add_segment(SegmentId(3), NodeId(5), NodeId(8)).unwrap();
    net.add_lane(LaneId(100), SegmentId(1), TransitionGroup::ALL).unwrap();
    net.add_lane(LaneId(200), SegmentId(2), TransitionGroup::ALL).unwrap();
    net.add_lane(LaneId(300), SegmentId(3), TransitionGroup::ALL).unwrap();
    net
}

fn forward_mask(graph: &ConnectionGraph, source: LaneEnd, target: u32) -> Option<TransitionGroup> {
    graph
        .get(source)
        .and_then(|c| c.edge(LaneId(target)))
        .map(|edge| edge.group)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_1_unidirectional_track() {
    let net = network();
    let mut graph = ConnectionGraph::new();
    graph.connect(&net, LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap();

    assert!(graph.is_connected_to(&net, LaneId(100), LaneId(200), NodeId(5), TRACK));
    assert!(!graph.is_connected_to(&net, LaneId(200), LaneId(100), NodeId(5), TRACK));

    // backward hint exists with an empty mask
    let back = net.lane_end(LaneId(200), NodeId(5)).unwrap();
    assert_eq!(forward_mask(&graph, back, 100), Some(TransitionGroup::NONE));
    graph.check_invariants().unwrap();
}

#[test]
fn scenario_2_second_category_merges() {
    let net = network();
    let mut graph = ConnectionGraph::new();
    graph.connect(&net, LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap();
    graph.connect(&net, LaneId(100), LaneId(200), NodeId(5), NORMAL).unwrap();

    assert_eq!(forward_mask(&graph, LaneEnd::start(LaneId(100)), 200), Some(TRACK | NORMAL));
    assert!(graph.is_connected_to(&net, LaneId(100), LaneId(200), NodeId(5), NORMAL));
    assert!(graph.is_connected_to(&net, LaneId(100), LaneId(200), NodeId(5), TRACK));
    assert!(graph.is_connected_to(&net, LaneId(100), LaneId(200), NodeId(5), TransitionGroup::ALL));
    assert_eq!(graph.get(LaneEnd::start(LaneId(100))).unwrap().len(), 1);
    graph.check_invariants().unwrap();
}

#[test]
fn scenario_3_partial_disconnect() {
    let net = network();
    let mut graph = ConnectionGraph::new();
    graph.connect(&net, LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap();
    graph.connect(&net, LaneId(100), LaneId(200), NodeId(5), NORMAL).unwrap();

    assert!(graph.disconnect(&net, LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap());

    assert_eq!(forward_mask(&graph, LaneEnd::start(LaneId(100)), 200), Some(NORMAL));
    assert!(graph.contains(LaneEnd::start(LaneId(100))));
    assert!(!graph.is_connected_to(&net, LaneId(100), LaneId(200), NodeId(5), TRACK));
    assert!(graph.is_connected_to(&net, LaneId(100), LaneId(200), NodeId(5), NORMAL));
    graph.check_invariants().unwrap();
}

#[test]
fn scenario_4_disconnect_never_connected() {
    let net = network();
    let mut graph = ConnectionGraph::new();

    assert!(!graph.disconnect(&net, LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap());
    assert!(graph.is_empty());
}

// ---------------------------------------------------------------------------
// Properties on concrete graphs
// ---------------------------------------------------------------------------

#[test]
fn garbage_collection_after_full_disconnect() {
    let net = network();
    let mut graph = ConnectionGraph::new();
    graph.connect(&net, LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap();
    graph.connect(&net, LaneId(100), LaneId(300), NodeId(5), NORMAL).unwrap();

    assert!(graph.disconnect(&net, LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap());

    // 100 keeps its entry for 300 but nothing for 200; 200 is gone entirely
    assert_eq!(forward_mask(&graph, LaneEnd::start(LaneId(100)), 200), None);
    assert!(!graph.contains(LaneEnd::end(LaneId(200))));
    assert!(graph.contains(LaneEnd::start(LaneId(100))));
    graph.check_invariants().unwrap();
}

#[test]
fn idempotent_connect_matches_single_connect() {
    let net = network();
    let mut once = ConnectionGraph::new();
    let mut twice = ConnectionGraph::new();

    once.connect(&net, LaneId(200), LaneId(300), NodeId(5), TransitionGroup::ALL).unwrap();
    twice.connect(&net, LaneId(200), LaneId(300), NodeId(5), TransitionGroup::ALL).unwrap();
    twice.connect(&net, LaneId(200), LaneId(300), NodeId(5), TransitionGroup::ALL).unwrap();

    for end in [LaneEnd::end(LaneId(200)), LaneEnd::start(LaneId(300))] {
        assert_eq!(once.connections(end), twice.connections(end));
        assert_eq!(once.outgoing_groups(end), twice.outgoing_groups(end));
        assert_eq!(once.incoming_groups(end), twice.incoming_groups(end));
    }
    assert_eq!(once.stats(), twice.stats());
}

#[test]
fn bulk_removal_leaves_no_references() {
    let net = network();
    let mut graph = ConnectionGraph::new();
    for (s, t) in [(100, 200), (200, 100), (200, 300), (300, 100), (100, 300)] {
        graph.connect(&net, LaneId(s), LaneId(t), NodeId(5), TRACK).unwrap();
    }

    graph.remove_connections(LaneEnd::start(LaneId(100)));

    assert!(!graph.contains(LaneEnd::start(LaneId(100))));
    for (key, collection) in graph.iter() {
        assert!(
            collection.iter().all(|edge| edge.target_lane() != LaneId(100)),
            "{} still references lane 100",
            key
        );
    }
    assert!(graph.is_connected_to(&net, LaneId(200), LaneId(300), NodeId(5), TRACK));
    graph.check_invariants().unwrap();
}

#[test]
fn unresolvable_node_is_reported() {
    let net = network();
    let mut graph = ConnectionGraph::new();

    let err = graph.connect(&net, LaneId(100), LaneId(200), NodeId(6), TRACK).unwrap_err();
    assert_eq!(err.code(), "NODE_NOT_ON_LANE");
    assert!(!graph.is_connected_to(&net, LaneId(100), LaneId(200), NodeId(6), TRACK));
    assert!(graph.is_empty());
}

#[test]
fn released_lane_leaves_no_dangling_keys() {
    let mut manager = LaneConnectionManager::new(network());
    manager.add_lane_connection(LaneId(100), LaneId(200), NodeId(5), TRACK).unwrap();
    manager.add_lane_connection(LaneId(300), LaneId(200), NodeId(5), NORMAL).unwrap();
    manager.add_lane_connection(LaneId(200), LaneId(300), NodeId(5), NORMAL).unwrap();

    manager.release_lane(LaneId(200)).unwrap();

    assert!(manager.graph().is_empty());
    assert!(manager.dump().is_empty());
    manager.check().unwrap();
}
