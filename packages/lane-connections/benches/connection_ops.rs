//! Benchmark suite for lane connection operations
//!
//! Covers the paths a junction tool hits:
//! - Mutation: connect, disconnect, remove_lane_connections
//! - Query: is_connected_to, has_outgoing (cached masks)
//! - Records: capture + restore of one junction
//!
//! Run: cargo bench --bench connection_ops

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use lane_connections::{
    LaneConnectionManager, LaneConnectionRecord, LaneId, NodeId, RoadNetwork, SegmentId, TransitionGroup,
};

const LANES_PER_SEGMENT: u32 = 4;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn incoming_lane(junction: u32, i: u32) -> LaneId {
    LaneId(junction * 2 * LANES_PER_SEGMENT + i)
}

fn outgoing_lane(junction: u32, i: u32) -> LaneId {
    LaneId(junction * 2 * LANES_PER_SEGMENT + LANES_PER_SEGMENT + i)
}

/// `junctions` independent nodes, each joining one incoming and one outgoing
/// segment of four lanes.
fn create_network(junctions: u32) -> RoadNetwork {
    let mut net = RoadNetwork::new();
    for j in 1..=junctions {
        let inbound = SegmentId(2 * j);
        let outbound = SegmentId(2 * j + 1);
        net.add_segment(inbound, NodeId(1_000_000 + j), NodeId(j)).unwrap();
        net.add_segment(outbound, NodeId(j), NodeId(2_000_000 + j)).unwrap();
        for i in 0..LANES_PER_SEGMENT {
            net.add_lane(incoming_lane(j, i), inbound, TransitionGroup::ALL).unwrap();
            net.add_lane(outgoing_lane(j, i), outbound, TransitionGroup::ALL).unwrap();
        }
    }
    net
}

/// Every incoming lane connected to every outgoing lane at every junction.
fn create_connected(junctions: u32) -> LaneConnectionManager {
    let mut manager = LaneConnectionManager::new(create_network(junctions));
    for j in 1..=junctions {
        for i in 0..LANES_PER_SEGMENT {
            for o in 0..LANES_PER_SEGMENT {
                let group = if (i + o) % 2 == 0 { TransitionGroup::ALL } else { TransitionGroup::NORMAL };
                manager
                    .add_lane_connection(incoming_lane(j, i), outgoing_lane(j, o), NodeId(j), group)
                    .unwrap();
            }
        }
    }
    manager
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

fn bench_connect(c: &mut Criterion) {
    let mut group = c.benchmark_group("connect");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || LaneConnectionManager::new(create_network(size)),
                |mut manager| {
                    for j in 1..=size {
                        for i in 0..LANES_PER_SEGMENT {
                            manager
                                .add_lane_connection(
                                    black_box(incoming_lane(j, i)),
                                    black_box(outgoing_lane(j, i)),
                                    NodeId(j),
                                    TransitionGroup::TRACK,
                                )
                                .unwrap();
                        }
                    }
                    manager
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_disconnect(c: &mut Criterion) {
    let mut group = c.benchmark_group("disconnect");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || create_connected(size),
                |mut manager| {
                    for j in 1..=size {
                        manager
                            .remove_lane_connection(
                                black_box(incoming_lane(j, 0)),
                                black_box(outgoing_lane(j, 0)),
                                NodeId(j),
                                TransitionGroup::TRACK,
                            )
                            .unwrap();
                    }
                    manager
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_remove_lane(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_lane_connections");

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || create_connected(size),
                |mut manager| {
                    manager.remove_lane_connections(black_box(incoming_lane(size / 2 + 1, 1))).unwrap();
                    manager
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

fn bench_is_connected(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_connected_to");

    for size in [100, 1000] {
        let manager = create_connected(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut hits = 0usize;
                for j in 1..=size {
                    for o in 0..LANES_PER_SEGMENT {
                        if manager.is_connected_to(
                            black_box(incoming_lane(j, 1)),
                            black_box(outgoing_lane(j, o)),
                            NodeId(j),
                            TransitionGroup::TRACK,
                        ) {
                            hits += 1;
                        }
                    }
                }
                hits
            });
        });
    }

    group.finish();
}

fn bench_has_outgoing(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_outgoing");

    for size in [100, 1000] {
        let manager = create_connected(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                (1..=size)
                    .filter(|&j| {
                        manager.has_outgoing_connections(black_box(incoming_lane(j, 2)), false, TransitionGroup::TRACK)
                    })
                    .count()
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn bench_record_restore(c: &mut Criterion) {
    c.bench_function("record_restore_junction", |b| {
        b.iter_batched(
            || create_connected(100),
            |mut manager| {
                let node = NodeId(50);
                let mut records = LaneConnectionRecord::lanes_at_node(manager.network(), node);
                for record in &mut records {
                    record.record(&manager);
                }
                for record in &records {
                    manager.remove_lane_end_connections(record.lane_id, record.start_node).unwrap();
                }
                for record in &records {
                    record.restore(&mut manager).unwrap();
                }
                manager
            },
            BatchSize::SmallInput,
        );
    });
}

// ---------------------------------------------------------------------------
// Criterion group registration
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_connect,
    bench_disconnect,
    bench_remove_lane,
    bench_is_connected,
    bench_has_outgoing,
    bench_record_restore,
);
criterion_main!(benches);
