//! Throughput benchmarks for packet delivery
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flownet::runtime::nodes::{CollectedPackets, CollectorSink, CounterSource, MapNode};
use flownet::{
    Network, NetworkDescription, NetworkFactory, Packet, PortRef, RunOutcome, RuntimeConfig,
};

const PACKETS: i64 = 10_000;

/// counter → `stages` map nodes → collector
fn chain(stages: usize, capacity: usize) -> (Network, CollectedPackets) {
    let (collector, collected) = CollectorSink::new();
    let mut description = NetworkDescription::new();
    description.add_component("source", CounterSource::new(0..PACKETS));

    let mut upstream = PortRef::new("source", "out");
    for i in 0..stages {
        let name = format!("stage{}", i);
        description
            .add_component(name.clone(), MapNode::new(|p| p))
            .connect_with_capacity(upstream, PortRef::new(&name, "in"), capacity);
        upstream = PortRef::new(name, "out");
    }
    description
        .add_component("sink", collector)
        .connect_with_capacity(upstream, PortRef::new("sink", "in"), capacity);

    let config = RuntimeConfig::default().with_network_id("bench");
    let network = NetworkFactory::build(description, &config).expect("valid bench network");
    (network, collected)
}

fn bench_chain_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_capacity");
    group.throughput(Throughput::Elements(PACKETS as u64));
    group.sample_size(20);

    for capacity in [0usize, 1, 16, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let (network, _collected) = chain(2, capacity);
                    let outcome = network.start_and_terminate().expect("run");
                    assert_eq!(black_box(outcome), RunOutcome::Completed);
                });
            },
        );
    }

    group.finish();
}

fn bench_chain_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_length");
    group.throughput(Throughput::Elements(PACKETS as u64));
    group.sample_size(20);

    for stages in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(stages), &stages, |b, &stages| {
            b.iter(|| {
                let (network, _collected) = chain(stages, 64);
                black_box(network.start_and_terminate().expect("run"));
            });
        });
    }

    group.finish();
}

fn bench_continuous_rerun(c: &mut Criterion) {
    let mut group = c.benchmark_group("continuous_rerun");
    group.throughput(Throughput::Elements(PACKETS as u64));
    group.sample_size(20);

    // Threads stay parked between runs, so this measures reset + replay.
    let (network, collected) = chain(2, 64);
    group.bench_function("reset_and_run", |b| {
        b.iter(|| {
            black_box(network.start().expect("run"));
            collected.take()
        });
    });
    network.terminate();

    group.finish();
}

fn bench_packet_clone(c: &mut Criterion) {
    let list = Packet::from((0..64).map(Packet::Int).collect::<Vec<_>>());
    c.bench_function("packet_clone_list64", |b| b.iter(|| black_box(list.clone())));
}

criterion_group!(
    benches,
    bench_chain_capacity,
    bench_chain_length,
    bench_continuous_rerun,
    bench_packet_clone
);
criterion_main!(benches);
