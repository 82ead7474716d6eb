//! Configuration and resolver-hint benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use socket99::hints_to_addrinfo;
use socket99_core::{SocketConfig, build_hints};

fn configs() -> Vec<(&'static str, SocketConfig)> {
    vec![
        ("tcp_client", SocketConfig::inet("localhost", 8080)),
        ("tcp_server", SocketConfig::inet("127.0.0.1", 8080).with_server()),
        ("udp_client", SocketConfig::inet("localhost", 53).with_datagram()),
        ("ipv6_literal", SocketConfig::default().with_ipv6("::1").with_server()),
        ("unix", SocketConfig::unix("/tmp/socket99.sock").with_server()),
    ]
}

fn bench_build_hints(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_hints");
    for (name, cfg) in configs() {
        group.bench_with_input(BenchmarkId::new("core", name), &cfg, |b, cfg| {
            b.iter(|| criterion::black_box(build_hints(criterion::black_box(cfg))));
        });
        group.bench_with_input(BenchmarkId::new("addrinfo", name), &cfg, |b, cfg| {
            b.iter(|| {
                let ai = hints_to_addrinfo(&build_hints(criterion::black_box(cfg)));
                criterion::black_box(ai.ai_flags);
            });
        });
    }
    group.finish();
}

fn bench_check_and_service(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");
    let cfg = SocketConfig::inet("127.0.0.1", 65_535).with_ipv4("127.0.0.1");

    group.bench_function("check", |b| {
        b.iter(|| criterion::black_box(criterion::black_box(&cfg).check().is_ok()));
    });
    group.bench_function("service", |b| {
        b.iter(|| criterion::black_box(criterion::black_box(&cfg).service()));
    });
    group.finish();
}

criterion_group!(benches, bench_build_hints, bench_check_and_service);
criterion_main!(benches);
