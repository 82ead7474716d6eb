//! End-to-end open and result formatting benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use socket99::{SocketConfig, open};

fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");

    group.bench_function("tcp_server_ephemeral", |b| {
        let cfg = SocketConfig::inet("127.0.0.1", 0).with_server();
        b.iter(|| criterion::black_box(open(&cfg)));
    });

    group.bench_function("udp_client", |b| {
        let cfg = SocketConfig::inet("127.0.0.1", 9).with_datagram();
        b.iter(|| criterion::black_box(open(&cfg)));
    });

    group.bench_function("unix_datagram_server", |b| {
        let path = std::env::temp_dir().join(format!("socket99-bench-{}", std::process::id()));
        let cfg = SocketConfig::unix(&path).with_server().with_datagram();
        b.iter(|| {
            let res = open(&cfg);
            let _ = std::fs::remove_file(&path);
            criterion::black_box(res)
        });
    });

    group.bench_function("config_rejected", |b| {
        let cfg = SocketConfig::default().with_ipv4("127.0.0.1").with_ipv6("::1");
        b.iter(|| criterion::black_box(open(&cfg)));
    });

    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");
    let failed = open(&SocketConfig::inet("127.0.0.1", 100_000));
    let resolve_failed = open(&SocketConfig::inet("x", 80).with_ipv4("not-an-address"));

    group.bench_function("format_into_errno", |b| {
        let mut buf = [0u8; 128];
        b.iter(|| criterion::black_box(failed.format_into(&mut buf)));
    });
    group.bench_function("format_into_resolver", |b| {
        let mut buf = [0u8; 128];
        b.iter(|| criterion::black_box(resolve_failed.format_into(&mut buf)));
    });
    group.bench_function("write_to_sink", |b| {
        b.iter(|| criterion::black_box(failed.write_to(std::io::sink()).is_ok()));
    });

    group.finish();
}

criterion_group!(benches, bench_open, bench_format);
criterion_main!(benches);
