use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use radio_bus::*;
use std::hint::black_box;

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let radio = Radio::new();
    let channel = radio.channel("bench").unwrap();

    channel
        .comply("save", Handler::effect(|_, _| {}))
        .reply("load", Handler::new(|_, args| args.first().cloned().unwrap_or(Value::Null)))
        .reply(DEFAULT_HANDLER, json!(null));

    group.throughput(Throughput::Elements(1));
    group.bench_function("command", |b| {
        b.iter(|| channel.command(black_box("save"), &[json!(1)]));
    });
    group.bench_function("request", |b| {
        b.iter(|| black_box(channel.request(black_box("load"), &[json!(1)])));
    });
    group.bench_function("request_default_fallback", |b| {
        b.iter(|| black_box(channel.request(black_box("missing"), &[])));
    });
    group.bench_function("registry_lookup", |b| {
        b.iter(|| black_box(radio.request("bench", "load", &[]).unwrap()));
    });

    for names in [2usize, 8, 32] {
        let key = (0..names).map(|i| format!("n{i}")).collect::<Vec<_>>().join(" ");
        group.throughput(Throughput::Elements(names as u64));
        group.bench_with_input(BenchmarkId::new("request_fanout", names), &key, |b, key| {
            b.iter(|| black_box(channel.request(key.as_str(), &[])));
        });
    }

    for listeners in [1usize, 10, 100] {
        let bus = EventBus::new();
        for _ in 0..listeners {
            bus.on("tick", Handler::effect(|_, _| {}));
        }
        group.throughput(Throughput::Elements(listeners as u64));
        group.bench_with_input(BenchmarkId::new("trigger", listeners), &bus, |b, bus| {
            b.iter(|| bus.trigger(black_box("tick"), &[json!(1)]));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
