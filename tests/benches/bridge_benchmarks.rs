//! # Script Bridge Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | Registry | allocate and resolve against a populated table |
//! | Dispatcher | dispatch, notify, deliver (queued) |
//! | Codec | encode, decode typed and declared payloads |

#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sb_call_bridge::domain::DecodeTarget;
use sb_call_bridge::{
    CallDispatcher, CallbackChannel, ChannelTransport, FunctionDescriptor, JsonCodec, JsonKind,
    PayloadCodec, QueuedDelivery, RemoteFunctionRef,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Profile {
    id: u64,
    name: String,
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Entry {
    i: usize,
    tag: String,
}

// ============================================================================
// Registry
// ============================================================================

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");
    group.measurement_time(Duration::from_secs(5));

    for preload in [0usize, 1_000, 10_000] {
        let (transport, _commands) = ChannelTransport::new();
        let dispatcher = CallDispatcher::builder()
            .transport(transport)
            .delivery(Arc::new(QueuedDelivery::new()))
            .build()
            .unwrap();
        let add = FunctionDescriptor::new("add", RemoteFunctionRef::new(Some("calc"), "add"));

        // Keep `preload` calls in flight to measure lookups in a populated table.
        for _ in 0..preload {
            let _ = dispatcher
                .call::<i64>(add.clone(), vec![json!(1), json!(2)])
                .unwrap();
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("allocate_code", preload),
            &preload,
            |b, _| b.iter(|| black_box(dispatcher.registry().allocate_code())),
        );

        group.bench_with_input(BenchmarkId::new("resolve_unknown", preload), &preload, |b, _| {
            b.iter(|| black_box(dispatcher.registry().resolve(black_box("x")).is_none()))
        });
    }

    group.finish();
}

// ============================================================================
// Dispatch and completion
// ============================================================================

fn bench_dispatch_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.measurement_time(Duration::from_secs(5));

    let (transport, mut commands) = ChannelTransport::new();
    let delivery = Arc::new(QueuedDelivery::new());
    let dispatcher = CallDispatcher::builder()
        .transport(transport)
        .delivery(delivery.clone())
        .build()
        .unwrap();
    let add = FunctionDescriptor::new("add", RemoteFunctionRef::new(Some("calc"), "add"));
    let profile =
        FunctionDescriptor::new("profile", RemoteFunctionRef::new(Some("calc"), "loadProfile"));

    group.bench_function("round_trip_integer", |b| {
        b.iter(|| {
            let handle = dispatcher
                .call::<i64>(add.clone(), vec![json!(1), json!(2)])
                .unwrap()
                .on_success(|sum| {
                    black_box(sum);
                });
            let _ = commands.try_recv();
            dispatcher.on_success_notification(handle.code().as_str(), Some("3".to_string()));
            delivery.run_pending()
        })
    });

    let payload = json!({ "id": 7, "name": "ada", "tags": ["admin", "ops"] }).to_string();
    group.bench_function("round_trip_struct", |b| {
        b.iter(|| {
            let handle = dispatcher
                .call::<Profile>(profile.clone(), vec![json!(7)])
                .unwrap()
                .on_success(|p| {
                    black_box(p);
                });
            let _ = commands.try_recv();
            dispatcher.on_success_notification(handle.code().as_str(), Some(payload.clone()));
            delivery.run_pending()
        })
    });

    group.bench_function("round_trip_remote_error", |b| {
        b.iter(|| {
            let handle = dispatcher
                .call::<i64>(add.clone(), vec![])
                .unwrap()
                .on_error(|e| {
                    black_box(e);
                });
            let _ = commands.try_recv();
            dispatcher.on_error_notification(handle.code().as_str(), "TypeError".to_string());
            delivery.run_pending()
        })
    });

    group.finish();
}

// ============================================================================
// Codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = JsonCodec::new();

    for size in [1usize, 100, 1_000] {
        let document: Value = (0..size).map(|i| json!({ "i": i, "tag": "x" })).collect();
        let text = document.to_string();

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &document, |b, doc| {
            b.iter(|| black_box(codec.encode(doc).unwrap()))
        });

        let declared = DecodeTarget::Json(JsonKind::Array);
        group.bench_with_input(BenchmarkId::new("decode_declared", size), &text, |b, text| {
            b.iter(|| black_box(codec.decode(text, &declared).unwrap()))
        });

        let typed = DecodeTarget::Typed("Vec<Entry>");
        group.bench_with_input(BenchmarkId::new("decode_typed", size), &text, |b, text| {
            b.iter(|| {
                let value = codec.decode(text, &typed).unwrap();
                black_box(serde_json::from_value::<Vec<Entry>>(value).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_registry, bench_dispatch_complete, bench_codec);
criterion_main!(benches);
