//! Criterion benchmarks for the telemetry frame codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package hostpulse-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hostpulse_core::{decode_frame, encode_frame, TelemetryFrame};

fn bench_encode(c: &mut Criterion) {
    let frame = TelemetryFrame::new(63.47, 12.03, 1_760_745_600);
    c.bench_function("encode_frame", |b| {
        b.iter(|| encode_frame(black_box(&frame)).unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let text = encode_frame(&TelemetryFrame::new(63.47, 12.03, 1_760_745_600)).unwrap();
    c.bench_function("decode_frame", |b| {
        b.iter(|| decode_frame(black_box(&text)).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
