use std::hint::black_box;
use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lk_demux::{Demuxer, Lk7777Demuxer};
use lk_tests::{StreamBuilder, TEST_KEY, pattern};

fn drain(bytes: &[u8]) -> u64 {
    let mut demuxer = Lk7777Demuxer::open_with_key(Cursor::new(bytes), &TEST_KEY).unwrap();
    while demuxer.read_packet().unwrap().is_some() {}
    demuxer.close().payload_bytes
}

fn stream_of(frames: usize, payload_len: usize, encrypted: bool) -> Vec<u8> {
    let payload = pattern(payload_len, 1);
    let mut builder = StreamBuilder::new(TEST_KEY);
    for i in 0..frames {
        let ts = u32::try_from(i * 40).unwrap();
        if encrypted {
            builder.video_encrypted(ts, &payload);
        } else {
            builder.video(ts, &payload);
        }
    }
    builder.build()
}

fn bench_plain_vs_encrypted(c: &mut Criterion) {
    let mut group = c.benchmark_group("demux_frames");
    for &payload_len in &[188usize, 1024, 16 * 1024] {
        let plain = stream_of(256, payload_len, false);
        let encrypted = stream_of(256, payload_len, true);
        group.throughput(Throughput::Bytes(plain.len() as u64));

        group.bench_with_input(BenchmarkId::new("plain", payload_len), &plain, |b, bytes| {
            b.iter(|| drain(black_box(bytes)));
        });
        group.bench_with_input(
            BenchmarkId::new("encrypted", payload_len),
            &encrypted,
            |b, bytes| {
                b.iter(|| drain(black_box(bytes)));
            },
        );
    }
    group.finish();
}

fn bench_resync_scan(c: &mut Criterion) {
    let bytes = StreamBuilder::new(TEST_KEY)
        .garbage(150_000)
        .video(0, b"found")
        .build();

    let mut group = c.benchmark_group("resync");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("scan_150k_garbage", |b| {
        b.iter(|| drain(black_box(&bytes)));
    });
    group.finish();
}

fn bench_mixed_stream(c: &mut Criterion) {
    let mut builder = StreamBuilder::new(TEST_KEY);
    let video = pattern(4000, 2);
    let audio = pattern(417, 3);
    for i in 0..200u32 {
        builder.video_encrypted(i * 40, &video);
        builder.audio_encrypted(i * 40 + 13, &audio);
        if i % 10 == 0 {
            builder.auxiliary(i * 40, &pattern(32, 4));
        }
    }
    let bytes = builder.build();

    c.bench_function("demux_mixed_av", |b| {
        b.iter(|| drain(black_box(&bytes)));
    });
}

criterion_group!(benches, bench_plain_vs_encrypted, bench_resync_scan, bench_mixed_stream);
criterion_main!(benches);
