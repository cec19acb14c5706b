//! Performance benchmarks for the per-packet hot path

use client::game::{GameSnapshot, SharedSnapshot};
use shared::{split_frames, FrameDecoder, StateUpdate};
use std::time::Instant;

const TICK_RECORD: &[u8] =
    br#"{"paddles":{"0":250.0,"1":312.5},"ball":{"x":401.25,"y":299.5},"scores":[3,2],"countdown":0,"winner":null,"sound_event":null}"#;

fn record_stream(records: usize) -> Vec<u8> {
    let mut stream = Vec::with_capacity(records * (TICK_RECORD.len() + 1));
    for _ in 0..records {
        stream.extend_from_slice(TICK_RECORD);
        stream.push(b'\n');
    }
    stream
}

/// Benchmarks splitting a buffer holding many complete records
#[test]
fn benchmark_frame_splitting() {
    let stream = record_stream(10_000);

    let start = Instant::now();
    let (frames, rest) = split_frames(&stream);
    let duration = start.elapsed();

    println!(
        "Frame splitting: {} records in {:?} ({:.2} ns/record)",
        frames.len(),
        duration,
        duration.as_nanos() as f64 / frames.len() as f64
    );

    assert_eq!(frames.len(), 10_000);
    assert!(rest.is_empty());
    assert!(duration.as_millis() < 100);
}

/// Benchmarks the decoder fed in socket-sized chunks
#[test]
fn benchmark_chunked_decoding() {
    let stream = record_stream(10_000);
    let mut decoder = FrameDecoder::new();
    let mut decoded = 0;

    let start = Instant::now();
    for chunk in stream.chunks(shared::READ_CHUNK_SIZE) {
        decoder.extend(chunk);
        decoded += decoder.drain_frames().len();
    }
    let duration = start.elapsed();

    println!(
        "Chunked decoding: {} records in {:?} ({:.2} μs/chunk)",
        decoded,
        duration,
        duration.as_micros() as f64 / (stream.len() / shared::READ_CHUNK_SIZE) as f64
    );

    assert_eq!(decoded, 10_000);
    assert!(decoder.is_empty());
    assert!(duration.as_millis() < 500);
}

/// Benchmarks parsing and merging full state records
#[test]
fn benchmark_parse_and_merge() {
    let mut snapshot = GameSnapshot::new();
    let iterations = 10_000;

    let start = Instant::now();
    for _ in 0..iterations {
        let update = StateUpdate::parse(TICK_RECORD).unwrap();
        snapshot.apply(update);
    }
    let duration = start.elapsed();

    println!(
        "Parse + merge: {} records in {:?} ({:.2} μs/record)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert_eq!(snapshot.scores, Some([3, 2]));
    // Should keep up with a 60Hz stream by several orders of magnitude
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks contended merges through the shared snapshot
#[tokio::test]
async fn benchmark_shared_snapshot_merge() {
    let shared = SharedSnapshot::new();
    let reader = shared.clone();
    let iterations = 5_000;

    let reads = tokio::spawn(async move {
        let mut observed = 0;
        for _ in 0..iterations {
            if reader.read().await.is_playable() {
                observed += 1;
            }
            tokio::task::yield_now().await;
        }
        observed
    });

    let start = Instant::now();
    for _ in 0..iterations {
        shared.merge(TICK_RECORD).await.unwrap();
    }
    let duration = start.elapsed();
    let observed = reads.await.unwrap();

    println!(
        "Shared merge: {} records in {:?} ({} playable reads)",
        iterations, duration, observed
    );

    assert!(duration.as_millis() < 2000);
}
