//! Performance benchmarks for the mix engine
//!
//! Run with: cargo bench -p seymour-core --bench mix_engine_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seymour_core::engine::MixEngine;
use seymour_core::params::{ChannelParam, GlobalParam};
use seymour_core::{BusFrames, NUM_BUSSES, MAX_CHANNELS};
use std::f32::consts::PI;

const SAMPLE_RATE: f32 = 48000.0;

/// Fill the first `channels` busses with sines at different pitches
fn generate_bus_block(channels: usize, frames: usize) -> Vec<f32> {
    let mut data = vec![0.0f32; NUM_BUSSES * frames];
    for ch in 0..channels {
        let freq = 110.0 * (ch + 1) as f32;
        for i in 0..frames {
            data[ch * frames + i] = 3.0 * (2.0 * PI * freq * i as f32 / SAMPLE_RATE).sin();
        }
    }
    data
}

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("mix_engine_block");

    for frames in [32usize, 128, 512] {
        group.throughput(Throughput::Elements(frames as u64));
        group.bench_with_input(BenchmarkId::new("8ch", frames), &frames, |b, &frames| {
            let mut engine = MixEngine::new(MAX_CHANNELS, SAMPLE_RATE);
            let layout = engine.layout().clone();
            let mut params = layout.defaults();
            for ch in 0..MAX_CHANNELS {
                params[layout.channel_param(ch, ChannelParam::Feedback)] = 70;
                params[layout.channel_param(ch, ChannelParam::Pan)] = -100 + 25 * ch as i32;
            }
            // Push the limiter into gain reduction
            params[layout.global_param(GlobalParam::Squash)] = 100;

            let source = generate_bus_block(MAX_CHANNELS, frames);
            let mut data = source.clone();

            b.iter(|| {
                data.copy_from_slice(&source);
                let mut busses = BusFrames::new(&mut data, frames);
                engine.process(&mut busses, black_box(params.as_slice()));
                black_box(busses.read(13, frames - 1))
            });
        });
    }

    group.finish();
}

fn bench_channel_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("mix_engine_channels");
    let frames = 128;
    group.throughput(Throughput::Elements(frames as u64));

    for channels in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("128f", channels), &channels, |b, &channels| {
            let mut engine = MixEngine::new(channels, SAMPLE_RATE);
            let params = engine.layout().defaults();
            let source = generate_bus_block(channels, frames);
            let mut data = source.clone();

            b.iter(|| {
                data.copy_from_slice(&source);
                let mut busses = BusFrames::new(&mut data, frames);
                engine.process(&mut busses, black_box(params.as_slice()));
                black_box(busses.read(13, 0))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_block_sizes, bench_channel_counts);
criterion_main!(benches);
