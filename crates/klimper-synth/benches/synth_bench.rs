//! Criterion benchmarks for klimper-synth components
//!
//! Run with: cargo bench -p klimper-synth
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use klimper_core::{Waveform, WavetableCache};
use klimper_synth::{
    AdsrValues, Envelope, NoteSink, Sequencer, SequencerConfig, Synth, SynthConfig,
    WavetableOscillator,
};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZES: &[usize] = &[110, 220, 880];

// ============================================================================
// Oscillator benchmarks
// ============================================================================

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");
    let cache = WavetableCache::default();

    for &block_size in BLOCK_SIZES {
        let mut osc = WavetableOscillator::new(cache.get(Waveform::Sine), SAMPLE_RATE);
        osc.reinit(440.0, true);
        group.bench_with_input(BenchmarkId::new("Plain", block_size), &block_size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..n {
                    sum += osc.tick(0.0);
                }
                black_box(sum)
            })
        });

        let mut carrier = WavetableOscillator::new(cache.get(Waveform::Sine), SAMPLE_RATE);
        let mut modulator = WavetableOscillator::new(cache.get(Waveform::Sine), SAMPLE_RATE);
        carrier.reinit(440.0, true);
        modulator.reinit(880.0, true);
        group.bench_with_input(BenchmarkId::new("FM", block_size), &block_size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..n {
                    sum += carrier.tick(modulator.tick(0.0) * 0.8);
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Envelope benchmarks
// ============================================================================

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("Envelope");

    for &block_size in BLOCK_SIZES {
        let mut env = Envelope::new(SAMPLE_RATE, AdsrValues::default());
        group.bench_with_input(BenchmarkId::new("Cycle", block_size), &block_size, |b, &n| {
            b.iter(|| {
                env.trigger_attack();
                let mut sum = 0.0f32;
                for i in 0..n {
                    if i == n / 2 {
                        env.trigger_release();
                    }
                    sum += env.tick();
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

// ============================================================================
// Synth benchmarks
// ============================================================================

fn bench_synth_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("Synth");
    let cache = WavetableCache::default();

    for voices in [1usize, 4, 8] {
        let config = SynthConfig::default();
        let mut synth = Synth::new(&config, &cache).unwrap();
        for i in 0..voices {
            synth.note_on(48 + 2 * i as u8, 0.8);
        }
        // One 220-sample sub-block, the engine's unit of work
        let mut block = vec![0.0f32; 220];
        group.bench_with_input(BenchmarkId::new("Voices", voices), &voices, |b, _| {
            b.iter(|| {
                block.fill(0.0);
                synth.process(black_box(&mut block));
            })
        });
    }

    group.finish();
}

fn bench_voice_allocation(c: &mut Criterion) {
    let cache = WavetableCache::default();
    let mut synth = Synth::new(&SynthConfig::default(), &cache).unwrap();
    let mut note = 0u8;

    c.bench_function("Synth/note_on_steal", |b| {
        b.iter(|| {
            note = (note + 7) % 128;
            black_box(synth.note_on(note, 0.7));
        })
    });
}

struct Discard;

impl NoteSink for Discard {
    fn note_on(&mut self, note: u8, velocity: f32) {
        black_box((note, velocity));
    }

    fn note_off(&mut self, note: u8) {
        black_box(note);
    }
}

fn bench_sequencer(c: &mut Criterion) {
    let mut sequencer = Sequencer::new(&SequencerConfig::default(), 44100).unwrap();
    let mut sink = Discard;

    c.bench_function("Sequencer/process_110", |b| {
        b.iter(|| sequencer.process(&mut sink, black_box(110)))
    });
}

criterion_group!(
    benches,
    bench_oscillator,
    bench_envelope,
    bench_synth_voices,
    bench_voice_allocation,
    bench_sequencer,
);

criterion_main!(benches);
