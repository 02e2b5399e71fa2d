//! Property-based tests for klimper-synth.
//!
//! Covers oscillator phase accumulation, envelope stage shapes, voice pool
//! bounds and the sequencer's note bookkeeping.

use klimper_core::{Waveform, WavetableCache};
use klimper_synth::{
    AdsrValues, Envelope, EnvelopeStage, NoteSink, SEQUENCER_POLYPHONY, Sequencer,
    SequencerConfig, Synth, SynthConfig, WavetableOscillator,
};
use proptest::prelude::*;

#[derive(Default)]
struct Recorder {
    on: usize,
    off: usize,
}

impl NoteSink for Recorder {
    fn note_on(&mut self, _note: u8, _velocity: f32) {
        self.on += 1;
    }

    fn note_off(&mut self, _note: u8) {
        self.off += 1;
    }
}

fn adsr() -> impl Strategy<Value = AdsrValues> {
    (
        0.0f32..0.05,
        0.0f32..0.05,
        prop_oneof![Just(0.0f32), 0.1f32..=1.0],
        0.0f32..0.05,
        0.1f32..=1.0,
    )
        .prop_map(|(attack, decay, sustain, release, peak)| AdsrValues {
            attack,
            decay,
            sustain,
            release,
            peak,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Without FM input, the phase after `n` ticks is `n * increment` wrapped
    /// into the table.
    #[test]
    fn oscillator_phase_accumulates(
        freq in 1.0f32..20000.0,
        ticks in 1usize..500,
    ) {
        let cache = WavetableCache::default();
        let mut osc = WavetableOscillator::new(cache.get(Waveform::Sine), 44100.0);
        osc.reinit(freq, true);
        for _ in 0..ticks {
            osc.tick(0.0);
        }

        let len = f64::from(osc.table_len());
        let expected = (ticks as f64 * f64::from(osc.increment())).rem_euclid(len);
        let diff = (f64::from(osc.phase()) - expected).abs();
        let circular = diff.min(len - diff);
        prop_assert!(circular < 0.05, "phase {} expected {}", osc.phase(), expected);
        prop_assert!(osc.phase() >= 0.0 && osc.phase() < osc.table_len());
    }

    /// Any FM input keeps the phase inside the table.
    #[test]
    fn oscillator_phase_stays_in_table(
        freq in 1.0f32..20000.0,
        fm in prop::collection::vec(-1000.0f32..1000.0, 1..64),
    ) {
        let cache = WavetableCache::default();
        let mut osc = WavetableOscillator::new(cache.get(Waveform::Sine), 44100.0);
        osc.reinit(freq, true);
        for input in fm {
            let sample = osc.tick(input);
            prop_assert!(sample.abs() <= 1.0 + 1e-6);
            prop_assert!(osc.phase() >= 0.0 && osc.phase() < osc.table_len());
        }
    }

    /// Attack never falls, decay and release never rise, and the level stays
    /// within `[0, peak]`.
    #[test]
    fn envelope_segments_are_monotonic(
        values in adsr(),
        gate_samples in 1usize..3000,
    ) {
        let mut env = Envelope::new(44100.0, values);
        env.trigger_attack();
        let mut last = env.value();
        let limit = values.peak + 1e-6;

        for _ in 0..gate_samples {
            let stage = env.stage();
            let v = env.tick();
            prop_assert!((0.0..=limit).contains(&v));
            match stage {
                EnvelopeStage::Attack => prop_assert!(v >= last),
                EnvelopeStage::Decay => prop_assert!(v <= last + 1e-6),
                _ => {}
            }
            last = v;
        }

        env.trigger_release();
        // The first release tick returns the level the gate left behind
        last = env.value();
        // Slowest case: released at the peak with sustain 0.1, so ten times
        // the 0.05 s release
        for _ in 0..25_000 {
            let v = env.tick();
            prop_assert!(v <= last + 1e-6, "release rose from {} to {}", last, v);
            prop_assert!(v >= 0.0);
            last = v;
        }
        prop_assert_eq!(env.stage(), EnvelopeStage::Stopped);
    }

    /// The active voice count never exceeds the pool, whatever notes arrive.
    #[test]
    fn voice_pool_is_bounded(
        polyphony in 1usize..8,
        notes in prop::collection::vec((0u8..128, 0.0f32..=1.0), 1..40),
    ) {
        let cache = WavetableCache::default();
        let config = SynthConfig { polyphony, ..SynthConfig::default() };
        let mut synth = Synth::new(&config, &cache).unwrap();
        let mut block = vec![0.0f32; 64];
        for (note, velocity) in notes {
            let slot = synth.note_on(note, velocity);
            prop_assert!(slot < polyphony);
            block.fill(0.0);
            synth.process(&mut block);
            prop_assert!(synth.active_voices() <= polyphony);
        }
    }

    /// The sequencer starts at most one note per call and never tracks more
    /// notes than its bound.
    #[test]
    fn sequencer_respects_bound(
        seed in any::<u64>(),
        bpm in 20u32..300,
        frames in prop::collection::vec(1usize..2000, 1..300),
    ) {
        let config = SequencerConfig { bpm, seed, ..SequencerConfig::default() };
        let mut sequencer = Sequencer::new(&config, 44100).unwrap();
        let mut sink = Recorder::default();
        for n in frames {
            let before = sink.on;
            sequencer.process(&mut sink, n);
            prop_assert!(sink.on - before <= 1);
            prop_assert!(sequencer.tracked_notes() <= SEQUENCER_POLYPHONY);
            prop_assert_eq!(sink.on - sink.off, sequencer.tracked_notes());
        }
    }
}
