//! Property-based tests for the mixer building blocks
//!
//! These tests use proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use seymour_core::config::MixerConfig;
use seymour_core::engine::*;
use seymour_core::params::{ChannelParam, GlobalParam, ParameterLayout};
use seymour_core::{BusFrames, NUM_BUSSES};

proptest! {
    /// Property: equal-power pan keeps gL² + gR² = 1 with both gains in [0, 1]
    #[test]
    fn pan_law_preserves_power(pan in -100.0f32..=100.0) {
        let (l, r) = equal_power_pan(pan);
        prop_assert!((l * l + r * r - 1.0).abs() < 1e-5);
        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&l));
        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&r));
    }

    /// Property: moving the pan right never makes the left side louder
    #[test]
    fn pan_is_monotonic(a in -100.0f32..=100.0, b in -100.0f32..=100.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (l_lo, r_lo) = equal_power_pan(lo);
        let (l_hi, r_hi) = equal_power_pan(hi);
        prop_assert!(l_hi <= l_lo + 1e-6);
        prop_assert!(r_hi >= r_lo - 1e-6);
    }

    /// Property: soft and hard curves never leave ±1, tube never leaves ±1.1
    #[test]
    fn saturation_is_bounded(x in -1000.0f32..1000.0) {
        prop_assert!(Saturation::Soft.apply(x).abs() <= 1.0);
        prop_assert!(Saturation::Hard.apply(x).abs() <= 1.0);
        prop_assert!(Saturation::Tube.apply(x).abs() <= 1.1 + 1e-6);
    }

    /// Property: every curve preserves the sign of its input
    #[test]
    fn saturation_preserves_sign(x in -50.0f32..50.0, raw in 0i32..3) {
        let y = Saturation::from_raw(raw).apply(x);
        prop_assert!(y * x >= 0.0);
    }

    /// Property: CV modulation keeps feedback in [0, 1] and pan in [-100, 100]
    #[test]
    fn cv_modulation_stays_in_range(
        base in 0.0f32..=1.0,
        pan in -100.0f32..=100.0,
        cv in -20.0f32..20.0,
        depth in 0.0f32..=1.0
    ) {
        let fb = modulate_feedback(base, cv, depth);
        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&fb));
        let p = modulate_pan(pan, cv, depth);
        prop_assert!((-100.0..=100.0).contains(&p));
    }

    /// Property: config conversion always produces in-range raw values
    #[test]
    fn mixer_config_raw_values_in_range(
        feedback in -50.0f32..250.0,
        pan in -500i32..500,
        lookahead_ms in -5.0f32..100.0,
        squash in -20.0f32..200.0,
        channels in 1usize..=8
    ) {
        let mut config = MixerConfig {
            lookahead_ms,
            squash_percent: squash,
            ..MixerConfig::default()
        };
        config.channels = (0..channels)
            .map(|ch| {
                let mut c = seymour_core::config::ChannelSettings::for_channel(ch);
                c.feedback_percent = feedback;
                c.pan = pan;
                c
            })
            .collect();

        let layout = ParameterLayout::new(config.num_channels());
        let raw = config.raw_values(&layout);
        prop_assert_eq!(raw.len(), layout.len());
        for (value, info) in raw.iter().zip(layout.params()) {
            prop_assert!(*value >= info.min && *value <= info.max, "{} = {}", info.name, value);
        }
    }

    /// Property: the engine never produces NaN or Inf for any parameter set
    #[test]
    fn engine_output_is_finite(
        samples in prop::collection::vec(-10.0f32..10.0, 64..512),
        feedback in 0i32..=100,
        pan in -100i32..=100,
        saturation in 0i32..=2,
        squash in 0i32..=100,
        lookahead in 5i32..=200,
        feedback_delay in 5i32..=200
    ) {
        let mut engine = MixEngine::new(2, 48000.0);
        let layout = engine.layout().clone();
        let mut params = layout.defaults();
        for ch in 0..2 {
            params[layout.channel_param(ch, ChannelParam::Feedback)] = feedback;
            params[layout.channel_param(ch, ChannelParam::Pan)] = pan;
        }
        params[layout.global_param(GlobalParam::Saturation)] = saturation;
        params[layout.global_param(GlobalParam::Squash)] = squash;
        params[layout.global_param(GlobalParam::Lookahead)] = lookahead;
        params[layout.global_param(GlobalParam::FeedbackDelay)] = feedback_delay;

        let frames = samples.len();
        for _ in 0..8 {
            let mut bus_data = vec![0.0f32; NUM_BUSSES * frames];
            bus_data[..frames].copy_from_slice(&samples);
            bus_data[frames..2 * frames].copy_from_slice(&samples);
            let mut busses = BusFrames::new(&mut bus_data, frames);
            engine.process(&mut busses, params.as_slice());

            let left = busses.bus(13).unwrap();
            let right = busses.bus(14).unwrap();
            prop_assert!(left.iter().chain(right).all(|s| s.is_finite()));
        }
    }
}
