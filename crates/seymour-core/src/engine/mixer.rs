//! Mix engine - feedback channels, master level, lookahead limiter
//!
//! Signal flow per frame:
//!   input bus → (+ DC-blocked feedback tap × feedback) → pan → Σ mix
//!   → master level → lookahead limiter → output busses
//!
//! Raw parameters are read once per block into [`GlobalConfig`] and
//! [`ChannelConfig`] snapshots; CV busses are read per frame. Lookahead and
//! feedback delay lengths are recomputed when their raw values change, either
//! through [`MixEngine::parameter_changed`] or when a block starts.
//!
//! Everything is allocated in [`MixEngine::new`]; `process` never allocates,
//! locks, or logs.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::channel::{ChannelConfig, ChannelState};
use super::coefficients::Coefficients;
use super::feedback_delay::FeedbackDelayLine;
use super::limiter::{squash_threshold, LookaheadLimiter};
use super::saturation::Saturation;
use super::smoother::ParameterSmoother;
use crate::params::{GlobalParam, ParamId, ParamSource, ParameterLayout};
use crate::types::{BusFrames, StereoSample, MAX_CHANNELS};

/// Smoothed master level at construction
const INITIAL_MASTER_LEVEL: f32 = 0.8;

// ═══════════════════════════════════════════════════════════════════════════════
// Global configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-block snapshot of the global parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalConfig {
    pub output_left: i32,
    pub output_right: i32,
    /// Overwrite the output busses instead of adding to them
    pub replace: bool,
    /// Master level target 0..1
    pub master_level: f32,
    pub saturation: Saturation,
    /// Limiter threshold in volts, derived from squash
    pub threshold: f32,
}

impl GlobalConfig {
    pub fn read<P: ParamSource + ?Sized>(layout: &ParameterLayout, params: &P) -> Self {
        let raw = |p: GlobalParam| params.raw(layout.global_param(p));
        Self {
            output_left: raw(GlobalParam::OutputL),
            output_right: raw(GlobalParam::OutputR),
            replace: raw(GlobalParam::OutputMode) != 0,
            master_level: raw(GlobalParam::MasterLevel) as f32 / 100.0,
            saturation: Saturation::from_raw(raw(GlobalParam::Saturation)),
            threshold: squash_threshold(raw(GlobalParam::Squash) as f32),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Mix engine
// ═══════════════════════════════════════════════════════════════════════════════

/// Multi-channel feedback mixer with a lookahead safety limiter
pub struct MixEngine {
    layout: ParameterLayout,
    coeffs: Coefficients,

    /// Runtime state, only the first `num_channels` entries are used
    channels: [ChannelState; MAX_CHANNELS],
    /// Parameter snapshot for the current block
    configs: [ChannelConfig; MAX_CHANNELS],
    master_level: ParameterSmoother,

    feedback: FeedbackDelayLine,
    limiter: LookaheadLimiter,

    /// Raw lookahead (tenths of ms) the limiter was last configured with
    lookahead_raw: i32,
    /// Raw feedback delay (tenths of ms) the delay line was last configured with
    feedback_delay_raw: i32,
}

impl MixEngine {
    /// Create an engine for `num_channels` channels (clamped to 1..=8)
    pub fn new(num_channels: usize, sample_rate: f32) -> Self {
        let layout = ParameterLayout::new(num_channels);
        let coeffs = Coefficients::new(sample_rate);
        let limiter = LookaheadLimiter::new(&coeffs);

        let mut engine = Self {
            layout,
            coeffs,
            channels: [ChannelState::new(); MAX_CHANNELS],
            configs: [ChannelConfig::default(); MAX_CHANNELS],
            master_level: ParameterSmoother::new(INITIAL_MASTER_LEVEL),
            feedback: FeedbackDelayLine::new(),
            limiter,
            lookahead_raw: 0,
            feedback_delay_raw: 0,
        };

        let lookahead = GlobalParam::Lookahead.info().default;
        let feedback_delay = GlobalParam::FeedbackDelay.info().default;
        engine.apply_lookahead(lookahead);
        engine.apply_feedback_delay(feedback_delay);

        log::info!(
            "MixEngine: {} channels @ {} Hz, lookahead {} samples, feedback delay {} samples",
            engine.layout.num_channels(),
            engine.coeffs.sample_rate,
            engine.limiter.latency_samples(),
            engine.feedback.delay_samples()
        );

        engine
    }

    /// Parameter table for this instance
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    pub fn num_channels(&self) -> usize {
        self.layout.num_channels()
    }

    pub fn sample_rate(&self) -> f32 {
        self.coeffs.sample_rate
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coeffs
    }

    /// Latency introduced by the limiter's lookahead, in samples
    pub fn latency_samples(&self) -> usize {
        self.limiter.latency_samples()
    }

    /// Current feedback delay in samples
    pub fn feedback_delay_samples(&self) -> usize {
        self.feedback.delay_samples()
    }

    /// Current smoothed master level
    pub fn master_level(&self) -> f32 {
        self.master_level.value()
    }

    /// Runtime state of channel `channel` (0-based)
    pub fn channel(&self, channel: usize) -> Option<&ChannelState> {
        self.channels[..self.num_channels()].get(channel)
    }

    pub fn limiter(&self) -> &LookaheadLimiter {
        &self.limiter
    }

    /// Get the limiting indicator atomic (for UI)
    pub fn limit_indicator(&self) -> Arc<AtomicBool> {
        self.limiter.limit_indicator()
    }

    /// Recompute coefficients and both delay lengths for a new sample rate.
    ///
    /// Ring buffers keep their size; delays are re-clamped into them.
    pub fn set_sample_rate<P: ParamSource + ?Sized>(&mut self, sample_rate: f32, params: &P) {
        self.coeffs = Coefficients::new(sample_rate);
        self.limiter.set_coefficients(&self.coeffs);
        self.apply_lookahead(params.raw(self.layout.global_param(GlobalParam::Lookahead)));
        self.apply_feedback_delay(params.raw(self.layout.global_param(GlobalParam::FeedbackDelay)));

        log::info!(
            "MixEngine: sample rate {} Hz, lookahead {} samples, feedback delay {} samples",
            self.coeffs.sample_rate,
            self.limiter.latency_samples(),
            self.feedback.delay_samples()
        );
    }

    /// Notify the engine that the parameter at `index` changed.
    ///
    /// Only the lookahead and feedback delay need immediate recomputation;
    /// everything else is picked up at the next block.
    pub fn parameter_changed<P: ParamSource + ?Sized>(&mut self, index: usize, params: &P) {
        match self.layout.locate(index) {
            Ok(ParamId::Global(GlobalParam::Lookahead)) => {
                self.apply_lookahead(params.raw(index));
                log::debug!(
                    "MixEngine: lookahead now {} samples",
                    self.limiter.latency_samples()
                );
            }
            Ok(ParamId::Global(GlobalParam::FeedbackDelay)) => {
                self.apply_feedback_delay(params.raw(index));
                log::debug!(
                    "MixEngine: feedback delay now {} samples",
                    self.feedback.delay_samples()
                );
            }
            Ok(_) => {}
            Err(e) => log::warn!("MixEngine: {}", e),
        }
    }

    fn apply_lookahead(&mut self, raw: i32) {
        let samples = self.coeffs.ms_to_samples(raw as f32 / 10.0);
        self.limiter.set_lookahead_samples(samples);
        self.lookahead_raw = raw;
    }

    fn apply_feedback_delay(&mut self, raw: i32) {
        let samples = self.coeffs.ms_to_samples(raw as f32 / 10.0);
        self.feedback.set_delay_samples(samples);
        self.feedback_delay_raw = raw;
    }

    /// Process one block of host bus frames in place
    pub fn process<P: ParamSource + ?Sized>(&mut self, busses: &mut BusFrames<'_>, params: &P) {
        let num_channels = self.layout.num_channels();

        // ── 1. Snapshot parameters for this block ────────────────────────
        let globals = GlobalConfig::read(&self.layout, params);

        let lookahead = params.raw(self.layout.global_param(GlobalParam::Lookahead));
        if lookahead != self.lookahead_raw {
            self.apply_lookahead(lookahead);
        }
        let feedback_delay = params.raw(self.layout.global_param(GlobalParam::FeedbackDelay));
        if feedback_delay != self.feedback_delay_raw {
            self.apply_feedback_delay(feedback_delay);
        }

        for (ch, config) in self.configs[..num_channels].iter_mut().enumerate() {
            *config = ChannelConfig::read(&self.layout, params, ch);
        }

        self.limiter.begin_block(globals.threshold, globals.saturation);

        for frame in 0..busses.num_frames() {
            // ── 2. Channels: input + feedback tap → lane, pan → mix ──────
            let read_pos = self.feedback.read_pos();
            let mut mix = StereoSample::silence();

            for ch in 0..num_channels {
                let config = self.configs[ch];
                let input = busses.read(config.input_bus, frame);
                let feedback_target = config.feedback_target(busses, frame);
                let pan_target = config.pan_target(busses, frame);
                let tap = self.feedback.tap(read_pos, ch);

                let (lane, out) = self.channels[ch].process(
                    input,
                    tap,
                    feedback_target,
                    pan_target,
                    &self.coeffs,
                );
                self.feedback.write(ch, lane);
                mix += out;
            }

            self.feedback.advance();

            // ── 3. Master level ──────────────────────────────────────────
            mix *= self.master_level.next(globals.master_level, self.coeffs.smoothing);

            // ── 4. Limiter ───────────────────────────────────────────────
            let out = self.limiter.process(mix);

            // ── 5. Output busses ─────────────────────────────────────────
            if globals.replace {
                busses.write(globals.output_left, frame, out.left);
                busses.write(globals.output_right, frame, out.right);
            } else {
                busses.accumulate(globals.output_left, frame, out.left);
                busses.accumulate(globals.output_right, frame, out.right);
            }
        }

        self.limiter.end_block();
    }

    /// Clear all delay lines and filter state and return smoothers to their
    /// initial values
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.master_level.snap(INITIAL_MASTER_LEVEL);
        self.feedback.reset();
        self.limiter.reset();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ChannelParam;
    use std::sync::atomic::Ordering;

    const SR: f32 = 48000.0;
    const NUM_BUSSES: usize = 28;

    fn run_block(engine: &mut MixEngine, params: &[i32], bus_data: &mut [f32], frames: usize) {
        let mut busses = BusFrames::new(bus_data, frames);
        engine.process(&mut busses, params);
    }

    #[test]
    fn test_new_uses_default_delays() {
        let engine = MixEngine::new(4, SR);
        // 5 ms @ 48 kHz
        assert_eq!(engine.latency_samples(), 240);
        assert_eq!(engine.feedback_delay_samples(), 240);
        assert_eq!(engine.num_channels(), 4);
        assert_eq!(engine.master_level(), INITIAL_MASTER_LEVEL);
    }

    #[test]
    fn test_channel_count_clamped() {
        assert_eq!(MixEngine::new(0, SR).num_channels(), 1);
        assert_eq!(MixEngine::new(9, SR).num_channels(), MAX_CHANNELS);
        assert!(MixEngine::new(2, SR).channel(2).is_none());
    }

    #[test]
    fn test_parameter_changed_recomputes_delays() {
        let mut engine = MixEngine::new(1, SR);
        let layout = engine.layout().clone();
        let mut params = layout.defaults();

        let lookahead = layout.global_param(GlobalParam::Lookahead);
        params[lookahead] = 10; // 1 ms
        engine.parameter_changed(lookahead, &params);
        assert_eq!(engine.latency_samples(), 48);

        let fb_delay = layout.global_param(GlobalParam::FeedbackDelay);
        params[fb_delay] = 200; // 20 ms
        engine.parameter_changed(fb_delay, &params);
        assert_eq!(engine.feedback_delay_samples(), 960);

        // Unrelated and unknown indices leave delays alone
        engine.parameter_changed(layout.global_param(GlobalParam::Squash), &params);
        engine.parameter_changed(layout.len() + 3, &params);
        assert_eq!(engine.latency_samples(), 48);
        assert_eq!(engine.feedback_delay_samples(), 960);
    }

    #[test]
    fn test_block_start_detects_delay_changes() {
        let mut engine = MixEngine::new(1, SR);
        let layout = engine.layout().clone();
        let mut params = layout.defaults();
        params[layout.global_param(GlobalParam::Lookahead)] = 5;
        params[layout.global_param(GlobalParam::FeedbackDelay)] = 100;

        let mut bus_data = vec![0.0; NUM_BUSSES * 16];
        run_block(&mut engine, &params, &mut bus_data, 16);

        assert_eq!(engine.latency_samples(), 24);
        assert_eq!(engine.feedback_delay_samples(), 480);
    }

    #[test]
    fn test_sample_rate_change_rescales_delays() {
        let mut engine = MixEngine::new(1, SR);
        let params = engine.layout().defaults();
        engine.set_sample_rate(96000.0, &params);
        assert_eq!(engine.sample_rate(), 96000.0);
        assert_eq!(engine.latency_samples(), 480);
        assert_eq!(engine.feedback_delay_samples(), 480);
    }

    #[test]
    fn test_output_mode_add_vs_replace() {
        let frames = 8;
        let mut engine = MixEngine::new(1, SR);
        let layout = engine.layout().clone();
        let mut params = layout.defaults();
        params[layout.channel_param(0, ChannelParam::Input)] = 0;

        // Replace: silent mix overwrites whatever is on the output busses
        let mut bus_data = vec![0.0; NUM_BUSSES * frames];
        let mut busses = BusFrames::new(&mut bus_data, frames);
        for f in 0..frames {
            busses.write(13, f, 3.0);
            busses.write(14, f, 3.0);
        }
        engine.process(&mut busses, &params);
        assert!(busses.bus(13).unwrap().iter().all(|&s| s == 0.0));
        assert!(busses.bus(14).unwrap().iter().all(|&s| s == 0.0));

        // Add: silent mix leaves existing content in place
        params[layout.global_param(GlobalParam::OutputMode)] = 0;
        for f in 0..frames {
            busses.write(13, f, 3.0);
        }
        engine.process(&mut busses, &params);
        assert!(busses.bus(13).unwrap().iter().all(|&s| s == 3.0));
    }

    #[test]
    fn test_limit_indicator_raised_on_overload() {
        let frames = 256;
        let mut engine = MixEngine::new(1, SR);
        let layout = engine.layout().clone();
        let mut params = layout.defaults();
        params[layout.global_param(GlobalParam::Squash)] = 100; // 1 V threshold

        let indicator = engine.limit_indicator();
        let mut bus_data = vec![0.0; NUM_BUSSES * frames];
        {
            let mut busses = BusFrames::new(&mut bus_data, frames);
            busses.bus_mut(1).unwrap().fill(8.0);
        }
        for _ in 0..8 {
            run_block(&mut engine, &params, &mut bus_data, frames);
            let mut busses = BusFrames::new(&mut bus_data, frames);
            busses.bus_mut(1).unwrap().fill(8.0);
        }
        assert!(indicator.load(Ordering::Relaxed));
        assert!(engine.limiter().gain() < 0.5);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let frames = 64;
        let mut engine = MixEngine::new(2, SR);
        let layout = engine.layout().clone();
        let mut params = layout.defaults();
        params[layout.channel_param(0, ChannelParam::Feedback)] = 80;
        params[layout.global_param(GlobalParam::MasterLevel)] = 20;

        let mut bus_data = vec![0.5; NUM_BUSSES * frames];
        run_block(&mut engine, &params, &mut bus_data, frames);
        assert!(engine.channel(0).unwrap().feedback() > 0.0);
        assert!(engine.master_level() < INITIAL_MASTER_LEVEL);

        engine.reset();
        assert_eq!(engine.channel(0).unwrap().feedback(), 0.0);
        assert_eq!(engine.master_level(), INITIAL_MASTER_LEVEL);
        assert_eq!(engine.limiter().gain(), 1.0);
        assert_eq!(engine.limiter().envelope(), 0.0);
    }
}
